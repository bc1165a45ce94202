//! Rule forest: construction, traversal and cross-root tie-break.
//!
//! Nodes live in an arena owned by the forest. Children and parents are `RuleId`s, so the
//! parent link is read-only linkage and never owns anything.

use crate::capture::CaptureMap;
use crate::error::{Result, RuleError};
use crate::node::{RuleDefinition, RuleId, RuleNode};
use crate::resolve::{resolve_path_template, resolve_tag_template, substitute_captures, ParentView};
use crate::template;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Maximum nesting depth accepted when building a forest
pub const MAX_RULE_DEPTH: usize = 32;

/// Policy for choosing among roots that all match the same filename
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TieBreak {
    /// The last matching root in declaration order wins; earlier matches are discarded
    #[default]
    #[serde(rename = "last")]
    LastMatch,
    /// The first matching root wins; later roots are not evaluated
    #[serde(rename = "first")]
    FirstMatch,
    /// The deepest resolution across all roots wins; ties keep the earlier root
    #[serde(rename = "deepest")]
    Deepest,
}

impl TieBreak {
    pub fn as_str(&self) -> &'static str {
        match self {
            TieBreak::LastMatch => "last",
            TieBreak::FirstMatch => "first",
            TieBreak::Deepest => "deepest",
        }
    }
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TieBreak {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "last" => Ok(TieBreak::LastMatch),
            "first" => Ok(TieBreak::FirstMatch),
            "deepest" => Ok(TieBreak::Deepest),
            other => Err(format!("unknown tie-break '{}' (expected last, first or deepest)", other)),
        }
    }
}

/// A resolved destination for one filename
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Resolved relative path
    pub path: String,
    /// Deepest matching rule
    pub rule: RuleId,
    /// Rule names from the root down to `rule`
    pub rule_chain: Vec<String>,
    /// Depth of `rule` (roots are 0)
    pub depth: usize,
    /// Values captured along the matching chain
    pub captures: CaptureMap,
}

/// Result of matching one subtree
struct NodeMatch {
    rule: RuleId,
    path: String,
    captures: CaptureMap,
}

/// Ordered collection of independently rooted rule trees
#[derive(Debug, Clone, Default)]
pub struct RuleForest {
    nodes: Vec<RuleNode>,
    roots: Vec<RuleId>,
    tie_break: TieBreak,
}

/// Builder for a `RuleForest`
#[derive(Debug, Clone, Default)]
pub struct ForestBuilder {
    rules: Vec<RuleDefinition>,
    tie_break: TieBreak,
}

impl ForestBuilder {
    /// Add a root rule (declaration order is significant)
    pub fn rule(mut self, rule: RuleDefinition) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = RuleDefinition>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Validate the definitions, wire parent links and compile every template
    pub fn build(self) -> Result<RuleForest> {
        let mut forest = RuleForest {
            nodes: Vec::new(),
            roots: Vec::with_capacity(self.rules.len()),
            tie_break: self.tie_break,
        };

        check_sibling_names(&self.rules, "<root>")?;
        for definition in &self.rules {
            let id = forest.insert(definition, None, 0)?;
            forest.roots.push(id);
        }

        info!(
            rules = forest.nodes.len(),
            roots = forest.roots.len(),
            tie_break = %forest.tie_break,
            "Built rule forest"
        );
        Ok(forest)
    }
}

fn check_sibling_names(definitions: &[RuleDefinition], parent: &str) -> Result<()> {
    let mut seen = HashSet::new();
    for definition in definitions {
        if definition.name.trim().is_empty() {
            return Err(RuleError::Validation(format!(
                "rule under '{}' has an empty name",
                parent
            )));
        }
        if !seen.insert(definition.name.as_str()) {
            return Err(RuleError::Validation(format!(
                "duplicate rule name '{}' under '{}'",
                definition.name, parent
            )));
        }
    }
    Ok(())
}

impl RuleForest {
    pub fn builder() -> ForestBuilder {
        ForestBuilder::default()
    }

    /// Build a forest with the default tie-break
    pub fn from_definitions(rules: Vec<RuleDefinition>) -> Result<Self> {
        Self::builder().rules(rules).build()
    }

    fn insert(&mut self, definition: &RuleDefinition, parent: Option<RuleId>, depth: usize) -> Result<RuleId> {
        if depth >= MAX_RULE_DEPTH {
            return Err(RuleError::Validation(format!(
                "rule '{}' is nested deeper than {} levels",
                definition.name, MAX_RULE_DEPTH
            )));
        }

        let id = RuleId(self.nodes.len());
        let (resolved_tags, path_template) = {
            let parent_view = parent.map(|pid| {
                let p = &self.nodes[pid.0];
                ParentView {
                    tag: &p.tag,
                    path: &p.path_template,
                }
            });
            let tags: Vec<String> = std::iter::once(&definition.tag)
                .chain(definition.aliases.iter())
                .map(|t| resolve_tag_template(t, &definition.tag, parent_view))
                .collect();
            let path = resolve_path_template(&definition.path, &definition.tag, parent_view);
            (tags, path)
        };

        let patterns = template::compile(&resolved_tags, definition.case_sensitive)
            .map_err(|e| match e {
                RuleError::Pattern(msg) => RuleError::Pattern(format!("rule '{}': {}", definition.name, msg)),
                other => other,
            })?;

        let node = RuleNode {
            id,
            name: definition.name.clone(),
            tag: definition.tag.clone(),
            aliases: definition.aliases.clone(),
            path: definition.path.clone(),
            case_sensitive: definition.case_sensitive,
            parent,
            children: Vec::with_capacity(definition.children.len()),
            depth,
            patterns,
            path_template,
        };
        if node.is_catch_all() {
            warn!(rule = %node.name, "Rule has an empty tag and matches every filename");
        }
        debug!(
            rule = %node.name,
            tags = ?node.resolved_tags().collect::<Vec<_>>(),
            path = %node.path_template,
            "Compiled rule"
        );
        self.nodes.push(node);

        check_sibling_names(&definition.children, &definition.name)?;
        for child in &definition.children {
            let child_id = self.insert(child, Some(id), depth + 1)?;
            self.nodes[id.0].children.push(child_id);
        }

        Ok(id)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Resolve a filename to a destination path, or `None` when no rule matches
    pub fn get_path(&self, filename: &str) -> Option<String> {
        self.classify(filename).map(|r| r.path)
    }

    /// Resolve a filename, applying the forest's tie-break across roots
    pub fn classify(&self, filename: &str) -> Option<Resolution> {
        let mut selected: Option<Resolution> = None;

        for &root in &self.roots {
            let Some(found) = self.resolve_root(root, filename) else {
                continue;
            };
            match self.tie_break {
                TieBreak::FirstMatch => return Some(found),
                TieBreak::LastMatch => {
                    if let Some(previous) = &selected {
                        debug!(
                            discarded = %previous.path,
                            kept = %found.path,
                            "Later root overrides earlier match"
                        );
                    }
                    selected = Some(found);
                }
                TieBreak::Deepest => {
                    if selected.as_ref().map_or(true, |current| found.depth > current.depth) {
                        selected = Some(found);
                    }
                }
            }
        }

        selected
    }

    /// Every matching root's resolution, in root order
    pub fn classify_all(&self, filename: &str) -> Vec<Resolution> {
        self.roots
            .iter()
            .filter_map(|&root| self.resolve_root(root, filename))
            .collect()
    }

    fn resolve_root(&self, root: RuleId, filename: &str) -> Option<Resolution> {
        let found = self.match_node(root, filename, &CaptureMap::new())?;
        let node = &self.nodes[found.rule.0];
        Some(Resolution {
            path: found.path,
            rule: found.rule,
            rule_chain: self.ancestry(found.rule).map(|n| n.name.clone()).collect(),
            depth: node.depth,
            captures: found.captures,
        })
    }

    /// Depth-first, first-declared-child-wins traversal from `id`.
    fn match_node(&self, id: RuleId, filename: &str, inherited: &CaptureMap) -> Option<NodeMatch> {
        let node = &self.nodes[id.0];
        let matched = node.match_filename(filename)?;

        let mut local = inherited.clone();
        local.extend(matched.captures);

        for &child in &node.children {
            if let Some(found) = self.match_node(child, filename, &local) {
                local.merge(found.captures);
                return Some(NodeMatch {
                    rule: found.rule,
                    path: found.path,
                    captures: local,
                });
            }
        }

        let path = self.resolve_path(id, &local);
        debug!(
            rule = %node.name,
            via = matched.index,
            captures = ?local,
            template = %node.path,
            path = %path,
            "Resolved filename"
        );
        Some(NodeMatch {
            rule: id,
            path,
            captures: local,
        })
    }

    /// Resolve a node's path template with the given captures
    pub fn resolve_path(&self, id: RuleId, captures: &CaptureMap) -> String {
        substitute_captures(&self.nodes[id.0].path_template, captures)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    pub fn set_tie_break(&mut self, tie_break: TieBreak) {
        self.tie_break = tie_break;
    }

    pub fn roots(&self) -> &[RuleId] {
        &self.roots
    }

    pub fn get(&self, id: RuleId) -> Option<&RuleNode> {
        self.nodes.get(id.0)
    }

    pub fn parent(&self, id: RuleId) -> Option<&RuleNode> {
        self.get(id)?.parent.and_then(|p| self.get(p))
    }

    pub fn children(&self, id: RuleId) -> impl Iterator<Item = &RuleNode> {
        self.get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(move |&c| self.get(c))
    }

    /// Nodes from the root down to `id`
    pub fn ancestry(&self, id: RuleId) -> impl Iterator<Item = &RuleNode> {
        let mut chain = Vec::new();
        let mut cursor = self.get(id);
        while let Some(node) = cursor {
            chain.push(node);
            cursor = node.parent.and_then(|p| self.get(p));
        }
        chain.into_iter().rev()
    }

    /// All nodes in depth-first declaration order
    pub fn walk(&self) -> impl Iterator<Item = &RuleNode> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<RuleId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            order.push(node);
            stack.extend(node.children.iter().rev().copied());
        }
        order.into_iter()
    }

    /// Find a node by its name chain, e.g. `["Programming", "Assignment"]`
    pub fn find(&self, chain: &[&str]) -> Option<&RuleNode> {
        let (first, rest) = chain.split_first()?;
        let mut current = self
            .roots
            .iter()
            .map(|&r| &self.nodes[r.0])
            .find(|n| n.name == *first)?;
        for name in rest {
            current = self.children(current.id).find(|n| n.name == *name)?;
        }
        Some(current)
    }

    /// Number of nodes across all trees
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
