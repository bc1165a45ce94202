//! Rule nodes and their build-time definitions.

use crate::template::{match_first, CompiledPattern, PatternMatch};
use serde::Serialize;
use std::fmt;

/// Index of a node in its forest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RuleId(pub(crate) usize);

impl RuleId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Declarative rule used to build a forest.
///
/// Children are owned by value; parent links are wired by the builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleDefinition {
    pub name: String,
    pub tag: String,
    pub aliases: Vec<String>,
    pub path: String,
    pub case_sensitive: bool,
    pub children: Vec<RuleDefinition>,
}

impl RuleDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn aliases(mut self, aliases: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn child(mut self, child: RuleDefinition) -> Self {
        self.children.push(child);
        self
    }
}

/// A node of a built forest.
///
/// Structural markers in the tag, alias and path templates are resolved when the forest
/// is built; only capture placeholders are left for query time.
#[derive(Debug, Clone)]
pub struct RuleNode {
    pub(crate) id: RuleId,
    pub(crate) name: String,
    pub(crate) tag: String,
    pub(crate) aliases: Vec<String>,
    pub(crate) path: String,
    pub(crate) case_sensitive: bool,
    pub(crate) parent: Option<RuleId>,
    pub(crate) children: Vec<RuleId>,
    pub(crate) depth: usize,
    pub(crate) patterns: Vec<CompiledPattern>,
    pub(crate) path_template: String,
}

impl RuleNode {
    pub fn id(&self) -> RuleId {
        self.id
    }

    /// Human-readable rule name (diagnostics only)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw primary tag template as authored
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Raw alias templates as authored
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Raw path template as authored
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn parent(&self) -> Option<RuleId> {
        self.parent
    }

    pub fn children(&self) -> &[RuleId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Distance from the root (roots are 0)
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Tag and alias templates after structural resolution, primary first
    pub fn resolved_tags(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(CompiledPattern::template)
    }

    /// Path template after structural resolution
    pub fn path_template(&self) -> &str {
        &self.path_template
    }

    pub fn patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    /// Try the primary tag, then each alias in order
    pub(crate) fn match_filename(&self, filename: &str) -> Option<PatternMatch> {
        match_first(&self.patterns, filename)
    }

    /// True when some template is empty, so the node matches any filename
    pub fn is_catch_all(&self) -> bool {
        self.patterns.iter().any(|p| p.template().is_empty())
    }
}

impl fmt::Display for RuleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rule[{}|{}]", self.name, self.tag)
    }
}
