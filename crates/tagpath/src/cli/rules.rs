//! Rules and check commands - Inspect the loaded rule forest

use crate::cli::output::{print_json, print_table};
use serde::Serialize;
use std::path::Path;
use tagpath_rules::{RuleForest, RuleNode};

/// Arguments for the rules command
#[derive(Debug)]
pub struct RulesArgs {
    pub json: bool,
}

/// One rule as shown by `tagpath rules`
#[derive(Debug, Clone, Serialize)]
pub struct RuleSummary {
    pub chain: Vec<String>,
    pub depth: usize,
    pub tags: Vec<String>,
    pub path: String,
    pub case_sensitive: bool,
    pub children: usize,
}

/// Flatten the forest in declaration order
pub fn summarize(forest: &RuleForest) -> Vec<RuleSummary> {
    forest
        .walk()
        .map(|node| RuleSummary {
            chain: forest.ancestry(node.id()).map(|n| n.name().to_string()).collect(),
            depth: node.depth(),
            tags: node.resolved_tags().map(str::to_string).collect(),
            path: node.path_template().to_string(),
            case_sensitive: node.is_case_sensitive(),
            children: node.children().len(),
        })
        .collect()
}

/// Execute the rules command
pub fn run(forest: &RuleForest, args: RulesArgs) -> anyhow::Result<()> {
    let summaries = summarize(forest);

    if args.json {
        return print_json(&summaries);
    }

    if summaries.is_empty() {
        println!("No rules defined");
        return Ok(());
    }

    let headers = &["Rule", "Tags", "Path", "Case", "Children"];
    let rows: Vec<Vec<String>> = summaries
        .iter()
        .map(|summary| {
            let name = summary.chain.last().cloned().unwrap_or_default();
            vec![
                format!("{}{}", "  ".repeat(summary.depth), name),
                summary.tags.join(" | "),
                summary.path.clone(),
                if summary.case_sensitive { "exact" } else { "any" }.to_string(),
                summary.children.to_string(),
            ]
        })
        .collect();

    print_table(headers, rows);
    println!("Tie-break: {}", forest.tie_break());
    Ok(())
}

/// Rules that match every filename
pub fn catch_all_rules(forest: &RuleForest) -> Vec<&RuleNode> {
    forest
        .walk()
        .filter(|node| node.is_catch_all())
        .collect()
}

/// Execute the check command
///
/// Loading already validated the file; this reports what was loaded.
pub fn check(forest: &RuleForest, rules_path: &Path) -> anyhow::Result<()> {
    let catch_all = catch_all_rules(forest);

    println!(
        "OK: {} ({} rules in {} trees, tie-break: {})",
        rules_path.display(),
        forest.len(),
        forest.roots().len(),
        forest.tie_break()
    );
    for node in catch_all {
        let chain: Vec<&str> = forest.ancestry(node.id()).map(RuleNode::name).collect();
        println!("  WARNING: '{}' matches every filename", chain.join(" > "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagpath_rules::RuleDefinition;

    fn forest() -> RuleForest {
        RuleForest::from_definitions(vec![
            RuleDefinition::new("Programming")
                .tag("SYSC 2004")
                .alias("SYSC2004")
                .path("./Programming")
                .child(
                    RuleDefinition::new("Assignment")
                        .tag("Assignment")
                        .path("$PARENT_PATH/$TAG"),
                ),
            RuleDefinition::new("Inbox").path("./Inbox"),
        ])
        .unwrap()
    }

    #[test]
    fn summaries_follow_declaration_order() {
        let summaries = summarize(&forest());
        assert_eq!(summaries.len(), 3);

        assert_eq!(summaries[0].chain, vec!["Programming"]);
        assert_eq!(summaries[0].tags, vec!["SYSC 2004", "SYSC2004"]);
        assert_eq!(summaries[0].children, 1);

        assert_eq!(summaries[1].chain, vec!["Programming", "Assignment"]);
        assert_eq!(summaries[1].depth, 1);
        assert_eq!(summaries[1].path, "./Programming/Assignment");

        assert_eq!(summaries[2].chain, vec!["Inbox"]);
    }

    #[test]
    fn empty_tags_are_reported_as_catch_all() {
        let forest = forest();
        let catch_all: Vec<&str> = catch_all_rules(&forest).into_iter().map(RuleNode::name).collect();
        assert_eq!(catch_all, vec!["Inbox"]);
    }
}
