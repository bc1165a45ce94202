//! Resolve command - Show where filenames belong
//!
//! Names are treated as plain strings; they do not have to exist on disk.

use crate::cli::output::{destination, display_or_dash, print_json, print_table_colored};
use comfy_table::Color;
use serde::Serialize;
use std::path::PathBuf;
use tagpath_rules::{CaptureMap, Resolution, RuleForest};

/// Arguments for the resolve command
#[derive(Debug)]
pub struct ResolveArgs {
    pub names: Vec<String>,
    pub json: bool,
    pub all: bool,
    pub dest: Option<PathBuf>,
}

/// One root's resolution for a name
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub path: String,
    pub rule_chain: Vec<String>,
    pub captures: CaptureMap,
}

/// Resolution result for one name
#[derive(Debug, Clone, Serialize)]
pub struct ResolveEntry {
    pub filename: String,
    pub path: Option<String>,
    pub destination: Option<PathBuf>,
    pub rule_chain: Vec<String>,
    pub captures: CaptureMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<Candidate>>,
}

impl From<Resolution> for Candidate {
    fn from(resolution: Resolution) -> Self {
        Self {
            path: resolution.path,
            rule_chain: resolution.rule_chain,
            captures: resolution.captures,
        }
    }
}

/// Resolve one filename against the forest
pub fn resolve_entry(forest: &RuleForest, name: &str, args: &ResolveArgs) -> ResolveEntry {
    let selected = forest.classify(name);
    let candidates: Option<Vec<Candidate>> = args
        .all
        .then(|| forest.classify_all(name).into_iter().map(Candidate::from).collect());

    match selected {
        Some(resolution) => ResolveEntry {
            filename: name.to_string(),
            destination: Some(destination(args.dest.as_deref(), &resolution.path, name)),
            path: Some(resolution.path),
            rule_chain: resolution.rule_chain,
            captures: resolution.captures,
            candidates,
        },
        None => ResolveEntry {
            filename: name.to_string(),
            path: None,
            destination: None,
            rule_chain: Vec::new(),
            captures: CaptureMap::new(),
            candidates,
        },
    }
}

/// Execute the resolve command
pub fn run(forest: &RuleForest, args: ResolveArgs) -> anyhow::Result<()> {
    let entries: Vec<ResolveEntry> = args
        .names
        .iter()
        .map(|name| resolve_entry(forest, name, &args))
        .collect();

    if args.json {
        print_json(&entries)?;
    } else {
        output_table(&entries, args.all);
    }

    Ok(())
}

fn output_table(entries: &[ResolveEntry], all: bool) {
    let headers = &["Name", "Path", "Rule", "Captures"];

    let mut rows: Vec<Vec<(String, Option<Color>)>> = Vec::new();
    for entry in entries {
        let path_color = if entry.path.is_some() { Color::Green } else { Color::Red };
        rows.push(vec![
            (entry.filename.clone(), None),
            (display_or_dash(entry.path.as_deref()), Some(path_color)),
            (entry.rule_chain.join(" > "), None),
            (format_captures(&entry.captures), Some(Color::Grey)),
        ]);

        if !all {
            continue;
        }
        for candidate in entry.candidates.iter().flatten() {
            rows.push(vec![
                ("  candidate".to_string(), Some(Color::Grey)),
                (candidate.path.clone(), Some(Color::Yellow)),
                (candidate.rule_chain.join(" > "), None),
                (format_captures(&candidate.captures), Some(Color::Grey)),
            ]);
        }
    }

    print_table_colored(headers, rows);
}

/// Render captures as `N=1, WEEK=3`
pub fn format_captures(captures: &CaptureMap) -> String {
    captures
        .iter()
        .map(|(token, value)| format!("{}={}", token, value))
        .collect::<Vec<_>>()
        .join(", ")
}
