//! Scan command - Preview destinations for files in a directory
//!
//! Files are classified by name only. Nothing is moved.

use crate::cli::error::HelpfulError;
use crate::cli::output::{destination, display_or_dash, print_json, print_table_colored};
use comfy_table::Color;
use serde::Serialize;
use std::path::PathBuf;
use tagpath_rules::{CaptureMap, RuleForest};
use tracing::debug;
use walkdir::WalkDir;

/// Arguments for the scan command
#[derive(Debug)]
pub struct ScanArgs {
    pub path: PathBuf,
    pub recursive: bool,
    /// Maximum walk depth; set implies recursion
    pub depth: Option<usize>,
    pub json: bool,
    pub unmatched: bool,
    pub dest: Option<PathBuf>,
}

/// Classified file
#[derive(Debug, Clone, Serialize)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub name: String,
    pub resolved: Option<String>,
    pub destination: Option<PathBuf>,
    pub rule_chain: Vec<String>,
    pub captures: CaptureMap,
}

/// Summary counts
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanSummary {
    pub total: usize,
    pub matched: usize,
    pub unmatched: usize,
}

/// Complete scan result
#[derive(Debug, Serialize)]
pub struct ScanResult {
    pub scan_path: PathBuf,
    pub files: Vec<ScannedFile>,
    pub summary: ScanSummary,
}

/// Execute the scan command
pub fn run(forest: &RuleForest, args: ScanArgs) -> anyhow::Result<()> {
    let result = scan(forest, &args)?;

    if args.json {
        print_json(&result)?;
    } else {
        output_table(&result);
    }

    Ok(())
}

/// Walk the directory and classify every file name
pub fn scan(forest: &RuleForest, args: &ScanArgs) -> Result<ScanResult, HelpfulError> {
    if !args.path.exists() {
        return Err(HelpfulError::path_not_found(&args.path));
    }
    if !args.path.is_dir() {
        return Err(HelpfulError::not_a_directory(&args.path));
    }

    let mut walker = WalkDir::new(&args.path);
    match (args.depth, args.recursive) {
        // A depth limit implies recursion; 0 would list nothing, so it counts as 1
        (Some(depth), _) => walker = walker.max_depth(depth.max(1)),
        (None, true) => {}
        (None, false) => walker = walker.max_depth(1),
    }

    let mut files = Vec::new();
    let mut summary = ScanSummary::default();

    for entry in walker.into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        let resolution = forest.classify(&name);
        summary.total += 1;

        let file = match resolution {
            Some(resolution) => {
                summary.matched += 1;
                ScannedFile {
                    path: entry.path().to_path_buf(),
                    destination: Some(destination(args.dest.as_deref(), &resolution.path, &name)),
                    name,
                    resolved: Some(resolution.path),
                    rule_chain: resolution.rule_chain,
                    captures: resolution.captures,
                }
            }
            None => {
                summary.unmatched += 1;
                debug!(file = %entry.path().display(), "No rule matched");
                ScannedFile {
                    path: entry.path().to_path_buf(),
                    name,
                    resolved: None,
                    destination: None,
                    rule_chain: Vec::new(),
                    captures: CaptureMap::new(),
                }
            }
        };

        if args.unmatched && file.resolved.is_some() {
            continue;
        }
        files.push(file);
    }

    // Sort by path for consistent output
    files.sort_by(|a, b| a.path.cmp(&b.path));

    Ok(ScanResult {
        scan_path: args.path.clone(),
        files,
        summary,
    })
}

fn output_table(result: &ScanResult) {
    if result.files.is_empty() {
        println!("No files to show in: {}", result.scan_path.display());
        return;
    }

    println!(
        "Scanned {} files in {} ({} matched, {} unmatched)",
        result.summary.total,
        result.scan_path.display(),
        result.summary.matched,
        result.summary.unmatched
    );
    println!();

    let headers = &["File", "Resolved", "Rule", "Destination"];

    let rows: Vec<Vec<(String, Option<Color>)>> = result
        .files
        .iter()
        .map(|file| {
            let display_path = file
                .path
                .strip_prefix(&result.scan_path)
                .unwrap_or(&file.path)
                .display()
                .to_string();
            let color = if file.resolved.is_some() { Color::Green } else { Color::Red };

            vec![
                (display_path, None),
                (display_or_dash(file.resolved.as_deref()), Some(color)),
                (file.rule_chain.join(" > "), None),
                (
                    file.destination
                        .as_ref()
                        .map(|d| d.display().to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    Some(Color::Grey),
                ),
            ]
        })
        .collect();

    print_table_colored(headers, rows);
}
