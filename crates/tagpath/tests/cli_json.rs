use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const RULES: &str = r#"{
    "rules": {
        "Programming": {
            "tag": "SYSC 2004",
            "aliases": ["SYSC2004", "SYSC_2004"],
            "path": "./Programming",
            "childRules": {
                "Assignment": {
                    "tag": "Assignment",
                    "path": "$PARENT_PATH/$TAG",
                    "childRules": {
                        "Numbered": {
                            "tag": "$PARENT_TAG <N>",
                            "path": "$PARENT_PATH/$PARENT_TAG <N>"
                        }
                    }
                }
            }
        },
        "Labs": {
            "tag": "Lab",
            "path": "./All Labs"
        }
    }
}"#;

fn tagpath_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_tagpath"))
}

struct TestEnv {
    home: TempDir,
    rules_path: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        let home = TempDir::new().expect("Failed to create temp dir");
        let rules_path = home.path().join("rules.json");
        fs::write(&rules_path, RULES).expect("Failed to write rule file");
        Self { home, rules_path }
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(tagpath_bin())
            .args(args)
            .env("TAGPATH_HOME", self.home.path())
            .env("TAGPATH_RULES", &self.rules_path)
            .env_remove("TAGPATH_DEST")
            .env("RUST_LOG", "error")
            .output()
            .expect("failed to execute tagpath CLI")
    }

    fn run_json<T: DeserializeOwned>(&self, args: &[&str]) -> T {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "command failed: {}\nstdout:\n{}\nstderr:\n{}",
            args.join(" "),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap_or_else(|err| {
            panic!(
                "failed to parse JSON output: {}\nstdout:\n{}\nstderr:\n{}",
                err,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            )
        })
    }
}

#[derive(Debug, Deserialize)]
struct ResolveEntry {
    filename: String,
    path: Option<String>,
    destination: Option<PathBuf>,
    rule_chain: Vec<String>,
    captures: BTreeMap<String, String>,
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    path: String,
}

#[derive(Debug, Deserialize)]
struct ScanResult {
    files: Vec<ScanFile>,
    summary: ScanSummary,
}

#[derive(Debug, Deserialize)]
struct ScanFile {
    name: String,
    resolved: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScanSummary {
    total: usize,
    matched: usize,
    unmatched: usize,
}

#[derive(Debug, Deserialize)]
struct RuleSummary {
    chain: Vec<String>,
    depth: usize,
    tags: Vec<String>,
    path: String,
}

#[test]
fn resolve_json_reports_paths_and_captures() {
    let env = TestEnv::new();
    let entries: Vec<ResolveEntry> = env.run_json(&[
        "resolve",
        "--json",
        "SYSC 2004 Assignment 1.pdf",
        "SYSC_2004 Assignment Grading Scheme.pdf",
        "holiday.jpg",
    ]);

    assert_eq!(entries.len(), 3);

    assert_eq!(entries[0].filename, "SYSC 2004 Assignment 1.pdf");
    assert_eq!(
        entries[0].path.as_deref(),
        Some("./Programming/Assignment/Assignment 1")
    );
    assert_eq!(
        entries[0].rule_chain,
        vec!["Programming", "Assignment", "Numbered"]
    );
    assert_eq!(entries[0].captures.get("N").map(String::as_str), Some("1"));
    assert!(entries[0].candidates.is_none());

    assert_eq!(entries[1].path.as_deref(), Some("./Programming/Assignment"));

    assert!(entries[2].path.is_none());
    assert!(entries[2].destination.is_none());
}

#[test]
fn resolve_json_with_dest_and_all() {
    let env = TestEnv::new();
    let entries: Vec<ResolveEntry> = env.run_json(&[
        "resolve",
        "--json",
        "--all",
        "--dest",
        "/courses",
        "SYSC 2004 Lab 2.pdf",
    ]);

    let entry = &entries[0];
    assert_eq!(entry.path.as_deref(), Some("./All Labs"));
    assert_eq!(
        entry.destination.as_deref(),
        Some(Path::new("/courses/All Labs/SYSC 2004 Lab 2.pdf"))
    );

    let candidates: Vec<&str> = entry
        .candidates
        .as_ref()
        .expect("candidates requested")
        .iter()
        .map(|c| c.path.as_str())
        .collect();
    assert_eq!(candidates, vec!["./Programming", "./All Labs"]);
}

#[test]
fn tie_break_flag_overrides_rule_file() {
    let env = TestEnv::new();
    let entries: Vec<ResolveEntry> = env.run_json(&[
        "--tie-break",
        "first",
        "resolve",
        "--json",
        "SYSC 2004 Lab 2.pdf",
    ]);
    assert_eq!(entries[0].path.as_deref(), Some("./Programming"));
}

#[test]
fn scan_json_summarizes_directory() {
    let env = TestEnv::new();
    let inbox = TempDir::new().unwrap();
    File::create(inbox.path().join("SYSC 2004 Assignment 3.pdf")).unwrap();
    File::create(inbox.path().join("notes.txt")).unwrap();

    let inbox_path = inbox.path().to_string_lossy().to_string();
    let result: ScanResult = env.run_json(&["scan", &inbox_path, "--json"]);

    assert_eq!(result.summary.total, 2);
    assert_eq!(result.summary.matched, 1);
    assert_eq!(result.summary.unmatched, 1);

    let matched = result
        .files
        .iter()
        .find(|f| f.name == "SYSC 2004 Assignment 3.pdf")
        .expect("assignment file scanned");
    assert_eq!(
        matched.resolved.as_deref(),
        Some("./Programming/Assignment/Assignment 3")
    );

    // Nothing is moved
    assert!(inbox.path().join("SYSC 2004 Assignment 3.pdf").exists());
}

#[test]
fn rules_json_lists_resolved_templates() {
    let env = TestEnv::new();
    let rules: Vec<RuleSummary> = env.run_json(&["rules", "--json"]);

    assert_eq!(rules.len(), 4);
    let numbered = rules
        .iter()
        .find(|r| r.chain.last().map(String::as_str) == Some("Numbered"))
        .expect("numbered rule listed");
    assert_eq!(numbered.depth, 2);
    assert_eq!(numbered.tags, vec!["Assignment <N>"]);
    assert_eq!(numbered.path, "./Programming/Assignment/Assignment <N>");
}

#[test]
fn check_succeeds_for_valid_rules() {
    let env = TestEnv::new();
    let output = env.run(&["check"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("OK:"));
}

#[test]
fn missing_rule_file_fails_with_help() {
    let env = TestEnv::new();
    let output = Command::new(tagpath_bin())
        .args(["--rules", "/nonexistent/rules.json", "check"])
        .env("TAGPATH_HOME", env.home.path())
        .env("RUST_LOG", "error")
        .output()
        .expect("failed to execute tagpath CLI");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Rule file not found"), "stderr:\n{}", stderr);
}

#[test]
fn invalid_rule_file_fails_with_help() {
    let env = TestEnv::new();
    fs::write(&env.rules_path, r#"{"rules": {"A": {"tag": "a"}, "B": {"childRules": {"": {}}}}}"#)
        .unwrap();

    let output = env.run(&["check"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid rule file"), "stderr:\n{}", stderr);
}

#[test]
fn scan_depth_implies_recursion_and_rejects_zero() {
    let env = TestEnv::new();
    let inbox = TempDir::new().unwrap();
    File::create(inbox.path().join("SYSC 2004 Outline.pdf")).unwrap();
    fs::create_dir(inbox.path().join("term1")).unwrap();
    File::create(inbox.path().join("term1").join("SYSC 2004 Assignment 1.pdf")).unwrap();

    let inbox_path = inbox.path().to_string_lossy().to_string();
    let result: ScanResult = env.run_json(&["scan", &inbox_path, "--depth", "2", "--json"]);
    assert_eq!(result.summary.total, 2);

    let output = env.run(&["scan", &inbox_path, "--recursive", "--depth", "0"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("depth must be at least 1"), "stderr:\n{}", stderr);
}
