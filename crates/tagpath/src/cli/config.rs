//! Rule file location and loading for CLI commands.

use crate::cli::error::HelpfulError;
use std::path::{Path, PathBuf};
use tagpath_logging::tagpath_home;
use tagpath_rules::{RuleForest, RuleSetConfig, TieBreak};
use tracing::info;

/// Default rule file: ~/.tagpath/rules.json
pub fn default_rules_path() -> PathBuf {
    tagpath_home().join("rules.json")
}

/// Rule file chosen on the command line, or the default one
pub fn rules_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(default_rules_path)
}

/// Load and build the forest, optionally overriding the file's tie-break
pub fn load_forest(path: &Path, tie_break: Option<TieBreak>) -> Result<RuleForest, HelpfulError> {
    if !path.exists() {
        return Err(HelpfulError::rules_not_found(path));
    }

    let mut forest =
        RuleSetConfig::load_forest(path).map_err(|err| HelpfulError::invalid_rules(path, &err))?;

    if let Some(tie_break) = tie_break {
        forest.set_tie_break(tie_break);
    }

    info!(
        path = %path.display(),
        rules = forest.len(),
        tie_break = %forest.tie_break(),
        "Loaded rule file"
    );
    Ok(forest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_path_wins() {
        let path = PathBuf::from("/tmp/custom.toml");
        assert_eq!(rules_path(Some(path.as_path())), path);
        assert!(rules_path(None).ends_with("rules.json"));
    }

    #[test]
    fn missing_rule_file_is_helpful() {
        let err = load_forest(Path::new("/nonexistent/rules.json"), None).unwrap_err();
        assert!(err.message.contains("Rule file not found"));
    }

    #[test]
    fn tie_break_override() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("rules.json");
        fs::write(&path, r#"{"tieBreak": "first", "rules": {"A": {"tag": "a", "path": "./a"}}}"#)
            .unwrap();

        assert_eq!(load_forest(&path, None).unwrap().tie_break(), TieBreak::FirstMatch);
        assert_eq!(
            load_forest(&path, Some(TieBreak::Deepest)).unwrap().tie_break(),
            TieBreak::Deepest
        );
    }

    #[test]
    fn invalid_rule_file_is_helpful() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("rules.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_forest(&path, None).unwrap_err();
        assert!(err.message.starts_with("Invalid rule file"));
    }
}
