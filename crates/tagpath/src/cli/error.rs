//! Helpful error types for CLI commands
//!
//! Every error includes:
//! - What went wrong
//! - Context about the situation
//! - Suggestions for how to fix it

use std::fmt;
use std::path::Path;
use tagpath_rules::RuleError;

/// An error with helpful context and suggestions
#[derive(Debug)]
pub struct HelpfulError {
    /// The main error message
    pub message: String,
    /// Additional context about what was happening
    pub context: Option<String>,
    /// Suggestions for how to fix the error
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    /// Create a new helpful error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a suggestion for fixing the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add multiple suggestions
    pub fn with_suggestions(mut self, suggestions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.suggestions.extend(suggestions.into_iter().map(|s| s.into()));
        self
    }

    // === Common error constructors ===

    /// Path does not exist
    pub fn path_not_found(path: &Path) -> Self {
        Self::new(format!("Path not found: {}", path.display()))
            .with_context("The specified path does not exist on the filesystem")
            .with_suggestions([
                format!("TRY: Check that the path exists: ls -la {}", path.display()),
                "TRY: Check for typos in the path".to_string(),
            ])
    }

    /// Path exists but is not a directory
    pub fn not_a_directory(path: &Path) -> Self {
        Self::new(format!("Not a directory: {}", path.display()))
            .with_context("The scan command expects a directory, not a file")
            .with_suggestions([
                format!(
                    "TRY: Resolve a single name instead: tagpath resolve \"{}\"",
                    path.file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| path.display().to_string())
                ),
                format!(
                    "TRY: Scan the parent directory: tagpath scan {}",
                    path.parent()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| ".".to_string())
                ),
            ])
    }

    /// Rule file does not exist
    pub fn rules_not_found(path: &Path) -> Self {
        Self::new(format!("Rule file not found: {}", path.display()))
            .with_context("Tagpath needs a rule file describing where files belong")
            .with_suggestions([
                "TRY: Pass a rule file explicitly: tagpath --rules ./rules.json resolve ...".to_string(),
                "TRY: Set TAGPATH_RULES to the rule file location".to_string(),
                format!("TRY: Create the default rule file at {}", path.display()),
            ])
    }

    /// Rule file exists but could not be loaded
    pub fn invalid_rules(path: &Path, err: &RuleError) -> Self {
        let base = Self::new(format!("Invalid rule file: {}", err))
            .with_context(format!("Rule file: {}", path.display()));

        match err {
            RuleError::UnsupportedFormat(_) => {
                base.with_suggestion("TRY: Use a .json or .toml rule file")
            }
            RuleError::Json(_) | RuleError::Toml(_) => base.with_suggestions([
                "TRY: Check the syntax near the reported line and column",
                "TRY: Each rule accepts tag, aliases, path, caseSensitive and childRules",
            ]),
            RuleError::Validation(_) => base.with_suggestions([
                "TRY: Give every rule a non-empty name that is unique among its siblings",
                "TRY: Flatten deeply nested childRules",
            ]),
            RuleError::Pattern(_) => {
                base.with_suggestion("TRY: Shorten the tag or alias templates of the reported rule")
            }
            RuleError::Io(_) => base.with_suggestion(format!(
                "TRY: Check file permissions: ls -la {}",
                path.display()
            )),
        }
    }

    /// Unknown tie-break name
    pub fn invalid_tie_break(value: &str) -> Self {
        Self::new(format!("Invalid tie-break: '{}'", value))
            .with_context("The tie-break decides which root wins when several match")
            .with_suggestion("TRY: Use one of: last, first, deepest")
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}
