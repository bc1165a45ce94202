//! Rule file loading.
//!
//! Rule files are JSON or TOML, selected by extension:
//!
//! ```json
//! {
//!   "tieBreak": "last",
//!   "rules": {
//!     "Programming": {
//!       "tag": "SYSC 2004",
//!       "aliases": ["SYSC2004", "SYSC_2004"],
//!       "path": "./Programming",
//!       "childRules": {
//!         "Assignment": { "tag": "Assignment", "path": "$PARENT_PATH/$TAG" }
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! Map order is declaration order and is preserved; it decides both sibling priority and
//! the cross-root tie-break.

use crate::error::{Result, RuleError};
use crate::forest::{RuleForest, TieBreak};
use crate::node::RuleDefinition;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Top-level rule file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSetConfig {
    /// Tie-break across roots
    #[serde(default)]
    pub tie_break: TieBreak,

    /// Root rules by name
    #[serde(default)]
    pub rules: IndexMap<String, RuleConfig>,
}

/// One rule and its children
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleConfig {
    #[serde(default)]
    pub tag: String,

    #[serde(default)]
    pub aliases: Vec<String>,

    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub case_sensitive: bool,

    #[serde(default)]
    pub child_rules: IndexMap<String, RuleConfig>,
}

/// Supported rule file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "json" => Ok(ConfigFormat::Json),
            "toml" => Ok(ConfigFormat::Toml),
            _ => Err(RuleError::UnsupportedFormat(format!(
                "{} (expected .json or .toml)",
                path.display()
            ))),
        }
    }
}

impl RuleSetConfig {
    /// Load a rule file, choosing the parser from its extension
    pub fn load(path: &Path) -> Result<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), ?format, "Loading rule file");
        Self::parse(&content, format)
    }

    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        match format {
            ConfigFormat::Json => Self::from_json_str(content),
            ConfigFormat::Toml => Self::from_toml_str(content),
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Convert into builder definitions, keeping declaration order
    pub fn to_definitions(&self) -> Vec<RuleDefinition> {
        self.rules
            .iter()
            .map(|(name, rule)| rule.to_definition(name))
            .collect()
    }

    /// Load a rule file and build its forest
    pub fn load_forest(path: &Path) -> Result<RuleForest> {
        RuleForest::from_config(&Self::load(path)?)
    }
}

impl RuleConfig {
    pub fn to_definition(&self, name: &str) -> RuleDefinition {
        RuleDefinition {
            name: name.to_string(),
            tag: self.tag.clone(),
            aliases: self.aliases.clone(),
            path: self.path.clone(),
            case_sensitive: self.case_sensitive,
            children: self
                .child_rules
                .iter()
                .map(|(child_name, child)| child.to_definition(child_name))
                .collect(),
        }
    }
}

impl RuleForest {
    /// Build a forest from a parsed rule file
    pub fn from_config(config: &RuleSetConfig) -> Result<Self> {
        RuleForest::builder()
            .rules(config.to_definitions())
            .tie_break(config.tie_break)
            .build()
    }
}
