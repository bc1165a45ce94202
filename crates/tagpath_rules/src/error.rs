//! Error types for rule loading and forest construction

use std::io;
use thiserror::Error;

/// Rule error type
///
/// Every variant is raised while loading or building a forest. Queries against a
/// built forest never fail.
#[derive(Error, Debug)]
pub enum RuleError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported rule file format: {0}")]
    UnsupportedFormat(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Pattern error: {0}")]
    Pattern(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, RuleError>;
