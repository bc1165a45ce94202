//! Tagpath Rules - Hierarchical Filename Classification
//!
//! Maps a filename to a destination path by walking a forest of nested rules. Each rule
//! recognizes a tag in the filename and contributes a path-template fragment; children
//! refine the match (a numbered assignment inside an "Assignment" bucket).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Rule file  │     │   Forest    │     │  Traversal  │     │  Resolver   │
//! │ (JSON/TOML) │────▶│ (compiled   │────▶│ (deepest    │────▶│ (captures → │
//! │             │     │  templates) │     │  match)     │     │   path)     │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Core Concepts
//!
//! - **Tag template**: literal text with `<N>` placeholders and `$PARENT_TAG` / `$TAG` markers
//! - **Path template**: destination fragment with `$PARENT_PATH`, `$PARENT_TAG`, `$TAG`, `<N>`
//! - **CaptureMap**: values captured from one filename, threaded through one query
//! - **TieBreak**: how a result is picked when several roots match
//!
//! The forest is read-only once built and can be shared across threads. Queries never fail;
//! an unmatched filename yields `None`.

pub mod capture;
pub mod config;
pub mod error;
pub mod forest;
pub mod node;
pub mod resolve;
pub mod template;

// Re-exports for convenience
pub use capture::CaptureMap;
pub use config::{ConfigFormat, RuleConfig, RuleSetConfig};
pub use error::{Result, RuleError};
pub use forest::{ForestBuilder, Resolution, RuleForest, TieBreak, MAX_RULE_DEPTH};
pub use node::{RuleDefinition, RuleId, RuleNode};
pub use template::{CompiledPattern, PatternMatch};
