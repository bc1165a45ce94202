//! CLI module for Tagpath
//!
//! Commands only read the rule file and the filesystem. Nothing is moved or renamed;
//! destinations are printed so they can be reviewed first.

pub mod config;
pub mod error;
pub mod output;

pub mod resolve;
pub mod rules;
pub mod scan;
