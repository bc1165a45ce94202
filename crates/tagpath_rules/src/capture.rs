//! Per-query capture context.
//!
//! A `CaptureMap` holds the placeholder values captured from one filename. It is created
//! empty for every root, copied on descent into a child, and merged back when the child
//! matches. Nodes never store captures.

use serde::Serialize;
use std::collections::BTreeMap;

/// Placeholder token -> captured substring, valid for one query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CaptureMap {
    values: BTreeMap<String, String>,
}

impl CaptureMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.values.get(token).map(String::as_str)
    }

    /// Record a value, replacing any earlier capture of the same token
    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<String>) {
        self.values.insert(token.into(), value.into());
    }

    /// Merge a descendant's captures into this view. Descendant values win.
    pub fn merge(&mut self, other: CaptureMap) {
        self.values.extend(other.values);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Extend<(String, String)> for CaptureMap {
    fn extend<I: IntoIterator<Item = (String, String)>>(&mut self, iter: I) {
        self.values.extend(iter);
    }
}

impl FromIterator<(String, String)> for CaptureMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
