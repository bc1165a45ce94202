//! Structural and capture placeholder resolution.
//!
//! Structural markers come from tree linkage:
//! - `$PARENT_PATH`: the parent's resolved path (empty for a root)
//! - `$PARENT_TAG`: the parent's raw tag template (left as-is for a root)
//! - `$SELF_TAG` / `$TAG`: the node's own raw tag template
//!
//! Markers are replaced in a single pass, so substituted text is never rescanned.
//! Capture placeholders (`<N>`) are substituted last, per query.

use crate::capture::CaptureMap;
use crate::template::PLACEHOLDER;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub const PARENT_PATH: &str = "$PARENT_PATH";
pub const PARENT_TAG: &str = "$PARENT_TAG";
pub const SELF_TAG: &str = "$SELF_TAG";
pub const TAG: &str = "$TAG";

static STRUCTURAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$(PARENT_PATH|PARENT_TAG|SELF_TAG|TAG)").expect("structural regex"));

/// Parent data visible to a child during resolution
#[derive(Debug, Clone, Copy)]
pub struct ParentView<'a> {
    /// Raw tag template of the parent
    pub tag: &'a str,
    /// Parent path with structural markers already resolved
    pub path: &'a str,
}

/// Resolve structural markers in a tag template.
///
/// `$PARENT_PATH` has no meaning inside a tag and is left untouched.
pub fn resolve_tag_template(template: &str, own_tag: &str, parent: Option<ParentView<'_>>) -> String {
    replace_structural(template, |marker| match marker {
        "PARENT_TAG" => parent.map(|p| p.tag),
        "SELF_TAG" | "TAG" => Some(own_tag),
        _ => None,
    })
}

/// Resolve structural markers in a path template.
pub fn resolve_path_template(template: &str, own_tag: &str, parent: Option<ParentView<'_>>) -> String {
    replace_structural(template, |marker| match marker {
        "PARENT_PATH" => Some(parent.map_or("", |p| p.path)),
        "PARENT_TAG" => parent.map(|p| p.tag),
        "SELF_TAG" | "TAG" => Some(own_tag),
        _ => None,
    })
}

/// Substitute `<TOKEN>` placeholders from the capture map.
///
/// Tokens without a captured value are left as literal text.
pub fn substitute_captures(template: &str, captures: &CaptureMap) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            captures
                .get(&caps[1])
                .map(str::to_string)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn replace_structural<'a, F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<&'a str>,
{
    STRUCTURAL
        .replace_all(template, |caps: &Captures<'_>| match lookup(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
