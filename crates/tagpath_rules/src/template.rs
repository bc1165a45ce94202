//! Tag template compilation.
//!
//! A tag template is literal text with `<TOKEN>` placeholders. Compiling one produces a
//! regex used for a substring search against a filename:
//! - literal text is escaped
//! - `<N>` becomes a capturing group of decimal digits
//! - a run of whitespace matches one or more whitespace characters
//!
//! Tokens other than `<N>` are not capturable and stay literal text.

use crate::error::{Result, RuleError};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// `<TOKEN>` placeholders inside tag and path templates.
pub(crate) static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<([A-Z_]+)>").expect("placeholder regex"));

/// Regex class for a capturable token, if the token is capturable.
fn capture_class(token: &str) -> Option<&'static str> {
    match token {
        "N" => Some(r"\d+"),
        _ => None,
    }
}

/// A tag template compiled for matching
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    template: String,
    regex: Regex,
    tokens: Vec<String>,
}

/// Result of matching one pattern set against a filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    /// Position of the matching template (0 is the primary tag, then aliases)
    pub index: usize,
    /// Captured values keyed by token, in template order
    pub captures: Vec<(String, String)>,
}

impl CompiledPattern {
    /// Compile a single template
    pub fn new(template: &str, case_sensitive: bool) -> Result<Self> {
        let (source, tokens) = template_to_regex(template);
        let regex = RegexBuilder::new(&source)
            .case_insensitive(!case_sensitive)
            .build()
            .map_err(|e| RuleError::Pattern(format!("{}: {}", template, e)))?;

        Ok(Self {
            template: template.to_string(),
            regex,
            tokens,
        })
    }

    /// The template text this pattern was compiled from
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The generated regex source
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Capture tokens in group order
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Search the filename for this pattern.
    ///
    /// Returns the captured `(token, value)` pairs on a match. The search is a substring
    /// search; the template may occur anywhere in the filename.
    pub fn captures(&self, filename: &str) -> Option<Vec<(String, String)>> {
        let caps = self.regex.captures(filename)?;
        let values = self
            .tokens
            .iter()
            .zip(caps.iter().skip(1))
            .filter_map(|(token, group)| group.map(|m| (token.clone(), m.as_str().to_string())))
            .collect();
        Some(values)
    }
}

/// Compile templates, preserving their order.
pub fn compile<S: AsRef<str>>(templates: &[S], case_sensitive: bool) -> Result<Vec<CompiledPattern>> {
    templates
        .iter()
        .map(|t| CompiledPattern::new(t.as_ref(), case_sensitive))
        .collect()
}

/// Match the first pattern that finds an occurrence in the filename.
///
/// Later alternatives are not tried once one matches.
pub fn match_first(patterns: &[CompiledPattern], filename: &str) -> Option<PatternMatch> {
    patterns.iter().enumerate().find_map(|(index, pattern)| {
        pattern
            .captures(filename)
            .map(|captures| PatternMatch { index, captures })
    })
}

/// Translate a template into regex source plus its capture tokens.
fn template_to_regex(template: &str) -> (String, Vec<String>) {
    let mut source = String::with_capacity(template.len() * 2);
    let mut tokens = Vec::new();
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(template) {
        let whole = match caps.get(0) {
            Some(m) => m,
            None => continue,
        };
        push_literal(&mut source, &template[last..whole.start()]);

        let token = &caps[1];
        match capture_class(token) {
            Some(class) => {
                source.push('(');
                source.push_str(class);
                source.push(')');
                tokens.push(token.to_string());
            }
            None => push_literal(&mut source, whole.as_str()),
        }
        last = whole.end();
    }
    push_literal(&mut source, &template[last..]);

    (source, tokens)
}

/// Append escaped literal text, collapsing whitespace runs into `\s+`.
fn push_literal(source: &mut String, text: &str) {
    let mut run = String::new();
    let mut in_space = false;

    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                source.push_str(&regex::escape(&run));
                run.clear();
                source.push_str(r"\s+");
                in_space = true;
            }
        } else {
            run.push(ch);
            in_space = false;
        }
    }
    source.push_str(&regex::escape(&run));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_template_translation() {
        let (source, tokens) = template_to_regex("Assignment <N>");
        assert_eq!(source, r"Assignment\s+(\d+)");
        assert_eq!(tokens, vec!["N".to_string()]);
    }

    #[test]
    fn metacharacters_are_escaped() {
        let (source, tokens) = template_to_regex("C++ (Intro).v2");
        assert_eq!(source, r"C\+\+\s+\(Intro\)\.v2");
        assert!(tokens.is_empty());
    }

    #[test]
    fn whitespace_runs_collapse() {
        let (source, _) = template_to_regex("Lab  \t 1");
        assert_eq!(source, r"Lab\s+1");
    }

    #[test]
    fn unknown_tokens_stay_literal() {
        let pattern = CompiledPattern::new("Week <WEEK>", false).unwrap();
        assert!(pattern.tokens().is_empty());
        assert!(pattern.captures("notes Week <WEEK>.pdf").is_some());
        assert!(pattern.captures("notes Week 3.pdf").is_none());
    }

    #[test]
    fn substring_search_with_capture() {
        let pattern = CompiledPattern::new("Assignment <N>", false).unwrap();
        let caps = pattern.captures("SYSC 2004 Assignment  12.pdf").unwrap();
        assert_eq!(caps, vec![("N".to_string(), "12".to_string())]);
        assert!(pattern.captures("SYSC 2004 3 Assignment Grading Scheme.pdf").is_none());
    }

    #[test]
    fn case_sensitivity_flag() {
        let insensitive = CompiledPattern::new("Review", false).unwrap();
        assert!(insensitive.captures("MATH_1005 REVIEW doc.pdf").is_some());

        let sensitive = CompiledPattern::new("Review", true).unwrap();
        assert!(sensitive.captures("MATH_1005 REVIEW doc.pdf").is_none());
        assert!(sensitive.captures("MATH_1005 Review doc.pdf").is_some());
    }

    #[test]
    fn empty_template_matches_anything() {
        let pattern = CompiledPattern::new("", false).unwrap();
        assert_eq!(pattern.captures("anything.pdf"), Some(Vec::new()));
    }

    #[test]
    fn first_matching_alternative_wins() {
        let patterns = compile(&["SYSC 2004", "SYSC2004", "SYSC_2004"], false).unwrap();
        assert_eq!(match_first(&patterns, "SYSC 2004 Lab.pdf").map(|m| m.index), Some(0));
        assert_eq!(match_first(&patterns, "SYSC2004 Lab.pdf").map(|m| m.index), Some(1));
        assert_eq!(match_first(&patterns, "SYSC_2004 Lab.pdf").map(|m| m.index), Some(2));
        assert!(match_first(&patterns, "MATH 1005 Lab.pdf").is_none());
    }
}
