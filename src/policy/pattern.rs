//! URL pattern compilation.
//!
//! Rules match against the full URL string. Patterns are either regular
//! expressions or globs; both compile into one [`UrlMatcher`] per rule.

use regex::{Regex, RegexSet};

use crate::error::{NavFilterError, Result};

/// Convert a glob into a regular expression.
///
/// `*` matches any run of characters and everything else is literal. A glob
/// that carries a scheme (`://`) must cover the whole URL, optionally followed
/// by a query or fragment; any other glob matches anywhere in the URL.
pub fn glob_to_regex(glob: &str) -> String {
    let trimmed = glob.trim();
    let body = trimmed
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    if !trimmed.contains("://") {
        return body;
    }
    if trimmed.ends_with('*') {
        format!("^{body}$")
    } else {
        format!("^{body}(?:[?#].*)?$")
    }
}

/// A compiled set of URL patterns; matches when any pattern matches.
#[derive(Debug, Clone)]
pub struct UrlMatcher {
    set: RegexSet,
    regexes: Vec<Regex>,
}

impl UrlMatcher {
    /// Compile regex `patterns` and `globs` for the rule named `rule`.
    pub fn compile(rule: &str, patterns: &[String], globs: &[String]) -> Result<Self> {
        let sources: Vec<String> = patterns
            .iter()
            .cloned()
            .chain(globs.iter().map(|g| glob_to_regex(g)))
            .collect();

        let pattern_err = |source: regex::Error| NavFilterError::Pattern {
            rule: rule.to_string(),
            source,
        };

        let regexes = sources
            .iter()
            .map(|s| Regex::new(s))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(pattern_err)?;
        let set = RegexSet::new(&sources).map_err(pattern_err)?;

        Ok(Self { set, regexes })
    }

    /// A matcher with no patterns; never matches.
    pub fn empty() -> Self {
        Self {
            set: RegexSet::empty(),
            regexes: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.regexes.is_empty()
    }

    pub fn is_match(&self, url: &str) -> bool {
        self.set.is_match(url)
    }

    /// The first pattern, in declaration order, that matches `url`.
    pub fn first_match(&self, url: &str) -> Option<&Regex> {
        self.set
            .matches(url)
            .iter()
            .next()
            .map(|idx| &self.regexes[idx])
    }

    /// Compiled pattern sources, globs already converted.
    pub fn sources(&self) -> &[String] {
        self.set.patterns()
    }
}
