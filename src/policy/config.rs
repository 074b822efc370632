//! TOML rule-set document for navfilter.
//!
//! The top-level [`FilterConfig`] is deserialized from `navfilter.toml`. It
//! holds two rule lists: passthrough rules, which always resolve to allow and
//! are checked first, and the ordered block/redirect/allow rules.
//!
//! # Example `navfilter.toml`
//!
//! ```toml
//! [[policy.passthrough]]
//! name = "x-data-api"
//! patterns = ['://x\.com/i/']
//!
//! [[policy.rules]]
//! name = "ad-hosts"
//! patterns = ['://.*\.doubleclick\.net/']
//! action = "block"
//!
//! [[policy.rules]]
//! name = "facebook-feeds"
//! categories = ["mainFrame"]
//! patterns = ['://(m|www)\.facebook\.com/(home\.php|watch(?:/.*)?)$']
//! action = "redirect"
//! redirect = "https://m.facebook.com/me"
//! ```
//!
//! # Environment placeholders
//!
//! `${NAME}` and `$NAME` with an upper-case name are replaced by the value of
//! that environment variable before the document is parsed, everywhere except
//! on comment lines. This includes pattern strings and redirect targets, so a
//! capture reference in a redirect target must be numeric (`$1`) or lower-case
//! (`${slug}`); `${ID}` is read as an environment variable.

use std::path::Path;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::category::ResourceCategory;
use crate::error::{NavFilterError, Result};

/// The action a rule applies when it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Let the request proceed.
    Allow,
    /// Cancel the request.
    Block,
    /// Send the request to the rule's `redirect` target instead.
    Redirect,
}

/// An ordered rule (`[[policy.rules]]`).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// Unique rule name (e.g., `"ad-hosts"`).
    pub name: String,
    /// Regular expressions matched against the full URL. Any may match.
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Glob patterns matched against the full URL. Any may match.
    #[serde(default)]
    pub globs: Vec<String>,
    /// Regular expressions that exempt a URL from this rule.
    #[serde(default)]
    pub except: Vec<String>,
    /// Resource categories this rule applies to. Empty means every category.
    #[serde(default)]
    pub categories: Vec<ResourceCategory>,
    /// Action to take when this rule matches.
    pub action: Action,
    /// Redirect target; required when `action = "redirect"`.
    #[serde(default)]
    pub redirect: Option<String>,
    /// Optional note for documentation purposes.
    #[serde(default)]
    pub note: Option<String>,
}

/// A passthrough rule (`[[policy.passthrough]]`). Always resolves to allow.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PassthroughConfig {
    pub name: String,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub globs: Vec<String>,
    #[serde(default)]
    pub except: Vec<String>,
    #[serde(default)]
    pub categories: Vec<ResourceCategory>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Policy section (`[policy]`).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    /// Rules evaluated ahead of everything else.
    #[serde(default)]
    pub passthrough: Vec<PassthroughConfig>,
    /// Ordered list of rules; first match wins.
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

/// Top-level rule-set document deserialized from `navfilter.toml`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    #[serde(default)]
    pub policy: PolicyConfig,
}

impl FilterConfig {
    /// Load and parse the rule set from a TOML file at the given path.
    ///
    /// Before parsing, `${VAR}` and `$VAR` placeholders (upper-case names only)
    /// are replaced with the corresponding environment variable values. An
    /// error is returned if a referenced variable is not set.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse a rule set from TOML text, substituting environment placeholders.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let content = substitute_env_vars(content)?;
        let config: FilterConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Total number of rules across both tiers.
    pub fn rule_count(&self) -> usize {
        self.policy.passthrough.len() + self.policy.rules.len()
    }
}

fn env_placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Lower-case names are left alone: `${name}` is a capture reference in
    // redirect targets.
    RE.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}|\$([A-Z_][A-Z0-9_]*)")
            .expect("env placeholder pattern is valid")
    })
}

/// Replace `${VAR_NAME}` and `$VAR_NAME` placeholders with environment variable values.
///
/// Lines whose first non-blank character is `#` are copied as-is.
/// Returns an error containing the variable name if the variable is not set.
fn substitute_env_vars(input: &str) -> Result<String> {
    let mut missing: Option<String> = None;
    let mut output = String::with_capacity(input.len());

    for line in input.split_inclusive('\n') {
        if line.trim_start().starts_with('#') {
            output.push_str(line);
            continue;
        }
        let replaced = env_placeholder().replace_all(line, |caps: &Captures| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            match std::env::var(name) {
                Ok(value) => value,
                Err(_) => {
                    missing.get_or_insert_with(|| name.to_string());
                    String::new()
                }
            }
        });
        output.push_str(&replaced);
    }

    if let Some(name) = missing {
        return Err(NavFilterError::ConfigEnvVar(name));
    }
    Ok(output)
}
