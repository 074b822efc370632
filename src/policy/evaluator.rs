use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, trace};

use super::builtin::builtin_config;
use super::config::FilterConfig;
use super::rule::{Disposition, Rule};
use crate::category::ResourceCategory;
use crate::error::{NavFilterError, Result};

/// A request handed over by the host's request hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestDescriptor<'a> {
    pub url: &'a str,
    pub category: ResourceCategory,
}

impl<'a> RequestDescriptor<'a> {
    pub fn new(url: &'a str, category: ResourceCategory) -> Self {
        Self { url, category }
    }

    /// Build a descriptor from the host's resource-type tag. Unknown tags
    /// become [`ResourceCategory::Other`].
    pub fn from_tag(url: &'a str, tag: &str) -> Self {
        Self::new(url, ResourceCategory::classify(tag))
    }
}

/// Where a decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Passthrough,
    Rule,
    Default,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Passthrough => f.write_str("passthrough"),
            Tier::Rule => f.write_str("rule"),
            Tier::Default => f.write_str("default"),
        }
    }
}

/// Result of an evaluation, including the matched rule and the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub disposition: Disposition,
    pub tier: Tier,
    pub matched_rule: Option<String>,
    pub reason: String,
}

impl Evaluation {
    /// Pretty-printed JSON, as `navfilter check --explain` prints it.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Decides block / redirect / allow for each request.
///
/// Passthrough rules are checked first and always allow. Ordered rules follow,
/// first match wins. A request no rule claims, or whose URL does not parse, is
/// allowed.
///
/// The engine is immutable once built and can be shared across threads; to
/// change rules, build a new engine and swap it in (see
/// [`EngineHandle`](super::reload::EngineHandle)).
#[derive(Debug, Clone, Default)]
pub struct DispositionEngine {
    passthrough: Vec<Rule>,
    rules: Vec<Rule>,
}

impl DispositionEngine {
    /// Compile a rule set. Rule names must be unique across both tiers.
    pub fn from_config(config: &FilterConfig) -> Result<Self> {
        let mut seen = HashSet::new();
        let names = config
            .policy
            .passthrough
            .iter()
            .map(|p| p.name.as_str())
            .chain(config.policy.rules.iter().map(|r| r.name.as_str()));
        for name in names {
            if !seen.insert(name) {
                return Err(NavFilterError::InvalidRule(format!(
                    "duplicate rule name '{name}'"
                )));
            }
        }

        let passthrough = config
            .policy
            .passthrough
            .iter()
            .map(Rule::passthrough)
            .collect::<Result<Vec<_>>>()?;
        let rules = config
            .policy
            .rules
            .iter()
            .map(Rule::from_config)
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Disposition engine ready ({} passthrough, {} ordered rules)",
            passthrough.len(),
            rules.len()
        );
        Ok(Self { passthrough, rules })
    }

    /// Engine for the built-in rule set.
    pub fn builtin() -> Result<Self> {
        Self::from_config(&builtin_config()?)
    }

    /// Load, validate and compile the rule set at `path`.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let config = FilterConfig::load_from_path(path)?;
        Self::from_config(&config)
    }

    pub fn passthrough_rules(&self) -> &[Rule] {
        &self.passthrough
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule_count(&self) -> usize {
        self.passthrough.len() + self.rules.len()
    }

    /// Decide what happens to `req`. Never fails.
    pub fn evaluate(&self, req: &RequestDescriptor<'_>) -> Disposition {
        match self.find_match(req) {
            Some((tier, rule)) => {
                debug!("{} {} matched {} '{}'", req.category, req.url, tier, rule.name());
                rule.disposition(req.url)
            }
            None => Disposition::Allow,
        }
    }

    /// Same decision as [`evaluate`](Self::evaluate), with provenance.
    pub fn explain(&self, req: &RequestDescriptor<'_>) -> Evaluation {
        match self.find_match(req) {
            Some((tier, rule)) => Evaluation {
                disposition: rule.disposition(req.url),
                tier,
                matched_rule: Some(rule.name().to_string()),
                reason: format!("Matched {} rule: {}", tier, rule.name()),
            },
            None => Evaluation {
                disposition: Disposition::Allow,
                tier: Tier::Default,
                matched_rule: None,
                reason: if url::Url::parse(req.url).is_err() {
                    "URL does not parse; default policy applied".to_string()
                } else {
                    "No matching rule; default policy applied".to_string()
                },
            },
        }
    }

    fn find_match(&self, req: &RequestDescriptor<'_>) -> Option<(Tier, &Rule)> {
        if url::Url::parse(req.url).is_err() {
            trace!("Unparseable URL falls through to default: {:?}", req.url);
            return None;
        }

        if let Some(rule) = self
            .passthrough
            .iter()
            .find(|r| r.matches(req.url, req.category))
        {
            return Some((Tier::Passthrough, rule));
        }

        self.rules
            .iter()
            .find(|r| r.matches(req.url, req.category))
            .map(|rule| (Tier::Rule, rule))
    }
}
