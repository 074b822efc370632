//! Compiled rules and the dispositions they produce.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::config::{Action, PassthroughConfig, RuleConfig};
use super::pattern::UrlMatcher;
use crate::category::ResourceCategory;
use crate::error::{NavFilterError, Result};

/// The decision for one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "target", rename_all = "lowercase")]
pub enum Disposition {
    /// No constraint; the request proceeds.
    Allow,
    /// The request must not proceed.
    Block,
    /// The request must be sent to the given URL instead.
    Redirect(String),
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disposition::Allow => f.write_str("allow"),
            Disposition::Block => f.write_str("block"),
            Disposition::Redirect(target) => write!(f, "redirect -> {target}"),
        }
    }
}

/// Redirect target, optionally referencing capture groups of the matched pattern.
#[derive(Debug, Clone)]
pub struct RedirectTarget {
    template: String,
    expands: bool,
}

fn capture_ref() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$\$|\$\{[^}]*\}|\$[0-9A-Za-z_]+").expect("capture ref pattern is valid")
    })
}

impl RedirectTarget {
    /// Validate `template` for the rule named `rule`.
    ///
    /// With capture references replaced by a placeholder, the target must be
    /// an absolute URL.
    pub fn parse(rule: &str, template: &str) -> Result<Self> {
        let expands = template.contains('$');
        let candidate = if expands {
            capture_ref().replace_all(template, "x").into_owned()
        } else {
            template.to_string()
        };

        url::Url::parse(&candidate).map_err(|e| {
            NavFilterError::InvalidRule(format!(
                "rule '{rule}' has invalid redirect target '{template}': {e}"
            ))
        })?;

        Ok(Self {
            template: template.to_string(),
            expands,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Resolve the target for `url`, expanding capture references against
    /// the pattern that matched.
    fn resolve(&self, matcher: &UrlMatcher, url: &str) -> String {
        if !self.expands {
            return self.template.clone();
        }
        let mut out = String::new();
        match matcher.first_match(url).and_then(|re| re.captures(url)) {
            Some(caps) => caps.expand(&self.template, &mut out),
            None => out.push_str(&self.template),
        }
        out
    }
}

#[derive(Debug, Clone)]
enum RuleAction {
    Allow,
    Block,
    Redirect(RedirectTarget),
}

/// A compiled rule: URL predicate, optional category filter, and action.
#[derive(Debug, Clone)]
pub struct Rule {
    name: String,
    matcher: UrlMatcher,
    except: UrlMatcher,
    categories: Vec<ResourceCategory>,
    action: RuleAction,
    note: Option<String>,
}

impl Rule {
    /// Compile an ordered rule.
    pub fn from_config(config: &RuleConfig) -> Result<Self> {
        let name = config.name.as_str();
        let action = match (config.action, config.redirect.as_deref()) {
            (Action::Redirect, Some(target)) => {
                RuleAction::Redirect(RedirectTarget::parse(name, target)?)
            }
            (Action::Redirect, None) => {
                return Err(NavFilterError::InvalidRule(format!(
                    "rule '{name}' has action redirect but no redirect target"
                )));
            }
            (_, Some(_)) => {
                return Err(NavFilterError::InvalidRule(format!(
                    "rule '{name}' sets a redirect target but its action is not redirect"
                )));
            }
            (Action::Allow, None) => RuleAction::Allow,
            (Action::Block, None) => RuleAction::Block,
        };

        Self::build(
            name,
            &config.patterns,
            &config.globs,
            &config.except,
            &config.categories,
            action,
            config.note.clone(),
        )
    }

    /// Compile a passthrough rule; its action is always allow.
    pub fn passthrough(config: &PassthroughConfig) -> Result<Self> {
        Self::build(
            &config.name,
            &config.patterns,
            &config.globs,
            &config.except,
            &config.categories,
            RuleAction::Allow,
            config.note.clone(),
        )
    }

    fn build(
        name: &str,
        patterns: &[String],
        globs: &[String],
        except: &[String],
        categories: &[ResourceCategory],
        action: RuleAction,
        note: Option<String>,
    ) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(NavFilterError::InvalidRule(
                "rule name must not be empty".to_string(),
            ));
        }
        if patterns.is_empty() && globs.is_empty() {
            return Err(NavFilterError::InvalidRule(format!(
                "rule '{name}' has no patterns or globs"
            )));
        }

        let matcher = UrlMatcher::compile(name, patterns, globs)?;
        let except = if except.is_empty() {
            UrlMatcher::empty()
        } else {
            UrlMatcher::compile(name, except, &[])?
        };

        Ok(Self {
            name: name.to_string(),
            matcher,
            except,
            categories: categories.to_vec(),
            action,
            note,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn action(&self) -> Action {
        match self.action {
            RuleAction::Allow => Action::Allow,
            RuleAction::Block => Action::Block,
            RuleAction::Redirect(_) => Action::Redirect,
        }
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match &self.action {
            RuleAction::Redirect(target) => Some(target.template()),
            _ => None,
        }
    }

    /// Categories this rule is limited to; empty means any.
    pub fn categories(&self) -> &[ResourceCategory] {
        &self.categories
    }

    pub fn patterns(&self) -> &[String] {
        self.matcher.sources()
    }

    pub fn exceptions(&self) -> &[String] {
        self.except.sources()
    }

    /// Whether the category filter admits `category`.
    pub fn applies_to(&self, category: ResourceCategory) -> bool {
        self.categories.is_empty() || self.categories.contains(&category)
    }

    /// Whether this rule claims the request.
    pub fn matches(&self, url: &str, category: ResourceCategory) -> bool {
        self.applies_to(category) && self.matcher.is_match(url) && !self.except.is_match(url)
    }

    /// The disposition this rule produces for `url`. Only meaningful after
    /// [`Rule::matches`] returned true.
    pub fn disposition(&self, url: &str) -> Disposition {
        match &self.action {
            RuleAction::Allow => Disposition::Allow,
            RuleAction::Block => Disposition::Block,
            RuleAction::Redirect(target) => {
                Disposition::Redirect(target.resolve(&self.matcher, url))
            }
        }
    }
}
