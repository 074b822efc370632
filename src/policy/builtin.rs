//! The rule set navfilter ships with.
//!
//! It lives in `templates/navfilter.toml` so that `navfilter init` writes out
//! exactly what the engine runs when no config file is present.

use super::config::FilterConfig;
use crate::error::Result;

/// Text of the built-in rule set.
pub const DEFAULT_TEMPLATE: &str = include_str!("../../templates/navfilter.toml");

/// Parse the built-in rule set.
pub fn builtin_config() -> Result<FilterConfig> {
    FilterConfig::from_toml_str(DEFAULT_TEMPLATE)
}
