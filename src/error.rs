use thiserror::Error;

/// Unified error type for the navfilter library.
///
/// Only rule-set loading and reloading can fail. Evaluating a request never
/// returns an error.
#[derive(Debug, Error)]
pub enum NavFilterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config references unset environment variable: {0}")]
    ConfigEnvVar(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid pattern in rule '{rule}': {source}")]
    Pattern {
        rule: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),
}

pub type Result<T> = std::result::Result<T, NavFilterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: NavFilterError = io_err.into();
        assert!(matches!(err, NavFilterError::Io(_)));
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn invalid_rule_displays_message() {
        let err = NavFilterError::InvalidRule("duplicate rule name 'ads'".to_string());
        assert_eq!(err.to_string(), "Invalid rule: duplicate rule name 'ads'");
    }

    #[test]
    fn config_parse_error_converts() {
        let bad_toml = "[invalid";
        let toml_err = toml::from_str::<toml::Value>(bad_toml).unwrap_err();
        let err: NavFilterError = toml_err.into();
        assert!(matches!(err, NavFilterError::ConfigParse(_)));
    }

    #[test]
    fn pattern_error_names_the_rule() {
        let source = regex::Regex::new("(unclosed").unwrap_err();
        let err = NavFilterError::Pattern {
            rule: "ads".to_string(),
            source,
        };
        assert!(err.to_string().starts_with("Invalid pattern in rule 'ads'"));
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NavFilterError>();
    }
}
