//! Errors from loading `skims.toml` and its environment overrides.

use super::error_code::{self, SkimsErrorCode};

/// A configuration problem. Always fatal: no run starts on a bad config.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {message}")]
    Unreadable { path: String, message: String },

    #[error("{path} is not valid TOML: {message}")]
    InvalidToml { path: String, message: String },

    #[error("cannot render config as TOML: {0}")]
    Unserializable(String),

    /// A value parsed but is out of range or unknown, e.g. a finding code
    /// that no query implements.
    #[error("`{field}` {message}")]
    ValidationFailed { field: String, message: String },

    #[error("`{var}` holds `{value}`, expected {expected}")]
    InvalidEnvValue {
        var: String,
        value: String,
        expected: &'static str,
    },
}

impl SkimsErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        error_code::CONFIG_ERROR
    }
}
