//! Configuration errors.

use std::path::PathBuf;

/// Errors raised while building, validating, reading or writing a
/// [`Configuration`](super::Configuration).
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("unknown parameter '{key}'{}", hint(.suggestion))]
    UnknownParameter {
        key: String,
        /// Closest known parameter name, if any is close.
        suggestion: Option<String>,
    },

    #[error("invalid value {value} for parameter '{key}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("invalid parameter name '{key}': {reason}")]
    InvalidKey { key: String, reason: &'static str },

    #[error("line {line}: {reason}: '{content}'")]
    Parse {
        line: usize,
        content: String,
        reason: String,
    },

    #[error("line {line}: parameter '{key}' already set")]
    DuplicateKey { key: String, line: usize },

    #[error("parameter file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{s}'?)"),
        None => String::new(),
    }
}
