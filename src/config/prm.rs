//! Parameter files: one `name value` pair per line.
//!
//! ```text
//! # Parameter settings
//! Heuristics 0.2
//! MIPFocus 1
//! ```
//!
//! `#` starts a comment; blank lines are ignored. Values are read as a
//! boolean (`true`/`false`), then an integer (optional sign and digits),
//! then a float, and otherwise as an enum token.

use super::configuration::{key_problem, Configuration, ParamValue};
use super::error::ConfigurationError;
use std::fmt::Write as _;
use std::path::Path;

const HEADER: &str = "# Parameter settings";

impl Configuration {
    /// Renders the configuration as a parameter file.
    pub fn to_prm(&self) -> String {
        let mut out = String::with_capacity(16 + 24 * self.len());
        out.push_str(HEADER);
        out.push('\n');
        for (key, value) in self.iter() {
            // writing to a String cannot fail
            let _ = writeln!(out, "{key} {value}");
        }
        out
    }

    /// Parses a parameter file.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::Parse`] for malformed lines or invalid values,
    /// [`ConfigurationError::DuplicateKey`] when a name appears twice.
    pub fn from_prm(text: &str) -> Result<Self, ConfigurationError> {
        let mut config = Configuration::new();
        for (i, raw) in text.lines().enumerate() {
            let line = i + 1;
            let tokens: Vec<&str> = raw
                .split_whitespace()
                .take_while(|t| !t.starts_with('#'))
                .collect();
            if tokens.is_empty() {
                continue;
            }
            let parse_err = |reason: &str| ConfigurationError::Parse {
                line,
                content: raw.trim().to_string(),
                reason: reason.to_string(),
            };
            let [key, value] = tokens[..] else {
                return Err(parse_err("expected 'name value'"));
            };
            if let Some(reason) = key_problem(key) {
                return Err(parse_err(reason));
            }
            let value = parse_value(value).map_err(parse_err)?;
            if config.contains(key) {
                return Err(ConfigurationError::DuplicateKey {
                    key: key.to_string(),
                    line,
                });
            }
            config.insert_unchecked(key.to_string(), value);
        }
        Ok(config)
    }

    /// Writes the configuration to `path` as a parameter file.
    pub fn write_prm_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigurationError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_prm()).map_err(|source| ConfigurationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(
            component = "config",
            operation = "write_prm",
            path = %path.display(),
            parameters = self.len(),
            "Wrote parameter file"
        );
        Ok(())
    }

    /// Reads a parameter file from `path`.
    pub fn read_prm_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_prm(&text)?;
        tracing::debug!(
            component = "config",
            operation = "read_prm",
            path = %path.display(),
            parameters = config.len(),
            "Read parameter file"
        );
        Ok(config)
    }
}

fn parse_value(token: &str) -> Result<ParamValue, &'static str> {
    match token {
        "true" => return Ok(ParamValue::Bool(true)),
        "false" => return Ok(ParamValue::Bool(false)),
        _ => {}
    }
    let digits = token.strip_prefix(['-', '+']).unwrap_or(token);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(i) = token.parse::<i64>() {
            return Ok(ParamValue::Int(i));
        }
    }
    if let Ok(f) = token.parse::<f64>() {
        if f.is_nan() {
            return Err("NaN is not a valid parameter value");
        }
        return Ok(ParamValue::Float(f));
    }
    let value = ParamValue::Enum(token.to_string());
    match value.problem() {
        Some(reason) => Err(reason),
        None => Ok(value),
    }
}
