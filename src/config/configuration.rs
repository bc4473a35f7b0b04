//! Parameter values and immutable configurations.

use super::error::ConfigurationError;
use std::collections::BTreeMap;
use std::fmt;

/// Value of one solver parameter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParamValue {
    Int(i64),
    /// Never NaN.
    Float(f64),
    Bool(bool),
    /// Identifier-like token, e.g. `barrier`.
    Enum(String),
}

impl ParamValue {
    /// Numeric view of `Int` and `Float` values.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            ParamValue::Int(i) => Some(i as f64),
            ParamValue::Float(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            ParamValue::Int(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            ParamValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&str> {
        match self {
            ParamValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Int(_) => "int",
            ParamValue::Float(_) => "float",
            ParamValue::Bool(_) => "bool",
            ParamValue::Enum(_) => "enum",
        }
    }

    /// Why this value cannot be stored, if it cannot.
    pub(crate) fn problem(&self) -> Option<&'static str> {
        match self {
            ParamValue::Float(f) if f.is_nan() => Some("NaN is not a valid parameter value"),
            ParamValue::Enum(token) => token_problem(token),
            _ => None,
        }
    }
}

/// Enum tokens must survive the `name value` file format unchanged and
/// must not read back as another value type.
fn token_problem(token: &str) -> Option<&'static str> {
    if token.is_empty() {
        Some("enum value is empty")
    } else if token.chars().any(char::is_whitespace) {
        Some("enum value contains whitespace")
    } else if token.starts_with('#') {
        Some("enum value starts with '#'")
    } else if token == "true" || token == "false" {
        Some("enum value reads as a boolean")
    } else if token.parse::<f64>().is_ok() {
        Some("enum value reads as a number")
    } else {
        None
    }
}

pub(crate) fn key_problem(key: &str) -> Option<&'static str> {
    if key.is_empty() {
        Some("name is empty")
    } else if key.chars().any(char::is_whitespace) {
        Some("name contains whitespace")
    } else if key.starts_with('#') {
        Some("name starts with '#'")
    } else {
        None
    }
}

/// Floats print in shortest round-trip form and always carry a `.`, an
/// exponent or `inf`, so they never read back as integers.
impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(i) => write!(f, "{i}"),
            ParamValue::Float(x) => write!(f, "{x:?}"),
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Enum(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v.into())
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Enum(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Enum(v)
    }
}

/// Immutable, ordered mapping from parameter name to value.
///
/// # Examples
///
/// ```
/// use u_optmodel::config::{Configuration, ParamValue};
///
/// let config = Configuration::builder()
///     .set("TimeLimit", 10.0)
///     .set("MIPFocus", 1)
///     .build()
///     .unwrap();
/// assert_eq!(config.get_f64("TimeLimit"), Some(10.0));
/// assert_eq!(config.get("MIPFocus"), Some(&ParamValue::Int(1)));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Configuration {
    values: BTreeMap<String, ParamValue>,
}

impl Configuration {
    /// The empty configuration: every parameter at the engine default.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::default()
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(ParamValue::as_f64)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(ParamValue::as_i64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(ParamValue::as_bool)
    }

    pub fn get_enum(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ParamValue::as_enum)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// A copy with `key` set to `value`.
    pub fn with_value(
        &self,
        key: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Result<Self, ConfigurationError> {
        let mut builder = ConfigurationBuilder {
            values: self.values.clone(),
            error: None,
        };
        builder = builder.set(key, value);
        builder.build()
    }

    /// A copy without `key`.
    pub fn without(&self, key: &str) -> Self {
        let mut values = self.values.clone();
        values.remove(key);
        Self { values }
    }

    /// A copy of `self` with every entry of `other` applied on top.
    pub fn overlay(&self, other: &Configuration) -> Self {
        let mut values = self.values.clone();
        values.extend(other.values.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self { values }
    }

    pub(crate) fn insert_unchecked(&mut self, key: String, value: ParamValue) {
        self.values.insert(key, value);
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k}={v}")?;
        }
        f.write_str("}")
    }
}

/// Builder for [`Configuration`]. The first invalid entry is reported by
/// [`build`](ConfigurationBuilder::build).
#[derive(Debug, Default)]
pub struct ConfigurationBuilder {
    values: BTreeMap<String, ParamValue>,
    error: Option<ConfigurationError>,
}

impl ConfigurationBuilder {
    /// Sets `key`, replacing any previous value.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        if self.error.is_some() {
            return self;
        }
        let key = key.into();
        let value = value.into();
        if let Some(reason) = key_problem(&key) {
            self.error = Some(ConfigurationError::InvalidKey { key, reason });
        } else if let Some(reason) = value.problem() {
            self.error = Some(ConfigurationError::InvalidValue {
                key,
                value: value.to_string(),
                reason: reason.to_string(),
            });
        } else {
            self.values.insert(key, value);
        }
        self
    }

    pub fn build(self) -> Result<Configuration, ConfigurationError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(Configuration {
                values: self.values,
            }),
        }
    }
}
