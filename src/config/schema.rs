//! Parameter schemas: the names, types and ranges an engine accepts.

use super::configuration::{Configuration, ParamValue};
use super::error::ConfigurationError;
use std::collections::BTreeMap;

/// Type and admissible range of a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    Int { min: i64, max: i64 },
    /// Integers are accepted and widened.
    Float { min: f64, max: f64 },
    Bool,
    Enum { choices: Vec<String> },
}

impl ParamKind {
    /// Checks `value` against the kind.
    pub fn check(&self, value: &ParamValue) -> Result<(), String> {
        match (self, value) {
            (ParamKind::Int { min, max }, ParamValue::Int(v)) => {
                if (*min..=*max).contains(v) {
                    Ok(())
                } else {
                    Err(format!("must be in [{min}, {max}]"))
                }
            }
            (ParamKind::Float { min, max }, v @ (ParamValue::Int(_) | ParamValue::Float(_))) => {
                let x = v.as_f64().unwrap_or(f64::NAN);
                if x >= *min && x <= *max {
                    Ok(())
                } else {
                    Err(format!("must be in [{min}, {max}]"))
                }
            }
            (ParamKind::Bool, ParamValue::Bool(_)) => Ok(()),
            (ParamKind::Enum { choices }, ParamValue::Enum(s)) => {
                if choices.iter().any(|c| c == s) {
                    Ok(())
                } else {
                    Err(format!("must be one of {}", choices.join(", ")))
                }
            }
            (kind, v) => Err(format!("expected {}, got {}", kind.type_name(), v.type_name())),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ParamKind::Int { .. } => "int",
            ParamKind::Float { .. } => "float",
            ParamKind::Bool => "bool",
            ParamKind::Enum { .. } => "enum",
        }
    }
}

/// Declaration of one parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    pub name: String,
    pub kind: ParamKind,
    pub description: String,
    /// Values a tuning search may try. Empty means not tunable.
    pub tuning_values: Vec<ParamValue>,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>, kind: ParamKind, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            tuning_values: Vec::new(),
        }
    }

    pub fn int(name: impl Into<String>, min: i64, max: i64, description: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Int { min, max }, description)
    }

    pub fn float(name: impl Into<String>, min: f64, max: f64, description: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Float { min, max }, description)
    }

    pub fn boolean(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Bool, description)
    }

    pub fn choice<S: Into<String>>(
        name: impl Into<String>,
        choices: impl IntoIterator<Item = S>,
        description: impl Into<String>,
    ) -> Self {
        let choices = choices.into_iter().map(Into::into).collect();
        Self::new(name, ParamKind::Enum { choices }, description)
    }

    pub fn with_tuning_values<V: Into<ParamValue>>(
        mut self,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.tuning_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_tunable(&self) -> bool {
        !self.tuning_values.is_empty()
    }
}

/// Set of parameters an engine accepts.
///
/// # Examples
///
/// ```
/// use u_optmodel::config::{Configuration, ParameterSchema};
///
/// let schema = ParameterSchema::standard();
/// let ok = Configuration::builder().set("TimeLimit", 30.0).build().unwrap();
/// assert!(schema.validate(&ok).is_ok());
///
/// let typo = Configuration::builder().set("TimeLimt", 30.0).build().unwrap();
/// assert!(schema.validate(&typo).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ParameterSchema {
    specs: BTreeMap<String, ParameterSpec>,
}

impl ParameterSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters common to mathematical programming engines.
    pub fn standard() -> Self {
        Self::new()
            .with(ParameterSpec::float(
                "TimeLimit",
                0.0,
                f64::INFINITY,
                "wall-clock limit of one solve, in seconds",
            ))
            .with(ParameterSpec::int("Seed", 0, i32::MAX.into(), "random seed"))
            .with(ParameterSpec::int("Threads", 0, 1024, "worker threads, 0 = automatic"))
            .with(ParameterSpec::float(
                "MIPGap",
                0.0,
                f64::INFINITY,
                "relative optimality gap",
            ))
            .with(
                ParameterSpec::int("MIPFocus", 0, 3, "balance of feasibility and optimality")
                    .with_tuning_values([0, 1, 2, 3]),
            )
            .with(
                ParameterSpec::int("Presolve", -1, 2, "presolve level, -1 = automatic")
                    .with_tuning_values([-1, 0, 1, 2]),
            )
            .with(
                ParameterSpec::int("Method", -1, 5, "continuous algorithm, -1 = automatic")
                    .with_tuning_values([-1, 0, 1, 2]),
            )
            .with(
                ParameterSpec::int("Cuts", -1, 3, "cut generation level, -1 = automatic")
                    .with_tuning_values([-1, 0, 1, 2, 3]),
            )
            .with(
                ParameterSpec::float("Heuristics", 0.0, 1.0, "share of time spent in heuristics")
                    .with_tuning_values([0.0, 0.05, 0.2, 0.5]),
            )
            .with(
                ParameterSpec::int(
                    "FuncPieces",
                    0,
                    crate::registry::MAX_PIECES as i64,
                    "pieces of function approximations, 0 = automatic",
                )
                .with_tuning_values([0, 16, 64, 256]),
            )
            .with(ParameterSpec::float(
                "FuncPieceError",
                1e-9,
                1e6,
                "maximum error of function approximations",
            ))
            .with(ParameterSpec::float(
                "FuncPieceRatio",
                -1.0,
                1.0,
                "approximation below (0) or above (1) the function, -1 = automatic",
            ))
    }

    /// Adds or replaces a parameter.
    pub fn with(mut self, spec: ParameterSpec) -> Self {
        self.specs.insert(spec.name.clone(), spec);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParameterSpec> {
        self.specs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Parameters in name order.
    pub fn specs(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.specs.values()
    }

    /// Parameters with tuning values.
    pub fn tunable(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.specs.values().filter(|s| s.is_tunable())
    }

    /// Checks every entry of `config`: names must be declared and values
    /// must match the declared kind and range.
    pub fn validate(&self, config: &Configuration) -> Result<(), ConfigurationError> {
        for (key, value) in config.iter() {
            let Some(spec) = self.specs.get(key) else {
                return Err(ConfigurationError::UnknownParameter {
                    key: key.to_string(),
                    suggestion: self.suggest(key),
                });
            };
            spec.kind
                .check(value)
                .map_err(|reason| ConfigurationError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                    reason,
                })?;
        }
        Ok(())
    }

    /// Closest declared name: a case-insensitive match, else the nearest
    /// name within edit distance 2.
    fn suggest(&self, key: &str) -> Option<String> {
        let lower = key.to_ascii_lowercase();
        if let Some(name) = self
            .specs
            .keys()
            .find(|name| name.to_ascii_lowercase() == lower)
        {
            return Some(name.clone());
        }
        self.specs
            .keys()
            .map(|name| (edit_distance(&lower, &name.to_ascii_lowercase()), name))
            .filter(|(d, _)| *d <= 2)
            .min_by_key(|(d, _)| *d)
            .map(|(_, name)| name.clone())
    }
}

/// Levenshtein distance over chars.
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0; b.len() + 1];
    for (i, ca) in a.chars().enumerate() {
        cur[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            cur[j + 1] = substitution.min(prev[j + 1] + 1).min(cur[j] + 1);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(entries: &[(&str, ParamValue)]) -> Configuration {
        entries
            .iter()
            .fold(Configuration::builder(), |b, (k, v)| b.set(*k, v.clone()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_standard_accepts_defaults() {
        let schema = ParameterSchema::standard();
        let c = config(&[
            ("TimeLimit", ParamValue::Float(1.5)),
            ("Seed", ParamValue::Int(42)),
            ("MIPFocus", ParamValue::Int(2)),
            ("Heuristics", ParamValue::Int(0)),
        ]);
        assert!(schema.validate(&c).is_ok());
        assert!(schema.validate(&Configuration::new()).is_ok());
    }

    #[test]
    fn test_unknown_parameter() {
        let schema = ParameterSchema::standard();
        let err = schema
            .validate(&config(&[("FooBar", ParamValue::Int(1))]))
            .unwrap_err();
        match err {
            ConfigurationError::UnknownParameter { key, suggestion } => {
                assert_eq!(key, "FooBar");
                assert_eq!(suggestion, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_suggestions() {
        let schema = ParameterSchema::standard();
        let suggestion = |key: &str| match schema.validate(&config(&[(key, ParamValue::Int(1))])) {
            Err(ConfigurationError::UnknownParameter { suggestion, .. }) => suggestion,
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(suggestion("timelimit").as_deref(), Some("TimeLimit"));
        assert_eq!(suggestion("Thraeds").as_deref(), Some("Threads"));
    }

    #[test]
    fn test_invalid_values() {
        let schema = ParameterSchema::standard();
        for (key, value) in [
            ("MIPFocus", ParamValue::Int(7)),
            ("MIPFocus", ParamValue::Float(1.0)),
            ("TimeLimit", ParamValue::Float(-1.0)),
            ("Seed", ParamValue::Bool(true)),
        ] {
            let err = schema
                .validate(&config(&[(key, value.clone())]))
                .unwrap_err();
            assert!(
                matches!(err, ConfigurationError::InvalidValue { key: ref k, .. } if k == key),
                "{key}={value} accepted"
            );
        }
    }

    #[test]
    fn test_enum_kind() {
        let schema = ParameterSchema::new().with(
            ParameterSpec::choice("Algorithm", ["primal", "dual", "barrier"], "lp algorithm")
                .with_tuning_values(["primal", "dual"]),
        );
        assert!(schema
            .validate(&config(&[("Algorithm", "dual".into())]))
            .is_ok());
        assert!(schema
            .validate(&config(&[("Algorithm", "sifting".into())]))
            .is_err());
        assert_eq!(schema.tunable().count(), 1);
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("same", "same"), 0);
    }
}
