//! Model construction and validation errors.

use super::variables::ModelId;
use crate::registry::Domain;
use std::fmt;

/// The kind of named model entity an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Variable,
    Constraint,
    GeneralConstraint,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Entity::Variable => "variable",
            Entity::Constraint => "constraint",
            Entity::GeneralConstraint => "general constraint",
        })
    }
}

/// Errors raised while building or finalizing a [`Model`](super::Model).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("invalid bounds [{lower}, {upper}] for variable '{name}': {reason}")]
    InvalidBounds {
        name: String,
        lower: f64,
        upper: f64,
        reason: &'static str,
    },

    #[error("duplicate {entity} name '{name}'")]
    DuplicateName { entity: Entity, name: String },

    #[error("{context} references variable #{index} of model {owner}, not of model {model}")]
    ForeignVariable {
        /// What holds the reference, e.g. `constraint 'c1'`.
        context: String,
        /// Model that issued the handle.
        owner: ModelId,
        /// Model the reference was handed to.
        model: ModelId,
        index: usize,
    },

    #[error("{entity} handle #{index} does not exist in model {model}")]
    UnknownHandle {
        entity: Entity,
        model: ModelId,
        index: usize,
    },

    #[error("unsupported general constraint relation '{tag}'")]
    UnsupportedRelation { tag: String },

    #[error("invalid options for {tag} constraint '{name}': {reason}")]
    InvalidFunctionOptions {
        tag: String,
        name: String,
        reason: String,
    },

    #[error(transparent)]
    DomainMismatch(Box<DomainMismatch>),

    #[error("non-finite {what} {value} in '{name}'")]
    InvalidCoefficient {
        name: String,
        what: &'static str,
        value: f64,
    },

    #[error("model validation failed with {count} violation(s):\n{0}", count = .0.len())]
    Validation(ValidationReport),
}

/// A general-constraint variable whose bounds miss the relation's domain.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error(
    "{tag} constraint '{name}': {role} variable '{variable}' with bounds [{lower}, {upper}] \
     cannot take values in {domain}"
)]
pub struct DomainMismatch {
    pub tag: String,
    pub name: String,
    /// `"input"` or `"output"`.
    pub role: &'static str,
    pub variable: String,
    pub lower: f64,
    pub upper: f64,
    pub domain: Domain,
}

/// Every violation found by [`Model::finalize`](super::Model::finalize).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationReport {
    violations: Vec<ModelError>,
}

impl ValidationReport {
    pub(crate) fn push(&mut self, violation: ModelError) {
        self.violations.push(violation);
    }

    /// The individual violations, in discovery order.
    pub fn violations(&self) -> &[ModelError] {
        &self.violations
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Whether any violation matches `predicate`.
    pub fn any<F: Fn(&ModelError) -> bool>(&self, predicate: F) -> bool {
        self.violations.iter().any(predicate)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  - {v}")?;
        }
        Ok(())
    }
}
