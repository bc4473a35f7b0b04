//! Constraint, objective and policy types.

use super::expr::LinearExpr;
use super::variables::{ModelId, Var};
use crate::registry::{FunctionOptions, RelationTag};
use std::fmt;

/// Relational operator of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Relation {
    LessEqual,
    Equal,
    GreaterEqual,
}

impl Relation {
    pub fn symbol(self) -> &'static str {
        match self {
            Relation::LessEqual => "<=",
            Relation::Equal => "=",
            Relation::GreaterEqual => ">=",
        }
    }

    /// Amount by which `lhs (op) rhs` is violated; 0 when satisfied.
    pub fn violation(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Relation::LessEqual => (lhs - rhs).max(0.0),
            Relation::GreaterEqual => (rhs - lhs).max(0.0),
            Relation::Equal => (lhs - rhs).abs(),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Handle to a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintId {
    pub(crate) model: ModelId,
    pub(crate) index: usize,
}

impl ConstraintId {
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Handle to a general constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenConstrId {
    pub(crate) model: ModelId,
    pub(crate) index: usize,
}

impl GenConstrId {
    pub fn index(&self) -> usize {
        self.index
    }
}

/// A linear constraint `expr (op) rhs`.
///
/// The constant of `expr` is kept as given; [`Constraint::activity`]
/// includes it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Constraint {
    pub name: String,
    pub expr: LinearExpr,
    pub relation: Relation,
    pub rhs: f64,
}

impl Constraint {
    /// Left-hand side value under `value_of`.
    pub fn activity<F: Fn(Var) -> f64>(&self, value_of: F) -> f64 {
        self.expr.evaluate(value_of)
    }

    /// Violation amount under `value_of`; 0 when satisfied.
    pub fn violation<F: Fn(Var) -> f64>(&self, value_of: F) -> f64 {
        self.relation.violation(self.activity(value_of), self.rhs)
    }
}

/// A general (function) constraint `output = f(input)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneralConstraint {
    pub name: String,
    pub relation: RelationTag,
    pub input: Var,
    pub output: Var,
    pub options: FunctionOptions,
}

/// Optimization direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ObjectiveSense {
    #[default]
    Minimize,
    Maximize,
}

impl ObjectiveSense {
    /// Maps an objective value onto a "lower is better" scale.
    pub fn normalize(self, value: f64) -> f64 {
        match self {
            ObjectiveSense::Minimize => value,
            ObjectiveSense::Maximize => -value,
        }
    }

    /// Whether `candidate` improves on `incumbent`.
    pub fn is_better(self, candidate: f64, incumbent: f64) -> bool {
        self.normalize(candidate) < self.normalize(incumbent)
    }
}

/// Objective function: a linear expression and a direction.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Objective {
    pub expr: LinearExpr,
    pub sense: ObjectiveSense,
}

/// Model-wide policy flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PolicyFlag {
    /// Treat general constraints as true nonlinear functions unless a
    /// constraint overrides it.
    FuncNonlinear,
}

/// Values of the model-wide policy flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelPolicy {
    pub func_nonlinear: bool,
}

impl ModelPolicy {
    pub fn get(&self, flag: PolicyFlag) -> bool {
        match flag {
            PolicyFlag::FuncNonlinear => self.func_nonlinear,
        }
    }

    pub fn set(&mut self, flag: PolicyFlag, value: bool) {
        match flag {
            PolicyFlag::FuncNonlinear => self.func_nonlinear = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_violation() {
        assert_eq!(Relation::LessEqual.violation(1.0, 2.0), 0.0);
        assert_eq!(Relation::LessEqual.violation(3.0, 2.0), 1.0);
        assert_eq!(Relation::GreaterEqual.violation(1.0, 2.0), 1.0);
        assert_eq!(Relation::Equal.violation(1.5, 2.0), 0.5);
    }

    #[test]
    fn test_sense_normalization() {
        assert!(ObjectiveSense::Minimize.is_better(1.0, 2.0));
        assert!(ObjectiveSense::Maximize.is_better(2.0, 1.0));
        assert_eq!(ObjectiveSense::Maximize.normalize(3.0), -3.0);
    }

    #[test]
    fn test_policy_flags() {
        let mut policy = ModelPolicy::default();
        assert!(!policy.get(PolicyFlag::FuncNonlinear));
        policy.set(PolicyFlag::FuncNonlinear, true);
        assert!(policy.func_nonlinear);
    }
}
