//! Solve results.

use crate::model::{ModelId, Var};
use std::time::Duration;

/// Outcome of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolveStatus {
    /// Proven optimal within the engine's tolerances.
    Optimal,
    /// No feasible point exists.
    Infeasible,
    /// The objective is unbounded.
    Unbounded,
    /// Time limit reached. Values are the best incumbent, if any.
    TimedOut,
    /// The engine failed.
    Error,
}

/// Values returned by a solver gateway.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    /// Solver status.
    pub status: SolveStatus,
    /// Model the values belong to.
    pub model: ModelId,
    /// One value per variable, in variable order. Empty when no point was
    /// found.
    pub values: Vec<f64>,
    /// Objective value including its constant, if a point was found.
    pub objective_value: Option<f64>,
    /// Wall-clock solve time.
    pub runtime: Duration,
}

impl Solution {
    pub fn new(
        status: SolveStatus,
        model: ModelId,
        values: Vec<f64>,
        objective_value: Option<f64>,
        runtime: Duration,
    ) -> Self {
        Self {
            status,
            model,
            values,
            objective_value,
            runtime,
        }
    }

    /// A solution without values.
    pub fn empty(status: SolveStatus, model: ModelId) -> Self {
        Self::new(status, model, Vec::new(), None, Duration::ZERO)
    }

    /// Value of `var`; `None` for variables of another model or when no
    /// point was found.
    pub fn value(&self, var: Var) -> Option<f64> {
        if var.model_id() != self.model {
            return None;
        }
        self.values.get(var.index()).copied()
    }

    /// Whether the solution carries a point.
    pub fn is_solution_found(&self) -> bool {
        matches!(self.status, SolveStatus::Optimal | SolveStatus::TimedOut)
            && self.objective_value.is_some()
    }
}
