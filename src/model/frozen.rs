//! Immutable model snapshots handed to solver gateways.

use super::data::ModelData;
use crate::registry::{ConsistencyViolation, ConstraintRegistry};
use crate::solver::Solution;
use std::ops::Deref;
use std::sync::Arc;

/// Reason a point fails to satisfy a frozen model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Infeasibility {
    #[error("solution has {actual} values, model has {expected} variables")]
    Dimension { expected: usize, actual: usize },

    #[error("variable '{variable}' = {value} violates its bounds or kind")]
    Bound { variable: String, value: f64 },

    #[error("constraint '{constraint}' violated by {violation}")]
    Linear { constraint: String, violation: f64 },

    #[error("general constraint '{}' off by {}", .0.constraint, .0.deviation)]
    General(ConsistencyViolation),
}

/// A validated, immutable view of a [`Model`](super::Model).
///
/// Cheap to clone; later edits to the originating model never show
/// through.
#[derive(Debug, Clone)]
pub struct FrozenModel {
    data: Arc<ModelData>,
    registry: Arc<ConstraintRegistry>,
}

impl FrozenModel {
    pub(crate) fn new(data: Arc<ModelData>, registry: Arc<ConstraintRegistry>) -> Self {
        Self { data, registry }
    }

    /// Registry the model was validated against.
    pub fn registry(&self) -> &ConstraintRegistry {
        &self.registry
    }

    /// Objective value at `values`, `None` on a dimension mismatch.
    pub fn objective_at(&self, values: &[f64]) -> Option<f64> {
        if values.len() != self.num_vars() {
            return None;
        }
        Some(self.objective().expr.evaluate(|v| values[v.index()]))
    }

    /// General constraints whose `y = f(x)` is not met by `solution`.
    pub fn check_solution(&self, solution: &Solution, tolerance: f64) -> Vec<ConsistencyViolation> {
        self.registry.check_solution(&self.data, solution, tolerance)
    }

    /// Checks bounds, linear constraints and general constraints at
    /// `values`, returning the first failure.
    pub fn check_feasibility(&self, values: &[f64], tolerance: f64) -> Result<(), Infeasibility> {
        if values.len() != self.num_vars() {
            return Err(Infeasibility::Dimension {
                expected: self.num_vars(),
                actual: values.len(),
            });
        }
        for (v, &value) in self.variables().iter().zip(values) {
            if !v.admits(value, tolerance) {
                return Err(Infeasibility::Bound {
                    variable: v.name.clone(),
                    value,
                });
            }
        }
        for c in self.constraints() {
            let violation = c.violation(|var| values[var.index()]);
            if violation > tolerance {
                return Err(Infeasibility::Linear {
                    constraint: c.name.clone(),
                    violation,
                });
            }
        }
        let probe = Solution::new(
            crate::solver::SolveStatus::Optimal,
            self.id(),
            values.to_vec(),
            None,
            std::time::Duration::ZERO,
        );
        match self.check_solution(&probe, tolerance).into_iter().next() {
            Some(v) => Err(Infeasibility::General(v)),
            None => Ok(()),
        }
    }
}

impl Deref for FrozenModel {
    type Target = ModelData;

    fn deref(&self) -> &ModelData {
        &self.data
    }
}
