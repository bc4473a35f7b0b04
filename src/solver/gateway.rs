//! The contract between models and solving engines.

use super::solution::Solution;
use crate::config::{Configuration, ConfigurationError, ParameterSchema};
use crate::model::{FrozenModel, ModelError};
use std::fmt;

/// Category of a failed solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FailureKind {
    Infeasible,
    Unbounded,
    /// Time limit reached without any incumbent.
    TimedOut,
    /// The engine failed or cannot handle the model.
    EngineError,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureKind::Infeasible => "infeasible",
            FailureKind::Unbounded => "unbounded",
            FailureKind::TimedOut => "timed out",
            FailureKind::EngineError => "engine error",
        })
    }
}

/// A solve that produced no usable point.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct SolveFailure {
    pub kind: FailureKind,
    pub message: String,
    /// Whether resubmitting the same request may succeed.
    pub retryable: bool,
}

impl SolveFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn infeasible(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Infeasible, message)
    }

    pub fn engine(message: impl Into<String>) -> Self {
        Self::new(FailureKind::EngineError, message)
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }
}

/// Errors returned by [`SolverGateway::submit`].
#[derive(Debug, thiserror::Error)]
pub enum SolveError {
    #[error("configuration rejected: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("solve failed: {0}")]
    Failure(#[from] SolveFailure),
}

impl SolveError {
    /// Whether resubmitting may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SolveError::Failure(f) if f.retryable)
    }
}

/// A solving engine.
///
/// Implementors provide [`solve`](SolverGateway::solve); callers go through
/// [`submit`](SolverGateway::submit), which validates the configuration
/// against [`schema`](SolverGateway::schema) first. Only frozen models can
/// be submitted, so a model cannot change under an in-flight solve.
///
/// A returned [`Solution`] always carries a point: an optimal one, or the
/// best incumbent when the time limit was hit. Everything else is a
/// [`SolveFailure`].
pub trait SolverGateway: Send + Sync {
    /// Engine name for logs.
    fn name(&self) -> &str;

    /// Parameters the engine accepts.
    fn schema(&self) -> &ParameterSchema;

    /// Solves `model` under an already validated `configuration`.
    fn solve(
        &self,
        model: &FrozenModel,
        configuration: &Configuration,
    ) -> Result<Solution, SolveError>;

    /// How many solves may run at once, e.g. by licensing.
    fn max_concurrent_solves(&self) -> usize {
        1
    }

    /// Validates `configuration` and solves.
    ///
    /// # Errors
    ///
    /// - [`SolveError::Configuration`] for unknown parameters or invalid
    ///   values; the engine is not called.
    /// - [`SolveError::Failure`] when no point was found.
    fn submit(
        &self,
        model: &FrozenModel,
        configuration: &Configuration,
    ) -> Result<Solution, SolveError> {
        if let Err(e) = self.schema().validate(configuration) {
            tracing::debug!(
                component = "solver",
                operation = "submit",
                status = "rejected",
                gateway = self.name(),
                error = %e,
                "Configuration rejected"
            );
            return Err(e.into());
        }
        tracing::debug!(
            component = "solver",
            operation = "submit",
            gateway = self.name(),
            model = %model.id(),
            configuration = %configuration,
            "Submitting model"
        );
        let result = self.solve(model, configuration);
        match &result {
            Ok(solution) => tracing::info!(
                component = "solver",
                operation = "submit",
                status = "success",
                gateway = self.name(),
                model = %model.id(),
                solve_status = ?solution.status,
                objective = solution.objective_value,
                runtime_ms = solution.runtime.as_secs_f64() * 1e3,
                "Solve finished"
            ),
            Err(e) => tracing::info!(
                component = "solver",
                operation = "submit",
                status = "failed",
                gateway = self.name(),
                model = %model.id(),
                error = %e,
                "Solve failed"
            ),
        }
        result
    }
}
