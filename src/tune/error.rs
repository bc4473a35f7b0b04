//! Tuning errors.

use crate::config::ConfigurationError;

/// Errors raised by a [`TuningOrchestrator`](super::TuningOrchestrator).
#[derive(Debug, thiserror::Error)]
pub enum TuneError {
    #[error("invalid tuning argument: {0}")]
    InvalidArgument(String),

    #[error("tuning aborted: all {attempted} attempted candidate(s) failed")]
    Aborted { attempted: usize },

    #[error("rank {rank} out of range, {retained} result(s) retained")]
    IndexOutOfRange { rank: usize, retained: usize },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}
