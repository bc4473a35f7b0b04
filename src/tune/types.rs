//! Tuning states, scores and results.

use super::error::TuneError;
use crate::config::Configuration;
use crate::solver::FailureKind;
use std::cmp::Ordering;
use std::path::Path;
use std::time::Duration;

/// Lifecycle of a tuning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TuneState {
    #[default]
    Idle,
    Running,
    Completed,
    /// No candidate produced a solution.
    Aborted,
}

/// Quality of one candidate configuration.
///
/// Orders feasible before infeasible, then by direction-normalized
/// objective (lower first), then by runtime (shorter first). `Less` means
/// better.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Score {
    /// Every trial returned a solution.
    pub feasible: bool,
    /// Mean objective value over the successful trials.
    pub objective: f64,
    /// `objective` mapped so that lower is better.
    pub normalized_objective: f64,
    /// Mean runtime over the successful trials.
    pub runtime: Duration,
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .feasible
            .cmp(&self.feasible)
            .then_with(|| self.normalized_objective.total_cmp(&other.normalized_objective))
            .then_with(|| self.runtime.cmp(&other.runtime))
    }
}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Score {}

/// One retained configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TuningEntry {
    /// Position in the attempted sequence; 0 is the baseline.
    pub candidate: usize,
    pub configuration: Configuration,
    /// `None` only for a baseline that failed.
    pub score: Option<Score>,
}

/// A candidate that produced no solution.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CandidateFailure {
    pub candidate: usize,
    pub configuration: Configuration,
    /// Failure category of the last attempt, `None` for rejected
    /// configurations and model errors.
    pub kind: Option<FailureKind>,
    pub message: String,
    /// Solves submitted, retries included.
    pub attempts: usize,
}

/// Ranked outcome of a tuning run.
///
/// Entry 0 is always the baseline. Entries 1.. are the candidates that
/// produced a solution, best first; the best may be the baseline again.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TuningResult {
    pub(crate) entries: Vec<TuningEntry>,
    pub(crate) failures: Vec<CandidateFailure>,
    pub(crate) attempted: usize,
    pub(crate) skipped: usize,
}

impl TuningResult {
    /// Retained entries: baseline, then ranked.
    pub fn entries(&self) -> &[TuningEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn baseline(&self) -> Option<&TuningEntry> {
        self.entries.first()
    }

    /// Best candidate found, if any produced a solution.
    pub fn best(&self) -> Option<&TuningEntry> {
        self.entries.get(1)
    }

    /// Candidates that failed, in attempt order.
    pub fn failures(&self) -> &[CandidateFailure] {
        &self.failures
    }

    /// Number of candidates solved, baseline included.
    pub fn attempted(&self) -> usize {
        self.attempted
    }

    /// Candidates left out because the tuning time limit was reached.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Configuration at `rank`: 0 is the baseline, 1 the best.
    pub fn configuration(&self, rank: usize) -> Result<&Configuration, TuneError> {
        self.entries
            .get(rank)
            .map(|e| &e.configuration)
            .ok_or(TuneError::IndexOutOfRange {
                rank,
                retained: self.entries.len(),
            })
    }

    /// Writes the best configuration as a parameter file.
    ///
    /// The file holds the candidate as generated. Overrides applied per
    /// solve, such as [`TuneConfig::candidate_time_limit`] and trial seeds,
    /// are not part of it.
    ///
    /// [`TuneConfig::candidate_time_limit`]: super::TuneConfig::candidate_time_limit
    pub fn write_best(&self, path: impl AsRef<Path>) -> Result<(), TuneError> {
        self.configuration(1)?.write_prm_file(path)?;
        Ok(())
    }
}
