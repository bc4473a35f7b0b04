//! Parameter tuning.
//!
//! A [`TuningOrchestrator`] solves one frozen model under a baseline
//! configuration and a set of generated candidates, scores each run and
//! retains the best. Solving goes through a
//! [`SolverGateway`](crate::solver::SolverGateway), so any engine can be
//! tuned.
//!
//! Ranking is feasible first, then objective in the model's direction,
//! then mean runtime. The baseline is always kept at rank 0.

mod candidates;
mod config;
mod error;
mod runner;
mod types;

pub use candidates::{CandidateGenerator, FixedCandidates, RandomCandidates};
pub use config::TuneConfig;
pub use error::TuneError;
pub use runner::TuningOrchestrator;
pub use types::{CandidateFailure, Score, TuneState, TuningEntry, TuningResult};
