//! Solver gateway contract and results.
//!
//! A [`SolverGateway`] is the only way a model reaches a solving engine.
//! The numerical work happens behind it; this crate defines the request
//! ([`FrozenModel`](crate::model::FrozenModel) plus
//! [`Configuration`](crate::config::Configuration)) and the response
//! ([`Solution`] or [`SolveError`]).
//!
//! [`GridScanGateway`] is a small reference implementation for models
//! with at most two free variables.

mod gateway;
mod scan;
mod solution;

pub use gateway::{FailureKind, SolveError, SolveFailure, SolverGateway};
pub use scan::{GridScanGateway, SCAN_POINTS};
pub use solution::{Solution, SolveStatus};
