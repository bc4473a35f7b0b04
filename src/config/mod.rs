//! Solver configurations.
//!
//! A [`Configuration`] is an immutable map from parameter name to
//! [`ParamValue`]. A [`ParameterSchema`] declares what an engine accepts;
//! gateways validate every configuration against theirs before solving.
//! Configurations persist as plain-text parameter files (see
//! [`Configuration::to_prm`]).

mod configuration;
mod error;
mod prm;
mod schema;

pub use configuration::{Configuration, ConfigurationBuilder, ParamValue};
pub use error::ConfigurationError;
pub use schema::{ParamKind, ParameterSchema, ParameterSpec};

/// Wall-clock limit of a solve, in seconds.
pub const TIME_LIMIT: &str = "TimeLimit";
/// Random seed of the engine.
pub const SEED: &str = "Seed";
/// Default piece count of function approximations.
pub const FUNC_PIECES: &str = "FuncPieces";
/// Default maximum error of function approximations.
pub const FUNC_PIECE_ERROR: &str = "FuncPieceError";
