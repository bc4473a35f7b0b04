//! Domain-agnostic optimization modeling layer.
//!
//! Builds mathematical programs and hands them to external solving
//! engines:
//!
//! - **Model**: typed decision variables, linear constraints, an
//!   objective, and general function constraints `y = f(x)` (sin, exp,
//!   log, pow, ...), each handled exactly or by piecewise-linear
//!   approximation.
//! - **Registry**: the table of supported relations with their domains,
//!   required options and closed-form evaluators.
//! - **Config**: typed solver parameters, schemas and parameter files.
//! - **Solver**: the [`SolverGateway`](solver::SolverGateway) contract
//!   between a frozen model and an engine, plus a grid-scan reference
//!   engine.
//! - **Tune**: repeated solves under candidate configurations, ranked by
//!   feasibility, objective and runtime.
//!
//! # Architecture
//!
//! The crate contains no numerical solver. A [`Model`](model::Model) is
//! mutable while it is built; [`Model::finalize`](model::Model::finalize)
//! validates it and yields an immutable
//! [`FrozenModel`](model::FrozenModel) snapshot that gateways and the
//! tuner share.

pub mod config;
pub mod model;
pub mod registry;
pub mod solver;
pub mod tune;
