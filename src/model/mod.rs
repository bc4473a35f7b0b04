//! Optimization model builder.
//!
//! A [`Model`] collects typed variables, linear constraints, general
//! (function) constraints such as `y = sin(x)`, and one linear objective.
//! Handles ([`Var`], [`ConstraintId`], [`GenConstrId`]) are tied to the
//! model that issued them; passing one to another model is an error.
//!
//! [`Model::finalize`] validates the whole model and returns a
//! [`FrozenModel`], the immutable form a
//! [`SolverGateway`](crate::solver::SolverGateway) consumes.
//!
//! # Nonlinear handling
//!
//! Each general constraint is either solved as a true nonlinear function
//! or replaced by a piecewise-linear approximation. The model-wide
//! [`PolicyFlag::FuncNonlinear`] gives the default; a constraint's
//! [`NonlinearHandling`](crate::registry::NonlinearHandling) other than
//! `Inherit` overrides it.

mod data;
mod error;
mod expr;
mod frozen;
mod loader;
#[allow(clippy::module_inception)]
mod model;
mod types;
mod variables;

pub use data::ModelData;
pub use error::{DomainMismatch, Entity, ModelError, ValidationReport};
pub use expr::LinearExpr;
pub use frozen::{FrozenModel, Infeasibility};
pub use loader::{LoadError, ModelLoader};
pub use model::{Model, SolveRecord};
pub use types::{
    Constraint, ConstraintId, GenConstrId, GeneralConstraint, ModelPolicy, Objective,
    ObjectiveSense, PolicyFlag, Relation,
};
pub use variables::{ModelId, Var, VarKind, VariableData};
