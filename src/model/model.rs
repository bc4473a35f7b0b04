//! Model builder.

use super::data::ModelData;
use super::error::{DomainMismatch, Entity, ModelError, ValidationReport};
use super::expr::LinearExpr;
use super::frozen::FrozenModel;
use super::types::{
    Constraint, ConstraintId, GenConstrId, GeneralConstraint, ModelPolicy, Objective,
    ObjectiveSense, PolicyFlag, Relation,
};
use super::variables::{ModelId, Var, VarKind, VariableData};
use crate::config::Configuration;
use crate::registry::{
    ConstraintRegistry, Domains, FunctionOptions, NonlinearHandling, RelationTag,
};
use crate::solver::{Solution, SolveError, SolverGateway};
use std::sync::Arc;

/// The configuration and solution of the most recent solve.
#[derive(Debug, Clone)]
pub struct SolveRecord {
    pub configuration: Configuration,
    pub solution: Solution,
}

/// An optimization model under construction.
///
/// Holds variables, linear constraints, general (function) constraints,
/// an objective and model-wide policy. Construction errors are returned
/// immediately; [`finalize`](Model::finalize) re-checks global invariants
/// and produces an immutable [`FrozenModel`] for the solver gateway.
///
/// # Examples
///
/// ```
/// use u_optmodel::model::{Model, ObjectiveSense, Relation, VarKind};
///
/// let mut m = Model::new("funcnonlinear");
/// let x = m.add_variable(-1.0, 4.0, VarKind::Continuous, "x").unwrap();
/// let twox = m.add_variable(-2.0, 8.0, VarKind::Continuous, "twox").unwrap();
/// let sinx = m.add_variable(-1.0, 1.0, VarKind::Continuous, "sinx").unwrap();
/// let cos2x = m.add_variable(-1.0, 1.0, VarKind::Continuous, "cos2x").unwrap();
/// let expx = m.add_variable(0.0, f64::INFINITY, VarKind::Continuous, "expx").unwrap();
///
/// m.set_objective(sinx + cos2x + 1.0, ObjectiveSense::Minimize);
/// m.add_constraint(0.25 * expx - x, Relation::LessEqual, 0.0, "l1").unwrap();
/// m.add_constraint(2.0 * x - twox, Relation::Equal, 0.0, "l2").unwrap();
/// m.add_gen_constr_sin(x, sinx, "gcf1").unwrap();
/// m.add_gen_constr_cos(twox, cos2x, "gcf2").unwrap();
/// m.add_gen_constr_exp(x, expx, "gcf3").unwrap();
///
/// let frozen = m.finalize().unwrap();
/// assert_eq!(frozen.general_constraints().len(), 3);
/// ```
#[derive(Debug)]
pub struct Model {
    data: Arc<ModelData>,
    registry: Arc<ConstraintRegistry>,
    record: Option<SolveRecord>,
}

impl Model {
    /// Creates an empty model using the built-in relation registry.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_registry(name, Arc::new(ConstraintRegistry::builtin()))
    }

    /// Creates an empty model validating general constraints against
    /// `registry`.
    pub fn with_registry(name: impl Into<String>, registry: Arc<ConstraintRegistry>) -> Self {
        let data = ModelData::new(name.into());
        tracing::debug!(
            component = "model",
            operation = "new",
            model = %data.id,
            name = %data.name,
            "Created model"
        );
        Self {
            data: Arc::new(data),
            registry,
            record: None,
        }
    }

    pub fn id(&self) -> ModelId {
        self.data.id
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    /// Read access to the current structure.
    pub fn data(&self) -> &ModelData {
        &self.data
    }

    pub fn registry(&self) -> &ConstraintRegistry {
        &self.registry
    }

    pub fn variable(&self, var: Var) -> Option<&VariableData> {
        self.data.variable(var)
    }

    pub fn var_by_name(&self, name: &str) -> Option<Var> {
        self.data.var_by_name(name)
    }

    pub fn num_vars(&self) -> usize {
        self.data.num_vars()
    }

    /// Mutable structure; any change discards the cached solve record.
    fn touch(&mut self) -> &mut ModelData {
        self.record = None;
        Arc::make_mut(&mut self.data)
    }

    fn check_var(&self, var: Var, context: impl FnOnce() -> String) -> Result<(), ModelError> {
        if var.model != self.data.id {
            return Err(ModelError::ForeignVariable {
                context: context(),
                owner: var.model,
                model: self.data.id,
                index: var.index,
            });
        }
        if var.index >= self.data.variables.len() {
            return Err(ModelError::UnknownHandle {
                entity: Entity::Variable,
                model: self.data.id,
                index: var.index,
            });
        }
        Ok(())
    }

    fn expr_problems(&self, expr: &LinearExpr, owner: &str) -> Vec<ModelError> {
        let mut problems = Vec::new();
        for (var, coef) in expr.terms() {
            if let Err(e) = self.check_var(var, || owner.to_string()) {
                problems.push(e);
            }
            if !coef.is_finite() {
                problems.push(ModelError::InvalidCoefficient {
                    name: owner.to_string(),
                    what: "coefficient",
                    value: coef,
                });
            }
        }
        if !expr.constant().is_finite() {
            problems.push(ModelError::InvalidCoefficient {
                name: owner.to_string(),
                what: "constant",
                value: expr.constant(),
            });
        }
        problems
    }

    /// Adds a variable.
    ///
    /// # Errors
    ///
    /// - [`ModelError::InvalidBounds`] if `lower > upper`, a bound is NaN,
    ///   or the bounds do not suit `kind`.
    /// - [`ModelError::DuplicateName`] if `name` is already used.
    pub fn add_variable(
        &mut self,
        lower: f64,
        upper: f64,
        kind: VarKind,
        name: impl Into<String>,
    ) -> Result<Var, ModelError> {
        let name = name.into();
        let data = VariableData {
            name,
            lower,
            upper,
            kind,
        };
        if let Some(reason) = data.bounds_problem() {
            return Err(ModelError::InvalidBounds {
                name: data.name,
                lower,
                upper,
                reason,
            });
        }
        if self.data.var_names.contains_key(&data.name) {
            return Err(ModelError::DuplicateName {
                entity: Entity::Variable,
                name: data.name,
            });
        }

        let model = self.data.id;
        let state = self.touch();
        let index = state.variables.len();
        state.var_names.insert(data.name.clone(), index);
        tracing::debug!(
            component = "model",
            operation = "add_variable",
            status = "success",
            model = %model,
            var = %data.name,
            lower,
            upper,
            kind = ?kind,
            "Added variable to model"
        );
        state.variables.push(data);
        Ok(Var { model, index })
    }

    /// Tightens the bounds of `var` to the intersection of its current
    /// bounds and `[lower, upper]`.
    ///
    /// # Errors
    ///
    /// [`ModelError::InvalidBounds`] if the intersection is empty or a
    /// bound is NaN; handle errors for foreign or unknown variables.
    pub fn tighten_bounds(&mut self, var: Var, lower: f64, upper: f64) -> Result<(), ModelError> {
        self.check_var(var, || "tighten_bounds".to_string())?;
        let current = &self.data.variables[var.index];
        let candidate = VariableData {
            lower: if lower.is_nan() {
                lower
            } else {
                current.lower.max(lower)
            },
            upper: if upper.is_nan() {
                upper
            } else {
                current.upper.min(upper)
            },
            ..current.clone()
        };
        if let Some(reason) = candidate.bounds_problem() {
            return Err(ModelError::InvalidBounds {
                name: candidate.name,
                lower: candidate.lower,
                upper: candidate.upper,
                reason,
            });
        }
        tracing::debug!(
            component = "model",
            operation = "tighten_bounds",
            status = "success",
            var = %candidate.name,
            lower = candidate.lower,
            upper = candidate.upper,
            "Tightened variable bounds"
        );
        self.touch().variables[var.index] = candidate;
        Ok(())
    }

    /// Adds the linear constraint `expr (relation) rhs`.
    ///
    /// # Errors
    ///
    /// - [`ModelError::ForeignVariable`] if `expr` references a variable of
    ///   another model.
    /// - [`ModelError::DuplicateName`] if a constraint is already named
    ///   `name`.
    /// - [`ModelError::InvalidCoefficient`] for non-finite coefficients,
    ///   constant or right-hand side.
    pub fn add_constraint(
        &mut self,
        expr: impl Into<LinearExpr>,
        relation: Relation,
        rhs: f64,
        name: impl Into<String>,
    ) -> Result<ConstraintId, ModelError> {
        let expr = expr.into();
        let name = name.into();
        if let Some(e) = self
            .expr_problems(&expr, &format!("constraint '{name}'"))
            .into_iter()
            .next()
        {
            return Err(e);
        }
        if !rhs.is_finite() {
            return Err(ModelError::InvalidCoefficient {
                name,
                what: "right-hand side",
                value: rhs,
            });
        }
        if self.data.constraint_names.contains_key(&name) {
            return Err(ModelError::DuplicateName {
                entity: Entity::Constraint,
                name,
            });
        }

        let model = self.data.id;
        let state = self.touch();
        let index = state.constraints.len();
        tracing::debug!(
            component = "model",
            operation = "add_constraint",
            status = "success",
            model = %model,
            constraint = %name,
            terms = expr.len(),
            relation = relation.symbol(),
            rhs,
            "Added linear constraint"
        );
        state.constraint_names.insert(name.clone(), index);
        state.constraints.push(Constraint {
            name,
            expr,
            relation,
            rhs,
        });
        Ok(ConstraintId { model, index })
    }

    /// Adds the general constraint `output = f(input)` where `f` is the
    /// relation registered under `tag`.
    ///
    /// # Errors
    ///
    /// - [`ModelError::UnsupportedRelation`] if `tag` is not registered.
    /// - [`ModelError::ForeignVariable`] for variables of another model.
    /// - [`ModelError::InvalidFunctionOptions`] if required options are
    ///   missing or approximation controls are out of range.
    /// - [`ModelError::DomainMismatch`] if a variable's bounds leave no
    ///   room for the relation's domain.
    /// - [`ModelError::DuplicateName`] on a reused name.
    pub fn add_general_constraint(
        &mut self,
        tag: impl Into<RelationTag>,
        input: Var,
        output: Var,
        name: impl Into<String>,
        options: FunctionOptions,
    ) -> Result<GenConstrId, ModelError> {
        let tag = tag.into();
        let name = name.into();
        let spec = self
            .registry
            .get(&tag)
            .ok_or_else(|| ModelError::UnsupportedRelation {
                tag: tag.to_string(),
            })?;
        let context = || format!("general constraint '{name}'");
        self.check_var(input, context)?;
        self.check_var(output, context)?;

        let invalid = |reason: String| ModelError::InvalidFunctionOptions {
            tag: tag.to_string(),
            name: name.clone(),
            reason,
        };
        options.validate().map_err(invalid)?;
        spec.requirement.check(&options).map_err(invalid)?;

        let gc = GeneralConstraint {
            name,
            relation: tag,
            input,
            output,
            options,
        };
        if let Some(e) = domain_problems(&self.data, &gc, (spec.domains)(&gc.options))
            .into_iter()
            .next()
        {
            return Err(e);
        }
        if self.data.general_names.contains_key(&gc.name) {
            return Err(ModelError::DuplicateName {
                entity: Entity::GeneralConstraint,
                name: gc.name,
            });
        }

        let model = self.data.id;
        let state = self.touch();
        let index = state.general.len();
        tracing::debug!(
            component = "model",
            operation = "add_general_constraint",
            status = "success",
            model = %model,
            constraint = %gc.name,
            relation = %gc.relation,
            handling = ?gc.options.handling,
            "Added general constraint"
        );
        state.general_names.insert(gc.name.clone(), index);
        state.general.push(gc);
        Ok(GenConstrId { model, index })
    }

    /// `output = sin(input)`
    pub fn add_gen_constr_sin(
        &mut self,
        input: Var,
        output: Var,
        name: impl Into<String>,
    ) -> Result<GenConstrId, ModelError> {
        self.add_general_constraint(RelationTag::SIN, input, output, name, FunctionOptions::default())
    }

    /// `output = cos(input)`
    pub fn add_gen_constr_cos(
        &mut self,
        input: Var,
        output: Var,
        name: impl Into<String>,
    ) -> Result<GenConstrId, ModelError> {
        self.add_general_constraint(RelationTag::COS, input, output, name, FunctionOptions::default())
    }

    /// `output = tan(input)`
    pub fn add_gen_constr_tan(
        &mut self,
        input: Var,
        output: Var,
        name: impl Into<String>,
    ) -> Result<GenConstrId, ModelError> {
        self.add_general_constraint(RelationTag::TAN, input, output, name, FunctionOptions::default())
    }

    /// `output = exp(input)`
    pub fn add_gen_constr_exp(
        &mut self,
        input: Var,
        output: Var,
        name: impl Into<String>,
    ) -> Result<GenConstrId, ModelError> {
        self.add_general_constraint(RelationTag::EXP, input, output, name, FunctionOptions::default())
    }

    /// `output = base^input`
    pub fn add_gen_constr_expa(
        &mut self,
        input: Var,
        output: Var,
        base: f64,
        name: impl Into<String>,
    ) -> Result<GenConstrId, ModelError> {
        let options = FunctionOptions::default().with_base(base);
        self.add_general_constraint(RelationTag::EXPA, input, output, name, options)
    }

    /// `output = ln(input)`
    pub fn add_gen_constr_log(
        &mut self,
        input: Var,
        output: Var,
        name: impl Into<String>,
    ) -> Result<GenConstrId, ModelError> {
        self.add_general_constraint(RelationTag::LOG, input, output, name, FunctionOptions::default())
    }

    /// `output = log_base(input)`
    pub fn add_gen_constr_loga(
        &mut self,
        input: Var,
        output: Var,
        base: f64,
        name: impl Into<String>,
    ) -> Result<GenConstrId, ModelError> {
        let options = FunctionOptions::default().with_base(base);
        self.add_general_constraint(RelationTag::LOGA, input, output, name, options)
    }

    /// `output = input^exponent`
    pub fn add_gen_constr_pow(
        &mut self,
        input: Var,
        output: Var,
        exponent: f64,
        name: impl Into<String>,
    ) -> Result<GenConstrId, ModelError> {
        let options = FunctionOptions::default().with_exponent(exponent);
        self.add_general_constraint(RelationTag::POW, input, output, name, options)
    }

    /// `output = p(input)`, coefficients highest degree first.
    pub fn add_gen_constr_poly(
        &mut self,
        input: Var,
        output: Var,
        coefficients: Vec<f64>,
        name: impl Into<String>,
    ) -> Result<GenConstrId, ModelError> {
        let options = FunctionOptions::default().with_coefficients(coefficients);
        self.add_general_constraint(RelationTag::POLY, input, output, name, options)
    }

    /// `output = 1 / (1 + exp(-input))`
    pub fn add_gen_constr_logistic(
        &mut self,
        input: Var,
        output: Var,
        name: impl Into<String>,
    ) -> Result<GenConstrId, ModelError> {
        self.add_general_constraint(
            RelationTag::LOGISTIC,
            input,
            output,
            name,
            FunctionOptions::default(),
        )
    }

    /// `output = |input|`
    pub fn add_gen_constr_abs(
        &mut self,
        input: Var,
        output: Var,
        name: impl Into<String>,
    ) -> Result<GenConstrId, ModelError> {
        self.add_general_constraint(RelationTag::ABS, input, output, name, FunctionOptions::default())
    }

    /// Sets the nonlinear handling override of one general constraint.
    pub fn set_general_handling(
        &mut self,
        id: GenConstrId,
        handling: NonlinearHandling,
    ) -> Result<(), ModelError> {
        if id.model != self.data.id || id.index >= self.data.general.len() {
            return Err(ModelError::UnknownHandle {
                entity: Entity::GeneralConstraint,
                model: self.data.id,
                index: id.index,
            });
        }
        let gc = &mut self.touch().general[id.index];
        gc.options.handling = handling;
        tracing::debug!(
            component = "model",
            operation = "set_general_handling",
            constraint = %gc.name,
            handling = ?handling,
            "Set general constraint handling"
        );
        Ok(())
    }

    /// Effective handling of a general constraint (`true` = nonlinear):
    /// the constraint's override if set, otherwise the model policy.
    pub fn effective_handling(&self, id: GenConstrId) -> Option<bool> {
        self.data
            .general_constraint(id)
            .map(|gc| self.data.is_nonlinear(gc))
    }

    /// Replaces the objective. References are checked by
    /// [`finalize`](Model::finalize).
    pub fn set_objective(&mut self, expr: impl Into<LinearExpr>, sense: ObjectiveSense) {
        let expr = expr.into();
        tracing::debug!(
            component = "model",
            operation = "set_objective",
            sense = ?sense,
            terms = expr.len(),
            "Set objective function"
        );
        self.touch().objective = Objective { expr, sense };
    }

    /// Sets a model-wide policy flag.
    pub fn set_policy(&mut self, flag: PolicyFlag, value: bool) {
        tracing::debug!(
            component = "model",
            operation = "set_policy",
            flag = ?flag,
            value,
            "Set model policy"
        );
        self.touch().policy.set(flag, value);
    }

    pub fn policy(&self) -> ModelPolicy {
        self.data.policy
    }

    /// Validates the whole model and returns an immutable snapshot.
    ///
    /// # Errors
    ///
    /// [`ModelError::Validation`] listing every violation found:
    /// dangling or foreign variable references, unusable bounds, and
    /// general constraints whose variables no longer meet the relation's
    /// domain after bound tightening.
    pub fn finalize(&self) -> Result<FrozenModel, ModelError> {
        let mut report = ValidationReport::default();
        let data = &*self.data;

        for v in &data.variables {
            if let Some(reason) = v.bounds_problem() {
                report.push(ModelError::InvalidBounds {
                    name: v.name.clone(),
                    lower: v.lower,
                    upper: v.upper,
                    reason,
                });
            }
        }
        for problem in self.expr_problems(&data.objective.expr, "objective") {
            report.push(problem);
        }
        for c in &data.constraints {
            for problem in self.expr_problems(&c.expr, &format!("constraint '{}'", c.name)) {
                report.push(problem);
            }
        }
        for gc in &data.general {
            let context = || format!("general constraint '{}'", gc.name);
            let mut refs_ok = true;
            for var in [gc.input, gc.output] {
                if let Err(e) = self.check_var(var, context) {
                    report.push(e);
                    refs_ok = false;
                }
            }
            match self.registry.get(&gc.relation) {
                Some(spec) if refs_ok => {
                    for problem in domain_problems(data, gc, (spec.domains)(&gc.options)) {
                        report.push(problem);
                    }
                }
                Some(_) => {}
                None => report.push(ModelError::UnsupportedRelation {
                    tag: gc.relation.to_string(),
                }),
            }
        }

        if !report.is_empty() {
            tracing::debug!(
                component = "model",
                operation = "finalize",
                status = "failed",
                model = %data.id,
                violations = report.len(),
                "Model validation failed"
            );
            return Err(ModelError::Validation(report));
        }

        tracing::debug!(
            component = "model",
            operation = "finalize",
            status = "success",
            model = %data.id,
            vars = data.variables.len(),
            constraints = data.constraints.len(),
            general_constraints = data.general.len(),
            "Froze model"
        );
        Ok(FrozenModel::new(
            Arc::clone(&self.data),
            Arc::clone(&self.registry),
        ))
    }

    /// Discards the cached solve record, keeping structure and policy.
    pub fn reset(&mut self) {
        if self.record.take().is_some() {
            tracing::debug!(
                component = "model",
                operation = "reset",
                model = %self.data.id,
                "Discarded solve state"
            );
        }
    }

    /// Finalizes the model, submits it to `gateway` and caches the result.
    ///
    /// A failed solve leaves no cached record.
    pub fn solve<G: SolverGateway + ?Sized>(
        &mut self,
        gateway: &G,
        configuration: &Configuration,
    ) -> Result<&Solution, SolveError> {
        self.record = None;
        let frozen = self.finalize()?;
        let solution = gateway.submit(&frozen, configuration)?;
        let record = self.record.insert(SolveRecord {
            configuration: configuration.clone(),
            solution,
        });
        Ok(&record.solution)
    }

    /// Solution of the most recent successful solve, if not reset since.
    pub fn last_solution(&self) -> Option<&Solution> {
        self.record.as_ref().map(|r| &r.solution)
    }

    pub fn solve_record(&self) -> Option<&SolveRecord> {
        self.record.as_ref()
    }
}

/// Checks the bounds of `gc`'s variables against the relation domains.
fn domain_problems(data: &ModelData, gc: &GeneralConstraint, domains: Domains) -> Vec<ModelError> {
    let mut problems = Vec::new();
    for (role, var, domain) in [
        ("input", gc.input, domains.input),
        ("output", gc.output, domains.output),
    ] {
        let Some(v) = data.variable(var) else {
            continue;
        };
        if !domain.intersects(v.lower, v.upper) {
            problems.push(ModelError::DomainMismatch(Box::new(DomainMismatch {
                tag: gc.relation.to_string(),
                name: gc.name.clone(),
                role,
                variable: v.name.clone(),
                lower: v.lower,
                upper: v.upper,
                domain,
            })));
        }
    }
    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn continuous(m: &mut Model, lower: f64, upper: f64, name: &str) -> Var {
        m.add_variable(lower, upper, VarKind::Continuous, name).unwrap()
    }

    #[test]
    fn test_add_variable_reads_back() {
        let mut m = Model::new("test");
        let x = continuous(&mut m, -1.0, 4.0, "x");
        let v = m.variable(x).unwrap();
        assert_eq!(v.name, "x");
        assert_eq!(v.lower, -1.0);
        assert_eq!(v.upper, 4.0);
        assert_eq!(v.kind, VarKind::Continuous);
        assert_eq!(m.var_by_name("x"), Some(x));
    }

    #[test]
    fn test_invalid_bounds() {
        let mut m = Model::new("test");
        let err = m
            .add_variable(2.0, 1.0, VarKind::Continuous, "x")
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidBounds { ref name, .. } if name == "x"));
        assert!(m
            .add_variable(f64::NAN, 1.0, VarKind::Continuous, "y")
            .is_err());
        assert!(m.add_variable(0.0, 3.0, VarKind::Binary, "b").is_err());
        assert_eq!(m.num_vars(), 0);
    }

    #[test]
    fn test_duplicate_variable_name() {
        let mut m = Model::new("test");
        continuous(&mut m, 0.0, 1.0, "x");
        let err = m
            .add_variable(0.0, 2.0, VarKind::Integer, "x")
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicateName {
                entity: Entity::Variable,
                name: "x".into()
            }
        );
    }

    #[test]
    fn test_foreign_variable_in_constraint() {
        let mut a = Model::new("a");
        let mut b = Model::new("b");
        let xa = continuous(&mut a, 0.0, 1.0, "x");
        let xb = continuous(&mut b, 0.0, 1.0, "x");

        let err = a
            .add_constraint(xa + xb, Relation::LessEqual, 1.0, "c")
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::ForeignVariable { owner, model, .. } if owner == b.id() && model == a.id()
        ));
        assert!(a.data().constraints().is_empty());
    }

    #[test]
    fn test_foreign_variable_in_objective_fails_finalize() {
        let mut a = Model::new("a");
        let mut b = Model::new("b");
        continuous(&mut a, 0.0, 1.0, "x");
        let xb = continuous(&mut b, 0.0, 1.0, "y");

        a.set_objective(2.0 * xb, ObjectiveSense::Minimize);
        let ModelError::Validation(report) = a.finalize().unwrap_err() else {
            panic!("expected validation error");
        };
        assert!(report.any(|e| matches!(e, ModelError::ForeignVariable { .. })));
    }

    #[test]
    fn test_foreign_variable_in_general_constraint() {
        let mut a = Model::new("a");
        let mut b = Model::new("b");
        let x = continuous(&mut a, 0.0, 1.0, "x");
        let y = continuous(&mut b, -1.0, 1.0, "y");
        let err = a.add_gen_constr_sin(x, y, "g").unwrap_err();
        assert!(matches!(err, ModelError::ForeignVariable { .. }));
    }

    #[test]
    fn test_unsupported_relation() {
        let mut m = Model::new("test");
        let x = continuous(&mut m, 0.0, 1.0, "x");
        let y = continuous(&mut m, 0.0, 1.0, "y");
        let err = m
            .add_general_constraint("SINH", x, y, "g", FunctionOptions::default())
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::UnsupportedRelation {
                tag: "SINH".into()
            }
        );
    }

    #[test]
    fn test_tag_lookup_is_case_insensitive() {
        let mut m = Model::new("test");
        let x = continuous(&mut m, 0.0, 1.0, "x");
        let y = continuous(&mut m, -1.0, 1.0, "y");
        let id = m
            .add_general_constraint("sin", x, y, "g", FunctionOptions::default())
            .unwrap();
        assert_eq!(
            m.data().general_constraint(id).unwrap().relation,
            RelationTag::SIN
        );
    }

    #[test]
    fn test_missing_function_options() {
        let mut m = Model::new("test");
        let x = continuous(&mut m, 0.0, 1.0, "x");
        let y = continuous(&mut m, 0.0, 1.0, "y");
        let err = m
            .add_general_constraint(RelationTag::POW, x, y, "g", FunctionOptions::default())
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidFunctionOptions { ref reason, .. } if reason.contains("exponent")));
        assert!(m.add_gen_constr_pow(x, y, 2.0, "g").is_ok());
    }

    #[test]
    fn test_domain_mismatch() {
        let mut m = Model::new("test");
        let x = continuous(&mut m, -5.0, 0.0, "x");
        let y = continuous(&mut m, -5.0, -1.0, "y");
        let err = m.add_gen_constr_exp(x, y, "g").unwrap_err();
        assert!(matches!(&err, ModelError::DomainMismatch(d) if d.role == "output"));

        let err = m.add_gen_constr_log(x, y, "g").unwrap_err();
        assert!(matches!(&err, ModelError::DomainMismatch(d) if d.role == "input"));
    }

    #[test]
    fn test_tighten_bounds() {
        let mut m = Model::new("test");
        let x = continuous(&mut m, -1.0, 4.0, "x");
        m.tighten_bounds(x, 0.0, 10.0).unwrap();
        let v = m.variable(x).unwrap();
        assert_eq!((v.lower, v.upper), (0.0, 4.0));

        let err = m.tighten_bounds(x, 5.0, 6.0).unwrap_err();
        assert!(matches!(err, ModelError::InvalidBounds { .. }));
        // failed tightening leaves bounds untouched
        let v = m.variable(x).unwrap();
        assert_eq!((v.lower, v.upper), (0.0, 4.0));
    }

    #[test]
    fn test_finalize_reports_all_violations() {
        let mut a = Model::new("a");
        let mut b = Model::new("b");
        let x = continuous(&mut a, 0.0, 2.0, "x");
        let y = continuous(&mut a, -10.0, 10.0, "y");
        let z = continuous(&mut a, 0.0, 10.0, "z");
        a.add_gen_constr_log(x, y, "glog").unwrap();
        a.add_gen_constr_abs(y, z, "gabs").unwrap();
        let foreign = continuous(&mut b, 0.0, 1.0, "w");
        a.set_objective(x + foreign, ObjectiveSense::Minimize);

        // Tightening keeps each variable's bounds valid but breaks LOG's
        // input domain.
        a.tighten_bounds(x, f64::NEG_INFINITY, 0.0).unwrap();

        let ModelError::Validation(report) = a.finalize().unwrap_err() else {
            panic!("expected validation error");
        };
        assert_eq!(report.len(), 2);
        assert!(report.any(|e| matches!(e, ModelError::ForeignVariable { .. })));
        assert!(report.any(|e| matches!(e, ModelError::DomainMismatch(_))));
    }

    #[test]
    fn test_policy_precedence() {
        let mut m = Model::new("test");
        let x = continuous(&mut m, 0.0, 1.0, "x");
        let s = continuous(&mut m, -1.0, 1.0, "s");
        let c = continuous(&mut m, -1.0, 1.0, "c");
        let gs = m.add_gen_constr_sin(x, s, "gs").unwrap();
        let gc = m.add_gen_constr_cos(x, c, "gc").unwrap();

        assert_eq!(m.effective_handling(gs), Some(false));
        m.set_policy(PolicyFlag::FuncNonlinear, true);
        assert_eq!(m.effective_handling(gs), Some(true));

        m.set_general_handling(gc, NonlinearHandling::PiecewiseLinear)
            .unwrap();
        assert_eq!(m.effective_handling(gc), Some(false));
        assert_eq!(m.effective_handling(gs), Some(true));

        m.set_policy(PolicyFlag::FuncNonlinear, false);
        m.set_general_handling(gs, NonlinearHandling::Nonlinear)
            .unwrap();
        assert_eq!(m.effective_handling(gs), Some(true));
    }

    #[test]
    fn test_frozen_snapshot_is_immutable() {
        let mut m = Model::new("test");
        let x = continuous(&mut m, 0.0, 1.0, "x");
        let frozen = m.finalize().unwrap();

        continuous(&mut m, 0.0, 1.0, "y");
        m.tighten_bounds(x, 0.5, 1.0).unwrap();

        assert_eq!(frozen.num_vars(), 1);
        assert_eq!(frozen.variable(x).unwrap().lower, 0.0);
        assert_eq!(m.num_vars(), 2);
    }

    #[test]
    fn test_objective_replaced() {
        let mut m = Model::new("test");
        let x = continuous(&mut m, 0.0, 1.0, "x");
        let y = continuous(&mut m, 0.0, 1.0, "y");
        m.set_objective(x + 1.0, ObjectiveSense::Minimize);
        m.set_objective(2.0 * y, ObjectiveSense::Maximize);
        let obj = m.data().objective();
        assert_eq!(obj.sense, ObjectiveSense::Maximize);
        assert_eq!(obj.expr.coefficient(x), 0.0);
        assert_eq!(obj.expr.coefficient(y), 2.0);
        assert_eq!(obj.expr.constant(), 0.0);
    }

    #[test]
    fn test_invalid_rhs() {
        let mut m = Model::new("test");
        let x = continuous(&mut m, 0.0, 1.0, "x");
        let err = m
            .add_constraint(x, Relation::LessEqual, f64::INFINITY, "c")
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidCoefficient { what: "right-hand side", .. }));
    }

    proptest! {
        #[test]
        fn prop_valid_bounds_read_back(a in -1e6f64..1e6, b in -1e6f64..1e6) {
            let (lower, upper) = if a <= b { (a, b) } else { (b, a) };
            let mut m = Model::new("prop");
            let x = m.add_variable(lower, upper, VarKind::Continuous, "x").unwrap();
            let v = m.variable(x).unwrap();
            prop_assert_eq!(v.lower, lower);
            prop_assert_eq!(v.upper, upper);
        }

        #[test]
        fn prop_inverted_bounds_rejected(a in -1e6f64..1e6, gap in 1e-3f64..1e3) {
            let mut m = Model::new("prop");
            let result = m.add_variable(a + gap, a, VarKind::Continuous, "x");
            let is_invalid_bounds = matches!(result, Err(ModelError::InvalidBounds { .. }));
            prop_assert!(is_invalid_bounds);
        }

        #[test]
        fn prop_duplicate_names_rejected(name in "[a-z][a-z0-9_]{0,8}") {
            let mut m = Model::new("prop");
            m.add_variable(0.0, 1.0, VarKind::Continuous, name.clone()).unwrap();
            let result = m.add_variable(-1.0, 2.0, VarKind::Continuous, name);
            let is_duplicate = matches!(result, Err(ModelError::DuplicateName { .. }));
            prop_assert!(is_duplicate);
        }
    }
}
