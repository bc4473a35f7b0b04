//! Structural data shared by [`Model`](super::Model) and
//! [`FrozenModel`](super::FrozenModel).

use super::types::{
    Constraint, ConstraintId, GenConstrId, GeneralConstraint, ModelPolicy, Objective,
};
use super::variables::{ModelId, Var, VariableData};
use std::collections::HashMap;

/// Variables, constraints, objective and policy of a model.
///
/// Read-only from the outside; a [`Model`](super::Model) mutates it
/// copy-on-write so outstanding frozen snapshots never change.
#[derive(Debug, Clone)]
pub struct ModelData {
    pub(crate) id: ModelId,
    pub(crate) name: String,
    pub(crate) variables: Vec<VariableData>,
    pub(crate) var_names: HashMap<String, usize>,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) constraint_names: HashMap<String, usize>,
    pub(crate) general: Vec<GeneralConstraint>,
    pub(crate) general_names: HashMap<String, usize>,
    pub(crate) objective: Objective,
    pub(crate) policy: ModelPolicy,
}

impl ModelData {
    pub(crate) fn new(name: String) -> Self {
        Self {
            id: ModelId::fresh(),
            name,
            variables: Vec::new(),
            var_names: HashMap::new(),
            constraints: Vec::new(),
            constraint_names: HashMap::new(),
            general: Vec::new(),
            general_names: HashMap::new(),
            objective: Objective::default(),
            policy: ModelPolicy::default(),
        }
    }

    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_vars(&self) -> usize {
        self.variables.len()
    }

    /// All variables, indexable by [`Var::index`].
    pub fn variables(&self) -> &[VariableData] {
        &self.variables
    }

    /// Whether `var` was issued by this model.
    pub fn owns(&self, var: Var) -> bool {
        var.model == self.id && var.index < self.variables.len()
    }

    /// Data of `var`, or `None` for a foreign handle.
    pub fn variable(&self, var: Var) -> Option<&VariableData> {
        if self.owns(var) {
            self.variables.get(var.index)
        } else {
            None
        }
    }

    /// Handle of the variable at `index`.
    pub fn var(&self, index: usize) -> Option<Var> {
        (index < self.variables.len()).then_some(Var {
            model: self.id,
            index,
        })
    }

    /// Handles of all variables, in creation order.
    pub fn vars(&self) -> impl Iterator<Item = Var> + '_ {
        (0..self.variables.len()).map(move |index| Var {
            model: self.id,
            index,
        })
    }

    pub fn var_by_name(&self, name: &str) -> Option<Var> {
        self.var_names.get(name).map(|&index| Var {
            model: self.id,
            index,
        })
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn constraint(&self, id: ConstraintId) -> Option<&Constraint> {
        if id.model == self.id {
            self.constraints.get(id.index)
        } else {
            None
        }
    }

    pub fn constraint_by_name(&self, name: &str) -> Option<&Constraint> {
        self.constraint_names
            .get(name)
            .map(|&i| &self.constraints[i])
    }

    pub fn general_constraints(&self) -> &[GeneralConstraint] {
        &self.general
    }

    pub fn general_constraint(&self, id: GenConstrId) -> Option<&GeneralConstraint> {
        if id.model == self.id {
            self.general.get(id.index)
        } else {
            None
        }
    }

    pub fn general_constraint_by_name(&self, name: &str) -> Option<&GeneralConstraint> {
        self.general_names.get(name).map(|&i| &self.general[i])
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn policy(&self) -> ModelPolicy {
        self.policy
    }

    /// Effective handling of `gc`: its own override if set, otherwise the
    /// model's `FuncNonlinear` policy. `true` means nonlinear.
    pub fn is_nonlinear(&self, gc: &GeneralConstraint) -> bool {
        gc.options.handling.resolve(self.policy.func_nonlinear)
    }
}
