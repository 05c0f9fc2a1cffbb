//! The grounded SAS⁺ task: variables, operators, axioms and the goal. This
//! module only models a task that has already been grounded; parsing a PDDL
//! or SAS file into this shape is outside the scope of this crate (see
//! [`TaskBuilder`] and the `fixture` submodule for the minimal construction
//! paths we do provide).

mod axioms;
mod builder;
mod fixture;
mod goal;
mod operator;
mod variable;

pub use axioms::{apply_axioms, compute_axiom_layers};
pub use builder::TaskBuilder;
pub use fixture::TaskFixture;
pub use goal::Goal;
pub use operator::{Effect, Operator, OperatorId};
pub use variable::{Fact, VarId, VarValue, Variable};

/// A fully grounded planning task.
#[derive(Debug, Clone)]
pub struct Task {
    pub variables: Vec<Variable>,
    pub operators: Vec<Operator>,
    pub axioms: Vec<Operator>,
    pub axiom_layers: Vec<usize>,
    pub goal: Goal,
    pub initial_state: Vec<VarValue>,
}

impl Task {
    pub fn domain_sizes(&self) -> Vec<usize> {
        self.variables.iter().map(|v| v.domain_size).collect()
    }

    pub fn has_non_unit_costs(&self) -> bool {
        self.operators.iter().any(|op| op.cost != 1)
    }

    pub fn operator(&self, id: OperatorId) -> &Operator {
        &self.operators[id]
    }

    /// Display name for a fact, falling back to a `var=value` rendering if
    /// the variable does not provide fact names.
    pub fn fact_name(&self, fact: Fact) -> String {
        let var = &self.variables[fact.var];
        var.fact_names
            .get(fact.value)
            .cloned()
            .unwrap_or_else(|| format!("var{}={}", fact.var, fact.value))
    }
}
