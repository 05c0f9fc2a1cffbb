use crate::error::PlannerError;
use crate::task::axioms::compute_axiom_layers;
use crate::task::{Goal, Operator, Task, VarValue, Variable};

/// Builds a [`Task`] from variables, operators, axioms, an initial state and
/// a goal. This is the only supported way to construct a task from within
/// this crate: grounding a PDDL/SAS problem file into this shape is the
/// responsibility of an external front end.
#[derive(Debug, Default)]
pub struct TaskBuilder {
    variables: Vec<Variable>,
    operators: Vec<Operator>,
    axioms: Vec<Operator>,
    initial_state: Vec<VarValue>,
    goal_facts: Vec<crate::task::Fact>,
}

impl TaskBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_variable(&mut self, variable: Variable, initial_value: VarValue) -> &mut Self {
        self.initial_state.push(initial_value);
        self.variables.push(variable);
        self
    }

    pub fn add_operator(&mut self, operator: Operator) -> &mut Self {
        self.operators.push(operator);
        self
    }

    pub fn add_axiom(&mut self, mut axiom: Operator) -> &mut Self {
        axiom.is_axiom = true;
        self.axioms.push(axiom);
        self
    }

    pub fn set_goal(&mut self, facts: Vec<crate::task::Fact>) -> &mut Self {
        self.goal_facts = facts;
        self
    }

    pub fn build(self) -> Result<Task, PlannerError> {
        if self.variables.is_empty() {
            return Err(PlannerError::InputError(
                "task must declare at least one variable".to_string(),
            ));
        }
        if self.initial_state.len() != self.variables.len() {
            return Err(PlannerError::InputError(
                "initial state must assign exactly one value per variable".to_string(),
            ));
        }
        for (var_index, &value) in self.initial_state.iter().enumerate() {
            if value >= self.variables[var_index].domain_size {
                return Err(PlannerError::InputError(format!(
                    "initial value {value} out of range for variable {var_index}"
                )));
            }
        }
        for fact in &self.goal_facts {
            validate_fact(&self.variables, *fact)?;
        }
        for operator in self.operators.iter().chain(self.axioms.iter()) {
            for fact in &operator.preconditions {
                validate_fact(&self.variables, *fact)?;
            }
            for effect in &operator.effects {
                for fact in &effect.conditions {
                    validate_fact(&self.variables, *fact)?;
                }
                validate_fact(&self.variables, effect.postcondition)?;
            }
            if operator.cost < 0 {
                return Err(PlannerError::InputError(format!(
                    "operator {} has negative cost",
                    operator.name
                )));
            }
        }

        let axiom_layers = compute_axiom_layers(&self.axioms);

        Ok(Task {
            variables: self.variables,
            operators: self.operators,
            axioms: self.axioms,
            axiom_layers,
            goal: Goal::new(self.goal_facts),
            initial_state: self.initial_state,
        })
    }
}

fn validate_fact(variables: &[Variable], fact: crate::task::Fact) -> Result<(), PlannerError> {
    let variable = variables.get(fact.var).ok_or_else(|| {
        PlannerError::InputError(format!("fact refers to unknown variable {}", fact.var))
    })?;
    if fact.value >= variable.domain_size {
        return Err(PlannerError::InputError(format!(
            "fact value {} out of range for variable {}",
            fact.value, fact.var
        )));
    }
    Ok(())
}
