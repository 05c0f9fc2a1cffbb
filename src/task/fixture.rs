use crate::error::PlannerError;
use crate::task::{Effect, Fact, Operator, Task, TaskBuilder, VarValue, Variable};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A minimal, serde-derived on-disk representation of a [`Task`]. This is
/// not a general SAS/PDDL front end: it exists only to give the demonstration
/// binary and the integration tests something concrete to load without
/// writing a grounding pipeline, which is out of scope for this crate.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskFixture {
    pub variables: Vec<FixtureVariable>,
    pub operators: Vec<FixtureOperator>,
    #[serde(default)]
    pub axioms: Vec<FixtureOperator>,
    pub initial_state: Vec<VarValue>,
    pub goal: Vec<FixtureFact>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FixtureVariable {
    pub name: String,
    pub domain_size: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FixtureFact {
    pub var: usize,
    pub value: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FixtureEffect {
    #[serde(default)]
    pub conditions: Vec<FixtureFact>,
    pub postcondition: FixtureFact,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FixtureOperator {
    pub name: String,
    #[serde(default)]
    pub preconditions: Vec<FixtureFact>,
    pub effects: Vec<FixtureEffect>,
    #[serde(default = "default_cost")]
    pub cost: i32,
}

fn default_cost() -> i32 {
    1
}

impl From<FixtureFact> for Fact {
    fn from(f: FixtureFact) -> Self {
        Fact::new(f.var, f.value)
    }
}

impl TaskFixture {
    pub fn load(path: impl AsRef<Path>) -> Result<Task, PlannerError> {
        let text = std::fs::read_to_string(&path).map_err(|err| {
            PlannerError::InputError(format!(
                "could not read task fixture {}: {err}",
                path.as_ref().display()
            ))
        })?;
        let fixture: TaskFixture = serde_json::from_str(&text)
            .map_err(|err| PlannerError::InputError(format!("malformed task fixture: {err}")))?;
        fixture.into_task()
    }

    pub fn into_task(self) -> Result<Task, PlannerError> {
        let mut builder = TaskBuilder::new();
        for (index, variable) in self.variables.iter().enumerate() {
            let initial_value = *self.initial_state.get(index).ok_or_else(|| {
                PlannerError::InputError(format!("missing initial value for variable {index}"))
            })?;
            builder.add_variable(Variable::new(&variable.name, variable.domain_size), initial_value);
        }
        for operator in self.operators {
            builder.add_operator(convert_operator(operator, false));
        }
        for axiom in self.axioms {
            builder.add_axiom(convert_operator(axiom, true));
        }
        builder.set_goal(self.goal.into_iter().map(Fact::from).collect());
        builder.build()
    }
}

fn convert_operator(operator: FixtureOperator, is_axiom: bool) -> Operator {
    let preconditions = operator.preconditions.into_iter().map(Fact::from).collect();
    let effects = operator
        .effects
        .into_iter()
        .map(|effect| {
            Effect::new(
                effect.conditions.into_iter().map(Fact::from).collect(),
                Fact::from(effect.postcondition),
            )
        })
        .collect();
    let mut op = Operator::new(operator.name, preconditions, effects, operator.cost);
    op.is_axiom = is_axiom;
    op
}
