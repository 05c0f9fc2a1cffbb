use crate::task::variable::{Fact, VarValue};
use serde::{Deserialize, Serialize};

/// Index into [`Task::operators`](crate::task::Task::operators). Axioms are
/// stored separately and are never assigned an `OperatorId`: the successor
/// generator must never emit one.
pub type OperatorId = usize;

/// A conditional effect: `postcondition` fires iff every fact in
/// `conditions` holds in the state the effect is being evaluated against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Effect {
    pub conditions: Vec<Fact>,
    pub postcondition: Fact,
}

impl Effect {
    pub fn new(conditions: Vec<Fact>, postcondition: Fact) -> Self {
        Self {
            conditions,
            postcondition,
        }
    }

    pub fn unconditional(postcondition: Fact) -> Self {
        Self {
            conditions: Vec::new(),
            postcondition,
        }
    }

    pub fn is_enabled(&self, state: &[VarValue]) -> bool {
        self.conditions.iter().all(|fact| fact.holds_in(state))
    }
}

/// An operator (action schema, already grounded) or an axiom.
///
/// Axioms reuse this shape (`is_axiom == true`, `cost == 0`) but are stored
/// in [`Task::axioms`](crate::task::Task::axioms) rather than
/// [`Task::operators`](crate::task::Task::operators), and are never returned
/// by the successor generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operator {
    pub name: String,
    pub preconditions: Vec<Fact>,
    pub effects: Vec<Effect>,
    pub cost: i32,
    pub is_axiom: bool,
}

impl Operator {
    pub fn new(
        name: impl Into<String>,
        preconditions: Vec<Fact>,
        effects: Vec<Effect>,
        cost: i32,
    ) -> Self {
        Self {
            name: name.into(),
            preconditions,
            effects,
            cost,
            is_axiom: false,
        }
    }

    pub fn axiom(preconditions: Vec<Fact>, postcondition: Fact) -> Self {
        Self {
            name: format!("axiom({}:={})", postcondition.var, postcondition.value),
            preconditions: Vec::new(),
            effects: vec![Effect::new(preconditions, postcondition)],
            cost: 0,
            is_axiom: true,
        }
    }

    pub fn is_applicable(&self, state: &[VarValue]) -> bool {
        self.preconditions.iter().all(|fact| fact.holds_in(state))
    }

    /// Display name in plan-file form, e.g. `(pickup-a)`.
    pub fn display_name(&self) -> String {
        format!("({})", self.name)
    }
}
