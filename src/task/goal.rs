use crate::task::variable::{Fact, VarValue};
use serde::{Deserialize, Serialize};

/// A conjunctive goal condition: a set of facts that must all hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub facts: Vec<Fact>,
}

impl Goal {
    pub fn new(facts: Vec<Fact>) -> Self {
        Self { facts }
    }

    pub fn is_satisfied(&self, state: &[VarValue]) -> bool {
        self.facts.iter().all(|fact| fact.holds_in(state))
    }

    /// Number of goal facts not currently satisfied. Used by the
    /// goal-counting evaluator.
    pub fn unsatisfied_count(&self, state: &[VarValue]) -> usize {
        self.facts.iter().filter(|fact| !fact.holds_in(state)).count()
    }
}
