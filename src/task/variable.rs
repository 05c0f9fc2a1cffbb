use serde::{Deserialize, Serialize};

/// Index of a state variable.
pub type VarId = usize;

/// A value a variable may take, `0 <= value < domain_size`.
pub type VarValue = usize;

/// A variable with a finite domain `{0, ..., domain_size - 1}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub domain_size: usize,
    /// Human-readable name for each value of this variable, used only for
    /// display purposes (e.g. plan output, logging).
    pub fact_names: Vec<String>,
}

impl Variable {
    pub fn new(name: impl Into<String>, domain_size: usize) -> Self {
        let name = name.into();
        let fact_names = (0..domain_size)
            .map(|value| format!("{name}={value}"))
            .collect();
        Self {
            name,
            domain_size,
            fact_names,
        }
    }

    pub fn with_fact_names(
        name: impl Into<String>,
        fact_names: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            domain_size: fact_names.len(),
            fact_names,
        }
    }
}

/// A fact is a pair `(var, value)`. Invariant: `0 <= value < domain(var)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fact {
    pub var: VarId,
    pub value: VarValue,
}

impl Fact {
    pub fn new(var: VarId, value: VarValue) -> Self {
        Self { var, value }
    }

    pub fn holds_in(&self, state: &[VarValue]) -> bool {
        state[self.var] == self.value
    }
}
