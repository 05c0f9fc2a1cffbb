//! Canonical storage for world states: every state reachable during search
//! is interned here exactly once, keyed by its packed bit representation, and
//! referred to everywhere else by the cheap, copyable [`StateId`] handle.

use crate::int_packer::{Bin, IntPacker};
use crate::segmented_vector::SegmentedArrayVector;
use crate::task::{apply_axioms, Operator, Task, VarValue};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Handle to a state stored in some [`StateRegistry`]. Only meaningful
/// relative to the registry that produced it: using a `StateId` from one
/// registry to index into another is a logic error (not memory-unsafe, since
/// `get` simply returns whatever garbage state that index happens to map to
/// in the other registry, but callers must not mix registries).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub usize);

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(0);

/// Interns [`VarValue`] assignments by their packed representation so that
/// structurally identical states always map to the same [`StateId`], and
/// gives callers cheap, stable-under-growth access to previously registered
/// states.
#[derive(Debug)]
pub struct StateRegistry {
    id: u64,
    packer: IntPacker,
    domain_sizes: Vec<usize>,
    buffers: SegmentedArrayVector<Bin>,
    index: HashMap<Vec<Bin>, StateId>,
    initial_state_id: StateId,
    axioms: Vec<Operator>,
    axiom_layers: Vec<usize>,
}

impl StateRegistry {
    pub fn new(task: &Task) -> Result<Self, crate::error::PlannerError> {
        let domain_sizes = task.domain_sizes();
        let packer = IntPacker::new(&domain_sizes)?;
        let mut buffers = SegmentedArrayVector::new(packer.bins_per_state().max(1));
        let mut index = HashMap::new();

        let mut initial_state = task.initial_state.clone();
        apply_axioms(&mut initial_state, &task.axioms, &task.axiom_layers);

        let mut initial_buffer = packer.new_buffer();
        for (var, &value) in initial_state.iter().enumerate() {
            packer.set(&mut initial_buffer, var, value);
        }
        buffers.push_back(&initial_buffer);
        index.insert(initial_buffer, StateId(0));

        Ok(Self {
            id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            packer,
            domain_sizes,
            buffers,
            index,
            initial_state_id: StateId(0),
            axioms: task.axioms.clone(),
            axiom_layers: task.axiom_layers.clone(),
        })
    }

    /// A value unique to this registry instance, used by
    /// [`crate::per_state_information::PerStateInformation`] to detect that
    /// it has outlived the registry it was bound to.
    pub fn registry_id(&self) -> u64 {
        self.id
    }

    pub fn initial_state_id(&self) -> StateId {
        self.initial_state_id
    }

    pub fn size(&self) -> usize {
        self.buffers.len()
    }

    /// Looks up or creates the `StateId` for `values`, a full assignment to
    /// every task variable.
    pub fn lookup_or_insert(&mut self, values: &[VarValue]) -> StateId {
        let mut buffer = self.packer.new_buffer();
        for (var, &value) in values.iter().enumerate() {
            self.packer.set(&mut buffer, var, value);
        }
        if let Some(&id) = self.index.get(&buffer) {
            return id;
        }
        let id = StateId(self.buffers.len());
        self.buffers.push_back(&buffer);
        self.index.insert(buffer, id);
        id
    }

    /// Applies `op`'s effects to `parent`, evaluating every effect's
    /// conditions against the *parent* state (not the partially-updated
    /// successor), then runs axioms to a fixpoint and canonicalizes the
    /// result. Mirrors `op.is_applicable(parent)` being a precondition the
    /// caller has already checked; this method does not re-check it.
    pub fn successor(&mut self, parent: StateId, op: &Operator) -> StateId {
        let before = self.state_values(parent);
        let mut values = before.clone();
        for effect in &op.effects {
            if effect.is_enabled(&before) {
                values[effect.postcondition.var] = effect.postcondition.value;
            }
        }
        apply_axioms(&mut values, &self.axioms, &self.axiom_layers);
        self.lookup_or_insert(&values)
    }

    /// Unpacks the full variable assignment for `id`.
    pub fn state_values(&self, id: StateId) -> Vec<VarValue> {
        let buffer = self.buffers.row(id.0);
        (0..self.domain_sizes.len())
            .map(|var| self.packer.get(&buffer, var))
            .collect()
    }

    pub fn value_of(&self, id: StateId, var: usize) -> VarValue {
        let buffer = self.buffers.row(id.0);
        self.packer.get(&buffer, var)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Fact, Operator, TaskBuilder, Variable};

    fn toy_task() -> Task {
        let mut builder = TaskBuilder::new();
        builder.add_variable(Variable::new("a", 2), 0);
        builder.add_variable(Variable::new("b", 3), 0);
        builder.add_operator(Operator::new(
            "op",
            vec![],
            vec![crate::task::Effect::unconditional(Fact::new(0, 1))],
            1,
        ));
        builder.set_goal(vec![Fact::new(0, 1)]);
        builder.build().unwrap()
    }

    #[test]
    fn initial_state_is_registered_at_construction() {
        let task = toy_task();
        let registry = StateRegistry::new(&task).unwrap();
        assert_eq!(registry.size(), 1);
        assert_eq!(registry.state_values(registry.initial_state_id()), vec![0, 0]);
    }

    #[test]
    fn identical_states_reuse_the_same_id() {
        let task = toy_task();
        let mut registry = StateRegistry::new(&task).unwrap();
        let a = registry.lookup_or_insert(&[1, 2]);
        let b = registry.lookup_or_insert(&[1, 2]);
        assert_eq!(a, b);
        assert_eq!(registry.size(), 2);
    }

    #[test]
    fn distinct_states_get_distinct_ids() {
        let task = toy_task();
        let mut registry = StateRegistry::new(&task).unwrap();
        let a = registry.lookup_or_insert(&[1, 0]);
        let b = registry.lookup_or_insert(&[0, 1]);
        assert_ne!(a, b);
    }

    #[test]
    fn successor_applies_effects_against_the_parent_state() {
        let task = toy_task();
        let mut registry = StateRegistry::new(&task).unwrap();
        let initial = registry.initial_state_id();
        let child = registry.successor(initial, &task.operators[0]);
        assert_eq!(registry.state_values(child), vec![1, 0]);
    }

    #[test]
    fn successor_evaluates_effect_conditions_against_the_parent_not_partial_updates() {
        // Two effects: one sets a:=1 unconditionally, the other sets b:=2
        // only if a==0 in the *pre*-effect state. Even though the first
        // effect would flip a to 1, the second effect must still see the
        // original a==0 and fire.
        let mut builder = TaskBuilder::new();
        builder.add_variable(Variable::new("a", 2), 0);
        builder.add_variable(Variable::new("b", 3), 0);
        builder.add_operator(Operator::new(
            "op",
            vec![],
            vec![
                crate::task::Effect::unconditional(Fact::new(0, 1)),
                crate::task::Effect::new(vec![Fact::new(0, 0)], Fact::new(1, 2)),
            ],
            1,
        ));
        builder.set_goal(vec![Fact::new(0, 1)]);
        let task = builder.build().unwrap();
        let mut registry = StateRegistry::new(&task).unwrap();
        let initial = registry.initial_state_id();
        let child = registry.successor(initial, &task.operators[0]);
        assert_eq!(registry.state_values(child), vec![1, 2]);
    }

    #[test]
    fn successor_applies_axioms_to_fixpoint() {
        let mut builder = TaskBuilder::new();
        builder.add_variable(Variable::new("a", 2), 0);
        builder.add_variable(Variable::new("derived", 2), 0);
        builder.add_operator(Operator::new(
            "op",
            vec![],
            vec![crate::task::Effect::unconditional(Fact::new(0, 1))],
            1,
        ));
        builder.add_axiom(Operator::axiom(vec![Fact::new(0, 1)], Fact::new(1, 1)));
        builder.set_goal(vec![Fact::new(1, 1)]);
        let task = builder.build().unwrap();
        let mut registry = StateRegistry::new(&task).unwrap();
        let initial = registry.initial_state_id();
        let child = registry.successor(initial, &task.operators[0]);
        assert_eq!(registry.state_values(child), vec![1, 1]);
    }

    #[test]
    fn axioms_fire_on_the_initial_state_too() {
        let mut builder = TaskBuilder::new();
        builder.add_variable(Variable::new("a", 2), 1);
        builder.add_variable(Variable::new("derived", 2), 0);
        builder.add_axiom(Operator::axiom(vec![Fact::new(0, 1)], Fact::new(1, 1)));
        builder.set_goal(vec![Fact::new(1, 1)]);
        let task = builder.build().unwrap();
        let registry = StateRegistry::new(&task).unwrap();
        assert_eq!(registry.state_values(registry.initial_state_id()), vec![1, 1]);
    }
}
