//! A lazily-grown `StateId -> T` map bound to a particular
//! [`StateRegistry`](crate::state_registry::StateRegistry) instance.
//!
//! The C++ planner ties these to the registry's lifetime through a
//! subscriber/notify relationship (see `algorithms/subscriber.h` and
//! `per_state_information.h` in the original source) so that growing the
//! registry also grows every attached per-state table. Rust's ownership
//! rules make that pattern awkward (it requires either a shared, mutably
//! aliased registry or unsafe raw back-pointers), so this instead binds
//! lazily: each `PerStateInformation` records the `registry_id` of the
//! registry it was last read through, and a registry mismatch (including
//! first use, or reuse after the original registry was dropped and a new one
//! took its place) resets the table to all-default before answering. A
//! `PerStateInformation` never holds a live reference into the registry, so
//! it can freely outlive the registry it was created for.

use crate::segmented_vector::SegmentedVector;
use crate::state_registry::{StateId, StateRegistry};

#[derive(Debug)]
pub struct PerStateInformation<T> {
    default: T,
    bound_registry_id: Option<u64>,
    values: SegmentedVector<T>,
}

impl<T: Clone> PerStateInformation<T> {
    pub fn new(default: T) -> Self {
        Self {
            default,
            bound_registry_id: None,
            values: SegmentedVector::new(),
        }
    }

    fn ensure_bound(&mut self, registry: &StateRegistry) {
        if self.bound_registry_id != Some(registry.registry_id()) {
            self.values = SegmentedVector::new();
            self.bound_registry_id = Some(registry.registry_id());
        }
    }

    fn ensure_len(&mut self, len: usize) {
        if self.values.len() < len {
            self.values.resize(len, self.default.clone());
        }
    }

    pub fn get(&mut self, registry: &StateRegistry, id: StateId) -> &T {
        self.ensure_bound(registry);
        self.ensure_len(id.0 + 1);
        self.values.get(id.0)
    }

    pub fn get_mut(&mut self, registry: &StateRegistry, id: StateId) -> &mut T {
        self.ensure_bound(registry);
        self.ensure_len(id.0 + 1);
        self.values.get_mut(id.0)
    }

    pub fn set(&mut self, registry: &StateRegistry, id: StateId, value: T) {
        *self.get_mut(registry, id) = value;
    }
}

/// A specialised, more compactly stored variant for boolean per-state flags
/// (e.g. "is this state closed?"), mirroring the C++ planner's
/// `PerStateBitset`.
#[derive(Debug)]
pub struct PerStateBitset {
    inner: PerStateInformation<bool>,
}

impl Default for PerStateBitset {
    fn default() -> Self {
        Self::new()
    }
}

impl PerStateBitset {
    pub fn new() -> Self {
        Self {
            inner: PerStateInformation::new(false),
        }
    }

    pub fn get(&mut self, registry: &StateRegistry, id: StateId) -> bool {
        *self.inner.get(registry, id)
    }

    pub fn set(&mut self, registry: &StateRegistry, id: StateId, value: bool) {
        self.inner.set(registry, id, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Fact, Operator, TaskBuilder, Variable};

    fn toy_task() -> crate::task::Task {
        let mut builder = TaskBuilder::new();
        builder.add_variable(Variable::new("a", 2), 0);
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
    fn defaults_before_any_write() {
        let task = toy_task();
        let registry = StateRegistry::new(&task).unwrap();
        let mut info: PerStateInformation<i32> = PerStateInformation::new(-1);
        assert_eq!(*info.get(&registry, registry.initial_state_id()), -1);
    }

    #[test]
    fn writes_are_visible_through_the_same_registry() {
        let task = toy_task();
        let mut registry = StateRegistry::new(&task).unwrap();
        let mut info: PerStateInformation<i32> = PerStateInformation::new(0);
        let s1 = registry.lookup_or_insert(&[1]);
        info.set(&registry, s1, 42);
        assert_eq!(*info.get(&registry, s1), 42);
    }

    #[test]
    fn rebinds_and_resets_after_registry_is_replaced() {
        let task = toy_task();
        let mut info: PerStateInformation<i32> = PerStateInformation::new(0);
        {
            let mut registry = StateRegistry::new(&task).unwrap();
            let s1 = registry.lookup_or_insert(&[1]);
            info.set(&registry, s1, 99);
            assert_eq!(*info.get(&registry, s1), 99);
        }
        // A fresh registry reuses the same StateId space starting at 0, but
        // must not see the old registry's values.
        let registry2 = StateRegistry::new(&task).unwrap();
        assert_eq!(*info.get(&registry2, registry2.initial_state_id()), 0);
    }
}
