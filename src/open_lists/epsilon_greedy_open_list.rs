use crate::evaluation_context::{EvaluationContext, EvaluationResult, SharedEvaluator};
use crate::open_lists::OpenList;
use crate::rng::PlannerRng;

struct Entry<T> {
    value: i32,
    insertion_id: u64,
    entry: T,
}

/// Orders by a single evaluator's value like [`crate::open_lists::BestFirstOpenList`],
/// but on each removal takes a uniformly random entry instead of the true
/// minimum with probability `epsilon`. A small amount of randomization can
/// help a greedy search escape plateaus that deterministic tie-breaking gets
/// stuck on.
#[derive(Debug)]
pub struct EpsilonGreedyOpenList<T> {
    evaluator: SharedEvaluator,
    epsilon: f64,
    rng: PlannerRng,
    entries: Vec<Entry<T>>,
    next_id: u64,
    only_preferred: bool,
}

impl<T: std::fmt::Debug> std::fmt::Debug for Entry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("value", &self.value)
            .field("insertion_id", &self.insertion_id)
            .field("entry", &self.entry)
            .finish()
    }
}

impl<T> EpsilonGreedyOpenList<T> {
    pub fn new(evaluator: SharedEvaluator, epsilon: f64, rng: PlannerRng) -> Self {
        assert!((0.0..=1.0).contains(&epsilon), "epsilon must be a probability");
        Self {
            evaluator,
            epsilon,
            rng,
            entries: Vec::new(),
            next_id: 0,
            only_preferred: false,
        }
    }

    pub fn preferred_only(mut self) -> Self {
        self.only_preferred = true;
        self
    }

    /// Index of the entry with the smallest `(value, insertion_id)` key.
    fn argmin(&self) -> usize {
        let mut best = 0;
        for (index, candidate) in self.entries.iter().enumerate().skip(1) {
            let current = &self.entries[best];
            if (candidate.value, candidate.insertion_id) < (current.value, current.insertion_id) {
                best = index;
            }
        }
        best
    }
}

impl<T: std::fmt::Debug> OpenList<T> for EpsilonGreedyOpenList<T> {
    fn insert(&mut self, context: &mut EvaluationContext, entry: T) -> EvaluationResult {
        let result = context.get_result(&self.evaluator);
        let accepted = !result.reliable_dead_end
            && (!self.only_preferred || context.reached_by_preferred_operator());
        if accepted {
            self.entries.push(Entry {
                value: result.value,
                insertion_id: self.next_id,
                entry,
            });
            self.next_id += 1;
        }
        result
    }

    fn pop(&mut self) -> Option<T> {
        if self.entries.is_empty() {
            return None;
        }
        let index = if self.rng.gen_bool(self.epsilon) {
            self.rng.gen_range_usize(self.entries.len())
        } else {
            self.argmin()
        };
        Some(self.entries.swap_remove(index).entry)
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn is_dead_end(&self, context: &mut EvaluationContext) -> bool {
        context.get_result(&self.evaluator).reliable_dead_end
    }

    fn only_preferred(&self) -> bool {
        self.only_preferred
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluators::GEvaluator;
    use crate::open_lists::OpenListEntry;
    use crate::state_registry::{StateId, StateRegistry};
    use crate::task::{Fact, Operator, TaskBuilder, Variable};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn toy_registry() -> StateRegistry {
        let mut builder = TaskBuilder::new();
        builder.add_variable(Variable::new("a", 2), 0);
        builder.add_operator(Operator::new(
            "op",
            vec![],
            vec![crate::task::Effect::unconditional(Fact::new(0, 1))],
            1,
        ));
        builder.set_goal(vec![Fact::new(0, 1)]);
        let task = builder.build().unwrap();
        StateRegistry::new(&task).unwrap()
    }

    #[test]
    fn zero_epsilon_always_pops_the_true_minimum() {
        let registry = toy_registry();
        let id = registry.initial_state_id();
        let evaluator: SharedEvaluator = Rc::new(RefCell::new(GEvaluator::new()));
        let mut list: EpsilonGreedyOpenList<OpenListEntry> =
            EpsilonGreedyOpenList::new(evaluator, 0.0, PlannerRng::from_seed(1));

        let mut ctx = EvaluationContext::new(&registry, id, 9, false);
        list.insert(&mut ctx, OpenListEntry::State(StateId(9)));
        let mut ctx = EvaluationContext::new(&registry, id, 1, false);
        list.insert(&mut ctx, OpenListEntry::State(StateId(1)));
        let mut ctx = EvaluationContext::new(&registry, id, 5, false);
        list.insert(&mut ctx, OpenListEntry::State(StateId(5)));

        assert_eq!(list.pop(), Some(OpenListEntry::State(StateId(1))));
        assert_eq!(list.pop(), Some(OpenListEntry::State(StateId(5))));
        assert_eq!(list.pop(), Some(OpenListEntry::State(StateId(9))));
    }

    #[test]
    fn reproducible_given_the_same_seed() {
        let registry = toy_registry();
        let id = registry.initial_state_id();

        let run = |seed: u64| {
            let evaluator: SharedEvaluator = Rc::new(RefCell::new(GEvaluator::new()));
            let mut list: EpsilonGreedyOpenList<OpenListEntry> =
                EpsilonGreedyOpenList::new(evaluator, 1.0, PlannerRng::from_seed(seed));
            for g in 0..10 {
                let mut ctx = EvaluationContext::new(&registry, id, g, false);
                list.insert(&mut ctx, OpenListEntry::State(StateId(g as usize)));
            }
            let mut popped = Vec::new();
            while let Some(entry) = list.pop() {
                popped.push(entry);
            }
            popped
        };

        assert_eq!(run(42), run(42));
    }
}
