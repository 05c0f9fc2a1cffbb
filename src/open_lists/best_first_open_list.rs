use crate::evaluation_context::{EvaluationContext, EvaluationResult, SharedEvaluator};
use crate::open_lists::open_list::KeyedOpenList;
use crate::open_lists::OpenList;

/// Orders entries by a single evaluator's value, ties broken by insertion
/// order. Plugging in `g` gives uniform-cost search; `g + h` gives A*; `h`
/// alone gives greedy best-first search.
#[derive(Debug)]
pub struct BestFirstOpenList<T> {
    evaluator: SharedEvaluator,
    queue: KeyedOpenList<T>,
    only_preferred: bool,
}

impl<T> BestFirstOpenList<T> {
    pub fn new(evaluator: SharedEvaluator) -> Self {
        Self {
            evaluator,
            queue: KeyedOpenList::new(),
            only_preferred: false,
        }
    }

    /// Marks this list as holding only preferred-operator successors, for
    /// use as the preferred-operator branch of an
    /// [`crate::open_lists::AlternationOpenList`].
    pub fn preferred_only(mut self) -> Self {
        self.only_preferred = true;
        self
    }
}

impl<T: std::fmt::Debug> OpenList<T> for BestFirstOpenList<T> {
    fn insert(&mut self, context: &mut EvaluationContext, entry: T) -> EvaluationResult {
        let result = context.get_result(&self.evaluator);
        let accepted = !result.reliable_dead_end
            && (!self.only_preferred || context.reached_by_preferred_operator());
        if accepted {
            self.queue.insert(vec![result.value], entry);
        }
        result
    }

    fn pop(&mut self) -> Option<T> {
        self.queue.pop()
    }

    fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn clear(&mut self) {
        self.queue.clear();
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
    fn pops_lowest_value_first() {
        let registry = toy_registry();
        let id = registry.initial_state_id();
        let evaluator: SharedEvaluator = Rc::new(RefCell::new(GEvaluator::new()));
        let mut list: BestFirstOpenList<OpenListEntry> = BestFirstOpenList::new(evaluator);

        let mut ctx = EvaluationContext::new(&registry, id, 5, false);
        list.insert(&mut ctx, OpenListEntry::State(StateId(5)));
        let mut ctx = EvaluationContext::new(&registry, id, 1, false);
        list.insert(&mut ctx, OpenListEntry::State(StateId(1)));

        assert_eq!(list.pop(), Some(OpenListEntry::State(StateId(1))));
    }
}
