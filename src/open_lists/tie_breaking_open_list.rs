use crate::evaluation_context::{add_costs, EvaluationContext, EvaluationResult, SharedEvaluator};
use crate::open_lists::open_list::KeyedOpenList;
use crate::open_lists::OpenList;
use crate::task::OperatorId;

/// Orders entries by several evaluators at once, applied lexicographically:
/// the first evaluator decides the primary order, later ones break ties,
/// and insertion order breaks any tie left after all of them. A common
/// configuration is `[h, g]`: sort by heuristic value, and among equally
/// promising states prefer the one closer to the root.
#[derive(Debug)]
pub struct TieBreakingOpenList<T> {
    evaluators: Vec<SharedEvaluator>,
    queue: KeyedOpenList<T>,
    only_preferred: bool,
}

impl<T> TieBreakingOpenList<T> {
    pub fn new(evaluators: Vec<SharedEvaluator>) -> Self {
        assert!(!evaluators.is_empty(), "tie-breaking open list needs at least one evaluator");
        Self {
            evaluators,
            queue: KeyedOpenList::new(),
            only_preferred: false,
        }
    }

    pub fn preferred_only(mut self) -> Self {
        self.only_preferred = true;
        self
    }
}

fn union_preferred(results: &[EvaluationResult]) -> Vec<OperatorId> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for result in results {
        for &op in &result.preferred_operators {
            if seen.insert(op) {
                out.push(op);
            }
        }
    }
    out
}

impl<T: std::fmt::Debug> OpenList<T> for TieBreakingOpenList<T> {
    fn insert(&mut self, context: &mut EvaluationContext, entry: T) -> EvaluationResult {
        let results: Vec<EvaluationResult> = self
            .evaluators
            .iter()
            .map(|e| context.get_result(e))
            .collect();
        let reliable_dead_end = results.iter().any(|r| r.reliable_dead_end);
        let accepted = !reliable_dead_end
            && (!self.only_preferred || context.reached_by_preferred_operator());
        if accepted {
            let key = results.iter().map(|r| r.value).collect();
            self.queue.insert(key, entry);
        }
        let value = results.iter().fold(0, |acc, r| add_costs(acc, r.value));
        EvaluationResult {
            value,
            preferred_operators: union_preferred(&results),
            reliable_dead_end,
        }
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
        self.evaluators
            .iter()
            .any(|e| context.get_result(e).reliable_dead_end)
    }

    fn only_preferred(&self) -> bool {
        self.only_preferred
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluators::ConstEvaluator;
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
    fn second_evaluator_breaks_ties_from_the_first() {
        let registry = toy_registry();
        let id = registry.initial_state_id();
        let primary: SharedEvaluator = Rc::new(RefCell::new(ConstEvaluator::new(1)));
        let tiebreak_low: SharedEvaluator = Rc::new(RefCell::new(ConstEvaluator::new(0)));
        let tiebreak_high: SharedEvaluator = Rc::new(RefCell::new(ConstEvaluator::new(9)));

        let mut list: TieBreakingOpenList<OpenListEntry> =
            TieBreakingOpenList::new(vec![primary.clone(), tiebreak_high]);
        let mut ctx = EvaluationContext::new(&registry, id, 0, false);
        list.insert(&mut ctx, OpenListEntry::State(StateId(1)));

        let mut list2: TieBreakingOpenList<OpenListEntry> =
            TieBreakingOpenList::new(vec![primary, tiebreak_low]);
        let mut ctx = EvaluationContext::new(&registry, id, 0, false);
        list2.insert(&mut ctx, OpenListEntry::State(StateId(2)));

        assert_eq!(list.pop(), Some(OpenListEntry::State(StateId(1))));
        assert_eq!(list2.pop(), Some(OpenListEntry::State(StateId(2))));
    }
}
