use crate::evaluation_context::{EvaluationContext, EvaluationResult, SharedEvaluator};
use crate::open_lists::OpenList;
use crate::rng::PlannerRng;
use std::collections::HashMap;

struct Bucket<T> {
    key: Vec<i32>,
    entries: Vec<T>,
}

/// Groups entries by the tuple of their sub-evaluators' values ("type") and,
/// on each removal, first picks a bucket uniformly at random and then an
/// entry within it uniformly at random. Unlike [`crate::open_lists::BestFirstOpenList`]
/// this gives every *distinct combination of evaluator values* equal
/// weight rather than favoring populous buckets, which helps diversify
/// search when many states happen to share the best heuristic value.
#[derive(Debug)]
pub struct TypeBasedOpenList<T> {
    evaluators: Vec<SharedEvaluator>,
    buckets: Vec<Bucket<T>>,
    bucket_of_key: HashMap<Vec<i32>, usize>,
    rng: PlannerRng,
    len: usize,
    only_preferred: bool,
}

impl<T: std::fmt::Debug> std::fmt::Debug for Bucket<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bucket")
            .field("key", &self.key)
            .field("entries", &self.entries)
            .finish()
    }
}

impl<T> TypeBasedOpenList<T> {
    pub fn new(evaluators: Vec<SharedEvaluator>, rng: PlannerRng) -> Self {
        assert!(!evaluators.is_empty(), "type-based open list needs at least one evaluator");
        Self {
            evaluators,
            buckets: Vec::new(),
            bucket_of_key: HashMap::new(),
            rng,
            len: 0,
            only_preferred: false,
        }
    }

    pub fn preferred_only(mut self) -> Self {
        self.only_preferred = true;
        self
    }
}

fn union_preferred(results: &[EvaluationResult]) -> Vec<crate::task::OperatorId> {
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

impl<T: std::fmt::Debug> OpenList<T> for TypeBasedOpenList<T> {
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
            let key: Vec<i32> = results.iter().map(|r| r.value).collect();
            match self.bucket_of_key.get(&key) {
                Some(&index) => self.buckets[index].entries.push(entry),
                None => {
                    let index = self.buckets.len();
                    self.bucket_of_key.insert(key.clone(), index);
                    self.buckets.push(Bucket {
                        key,
                        entries: vec![entry],
                    });
                }
            }
            self.len += 1;
        }
        EvaluationResult {
            value: results.iter().map(|r| r.value).min().unwrap_or(0),
            preferred_operators: union_preferred(&results),
            reliable_dead_end,
        }
    }

    fn pop(&mut self) -> Option<T> {
        if self.buckets.is_empty() {
            return None;
        }
        let bucket_index = self.rng.gen_range_usize(self.buckets.len());
        let bucket = &mut self.buckets[bucket_index];
        let entry_index = self.rng.gen_range_usize(bucket.entries.len());
        let entry = bucket.entries.swap_remove(entry_index);
        self.len -= 1;
        if bucket.entries.is_empty() {
            self.bucket_of_key.remove(&bucket.key);
            self.buckets.swap_remove(bucket_index);
            if bucket_index < self.buckets.len() {
                let moved_key = self.buckets[bucket_index].key.clone();
                self.bucket_of_key.insert(moved_key, bucket_index);
            }
        }
        Some(entry)
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        self.buckets.clear();
        self.bucket_of_key.clear();
        self.len = 0;
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
    fn every_inserted_entry_eventually_comes_back_out() {
        let registry = toy_registry();
        let id = registry.initial_state_id();
        let evaluator: SharedEvaluator = Rc::new(RefCell::new(ConstEvaluator::new(0)));
        let mut list: TypeBasedOpenList<OpenListEntry> =
            TypeBasedOpenList::new(vec![evaluator], PlannerRng::from_seed(3));

        for i in 0..5 {
            let mut ctx = EvaluationContext::new(&registry, id, 0, false);
            list.insert(&mut ctx, OpenListEntry::State(StateId(i)));
        }
        assert_eq!(list.len(), 5);

        let mut popped: Vec<usize> = Vec::new();
        while let Some(OpenListEntry::State(StateId(i))) = list.pop() {
            popped.push(i);
        }
        popped.sort();
        assert_eq!(popped, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn distinct_evaluator_tuples_form_distinct_buckets() {
        let registry = toy_registry();
        let id = registry.initial_state_id();
        let evaluator: SharedEvaluator = Rc::new(RefCell::new(ConstEvaluator::new(0)));
        let mut list: TypeBasedOpenList<OpenListEntry> =
            TypeBasedOpenList::new(vec![evaluator], PlannerRng::from_seed(3));
        let mut ctx = EvaluationContext::new(&registry, id, 0, false);
        list.insert(&mut ctx, OpenListEntry::State(StateId(1)));
        assert_eq!(list.buckets.len(), 1);
    }
}
