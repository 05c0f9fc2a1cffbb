use crate::evaluation_context::{EvaluationContext, EvaluationResult, SharedEvaluator};
use crate::open_lists::OpenList;
use crate::rng::PlannerRng;
use std::collections::{HashMap, VecDeque};

/// `a` dominates `b` (for minimization) iff it is no worse in every
/// component and strictly better in at least one.
fn dominates(a: &[i32], b: &[i32]) -> bool {
    a.iter().zip(b).all(|(x, y)| x <= y) && a.iter().zip(b).any(|(x, y)| x < y)
}

/// Maintains the Pareto front over several evaluators' value tuples:
/// `remove_min` never returns an entry whose key is dominated by some other
/// key currently present, so no single evaluator can starve entries that are
/// best according to another. Among nondominated keys, one is picked either
/// uniformly or weighted by its bucket's size (`state_uniform`), then a FIFO
/// entry is dequeued from it.
#[derive(Debug)]
pub struct ParetoOpenList<T> {
    evaluators: Vec<SharedEvaluator>,
    buckets: HashMap<Vec<i32>, VecDeque<T>>,
    front: Vec<Vec<i32>>,
    rng: PlannerRng,
    state_uniform: bool,
    len: usize,
    only_preferred: bool,
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

impl<T> ParetoOpenList<T> {
    /// `state_uniform`: if true, pick among nondominated keys weighted by how
    /// many entries each holds (so keys with more waiting entries are more
    /// likely); if false, every nondominated key is equally likely regardless
    /// of bucket size.
    pub fn new(evaluators: Vec<SharedEvaluator>, state_uniform: bool, rng: PlannerRng) -> Self {
        assert!(!evaluators.is_empty(), "pareto open list needs at least one evaluator");
        Self {
            evaluators,
            buckets: HashMap::new(),
            front: Vec::new(),
            rng,
            state_uniform,
            len: 0,
            only_preferred: false,
        }
    }

    pub fn preferred_only(mut self) -> Self {
        self.only_preferred = true;
        self
    }

    fn recompute_front(&mut self) {
        let keys: Vec<&Vec<i32>> = self.buckets.keys().collect();
        self.front = keys
            .iter()
            .filter(|&&key| !keys.iter().any(|&other| other != key && dominates(other, key)))
            .map(|&key| key.clone())
            .collect();
        // `self.buckets` is a HashMap, so its key iteration order is not
        // stable across runs; sort so that randomized selection over the
        // front stays reproducible given the same RNG seed.
        self.front.sort();
    }

    fn pick_front_key(&mut self) -> Vec<i32> {
        if !self.state_uniform {
            let index = self.rng.gen_range_usize(self.front.len());
            return self.front[index].clone();
        }
        let weights: Vec<usize> = self
            .front
            .iter()
            .map(|key| self.buckets[key].len())
            .collect();
        let total: usize = weights.iter().sum();
        let mut threshold = self.rng.gen_range_usize(total.max(1));
        for (key, weight) in self.front.iter().zip(weights.iter()) {
            if threshold < *weight {
                return key.clone();
            }
            threshold -= weight;
        }
        self.front.last().expect("front is nonempty").clone()
    }
}

impl<T: std::fmt::Debug> OpenList<T> for ParetoOpenList<T> {
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
            let is_new_key = !self.buckets.contains_key(&key);
            self.buckets.entry(key).or_default().push_back(entry);
            self.len += 1;
            if is_new_key {
                self.recompute_front();
            }
        }
        EvaluationResult {
            value: results.iter().map(|r| r.value).min().unwrap_or(0),
            preferred_operators: union_preferred(&results),
            reliable_dead_end,
        }
    }

    fn pop(&mut self) -> Option<T> {
        if self.front.is_empty() {
            return None;
        }
        let key = self.pick_front_key();
        let bucket = self.buckets.get_mut(&key).expect("front key has a bucket");
        let entry = bucket.pop_front().expect("front bucket is nonempty");
        self.len -= 1;
        if bucket.is_empty() {
            self.buckets.remove(&key);
            self.recompute_front();
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
        self.front.clear();
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
    fn dominance_helper_compares_componentwise() {
        assert!(dominates(&[1, 2], &[1, 3]));
        assert!(!dominates(&[1, 2], &[1, 2]));
        assert!(!dominates(&[2, 2], &[1, 3]));
    }

    #[test]
    fn dominated_key_is_never_chosen_while_a_dominating_key_remains() {
        let registry = toy_registry();
        let id = registry.initial_state_id();
        let evaluator: SharedEvaluator = Rc::new(RefCell::new(crate::evaluators::GEvaluator::new()));
        let mut list: ParetoOpenList<OpenListEntry> =
            ParetoOpenList::new(vec![evaluator], false, PlannerRng::from_seed(1));

        let mut ctx = EvaluationContext::new(&registry, id, 2, false);
        list.insert(&mut ctx, OpenListEntry::State(StateId(2)));
        let mut ctx = EvaluationContext::new(&registry, id, 1, false);
        list.insert(&mut ctx, OpenListEntry::State(StateId(1)));

        assert_eq!(list.front, vec![vec![1]]);
        assert_eq!(list.pop(), Some(OpenListEntry::State(StateId(1))));
        // Key [1]'s bucket is now empty; [2] becomes the new front.
        assert_eq!(list.front, vec![vec![2]]);
        assert_eq!(list.pop(), Some(OpenListEntry::State(StateId(2))));
    }

    #[test]
    fn nondominated_keys_both_stay_reachable() {
        let registry = toy_registry();
        let id = registry.initial_state_id();
        let e1: SharedEvaluator = Rc::new(RefCell::new(ConstEvaluator::new(1)));
        let e2: SharedEvaluator = Rc::new(RefCell::new(ConstEvaluator::new(5)));
        let mut list: ParetoOpenList<OpenListEntry> =
            ParetoOpenList::new(vec![e1, e2], false, PlannerRng::from_seed(1));
        let mut ctx = EvaluationContext::new(&registry, id, 0, false);
        list.insert(&mut ctx, OpenListEntry::State(StateId(1)));
        assert_eq!(list.front.len(), 1);

        let first = list.pop();
        assert_eq!(first, Some(OpenListEntry::State(StateId(1))));
        assert!(list.is_empty());
    }
}
