use crate::evaluation_context::{EvaluationContext, EvaluationResult};
use crate::open_lists::OpenList;
use crate::task::OperatorId;

/// Round-robins between several open lists, e.g. a plain `h`-ordered list
/// and a second list restricted to preferred-operator successors, so the
/// search does not starve either strategy. Every entry is inserted into
/// every sub-list; each sub-list decides independently (via its own
/// evaluators, and its own `only_preferred` setting) whether it accepts the
/// entry.
///
/// Each sublist carries an integer priority (initially 0, lower is dequeued
/// first). `pop` always returns the minimum-priority *nonempty* sublist's
/// entry and bumps that sublist's priority by one, so a lap of `k`
/// non-empty sublists visits each exactly once; `boost_preferred` lowers
/// the priority of every sublist restricted to preferred-operator entries,
/// making it win ties more often until the others catch back up.
#[derive(Debug)]
pub struct AlternationOpenList<T> {
    lists: Vec<Box<dyn OpenList<T>>>,
    priorities: Vec<i32>,
    boost_amount: i32,
}

impl<T> AlternationOpenList<T> {
    pub fn new(lists: Vec<Box<dyn OpenList<T>>>) -> Self {
        Self::with_boost(lists, 0)
    }

    /// Like [`Self::new`], but [`Self::boost_preferred`] lowers a
    /// preferred-only sublist's priority by `boost_amount` each time it is
    /// called, rather than by 1.
    pub fn with_boost(lists: Vec<Box<dyn OpenList<T>>>, boost_amount: usize) -> Self {
        assert!(!lists.is_empty(), "alternation open list needs at least one sub-list");
        let priorities = vec![0; lists.len()];
        Self {
            lists,
            priorities,
            boost_amount: boost_amount as i32,
        }
    }

    /// Index of the lowest-priority sublist that currently has an entry to
    /// give up, or `None` if every sublist is empty.
    fn best_nonempty(&self) -> Option<usize> {
        self.lists
            .iter()
            .enumerate()
            .filter(|(_, list)| !list.is_empty())
            .min_by_key(|&(index, _)| self.priorities[index])
            .map(|(index, _)| index)
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

impl<T: std::fmt::Debug + Clone> OpenList<T> for AlternationOpenList<T> {
    fn insert(&mut self, context: &mut EvaluationContext, entry: T) -> EvaluationResult {
        let results: Vec<EvaluationResult> = self
            .lists
            .iter_mut()
            .map(|list| list.insert(context, entry.clone()))
            .collect();
        let value = results.iter().map(|r| r.value).min().unwrap_or(0);
        EvaluationResult {
            value,
            preferred_operators: union_preferred(&results),
            reliable_dead_end: results.iter().all(|r| r.reliable_dead_end),
        }
    }

    fn pop(&mut self) -> Option<T> {
        let index = self.best_nonempty()?;
        let entry = self.lists[index].pop();
        self.priorities[index] += 1;
        entry
    }

    fn is_empty(&self) -> bool {
        self.lists.iter().all(|list| list.is_empty())
    }

    fn len(&self) -> usize {
        self.lists.iter().map(|list| list.len()).sum()
    }

    fn clear(&mut self) {
        for list in &mut self.lists {
            list.clear();
        }
    }

    fn is_dead_end(&self, context: &mut EvaluationContext) -> bool {
        self.lists.iter().all(|list| list.is_dead_end(context))
    }

    /// Lowers the priority of every sublist that only returns
    /// preferred-operator entries, by `boost_amount`, and recurses into any
    /// sublist that is itself an alternation (or otherwise has its own
    /// notion of boosting).
    fn boost_preferred(&mut self) {
        for (index, list) in self.lists.iter_mut().enumerate() {
            if list.only_preferred() {
                self.priorities[index] -= self.boost_amount;
            }
            list.boost_preferred();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluators::GEvaluator;
    use crate::open_lists::{BestFirstOpenList, OpenListEntry};
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

    /// Builds two independently pre-populated sublists (bypassing
    /// `AlternationOpenList::insert`, which would duplicate entries into
    /// both) so tests can tell which sublist served a given pop.
    fn presplit_lists(
        registry: &StateRegistry,
        first_ids: &[usize],
        second_ids: &[usize],
    ) -> AlternationOpenList<OpenListEntry> {
        let mut a = BestFirstOpenList::new(Rc::new(RefCell::new(GEvaluator::new()))
            as crate::evaluation_context::SharedEvaluator);
        for &id in first_ids {
            let mut context = EvaluationContext::new(registry, StateId(id), id as i32, false);
            a.insert(&mut context, OpenListEntry::State(StateId(id)));
        }
        let mut b = BestFirstOpenList::new(Rc::new(RefCell::new(GEvaluator::new()))
            as crate::evaluation_context::SharedEvaluator);
        for &id in second_ids {
            let mut context = EvaluationContext::new(registry, StateId(id), id as i32, false);
            b.insert(&mut context, OpenListEntry::State(StateId(id)));
        }
        AlternationOpenList::new(vec![Box::new(a), Box::new(b)])
    }

    #[test]
    fn round_robins_fairly_across_nonempty_sublists() {
        let registry = toy_registry();
        let mut list = presplit_lists(&registry, &[10, 11], &[20, 21]);
        let mut from_first = 0;
        let mut from_second = 0;
        for _ in 0..4 {
            match list.pop().unwrap() {
                OpenListEntry::State(StateId(id)) if id >= 20 => from_second += 1,
                OpenListEntry::State(_) => from_first += 1,
                _ => unreachable!(),
            }
        }
        assert_eq!(from_first, 2);
        assert_eq!(from_second, 2);
        assert_eq!(list.pop(), None);
    }

    #[test]
    fn an_empty_sublist_is_skipped_without_breaking_the_round_robin() {
        let registry = toy_registry();
        // Only the first sublist ever has entries; the second stays empty
        // for the whole run, but a `min_by_key` over priorities never gets
        // stuck waiting for it.
        let mut list = presplit_lists(&registry, &[10, 11, 12], &[]);
        assert_eq!(
            list.pop(),
            Some(OpenListEntry::State(StateId(10)))
        );
        assert_eq!(
            list.pop(),
            Some(OpenListEntry::State(StateId(11)))
        );
        assert_eq!(
            list.pop(),
            Some(OpenListEntry::State(StateId(12)))
        );
        assert_eq!(list.pop(), None);
    }

    #[test]
    fn boost_preferred_favors_the_preferred_only_sublist() {
        let registry = toy_registry();
        let mut plain = BestFirstOpenList::new(Rc::new(RefCell::new(GEvaluator::new()))
            as crate::evaluation_context::SharedEvaluator);
        for id in 0..4 {
            let mut context = EvaluationContext::new(&registry, StateId(id), id as i32, false);
            plain.insert(&mut context, OpenListEntry::State(StateId(id)));
        }
        let mut preferred = BestFirstOpenList::new(Rc::new(RefCell::new(GEvaluator::new()))
            as crate::evaluation_context::SharedEvaluator)
        .preferred_only();
        for id in 100..104 {
            let mut context = EvaluationContext::new(&registry, StateId(id), id as i32, true);
            preferred.insert(&mut context, OpenListEntry::State(StateId(id)));
        }
        let mut list =
            AlternationOpenList::with_boost(vec![Box::new(plain), Box::new(preferred)], 3);

        // Before boosting, both sublists start at priority 0; sublist 0 (the
        // plain one) is visited first since it ties and comes first.
        assert_eq!(list.pop(), Some(OpenListEntry::State(StateId(0))));
        list.boost_preferred();
        // Sublist 1 (preferred-only) now has priority -3 versus sublist 0's
        // priority 1, so it wins every tie until its priority catches back
        // up past 1.
        for _ in 0..4 {
            match list.pop() {
                Some(OpenListEntry::State(StateId(id))) => assert!(id >= 100),
                other => panic!("expected a preferred-only entry, got {other:?}"),
            }
        }
    }

    #[test]
    fn clear_empties_every_sublist() {
        let registry = toy_registry();
        let mut list = presplit_lists(&registry, &[10, 11], &[20, 21]);
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.pop(), None);
    }
}
