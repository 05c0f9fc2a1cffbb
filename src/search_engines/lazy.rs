//! Lazy best-first search: the open list holds `(predecessor, operator)`
//! edges rather than already-evaluated states. Expanding a state queues its
//! applicable operators without touching the successor generator or any
//! evaluator; the successor state is only materialized and evaluated once
//! its edge is popped, so states that never reach the front of the queue
//! never pay for a heuristic call. [`crate::search_engines::eager`] is the
//! sibling that evaluates eagerly instead.
//!
//! Because the true successor is not known at insertion time, the key used
//! to order a queued edge is computed against the *predecessor's* state
//! (with the successor's prospective `g`): a cheap proxy, refined into a
//! real evaluation only once the edge is popped.

use crate::cost_type::CostType;
use crate::evaluation_context::{EvaluationContext, SharedEvaluator};
use crate::open_lists::{OpenList, OpenListEntry};
use crate::plan::Plan;
use crate::rng::PlannerRng;
use crate::search_engines::{ResourceLimits, SearchStatistics, SearchStatus};
use crate::search_space::{SearchNodeStatus, SearchSpace};
use crate::state_registry::{StateId, StateRegistry};
use crate::successor_generator::SuccessorGenerator;
use crate::task::{OperatorId, Task};
use std::collections::HashSet;
use std::rc::Rc;

/// How applicable operators are ordered before being queued as edges.
/// Reordering only ever affects insertion order among entries tied on
/// priority, via the open list's FIFO tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredOperatorMode {
    /// Preferred operators first, otherwise successor-generator order.
    ListFirst,
    /// A uniformly random permutation of the applicable operators.
    Randomize,
    /// No reordering: exactly the successor generator's order.
    GeneratorOrder,
}

fn any_reliable_dead_end(evaluators: &[SharedEvaluator], context: &mut EvaluationContext) -> bool {
    evaluators
        .iter()
        .any(|e| context.get_result(e).reliable_dead_end)
}

fn dedup_path_dependent(groups: &[&[SharedEvaluator]]) -> Vec<SharedEvaluator> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for group in groups {
        for evaluator in group.iter() {
            let ptr = Rc::as_ptr(evaluator) as *const () as usize;
            if seen.insert(ptr) && evaluator.borrow().is_path_dependent() {
                out.push(evaluator.clone());
            }
        }
    }
    out
}

#[derive(Debug)]
pub struct LazyBestFirstSearch<'a> {
    task: &'a Task,
    successor_generator: &'a SuccessorGenerator,
    registry: StateRegistry,
    search_space: SearchSpace,
    open_list: Box<dyn OpenList<OpenListEntry>>,
    dead_end_evaluators: Vec<SharedEvaluator>,
    preferred_operator_evaluators: Vec<SharedEvaluator>,
    path_dependent_evaluators: Vec<SharedEvaluator>,
    cost_type: CostType,
    bound: i32,
    preferred_mode: PreferredOperatorMode,
    rng: Option<PlannerRng>,
    statistics: SearchStatistics,
}

impl<'a> LazyBestFirstSearch<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        task: &'a Task,
        successor_generator: &'a SuccessorGenerator,
        open_list: Box<dyn OpenList<OpenListEntry>>,
        dead_end_evaluators: Vec<SharedEvaluator>,
        preferred_operator_evaluators: Vec<SharedEvaluator>,
        cost_type: CostType,
        bound: i32,
        preferred_mode: PreferredOperatorMode,
        rng: Option<PlannerRng>,
    ) -> Result<Self, crate::error::PlannerError> {
        if preferred_mode == PreferredOperatorMode::Randomize && rng.is_none() {
            return Err(crate::error::PlannerError::InputError(
                "randomize preferred-operator mode requires an rng".to_string(),
            ));
        }
        let registry = StateRegistry::new(task)?;
        let path_dependent_evaluators =
            dedup_path_dependent(&[&dead_end_evaluators, &preferred_operator_evaluators]);
        Ok(Self {
            task,
            successor_generator,
            registry,
            search_space: SearchSpace::new(),
            open_list,
            dead_end_evaluators,
            preferred_operator_evaluators,
            path_dependent_evaluators,
            cost_type,
            bound,
            preferred_mode,
            rng,
            statistics: SearchStatistics::new(),
        })
    }

    pub fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    fn order_for_insertion(&mut self, ops: &mut [OperatorId], preferred: &HashSet<OperatorId>) {
        match self.preferred_mode {
            PreferredOperatorMode::GeneratorOrder => {}
            PreferredOperatorMode::ListFirst => {
                ops.sort_by_key(|op| !preferred.contains(op));
            }
            PreferredOperatorMode::Randomize => {
                let rng = self.rng.as_mut().expect("checked in new()");
                for i in (1..ops.len()).rev() {
                    let j = rng.gen_range_usize(i + 1);
                    ops.swap(i, j);
                }
            }
        }
    }

    /// Closes `state` (which must already be open) and queues edges for its
    /// applicable operators, or reports a solution if it already satisfies
    /// the goal.
    fn expand(&mut self, state: StateId) -> Option<SearchStatus> {
        let values = self.registry.state_values(state);
        if self.task.goal.is_satisfied(&values) {
            let steps = self.search_space.trace_plan(&self.registry, state);
            return Some(SearchStatus::Solved(Plan::new(steps)));
        }

        self.search_space.node(&self.registry, state).close();
        self.statistics.increment_expanded();

        let mut applicable = Vec::new();
        self.successor_generator
            .generate_applicable_ops(&values, &mut applicable);

        let (g, real_g) = {
            let node = self.search_space.node(&self.registry, state);
            (node.g(), node.real_g())
        };

        let preferred: HashSet<OperatorId> = {
            let mut context = EvaluationContext::new(&self.registry, state, g, false);
            let mut set = HashSet::new();
            for evaluator in &self.preferred_operator_evaluators {
                set.extend(context.get_result(evaluator).preferred_operators);
            }
            set
        };
        if !preferred.is_empty() {
            self.open_list.boost_preferred();
        }

        self.order_for_insertion(&mut applicable, &preferred);
        self.statistics.increment_generated_by(applicable.len());

        for op_id in applicable {
            let op = self.task.operator(op_id);
            if real_g + op.cost >= self.bound {
                continue;
            }
            let prospective_g = g + self.cost_type.adjust(op.cost);
            let mut context = EvaluationContext::new(
                &self.registry,
                state,
                prospective_g,
                preferred.contains(&op_id),
            );
            self.open_list
                .insert(&mut context, OpenListEntry::Edge(state, op_id));
        }
        None
    }

    #[tracing::instrument(skip(self, limits), fields(task_variables = self.task.variables.len()))]
    pub fn search(&mut self, limits: &ResourceLimits) -> SearchStatus {
        let initial = self.registry.initial_state_id();
        for evaluator in &self.path_dependent_evaluators {
            evaluator.borrow_mut().notify_initial_state(initial);
        }
        {
            let mut context = EvaluationContext::new(&self.registry, initial, 0, false);
            if any_reliable_dead_end(&self.dead_end_evaluators, &mut context) {
                self.statistics.finalize();
                return SearchStatus::Unsolvable;
            }
        }
        self.search_space.node(&self.registry, initial).open_initial();
        if let Some(status) = self.expand(initial) {
            self.statistics.finalize();
            return status;
        }

        let mut incomplete = false;

        loop {
            if let Some(status) = limits.check() {
                self.statistics.finalize();
                return status;
            }

            let entry = match self.open_list.pop() {
                Some(entry) => entry,
                None => {
                    self.statistics.finalize();
                    return if incomplete {
                        SearchStatus::UnsolvedIncomplete
                    } else {
                        SearchStatus::Unsolvable
                    };
                }
            };
            let OpenListEntry::Edge(predecessor, op_id) = entry else {
                unreachable!("lazy search only ever inserts Edge entries");
            };

            let (pred_g, pred_real_g) = {
                let node = self.search_space.node(&self.registry, predecessor);
                (node.g(), node.real_g())
            };
            let op = self.task.operator(op_id);
            let real_g_new = pred_real_g + op.cost;
            if real_g_new >= self.bound {
                continue;
            }

            let child = self.registry.successor(predecessor, op);
            for evaluator in &self.path_dependent_evaluators {
                evaluator
                    .borrow_mut()
                    .notify_state_transition(predecessor, op_id, child);
            }

            if self.search_space.node(&self.registry, child).status() != SearchNodeStatus::New {
                continue;
            }

            let g_new = pred_g + self.cost_type.adjust(op.cost);
            let mut context = EvaluationContext::new(&self.registry, child, g_new, false);
            self.statistics.increment_evaluated();
            if any_reliable_dead_end(&self.dead_end_evaluators, &mut context) {
                self.search_space.node(&self.registry, child).mark_dead_end();
                self.statistics.increment_dead_ends();
                continue;
            }
            if self
                .dead_end_evaluators
                .iter()
                .any(|e| context.get_result(e).value == crate::evaluation_context::INFINITE)
            {
                incomplete = true;
            }

            self.search_space
                .node(&self.registry, child)
                .open(g_new, real_g_new, predecessor, op_id);

            if let Some(status) = self.expand(child) {
                self.statistics.finalize();
                return status;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation_context::INFINITE;
    use crate::evaluators::GEvaluator;
    use crate::open_lists::BestFirstOpenList;
    use crate::task::{Effect, Fact, Operator, TaskBuilder, Variable};
    use std::cell::RefCell;

    fn corridor_task(length: usize) -> Task {
        let mut builder = TaskBuilder::new();
        builder.add_variable(Variable::new("pos", length + 1), 0);
        for i in 0..length {
            builder.add_operator(Operator::new(
                format!("advance-{i}"),
                vec![Fact::new(0, i)],
                vec![Effect::unconditional(Fact::new(0, i + 1))],
                1,
            ));
        }
        builder.set_goal(vec![Fact::new(0, length)]);
        builder.build().unwrap()
    }

    #[test]
    fn lazy_search_finds_a_plan_with_duplicate_edges_discarded() {
        let task = corridor_task(5);
        let generator = SuccessorGenerator::new(&task);
        let g: SharedEvaluator = Rc::new(RefCell::new(GEvaluator::new()));
        let open_list: Box<dyn OpenList<OpenListEntry>> =
            Box::new(BestFirstOpenList::new(g.clone()));
        let mut engine = LazyBestFirstSearch::new(
            &task,
            &generator,
            open_list,
            vec![g],
            vec![],
            CostType::Normal,
            INFINITE,
            PreferredOperatorMode::GeneratorOrder,
            None,
        )
        .unwrap();
        let status = engine.search(&ResourceLimits::unbounded());
        let plan = status.plan().expect("expected a solution");
        assert_eq!(plan.len(), 5);
    }

    #[test]
    fn randomize_mode_without_an_rng_is_rejected() {
        let task = corridor_task(1);
        let generator = SuccessorGenerator::new(&task);
        let g: SharedEvaluator = Rc::new(RefCell::new(GEvaluator::new()));
        let open_list: Box<dyn OpenList<OpenListEntry>> =
            Box::new(BestFirstOpenList::new(g.clone()));
        let result = LazyBestFirstSearch::new(
            &task,
            &generator,
            open_list,
            vec![g],
            vec![],
            CostType::Normal,
            INFINITE,
            PreferredOperatorMode::Randomize,
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn unreachable_goal_is_reported_unsolvable() {
        let mut builder = TaskBuilder::new();
        builder.add_variable(Variable::new("pos", 2), 0);
        builder.set_goal(vec![Fact::new(0, 1)]);
        let task = builder.build().unwrap();
        let generator = SuccessorGenerator::new(&task);
        let g: SharedEvaluator = Rc::new(RefCell::new(GEvaluator::new()));
        let open_list: Box<dyn OpenList<OpenListEntry>> =
            Box::new(BestFirstOpenList::new(g.clone()));
        let mut engine = LazyBestFirstSearch::new(
            &task,
            &generator,
            open_list,
            vec![g],
            vec![],
            CostType::Normal,
            INFINITE,
            PreferredOperatorMode::GeneratorOrder,
            None,
        )
        .unwrap();
        assert_eq!(engine.search(&ResourceLimits::unbounded()), SearchStatus::Unsolvable);
    }
}
