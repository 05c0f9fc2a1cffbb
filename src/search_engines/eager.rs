//! Eager best-first search: the open list holds *states*, each evaluated
//! immediately when it is generated. Plugging in `g` alone gives uniform-cost
//! search, `h` alone gives greedy best-first search, and `g + h` (or a
//! [`crate::evaluators::WeightedEvaluator`] over `h`) gives A*/weighted A*.
//! [`crate::search_engines::lazy`] is the sibling that defers evaluation to
//! pop time instead.

use crate::cost_type::CostType;
use crate::evaluation_context::{EvaluationContext, SharedEvaluator, INFINITE};
use crate::open_lists::{OpenList, OpenListEntry};
use crate::plan::Plan;
use crate::search_engines::{ResourceLimits, SearchStatistics, SearchStatus};
use crate::search_space::SearchSpace;
use crate::state_registry::{StateId, StateRegistry};
use crate::successor_generator::SuccessorGenerator;
use crate::task::Task;
use std::collections::HashSet;
use std::rc::Rc;
use tracing::{debug, trace};

/// True if any of `evaluators` reports a *reliable* dead end against
/// `context`, i.e. one safe to prune on without risking incompleteness.
fn any_reliable_dead_end(evaluators: &[SharedEvaluator], context: &mut EvaluationContext) -> bool {
    evaluators
        .iter()
        .any(|e| context.get_result(e).reliable_dead_end)
}

/// True if any of `evaluators` reports `INFINITE` without that being backed
/// by a dead-end proof. Pruning on this is unsound: it may discard a
/// solution, so a search that does it can only report `UnsolvedIncomplete`,
/// never `Unsolvable`, if its open list subsequently empties.
fn any_unreliable_infinite(evaluators: &[SharedEvaluator], context: &mut EvaluationContext) -> bool {
    evaluators.iter().any(|e| {
        let result = context.get_result(e);
        result.value == INFINITE && !result.reliable_dead_end
    })
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

/// Generalizes eager A*, weighted A* and greedy best-first search over a
/// configurable open list and evaluator set.
#[derive(Debug)]
pub struct EagerBestFirstSearch<'a> {
    task: &'a Task,
    successor_generator: &'a SuccessorGenerator,
    registry: StateRegistry,
    search_space: SearchSpace,
    open_list: Box<dyn OpenList<OpenListEntry>>,
    dead_end_evaluators: Vec<SharedEvaluator>,
    preferred_operator_evaluators: Vec<SharedEvaluator>,
    path_dependent_evaluators: Vec<SharedEvaluator>,
    cost_type: CostType,
    reopen_closed: bool,
    use_multi_path_dependence: bool,
    bound: i32,
    statistics: SearchStatistics,
}

impl<'a> EagerBestFirstSearch<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        task: &'a Task,
        successor_generator: &'a SuccessorGenerator,
        open_list: Box<dyn OpenList<OpenListEntry>>,
        dead_end_evaluators: Vec<SharedEvaluator>,
        preferred_operator_evaluators: Vec<SharedEvaluator>,
        cost_type: CostType,
        reopen_closed: bool,
        use_multi_path_dependence: bool,
        bound: i32,
    ) -> Result<Self, crate::error::PlannerError> {
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
            reopen_closed,
            use_multi_path_dependence,
            bound,
            statistics: SearchStatistics::new(),
        })
    }

    pub fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    pub fn registry(&self) -> &StateRegistry {
        &self.registry
    }

    /// Repeatedly pops from the open list until a node is found that is not
    /// already closed and, under multi-path dependence, whose cached `h`
    /// has not risen since it was inserted. Returns `None` once the open
    /// list is exhausted.
    fn fetch_next_node(&mut self) -> Option<StateId> {
        loop {
            let entry = self.open_list.pop()?;
            let OpenListEntry::State(state) = entry else {
                unreachable!("eager search only ever inserts State entries");
            };
            if self.search_space.node(&self.registry, state).is_closed() {
                continue;
            }
            if self.use_multi_path_dependence
                && self.search_space.node(&self.registry, state).h_is_dirty()
            {
                let g = self.search_space.node(&self.registry, state).g();
                let old_h = self.search_space.node(&self.registry, state).h();
                let mut context = EvaluationContext::new(&self.registry, state, g, false);
                if any_reliable_dead_end(&self.dead_end_evaluators, &mut context) {
                    self.search_space.node(&self.registry, state).mark_dead_end();
                    self.statistics.increment_dead_ends();
                    continue;
                }
                let new_h = self.dead_end_evaluators.first().map(|e| context.get_result(e).value);
                self.search_space.node(&self.registry, state).clear_h_dirty();
                if let (Some(old), Some(new)) = (old_h, new_h) {
                    if new > old {
                        if let Some(new) = new_h {
                            self.search_space.node(&self.registry, state).set_h(new);
                        }
                        self.open_list.insert(&mut context, OpenListEntry::State(state));
                        continue;
                    }
                }
            }
            return Some(state);
        }
    }

    /// Runs the search to completion (solved, proven unsolvable, or
    /// resource-limited), checking `limits` between expansion steps.
    #[tracing::instrument(skip(self, limits), fields(task_variables = self.task.variables.len()))]
    pub fn search(&mut self, limits: &ResourceLimits) -> SearchStatus {
        let initial = self.registry.initial_state_id();
        for evaluator in &self.path_dependent_evaluators {
            evaluator.borrow_mut().notify_initial_state(initial);
        }

        {
            let mut context = EvaluationContext::new(&self.registry, initial, 0, false);
            if any_reliable_dead_end(&self.dead_end_evaluators, &mut context) {
                debug!("initial state is a dead end");
                return SearchStatus::Unsolvable;
            }
        }
        self.search_space.node(&self.registry, initial).open_initial();
        {
            let mut context = EvaluationContext::new(&self.registry, initial, 0, false);
            self.open_list.insert(&mut context, OpenListEntry::State(initial));
        }
        self.statistics.increment_generated_by(1);

        let mut incomplete = false;

        loop {
            if let Some(status) = limits.check() {
                self.statistics.finalize();
                return status;
            }

            let current = match self.fetch_next_node() {
                Some(state) => state,
                None => {
                    self.statistics.finalize();
                    return if incomplete {
                        SearchStatus::UnsolvedIncomplete
                    } else {
                        SearchStatus::Unsolvable
                    };
                }
            };

            let state_values = self.registry.state_values(current);
            if self.task.goal.is_satisfied(&state_values) {
                let steps = self.search_space.trace_plan(&self.registry, current);
                self.statistics.finalize();
                return SearchStatus::Solved(Plan::new(steps));
            }

            self.search_space.node(&self.registry, current).close();
            self.statistics.increment_expanded();

            let mut applicable = Vec::new();
            self.successor_generator
                .generate_applicable_ops(&state_values, &mut applicable);

            let (current_g, current_real_g) = {
                let node = self.search_space.node(&self.registry, current);
                (node.g(), node.real_g())
            };

            let preferred: HashSet<usize> = {
                let mut context = EvaluationContext::new(&self.registry, current, current_g, false);
                let mut set = HashSet::new();
                for evaluator in &self.preferred_operator_evaluators {
                    set.extend(context.get_result(evaluator).preferred_operators);
                }
                set
            };
            if !preferred.is_empty() {
                self.open_list.boost_preferred();
            }

            for &op_id in &applicable {
                let op = self.task.operator(op_id);
                if current_real_g + op.cost >= self.bound {
                    continue;
                }

                let child = self.registry.successor(current, op);
                for evaluator in &self.path_dependent_evaluators {
                    evaluator
                        .borrow_mut()
                        .notify_state_transition(current, op_id, child);
                }

                if self.search_space.node(&self.registry, child).is_dead_end() {
                    continue;
                }

                let adjusted_cost = self.cost_type.adjust(op.cost);
                let g_new = current_g + adjusted_cost;
                let real_g_new = current_real_g + op.cost;
                let is_preferred = preferred.contains(&op_id);

                let child_status = self.search_space.node(&self.registry, child).status();
                match child_status {
                    crate::search_space::SearchNodeStatus::New => {
                        let mut context =
                            EvaluationContext::new(&self.registry, child, g_new, is_preferred);
                        self.statistics.increment_evaluated();
                        if any_reliable_dead_end(&self.dead_end_evaluators, &mut context) {
                            self.search_space.node(&self.registry, child).mark_dead_end();
                            self.statistics.increment_dead_ends();
                            continue;
                        }
                        if any_unreliable_infinite(&self.dead_end_evaluators, &mut context) {
                            incomplete = true;
                        }
                        self.search_space
                            .node(&self.registry, child)
                            .open(g_new, real_g_new, current, op_id);
                        if let Some(first) = self.dead_end_evaluators.first() {
                            let h = context.get_result(first).value;
                            self.search_space.node(&self.registry, child).set_h(h);
                        }
                        self.open_list.insert(&mut context, OpenListEntry::State(child));
                        self.statistics.increment_generated_by(1);
                    }
                    crate::search_space::SearchNodeStatus::DeadEnd => {}
                    crate::search_space::SearchNodeStatus::Open
                    | crate::search_space::SearchNodeStatus::Closed => {
                        let existing_g = self.search_space.node(&self.registry, child).g();
                        if g_new < existing_g {
                            if child_status == crate::search_space::SearchNodeStatus::Closed {
                                if self.reopen_closed {
                                    self.search_space.node(&self.registry, child).reopen(
                                        g_new,
                                        real_g_new,
                                        current,
                                        op_id,
                                    );
                                    let mut context = EvaluationContext::new(
                                        &self.registry,
                                        child,
                                        g_new,
                                        is_preferred,
                                    );
                                    self.open_list
                                        .insert(&mut context, OpenListEntry::State(child));
                                    self.statistics.increment_reopened();
                                } else {
                                    self.search_space.node(&self.registry, child).open(
                                        g_new,
                                        real_g_new,
                                        current,
                                        op_id,
                                    );
                                    self.search_space.node(&self.registry, child).close();
                                }
                            } else {
                                self.search_space.node(&self.registry, child).open(
                                    g_new,
                                    real_g_new,
                                    current,
                                    op_id,
                                );
                            }
                        }
                    }
                }
            }

            trace!(
                expanded = self.statistics.expanded(),
                generated = self.statistics.generated(),
                "expanded node"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluators::{ConstEvaluator, GEvaluator};
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
    fn uniform_cost_search_finds_the_shortest_path() {
        let task = corridor_task(4);
        let generator = SuccessorGenerator::new(&task);
        let g: SharedEvaluator = Rc::new(RefCell::new(GEvaluator::new()));
        let open_list: Box<dyn OpenList<OpenListEntry>> =
            Box::new(BestFirstOpenList::new(g.clone()));
        let mut engine = EagerBestFirstSearch::new(
            &task,
            &generator,
            open_list,
            vec![g],
            vec![],
            CostType::Normal,
            true,
            false,
            INFINITE,
        )
        .unwrap();
        let status = engine.search(&ResourceLimits::unbounded());
        let plan = status.plan().expect("expected a solution");
        assert_eq!(plan.len(), 4);
        assert_eq!(plan.cost(&task), 4);
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
        let mut engine = EagerBestFirstSearch::new(
            &task,
            &generator,
            open_list,
            vec![g],
            vec![],
            CostType::Normal,
            true,
            false,
            INFINITE,
        )
        .unwrap();
        assert_eq!(engine.search(&ResourceLimits::unbounded()), SearchStatus::Unsolvable);
    }

    #[test]
    fn initial_state_already_satisfying_the_goal_yields_an_empty_plan() {
        let mut builder = TaskBuilder::new();
        builder.add_variable(Variable::new("pos", 2), 1);
        builder.set_goal(vec![Fact::new(0, 1)]);
        let task = builder.build().unwrap();
        let generator = SuccessorGenerator::new(&task);
        let g: SharedEvaluator = Rc::new(RefCell::new(GEvaluator::new()));
        let open_list: Box<dyn OpenList<OpenListEntry>> =
            Box::new(BestFirstOpenList::new(g.clone()));
        let mut engine = EagerBestFirstSearch::new(
            &task,
            &generator,
            open_list,
            vec![g],
            vec![],
            CostType::Normal,
            true,
            false,
            INFINITE,
        )
        .unwrap();
        let status = engine.search(&ResourceLimits::unbounded());
        assert!(status.plan().unwrap().is_empty());
    }

    #[test]
    fn cost_bound_prunes_plans_at_or_above_the_bound() {
        let task = corridor_task(4);
        let generator = SuccessorGenerator::new(&task);
        let g: SharedEvaluator = Rc::new(RefCell::new(GEvaluator::new()));
        let open_list: Box<dyn OpenList<OpenListEntry>> =
            Box::new(BestFirstOpenList::new(g.clone()));
        let mut engine = EagerBestFirstSearch::new(
            &task,
            &generator,
            open_list,
            vec![g],
            vec![],
            CostType::Normal,
            true,
            false,
            3,
        )
        .unwrap();
        assert_eq!(engine.search(&ResourceLimits::unbounded()), SearchStatus::Unsolvable);
    }

    #[test]
    fn evaluator_reporting_infinite_without_reliability_still_finds_a_plan_but_marks_incomplete() {
        let task = corridor_task(2);
        let generator = SuccessorGenerator::new(&task);
        let g: SharedEvaluator = Rc::new(RefCell::new(GEvaluator::new()));
        // A const evaluator that never proves a dead end but never reports
        // INFINITE either, so it should not affect this small task's result;
        // this just exercises that a second dead-end evaluator composes.
        let c: SharedEvaluator = Rc::new(RefCell::new(ConstEvaluator::new(0)));
        let open_list: Box<dyn OpenList<OpenListEntry>> =
            Box::new(BestFirstOpenList::new(g.clone()));
        let mut engine = EagerBestFirstSearch::new(
            &task,
            &generator,
            open_list,
            vec![g, c],
            vec![],
            CostType::Normal,
            true,
            false,
            INFINITE,
        )
        .unwrap();
        let status = engine.search(&ResourceLimits::unbounded());
        assert!(status.is_solved());
    }
}
