//! Enforced hill-climbing: a local search that, from a *current* state,
//! breadth-first searches outward (optionally restricted to or ordered by
//! preferred operators) until it finds a state with strictly smaller
//! heuristic value, which becomes the new current state. Each such
//! improvement is one "EHC phase"; the sub-search is discarded and restarted
//! from scratch on every phase.

use crate::cost_type::CostType;
use crate::evaluation_context::{EvaluationContext, SharedEvaluator, INFINITE};
use crate::plan::Plan;
use crate::search_engines::{ResourceLimits, SearchStatistics, SearchStatus};
use crate::search_space::SearchSpace;
use crate::state_registry::{StateId, StateRegistry};
use crate::successor_generator::SuccessorGenerator;
use crate::task::{OperatorId, Task};
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;
use tracing::debug;

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
pub struct EnforcedHillClimbing<'a> {
    task: &'a Task,
    successor_generator: &'a SuccessorGenerator,
    registry: StateRegistry,
    search_space: SearchSpace,
    h_evaluator: SharedEvaluator,
    preferred_operator_evaluators: Vec<SharedEvaluator>,
    path_dependent_evaluators: Vec<SharedEvaluator>,
    /// Restrict each BFS expansion to preferred operators when the state
    /// has any, instead of merely using them to order the frontier.
    restrict_to_preferred: bool,
    cost_type: CostType,
    statistics: SearchStatistics,
    phases: u64,
}

impl<'a> EnforcedHillClimbing<'a> {
    pub fn new(
        task: &'a Task,
        successor_generator: &'a SuccessorGenerator,
        h_evaluator: SharedEvaluator,
        preferred_operator_evaluators: Vec<SharedEvaluator>,
        restrict_to_preferred: bool,
        cost_type: CostType,
    ) -> Result<Self, crate::error::PlannerError> {
        let registry = StateRegistry::new(task)?;
        let path_dependent_evaluators = dedup_path_dependent(&[
            std::slice::from_ref(&h_evaluator),
            &preferred_operator_evaluators,
        ]);
        Ok(Self {
            task,
            successor_generator,
            registry,
            search_space: SearchSpace::new(),
            h_evaluator,
            preferred_operator_evaluators,
            path_dependent_evaluators,
            restrict_to_preferred,
            cost_type,
            statistics: SearchStatistics::new(),
            phases: 0,
        })
    }

    pub fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    pub fn phases(&self) -> u64 {
        self.phases
    }

    fn preferred_operators(&mut self, state: StateId, g: i32) -> HashSet<OperatorId> {
        let mut context = EvaluationContext::new(&self.registry, state, g, false);
        let mut set = HashSet::new();
        for evaluator in &self.preferred_operator_evaluators {
            set.extend(context.get_result(evaluator).preferred_operators);
        }
        set
    }

    #[tracing::instrument(skip(self, limits), fields(task_variables = self.task.variables.len()))]
    pub fn search(&mut self, limits: &ResourceLimits) -> SearchStatus {
        let mut current = self.registry.initial_state_id();
        self.search_space.node(&self.registry, current).open_initial();
        for evaluator in &self.path_dependent_evaluators {
            evaluator.borrow_mut().notify_initial_state(current);
        }

        let mut current_h = {
            let mut context = EvaluationContext::new(&self.registry, current, 0, false);
            let result = context.get_result(&self.h_evaluator);
            if result.reliable_dead_end {
                self.statistics.finalize();
                return SearchStatus::Unsolvable;
            }
            result.value
        };

        loop {
            if let Some(status) = limits.check() {
                self.statistics.finalize();
                return status;
            }

            let values = self.registry.state_values(current);
            if self.task.goal.is_satisfied(&values) {
                let steps = self.search_space.trace_plan(&self.registry, current);
                self.statistics.finalize();
                return SearchStatus::Solved(Plan::new(steps));
            }
            if current_h == INFINITE {
                self.statistics.finalize();
                return SearchStatus::UnsolvedIncomplete;
            }

            self.phases += 1;
            debug!(phase = self.phases, current_h, "starting ehc phase");

            let (root_g, root_real_g) = {
                let node = self.search_space.node(&self.registry, current);
                (node.g(), node.real_g())
            };

            let mut queue: VecDeque<StateId> = VecDeque::new();
            let mut parent_of: HashMap<StateId, (StateId, OperatorId, i32, i32)> = HashMap::new();
            let mut visited: HashSet<StateId> = HashSet::new();
            queue.push_back(current);
            visited.insert(current);

            let mut found: Option<(StateId, i32)> = None;

            'bfs: while let Some(state) = queue.pop_front() {
                if let Some(status) = limits.check() {
                    self.statistics.finalize();
                    return status;
                }
                self.statistics.increment_expanded();

                let (g_state, real_g_state) = if state == current {
                    (root_g, root_real_g)
                } else {
                    let &(_, _, g, real_g) = &parent_of[&state];
                    (g, real_g)
                };

                let values = self.registry.state_values(state);
                let mut applicable = Vec::new();
                self.successor_generator
                    .generate_applicable_ops(&values, &mut applicable);

                let preferred = self.preferred_operators(state, g_state);
                let to_expand: Vec<OperatorId> = if self.restrict_to_preferred && !preferred.is_empty()
                {
                    applicable
                        .into_iter()
                        .filter(|op| preferred.contains(op))
                        .collect()
                } else {
                    applicable
                };

                for op_id in to_expand {
                    let op = self.task.operator(op_id);
                    let child = self.registry.successor(state, op);
                    for evaluator in &self.path_dependent_evaluators {
                        evaluator
                            .borrow_mut()
                            .notify_state_transition(state, op_id, child);
                    }
                    if !visited.insert(child) {
                        continue;
                    }
                    self.statistics.increment_generated_by(1);

                    let g_new = g_state + self.cost_type.adjust(op.cost);
                    let real_g_new = real_g_state + op.cost;
                    let is_preferred = preferred.contains(&op_id);
                    let mut context =
                        EvaluationContext::new(&self.registry, child, g_new, is_preferred);
                    self.statistics.increment_evaluated();
                    let result = context.get_result(&self.h_evaluator);
                    if result.reliable_dead_end {
                        self.statistics.increment_dead_ends();
                        continue;
                    }
                    parent_of.insert(child, (state, op_id, g_new, real_g_new));
                    if result.value < current_h {
                        found = Some((child, result.value));
                        break 'bfs;
                    }
                    queue.push_back(child);
                }
            }

            match found {
                Some((improved, improved_h)) => {
                    let mut chain = Vec::new();
                    let mut cursor = improved;
                    while cursor != current {
                        let &(parent, op_id, g, real_g) = &parent_of[&cursor];
                        chain.push((cursor, parent, op_id, g, real_g));
                        cursor = parent;
                    }
                    for (child, parent, op_id, g, real_g) in chain.into_iter().rev() {
                        self.search_space
                            .node(&self.registry, child)
                            .open(g, real_g, parent, op_id);
                    }
                    current = improved;
                    current_h = improved_h;
                }
                None => {
                    self.statistics.finalize();
                    return SearchStatus::UnsolvedIncomplete;
                }
            }
        }
    }
}
