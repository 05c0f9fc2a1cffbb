//! Runs a sequence of search-engine configurations in order, e.g. a quick
//! greedy pass followed by a bound A* pass, or repeated weighted-A* restarts
//! with a tightening cost bound. Each phase's engine is built fresh (so a
//! later phase never inherits an earlier phase's open list or closed set),
//! but statistics accumulate across phases and the best plan found by any
//! phase is the overall result.

use crate::error::PlannerError;
use crate::plan::Plan;
use crate::search_engines::{ResourceLimits, SearchStatistics, SearchStatus};
use crate::task::Task;

/// What [`EagerBestFirstSearch`](crate::search_engines::EagerBestFirstSearch),
/// [`LazyBestFirstSearch`](crate::search_engines::LazyBestFirstSearch) and
/// [`EnforcedHillClimbing`](crate::search_engines::EnforcedHillClimbing) all
/// have in common, so [`IteratedSearch`] can drive any of them without
/// knowing which.
pub trait SearchEngine {
    fn search(&mut self, limits: &ResourceLimits) -> SearchStatus;
    fn statistics(&self) -> &SearchStatistics;
}

impl<'a> SearchEngine for crate::search_engines::EagerBestFirstSearch<'a> {
    fn search(&mut self, limits: &ResourceLimits) -> SearchStatus {
        crate::search_engines::EagerBestFirstSearch::search(self, limits)
    }
    fn statistics(&self) -> &SearchStatistics {
        crate::search_engines::EagerBestFirstSearch::statistics(self)
    }
}

impl<'a> SearchEngine for crate::search_engines::LazyBestFirstSearch<'a> {
    fn search(&mut self, limits: &ResourceLimits) -> SearchStatus {
        crate::search_engines::LazyBestFirstSearch::search(self, limits)
    }
    fn statistics(&self) -> &SearchStatistics {
        crate::search_engines::LazyBestFirstSearch::statistics(self)
    }
}

impl<'a> SearchEngine for crate::search_engines::EnforcedHillClimbing<'a> {
    fn search(&mut self, limits: &ResourceLimits) -> SearchStatus {
        crate::search_engines::EnforcedHillClimbing::search(self, limits)
    }
    fn statistics(&self) -> &SearchStatistics {
        crate::search_engines::EnforcedHillClimbing::statistics(self)
    }
}

/// One configured phase: a human-readable name plus a factory that builds a
/// fresh engine given the current cost bound (tightened between phases when
/// `pass_bound` is set).
pub struct PhaseSpec<'a> {
    pub name: String,
    #[allow(clippy::type_complexity)]
    factory: Box<dyn Fn(i32) -> Result<Box<dyn SearchEngine + 'a>, PlannerError> + 'a>,
}

impl<'a> PhaseSpec<'a> {
    pub fn new(
        name: impl Into<String>,
        factory: impl Fn(i32) -> Result<Box<dyn SearchEngine + 'a>, PlannerError> + 'a,
    ) -> Self {
        Self {
            name: name.into(),
            factory: Box::new(factory),
        }
    }
}

/// The outcome of running one phase to completion.
#[derive(Debug, Clone)]
pub struct PhaseOutcome {
    pub name: String,
    pub status: SearchStatus,
}

pub struct IteratedSearch<'a> {
    task: &'a Task,
    phases: Vec<PhaseSpec<'a>>,
    pass_bound: bool,
    repeat_last: bool,
    continue_on_fail: bool,
    continue_on_solve: bool,
    statistics: SearchStatistics,
}

impl<'a> IteratedSearch<'a> {
    pub fn new(
        task: &'a Task,
        phases: Vec<PhaseSpec<'a>>,
        pass_bound: bool,
        repeat_last: bool,
        continue_on_fail: bool,
        continue_on_solve: bool,
    ) -> Self {
        Self {
            task,
            phases,
            pass_bound,
            repeat_last,
            continue_on_fail,
            continue_on_solve,
            statistics: SearchStatistics::new(),
        }
    }

    pub fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    /// Runs every configured phase in order (cycling the last one while it
    /// keeps improving, if `repeat_last` is set), returning the best plan
    /// found by any phase and a per-phase breakdown. `SOLVED` iff at least
    /// one phase solved the task.
    pub fn run(
        &mut self,
        limits: &ResourceLimits,
    ) -> Result<(SearchStatus, Vec<PhaseOutcome>), PlannerError> {
        let mut bound = crate::evaluation_context::INFINITE;
        let mut best: Option<Plan> = None;
        let mut best_cost = crate::evaluation_context::INFINITE;
        let mut outcomes = Vec::new();

        let mut i = 0;
        while i < self.phases.len() {
            if let Some(status) = limits.check() {
                outcomes.push(PhaseOutcome {
                    name: self.phases[i].name.clone(),
                    status: status.clone(),
                });
                self.statistics.finalize();
                let overall = best.clone().map(SearchStatus::Solved).unwrap_or(status);
                return Ok((overall, outcomes));
            }

            let cost_before_phase = best_cost;
            let mut engine = (self.phases[i].factory)(bound)?;
            let status = engine.search(limits);
            self.statistics.accumulate(engine.statistics());

            if let SearchStatus::Solved(ref plan) = status {
                let cost = plan.cost(self.task);
                if cost < best_cost {
                    best_cost = cost;
                    best = Some(plan.clone());
                }
                if self.pass_bound {
                    bound = best_cost;
                }
            }

            outcomes.push(PhaseOutcome {
                name: self.phases[i].name.clone(),
                status: status.clone(),
            });

            let solved = status.is_solved();
            let is_last = i == self.phases.len() - 1;

            if solved && self.repeat_last && is_last && best_cost < cost_before_phase {
                // Cycle the final configuration again under the tighter
                // bound; stop once a repeat stops improving.
                continue;
            }

            if solved && !self.continue_on_solve {
                break;
            }
            if !solved && !self.continue_on_fail {
                break;
            }
            i += 1;
        }

        self.statistics.finalize();
        let overall = best.map(SearchStatus::Solved).unwrap_or(SearchStatus::Unsolvable);
        Ok((overall, outcomes))
    }
}
