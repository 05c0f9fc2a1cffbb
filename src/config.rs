//! Resolves a small tag-based configuration surface into concrete engine,
//! evaluator and open-list objects, mirroring how the teacher's
//! `HeuristicName`/`SuccessorGeneratorName`/`SearchEngineName` enums each
//! resolve a `clap::ValueEnum` tag to a boxed trait object via a `create`
//! method. `EngineConfig` is the equivalent entry point here: one struct
//! covers every algorithm tag, since the tags differ only in which open
//! list and evaluator combination they wire up, not in the search loop
//! itself.

use crate::cost_type::CostType;
use crate::evaluation_context::{SharedEvaluator, INFINITE};
use crate::evaluators::{ConstEvaluator, GEvaluator, GoalCountEvaluator, SumEvaluator, WeightedEvaluator};
use crate::error::PlannerError;
use crate::open_lists::{AlternationOpenList, BestFirstOpenList, OpenList, OpenListEntry};
use crate::rng::PlannerRng;
use crate::search_engines::{
    EagerBestFirstSearch, EnforcedHillClimbing, IteratedSearch, LazyBestFirstSearch, PhaseSpec,
    PreferredOperatorMode, SearchEngine,
};
use crate::successor_generator::SuccessorGenerator;
use crate::task::Task;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Which search algorithm `EngineConfig` should build. The `*_greedy` and
/// `*_wastar`/`astar` variants are not distinct algorithms so much as fixed
/// parameterizations of eager best-first search, named separately because
/// that is how they are asked for on a command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[clap(rename_all = "kebab-case")]
pub enum AlgorithmTag {
    /// Eager best-first search, ordered by the evaluator list as given.
    Eager,
    /// Eager best-first search with `reopen_closed` forced off, i.e. greedy.
    EagerGreedy,
    /// Eager best-first search ordered by `g + w * h`, `reopen_closed` on.
    EagerWastar,
    /// `eager_wastar` with `w` forced to 1: plain A*.
    Astar,
    /// Lazy best-first search, ordered by the evaluator list as given.
    Lazy,
    /// Lazy best-first search with greedy ordering (no g component implied).
    LazyGreedy,
    /// Lazy best-first search ordered by `g + w * h`.
    LazyWastar,
    /// Enforced hill-climbing.
    Ehc,
    /// A sequence of phases, each its own `EngineConfig`; see
    /// [`IteratedPlanConfig`].
    Iterated,
}

/// The handful of evaluator primitives this crate ships, since real
/// heuristics are out of scope. `GoalCount` needs the task's goal at build
/// time, so resolution takes the task rather than being a bare `From`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[clap(rename_all = "kebab-case")]
pub enum EvaluatorTag {
    /// [`GEvaluator`]: the node's accumulated g-value.
    G,
    /// [`GoalCountEvaluator`]: number of unsatisfied goal facts.
    GoalCount,
    /// [`ConstEvaluator`] fixed at zero; a placeholder for "no heuristic".
    Zero,
}

impl EvaluatorTag {
    pub fn build(self, task: &Task) -> SharedEvaluator {
        match self {
            EvaluatorTag::G => Rc::new(RefCell::new(GEvaluator::new())),
            EvaluatorTag::GoalCount => {
                Rc::new(RefCell::new(GoalCountEvaluator::new(task.goal.clone())))
            }
            EvaluatorTag::Zero => Rc::new(RefCell::new(ConstEvaluator::new(0))),
        }
    }
}

/// Combines a list of evaluators into one: the identity if there is exactly
/// one, otherwise a [`SumEvaluator`] over all of them.
fn combine(evals: Vec<SharedEvaluator>) -> Result<SharedEvaluator, PlannerError> {
    match evals.len() {
        0 => Err(PlannerError::InputError(
            "at least one evaluator is required".to_string(),
        )),
        1 => Ok(evals.into_iter().next().unwrap()),
        _ => Ok(Rc::new(RefCell::new(SumEvaluator::new(evals)))),
    }
}

/// One configured search-engine invocation: the algorithm tag plus every
/// parameter any tag might need. Unused fields for a given tag are simply
/// ignored (e.g. `w` is meaningless outside the wastar/astar tags).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub algorithm: AlgorithmTag,
    /// Evaluators combined (by sum) into the list's ordering key.
    pub evals: Vec<EvaluatorTag>,
    /// Evaluators consulted for preferred operators. Empty means "none".
    #[serde(default)]
    pub preferred: Vec<EvaluatorTag>,
    /// Weight applied to the combined evaluator in the wastar/astar tags.
    #[serde(default = "default_weight")]
    pub w: i32,
    /// Extra visits per lap given to the preferred-operator sublist when
    /// `preferred` is non-empty.
    #[serde(default)]
    pub boost: usize,
    /// Whether a CLOSED node found via a cheaper path is reopened (true) or
    /// merely has its parent pointer updated (false). Forced per tag for
    /// the named presets; only the bare `eager`/`lazy` tags honor it as
    /// given.
    #[serde(default)]
    pub reopen_closed: bool,
    /// Restrict enforced hill-climbing's BFS phases to preferred operators
    /// (when any exist) instead of merely ordering by them. Ignored outside
    /// the `ehc` tag.
    #[serde(default)]
    pub restrict_to_preferred: bool,
    #[serde(default)]
    pub bound: Option<i32>,
    #[serde(default)]
    pub max_time_seconds: Option<u64>,
    #[serde(default)]
    pub cost_type: CostType,
    /// Seed for the preferred-operator randomization mode. Required only
    /// when `preferred_mode` is `Randomize`.
    #[serde(default)]
    pub rng_seed: Option<u64>,
    #[serde(default)]
    pub preferred_mode: PreferredOperatorModeTag,
}

fn default_weight() -> i32 {
    1
}

/// Serde/clap-friendly mirror of [`PreferredOperatorMode`] (which itself
/// carries no derive for either, since it belongs to the search-engine
/// layer rather than the configuration layer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[clap(rename_all = "kebab-case")]
pub enum PreferredOperatorModeTag {
    #[default]
    ListFirst,
    Randomize,
    GeneratorOrder,
}

impl From<PreferredOperatorModeTag> for PreferredOperatorMode {
    fn from(tag: PreferredOperatorModeTag) -> Self {
        match tag {
            PreferredOperatorModeTag::ListFirst => PreferredOperatorMode::ListFirst,
            PreferredOperatorModeTag::Randomize => PreferredOperatorMode::Randomize,
            PreferredOperatorModeTag::GeneratorOrder => PreferredOperatorMode::GeneratorOrder,
        }
    }
}

/// What a resolved `EngineConfig` turns into: either an engine the caller
/// drives directly, or a description of the phases an `iterated` tag needs
/// built (deferred, since a phase's engine cannot be constructed until its
/// bound is known).
pub enum ResolvedEngine<'a> {
    Eager(Box<EagerBestFirstSearch<'a>>),
    Lazy(Box<LazyBestFirstSearch<'a>>),
    Ehc(Box<EnforcedHillClimbing<'a>>),
}

impl<'a> ResolvedEngine<'a> {
    /// Erases which concrete engine this is, for callers (the CLI, an
    /// [`IteratedPlanConfig`] phase factory) that only need to drive it via
    /// [`SearchEngine`].
    pub fn into_boxed(self) -> Box<dyn SearchEngine + 'a> {
        match self {
            ResolvedEngine::Eager(engine) => engine,
            ResolvedEngine::Lazy(engine) => engine,
            ResolvedEngine::Ehc(engine) => engine,
        }
    }
}

impl EngineConfig {
    fn bound_or_infinite(&self) -> i32 {
        self.bound.unwrap_or(INFINITE)
    }

    /// Builds the configured evaluator list's combined form plus any
    /// preferred-operator evaluators, resolved against `task`.
    fn resolve_evaluators(
        &self,
        task: &Task,
    ) -> Result<(SharedEvaluator, Vec<SharedEvaluator>), PlannerError> {
        let evals: Vec<SharedEvaluator> = self.evals.iter().map(|tag| tag.build(task)).collect();
        let combined = combine(evals)?;
        let preferred: Vec<SharedEvaluator> =
            self.preferred.iter().map(|tag| tag.build(task)).collect();
        Ok((combined, preferred))
    }

    /// Builds the open list appropriate for an eager/lazy engine: a plain
    /// `BestFirstOpenList` ordered by `key`, or, when preferred-operator
    /// evaluators are configured, an alternation between that and a
    /// preferred-only sublist, boosted per [`Self::boost`].
    fn build_open_list(
        &self,
        key: SharedEvaluator,
        preferred: &[SharedEvaluator],
    ) -> Box<dyn OpenList<OpenListEntry>> {
        if preferred.is_empty() {
            return Box::new(BestFirstOpenList::new(key));
        }
        let main: Box<dyn OpenList<OpenListEntry>> = Box::new(BestFirstOpenList::new(key.clone()));
        let preferred_key = combine(preferred.to_vec()).unwrap_or(key);
        let preferred_list: Box<dyn OpenList<OpenListEntry>> =
            Box::new(BestFirstOpenList::new(preferred_key).preferred_only());
        Box::new(AlternationOpenList::with_boost(
            vec![main, preferred_list],
            self.boost,
        ))
    }

    /// The bound this phase should search under: the tighter of its own
    /// configured `bound` and `external_bound` (the exclusive upper bound
    /// an enclosing [`IteratedPlanConfig`] passes in when `pass_bound` is
    /// set; [`INFINITE`] otherwise).
    fn effective_bound(&self, external_bound: i32) -> i32 {
        self.bound_or_infinite().min(external_bound)
    }

    /// Resolves the `eager`/`eager_greedy`/`eager_wastar`/`astar` tags into
    /// a ready-to-run [`EagerBestFirstSearch`].
    fn build_eager<'a>(
        &self,
        task: &'a Task,
        successor_generator: &'a SuccessorGenerator,
        bound: i32,
    ) -> Result<EagerBestFirstSearch<'a>, PlannerError> {
        let (combined, preferred) = self.resolve_evaluators(task)?;
        let (key, reopen_closed) = match self.algorithm {
            AlgorithmTag::Eager => (combined.clone(), self.reopen_closed),
            AlgorithmTag::EagerGreedy => (combined.clone(), false),
            AlgorithmTag::EagerWastar => {
                let g: SharedEvaluator = Rc::new(RefCell::new(GEvaluator::new()));
                let weighted: SharedEvaluator =
                    Rc::new(RefCell::new(WeightedEvaluator::new(combined.clone(), self.w)));
                let f: SharedEvaluator =
                    Rc::new(RefCell::new(SumEvaluator::new(vec![g, weighted])));
                (f, true)
            }
            AlgorithmTag::Astar => {
                let g: SharedEvaluator = Rc::new(RefCell::new(GEvaluator::new()));
                let weighted: SharedEvaluator =
                    Rc::new(RefCell::new(WeightedEvaluator::new(combined.clone(), 1)));
                let f: SharedEvaluator =
                    Rc::new(RefCell::new(SumEvaluator::new(vec![g, weighted])));
                (f, true)
            }
            _ => unreachable!("build_eager called with a non-eager tag"),
        };
        let open_list = self.build_open_list(key, &preferred);
        EagerBestFirstSearch::new(
            task,
            successor_generator,
            open_list,
            vec![combined],
            preferred,
            self.cost_type,
            reopen_closed,
            reopen_closed,
            bound,
        )
    }

    /// Resolves the `lazy`/`lazy_greedy`/`lazy_wastar` tags into a ready-to-
    /// run [`LazyBestFirstSearch`].
    fn build_lazy<'a>(
        &self,
        task: &'a Task,
        successor_generator: &'a SuccessorGenerator,
        bound: i32,
    ) -> Result<LazyBestFirstSearch<'a>, PlannerError> {
        let (combined, preferred) = self.resolve_evaluators(task)?;
        let key = match self.algorithm {
            AlgorithmTag::Lazy | AlgorithmTag::LazyGreedy => combined.clone(),
            AlgorithmTag::LazyWastar => {
                let g: SharedEvaluator = Rc::new(RefCell::new(GEvaluator::new()));
                let weighted: SharedEvaluator =
                    Rc::new(RefCell::new(WeightedEvaluator::new(combined.clone(), self.w)));
                Rc::new(RefCell::new(SumEvaluator::new(vec![g, weighted])))
            }
            _ => unreachable!("build_lazy called with a non-lazy tag"),
        };
        let open_list = self.build_open_list(key, &preferred);
        let rng = match self.preferred_mode {
            PreferredOperatorModeTag::Randomize => Some(PlannerRng::from_seed(
                self.rng_seed
                    .ok_or_else(|| PlannerError::InputError("randomize preferred-operator mode requires rng_seed".to_string()))?,
            )),
            _ => None,
        };
        LazyBestFirstSearch::new(
            task,
            successor_generator,
            open_list,
            vec![combined],
            preferred,
            self.cost_type,
            bound,
            self.preferred_mode.into(),
            rng,
        )
    }

    /// Resolves the `ehc` tag into a ready-to-run [`EnforcedHillClimbing`].
    fn build_ehc<'a>(
        &self,
        task: &'a Task,
        successor_generator: &'a SuccessorGenerator,
    ) -> Result<EnforcedHillClimbing<'a>, PlannerError> {
        let (combined, preferred) = self.resolve_evaluators(task)?;
        EnforcedHillClimbing::new(
            task,
            successor_generator,
            combined,
            preferred,
            self.restrict_to_preferred,
            self.cost_type,
        )
    }

    /// Builds the engine named by `self.algorithm`. Returns an error for
    /// `Iterated`, which has no single engine to build: see
    /// [`IteratedPlanConfig::build_phases`].
    pub fn build<'a>(
        &self,
        task: &'a Task,
        successor_generator: &'a SuccessorGenerator,
    ) -> Result<ResolvedEngine<'a>, PlannerError> {
        match self.algorithm {
            AlgorithmTag::Eager | AlgorithmTag::EagerGreedy | AlgorithmTag::EagerWastar | AlgorithmTag::Astar => {
                Ok(ResolvedEngine::Eager(Box::new(self.build_eager(
                    task,
                    successor_generator,
                    self.bound_or_infinite(),
                )?)))
            }
            AlgorithmTag::Lazy | AlgorithmTag::LazyGreedy | AlgorithmTag::LazyWastar => {
                Ok(ResolvedEngine::Lazy(Box::new(self.build_lazy(
                    task,
                    successor_generator,
                    self.bound_or_infinite(),
                )?)))
            }
            AlgorithmTag::Ehc => Ok(ResolvedEngine::Ehc(Box::new(
                self.build_ehc(task, successor_generator)?,
            ))),
            AlgorithmTag::Iterated => Err(PlannerError::InputError(
                "the iterated tag has no single engine; use IteratedPlanConfig".to_string(),
            )),
        }
    }
}

/// Configuration for the `iterated` tag: a sequence of phases, each its own
/// `EngineConfig`, plus the chaining parameters named in the command
/// surface. Not `clap`-derived directly (chaining phases is not naturally a
/// flat flag set); loaded from a config file via `serde` instead, or built
/// programmatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IteratedPlanConfig {
    pub phases: Vec<EngineConfig>,
    #[serde(default)]
    pub pass_bound: bool,
    #[serde(default)]
    pub repeat_last: bool,
    #[serde(default)]
    pub continue_on_fail: bool,
    #[serde(default)]
    pub continue_on_solve: bool,
}

impl IteratedPlanConfig {
    /// Builds one [`PhaseSpec`] per configured phase, each a factory that
    /// resolves its `EngineConfig` against whatever bound
    /// [`IteratedSearch`] passes it at run time (tightened by
    /// [`IteratedSearch::run`] when `pass_bound` is set).
    fn build_phases<'a>(
        &self,
        task: &'a Task,
        successor_generator: &'a SuccessorGenerator,
    ) -> Vec<PhaseSpec<'a>> {
        self.phases
            .iter()
            .enumerate()
            .map(|(index, phase)| {
                let phase = phase.clone();
                let name = format!("{:?}[{index}]", phase.algorithm);
                PhaseSpec::new(name, move |external_bound: i32| {
                    let bound = phase.effective_bound(external_bound);
                    let engine = match phase.algorithm {
                        AlgorithmTag::Eager
                        | AlgorithmTag::EagerGreedy
                        | AlgorithmTag::EagerWastar
                        | AlgorithmTag::Astar => ResolvedEngine::Eager(Box::new(
                            phase.build_eager(task, successor_generator, bound)?,
                        )),
                        AlgorithmTag::Lazy | AlgorithmTag::LazyGreedy | AlgorithmTag::LazyWastar => {
                            ResolvedEngine::Lazy(Box::new(phase.build_lazy(
                                task,
                                successor_generator,
                                bound,
                            )?))
                        }
                        AlgorithmTag::Ehc => {
                            ResolvedEngine::Ehc(Box::new(phase.build_ehc(task, successor_generator)?))
                        }
                        AlgorithmTag::Iterated => {
                            return Err(PlannerError::InputError(
                                "iterated phases cannot themselves be iterated".to_string(),
                            ))
                        }
                    };
                    Ok(engine.into_boxed())
                })
            })
            .collect()
    }

    /// Builds the full [`IteratedSearch`] driver for this configuration.
    pub fn build<'a>(
        &self,
        task: &'a Task,
        successor_generator: &'a SuccessorGenerator,
    ) -> Result<IteratedSearch<'a>, PlannerError> {
        if self.phases.is_empty() {
            return Err(PlannerError::InputError(
                "iterated search requires at least one phase".to_string(),
            ));
        }
        let phases = self.build_phases(task, successor_generator);
        Ok(IteratedSearch::new(
            task,
            phases,
            self.pass_bound,
            self.repeat_last,
            self.continue_on_fail,
            self.continue_on_solve,
        ))
    }
}
