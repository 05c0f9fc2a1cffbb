//! The per-state, per-evaluation-round context threaded through evaluator
//! composition: the state being evaluated, the `g` value it was reached
//! with, whether it was reached by a preferred operator, and a cache so a
//! composite evaluator that consults the same sub-evaluator twice (e.g. two
//! branches of a `Max` both feeding from a shared heuristic) only evaluates
//! it once.
//!
//! Cache entries are keyed by the evaluator's pointer identity
//! (`Rc::as_ptr`), not by any notion of structural or configuration
//! equality: two distinct evaluator instances built from identical
//! configuration are still distinct cache entries, and the same instance
//! keeps the same key for its entire lifetime. This matters because
//! evaluators may carry internal, config-invisible state (e.g. a heuristic's
//! internal cache), so configuration equality would be unsound to cache on.

use crate::state_registry::{StateId, StateRegistry};
use crate::task::OperatorId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Sentinel value for "infinite"/"unknown" cost, used throughout the search
/// layer in place of a true infinity so costs stay representable as `i32`.
pub const INFINITE: i32 = i32::MAX;

/// Adds two costs, saturating at [`INFINITE`] rather than overflowing or
/// silently wrapping if either operand is already infinite.
pub fn add_costs(a: i32, b: i32) -> i32 {
    if a == INFINITE || b == INFINITE {
        INFINITE
    } else {
        a.saturating_add(b)
    }
}

pub type SharedEvaluator = Rc<RefCell<dyn Evaluator>>;

/// The outcome of evaluating one evaluator against one state.
#[derive(Debug, Clone)]
pub struct EvaluationResult {
    pub value: i32,
    pub preferred_operators: Vec<OperatorId>,
    /// True if this evaluator can *prove* the state is a dead end (as
    /// opposed to merely assigning it `INFINITE`, which some heuristics do
    /// as an estimate rather than a proof). Search algorithms may prune on a
    /// reliable dead end without risking incompleteness.
    pub reliable_dead_end: bool,
}

impl EvaluationResult {
    pub fn finite(value: i32) -> Self {
        Self {
            value,
            preferred_operators: Vec::new(),
            reliable_dead_end: false,
        }
    }

    pub fn dead_end() -> Self {
        Self {
            value: INFINITE,
            preferred_operators: Vec::new(),
            reliable_dead_end: true,
        }
    }
}

/// Implemented by anything that scores a state: heuristics, the `g`
/// pass-through, and the composite evaluators (sum, max, weighted, ...) that
/// combine other evaluators.
pub trait Evaluator: fmt::Debug {
    fn compute_result(&self, context: &mut EvaluationContext) -> EvaluationResult;

    /// Display name used in search progress logging.
    fn name(&self) -> &str {
        "evaluator"
    }

    /// Whether this evaluator ever reports preferred operators. Used by
    /// search engines to decide whether collecting preferred operators from
    /// this evaluator is worthwhile.
    fn supports_preferred_operators(&self) -> bool {
        false
    }

    /// Whether this evaluator's value for a state can depend on the path
    /// used to reach it, not just the state itself. Path-dependent
    /// evaluators receive [`notify_initial_state`](Self::notify_initial_state)
    /// and [`notify_state_transition`](Self::notify_state_transition)
    /// callbacks from the search engine so they can track that path.
    fn is_path_dependent(&self) -> bool {
        false
    }

    /// Called once, before search begins, with the registry's initial state.
    /// Only meaningful for evaluators with `is_path_dependent() == true`.
    fn notify_initial_state(&mut self, _state: StateId) {}

    /// Called whenever the search engine generates `child` from `parent` via
    /// `op`, before `child` is evaluated. Only meaningful for evaluators with
    /// `is_path_dependent() == true`.
    fn notify_state_transition(&mut self, _parent: StateId, _op: OperatorId, _child: StateId) {}
}

#[derive(Debug)]
pub struct EvaluationContext<'a> {
    registry: &'a StateRegistry,
    state_id: StateId,
    g: i32,
    preferred_path: bool,
    cache: HashMap<usize, EvaluationResult>,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(registry: &'a StateRegistry, state_id: StateId, g: i32, preferred_path: bool) -> Self {
        Self {
            registry,
            state_id,
            g,
            preferred_path,
            cache: HashMap::new(),
        }
    }

    pub fn registry(&self) -> &StateRegistry {
        self.registry
    }

    pub fn state_id(&self) -> StateId {
        self.state_id
    }

    pub fn g_value(&self) -> i32 {
        self.g
    }

    pub fn reached_by_preferred_operator(&self) -> bool {
        self.preferred_path
    }

    fn key_of(evaluator: &SharedEvaluator) -> usize {
        Rc::as_ptr(evaluator) as *const () as usize
    }

    /// Returns the (possibly cached) result of evaluating `evaluator`
    /// against this context's state.
    pub fn get_result(&mut self, evaluator: &SharedEvaluator) -> EvaluationResult {
        let key = Self::key_of(evaluator);
        if let Some(cached) = self.cache.get(&key) {
            return cached.clone();
        }
        let result = evaluator.borrow().compute_result(self);
        self.cache.insert(key, result.clone());
        result
    }
}
