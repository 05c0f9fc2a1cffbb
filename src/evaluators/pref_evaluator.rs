use crate::evaluation_context::{EvaluationContext, EvaluationResult, Evaluator};

/// Scores 0 if the state being evaluated was reached via a preferred
/// operator, 1 otherwise. Combined with [`crate::open_lists::AlternationOpenList`]
/// this implements the classic "two open lists, one for preferred-operator
/// successors" search strategy without the open list itself needing to know
/// anything about preference.
#[derive(Debug, Default)]
pub struct PrefEvaluator;

impl PrefEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for PrefEvaluator {
    fn compute_result(&self, context: &mut EvaluationContext) -> EvaluationResult {
        let value = if context.reached_by_preferred_operator() {
            0
        } else {
            1
        };
        EvaluationResult::finite(value)
    }

    fn name(&self) -> &str {
        "pref"
    }
}
