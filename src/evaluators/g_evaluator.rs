use crate::evaluation_context::{EvaluationContext, EvaluationResult, Evaluator};

/// Passes the search node's accumulated cost straight through. Used as the
/// `g` term in A*-style `g + h` evaluators, and on its own for uniform-cost
/// (Dijkstra) search.
#[derive(Debug, Default)]
pub struct GEvaluator;

impl GEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for GEvaluator {
    fn compute_result(&self, context: &mut EvaluationContext) -> EvaluationResult {
        EvaluationResult::finite(context.g_value())
    }

    fn name(&self) -> &str {
        "g"
    }
}
