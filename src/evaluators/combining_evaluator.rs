use crate::evaluation_context::{add_costs, EvaluationContext, EvaluationResult, Evaluator, SharedEvaluator, INFINITE};
use crate::task::OperatorId;

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

fn any_reliable_dead_end(results: &[EvaluationResult]) -> bool {
    results.iter().any(|r| r.reliable_dead_end)
}

/// Sums its sub-evaluators' values, saturating at [`INFINITE`] if any of
/// them is infinite. The classic use is `g + h` (via [`crate::evaluators::GEvaluator`]
/// and a heuristic), but any number of sub-evaluators is accepted.
#[derive(Debug)]
pub struct SumEvaluator {
    sub_evaluators: Vec<SharedEvaluator>,
}

impl SumEvaluator {
    pub fn new(sub_evaluators: Vec<SharedEvaluator>) -> Self {
        Self { sub_evaluators }
    }
}

impl Evaluator for SumEvaluator {
    fn compute_result(&self, context: &mut EvaluationContext) -> EvaluationResult {
        let results: Vec<EvaluationResult> = self
            .sub_evaluators
            .iter()
            .map(|e| context.get_result(e))
            .collect();
        let value = results.iter().fold(0, |acc, r| add_costs(acc, r.value));
        EvaluationResult {
            value,
            preferred_operators: union_preferred(&results),
            reliable_dead_end: any_reliable_dead_end(&results),
        }
    }

    fn name(&self) -> &str {
        "sum"
    }

    fn supports_preferred_operators(&self) -> bool {
        self.sub_evaluators
            .iter()
            .any(|e| e.borrow().supports_preferred_operators())
    }
}

/// Takes the maximum of its sub-evaluators' values. Combining several
/// admissible heuristics this way is always itself admissible.
#[derive(Debug)]
pub struct MaxEvaluator {
    sub_evaluators: Vec<SharedEvaluator>,
}

impl MaxEvaluator {
    pub fn new(sub_evaluators: Vec<SharedEvaluator>) -> Self {
        Self { sub_evaluators }
    }
}

impl Evaluator for MaxEvaluator {
    fn compute_result(&self, context: &mut EvaluationContext) -> EvaluationResult {
        let results: Vec<EvaluationResult> = self
            .sub_evaluators
            .iter()
            .map(|e| context.get_result(e))
            .collect();
        let value = results.iter().map(|r| r.value).max().unwrap_or(0);
        EvaluationResult {
            value,
            preferred_operators: union_preferred(&results),
            reliable_dead_end: any_reliable_dead_end(&results),
        }
    }

    fn name(&self) -> &str {
        "max"
    }

    fn supports_preferred_operators(&self) -> bool {
        self.sub_evaluators
            .iter()
            .any(|e| e.borrow().supports_preferred_operators())
    }
}
