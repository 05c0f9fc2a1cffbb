use crate::evaluation_context::{EvaluationContext, EvaluationResult, Evaluator};
use crate::task::Goal;

/// Estimates distance to the goal as the number of goal facts not yet
/// satisfied. Admissible only when every operator can fix at most one goal
/// fact per application, which is not guaranteed in general; this is a
/// greedy, inadmissible heuristic included as a cheap baseline.
#[derive(Debug, Clone)]
pub struct GoalCountEvaluator {
    goal: Goal,
}

impl GoalCountEvaluator {
    pub fn new(goal: Goal) -> Self {
        Self { goal }
    }
}

impl Evaluator for GoalCountEvaluator {
    fn compute_result(&self, context: &mut EvaluationContext) -> EvaluationResult {
        let state = context.registry().state_values(context.state_id());
        if self.goal.is_satisfied(&state) {
            return EvaluationResult::finite(0);
        }
        EvaluationResult::finite(self.goal.unsatisfied_count(&state) as i32)
    }

    fn name(&self) -> &str {
        "goal_count"
    }
}
