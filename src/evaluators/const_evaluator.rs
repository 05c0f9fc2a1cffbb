use crate::evaluation_context::{EvaluationContext, EvaluationResult, Evaluator};

/// Always reports the same fixed value, regardless of state. Useful as a
/// neutral element in combining evaluators, or to implement plain
/// breadth-first search by giving every state heuristic value 0.
#[derive(Debug, Clone, Copy)]
pub struct ConstEvaluator {
    value: i32,
}

impl ConstEvaluator {
    pub fn new(value: i32) -> Self {
        Self { value }
    }
}

impl Evaluator for ConstEvaluator {
    fn compute_result(&self, _context: &mut EvaluationContext) -> EvaluationResult {
        EvaluationResult::finite(self.value)
    }

    fn name(&self) -> &str {
        "const"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_registry::StateRegistry;
    use crate::task::{Fact, Operator, TaskBuilder, Variable};

    #[test]
    fn always_returns_its_configured_value() {
        let mut builder = TaskBuilder::new();
        builder.add_variable(Variable::new("a", 2), 0);
        builder.add_operator(Operator::new(
            "op",
            vec![],
            vec![crate::task::Effect::unconditional(Fact::new(0, 1))],
            1,
        ));
        builder.set_goal(vec![Fact::new(0, 1)]);
        let task = builder.build().unwrap();
        let registry = StateRegistry::new(&task).unwrap();
        let mut context = EvaluationContext::new(&registry, registry.initial_state_id(), 99, false);
        let result = ConstEvaluator::new(0).compute_result(&mut context);
        assert_eq!(result.value, 0);
    }
}
