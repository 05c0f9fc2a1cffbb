use crate::evaluation_context::{add_costs, EvaluationContext, EvaluationResult, Evaluator, SharedEvaluator, INFINITE};

/// Multiplies a sub-evaluator's value by a fixed weight. Used to build
/// weighted A* (`g + w*h`) out of a [`crate::evaluators::SumEvaluator`] of a
/// plain `g` evaluator and `WeightedEvaluator::new(h, w)`.
#[derive(Debug)]
pub struct WeightedEvaluator {
    inner: SharedEvaluator,
    weight: i32,
}

impl WeightedEvaluator {
    pub fn new(inner: SharedEvaluator, weight: i32) -> Self {
        Self { inner, weight }
    }
}

impl Evaluator for WeightedEvaluator {
    fn compute_result(&self, context: &mut EvaluationContext) -> EvaluationResult {
        let inner = context.get_result(&self.inner);
        if inner.value == INFINITE {
            return EvaluationResult {
                value: INFINITE,
                preferred_operators: inner.preferred_operators,
                reliable_dead_end: inner.reliable_dead_end,
            };
        }
        let scaled = add_costs(0, inner.value.saturating_mul(self.weight));
        EvaluationResult {
            value: scaled,
            preferred_operators: inner.preferred_operators,
            reliable_dead_end: inner.reliable_dead_end,
        }
    }

    fn name(&self) -> &str {
        "weighted"
    }

    fn supports_preferred_operators(&self) -> bool {
        self.inner.borrow().supports_preferred_operators()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluators::ConstEvaluator;
    use crate::state_registry::StateRegistry;
    use crate::task::{Fact, Operator, TaskBuilder, Variable};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn toy_registry() -> StateRegistry {
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
        StateRegistry::new(&task).unwrap()
    }

    #[test]
    fn scales_the_inner_value() {
        let registry = toy_registry();
        let mut context = EvaluationContext::new(&registry, registry.initial_state_id(), 0, false);
        let inner: SharedEvaluator = Rc::new(RefCell::new(ConstEvaluator::new(4)));
        let weighted = WeightedEvaluator::new(inner, 3);
        assert_eq!(weighted.compute_result(&mut context).value, 12);
    }

    #[test]
    fn infinite_inner_value_stays_infinite() {
        let registry = toy_registry();
        let mut context = EvaluationContext::new(&registry, registry.initial_state_id(), 0, false);
        let inner: SharedEvaluator = Rc::new(RefCell::new(ConstEvaluator::new(INFINITE)));
        let weighted = WeightedEvaluator::new(inner, 5);
        assert_eq!(weighted.compute_result(&mut context).value, INFINITE);
    }
}
