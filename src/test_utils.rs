//! Shared test fixtures, centralized the way the teacher centralizes its
//! benchmark PDDL text as `include_str!` constants in one module. This
//! crate's task model is the grounded [`crate::task::Task`] rather than
//! PDDL text, so the fixtures here are small task builders and one embedded
//! JSON fixture instead of file includes.

use crate::task::{Effect, Fact, Operator, Task, TaskBuilder, TaskFixture, Variable};

/// A single variable walking `0..=length`, one operator per step. The
/// smallest task with a unique, easily predicted optimal plan length.
pub fn corridor_task(length: usize) -> Task {
    let mut builder = TaskBuilder::new();
    builder.add_variable(Variable::new("pos", length + 1), 0);
    for i in 0..length {
        builder.add_operator(Operator::new(
            format!("advance-{i}"),
            vec![Fact::new(0, i)],
            vec![Effect::unconditional(Fact::new(0, i + 1))],
            1,
        ));
    }
    builder.set_goal(vec![Fact::new(0, length)]);
    builder.build().unwrap()
}

/// Two independent binary variables that must both reach 1, each flipped by
/// its own operator. Exercises evaluators/search over more than one
/// variable without the combinatorics of a full benchmark domain.
pub fn two_switches_task() -> Task {
    let mut builder = TaskBuilder::new();
    builder.add_variable(Variable::new("switch-a", 2), 0);
    builder.add_variable(Variable::new("switch-b", 2), 0);
    builder.add_operator(Operator::new(
        "flip-a",
        vec![Fact::new(0, 0)],
        vec![Effect::unconditional(Fact::new(0, 1))],
        1,
    ));
    builder.add_operator(Operator::new(
        "flip-b",
        vec![Fact::new(1, 0)],
        vec![Effect::unconditional(Fact::new(1, 1))],
        1,
    ));
    builder.set_goal(vec![Fact::new(0, 1), Fact::new(1, 1)]);
    builder.build().unwrap()
}

/// A single variable with no operators at all and a goal value it does not
/// start in: unsolvable, and every reachable evaluator should say so
/// reliably from the initial state.
pub fn unsolvable_task() -> Task {
    let mut builder = TaskBuilder::new();
    builder.add_variable(Variable::new("pos", 2), 0);
    builder.set_goal(vec![Fact::new(0, 1)]);
    builder.build().unwrap()
}

/// The minimal [`TaskFixture`] JSON used to exercise the on-disk loading
/// path end to end: one variable, one operator, solved in a single step.
pub const MINIMAL_FIXTURE_JSON: &str = r#"
{
    "variables": [{"name": "switch", "domain_size": 2}],
    "operators": [
        {
            "name": "flip",
            "preconditions": [{"var": 0, "value": 0}],
            "effects": [{"postcondition": {"var": 0, "value": 1}}]
        }
    ],
    "initial_state": [0],
    "goal": [{"var": 0, "value": 1}]
}
"#;

pub fn minimal_fixture_task() -> Task {
    let fixture: TaskFixture = serde_json::from_str(MINIMAL_FIXTURE_JSON).unwrap();
    fixture.into_task().unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corridor_task_has_one_operator_per_step() {
        let task = corridor_task(5);
        assert_eq!(task.operators.len(), 5);
    }

    #[test]
    fn two_switches_task_goal_needs_both_flips() {
        let task = two_switches_task();
        assert_eq!(task.operators.len(), 2);
        assert!(!task.goal.is_satisfied(&task.initial_state));
    }

    #[test]
    fn unsolvable_task_has_no_operators() {
        let task = unsolvable_task();
        assert!(task.operators.is_empty());
    }

    #[test]
    fn minimal_fixture_task_loads_and_builds() {
        let task = minimal_fixture_task();
        assert_eq!(task.operators.len(), 1);
        assert!(!task.goal.is_satisfied(&task.initial_state));
    }
}
