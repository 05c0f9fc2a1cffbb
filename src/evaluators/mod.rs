//! Evaluators score states for search ordering. A few leaf evaluators read
//! directly off the [`crate::evaluation_context::EvaluationContext`] (`g`,
//! goal count, a constant); the rest combine other evaluators.

mod combining_evaluator;
mod const_evaluator;
mod g_evaluator;
mod goal_count_evaluator;
mod pref_evaluator;
mod weighted_evaluator;

pub use combining_evaluator::{MaxEvaluator, SumEvaluator};
pub use const_evaluator::ConstEvaluator;
pub use g_evaluator::GEvaluator;
pub use goal_count_evaluator::GoalCountEvaluator;
pub use pref_evaluator::PrefEvaluator;
pub use weighted_evaluator::WeightedEvaluator;
