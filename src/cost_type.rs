//! How operator costs are interpreted when computing the `g` value used for
//! search ordering, as opposed to `real_g`, the true accumulated plan cost
//! reported in the final solution. Only `g` is affected by this setting;
//! `real_g` always uses the operator's actual cost.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[clap(rename_all = "kebab-case")]
pub enum CostType {
    /// Use each operator's declared cost as-is.
    Normal,
    /// Every operator costs exactly 1, regardless of its declared cost. This
    /// turns cost-optimal search into a search for the shortest plan.
    One,
    /// Every operator's declared cost is incremented by 1. Used so that
    /// tasks with some zero-cost operators still admit a well-founded,
    /// strictly-improving search order.
    PlusOne,
}

impl CostType {
    pub fn adjust(self, declared_cost: i32) -> i32 {
        match self {
            CostType::Normal => declared_cost,
            CostType::One => 1,
            CostType::PlusOne => declared_cost + 1,
        }
    }
}
