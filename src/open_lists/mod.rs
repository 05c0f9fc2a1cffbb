//! Priority structures that decide which frontier entry a search algorithm
//! expands next. All of them implement [`OpenList`]; which concrete policy
//! is plugged in determines the search strategy (uniform-cost, greedy, A*,
//! alternation between a plain and a preferred-operators queue, ...) without
//! the search loop itself changing.

mod alternation_open_list;
mod best_first_open_list;
mod epsilon_greedy_open_list;
mod open_list;
mod pareto_open_list;
mod tie_breaking_open_list;
mod type_based_open_list;

pub use alternation_open_list::AlternationOpenList;
pub use best_first_open_list::BestFirstOpenList;
pub use epsilon_greedy_open_list::EpsilonGreedyOpenList;
pub use open_list::{OpenList, OpenListEntry};
pub use pareto_open_list::ParetoOpenList;
pub use tie_breaking_open_list::TieBreakingOpenList;
pub use type_based_open_list::TypeBasedOpenList;
