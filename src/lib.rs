#![warn(missing_debug_implementations)]
#![deny(non_ascii_idents)]
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
#![deny(unit_bindings)]
#![warn(unused_qualifications)]

// Crate dependencies used in the binary or in tests but not in the library
// itself. Cargo does not yet allow specifying dependencies for binaries only.
use assert_approx_eq as _;
use tracing_subscriber as _;

pub mod config;
pub mod cost_type;
pub mod countdown_timer;
pub mod error;
pub mod evaluation_context;
pub mod evaluators;
pub mod int_packer;
pub mod open_lists;
pub mod per_state_information;
pub mod plan;
pub mod rng;
pub mod search_engines;
pub mod search_space;
pub mod segmented_vector;
pub mod state_registry;
pub mod successor_generator;
pub mod task;

#[cfg(test)]
mod test_utils;

pub use error::{ExitCode, PlannerError};
pub use plan::Plan;
pub use task::{Fact, Operator, OperatorId, Task, TaskBuilder, VarId, VarValue, Variable};
