//! Fatal error kinds and the process exit codes they (and the non-fatal
//! search outcomes in [`crate::search_engines::SearchStatus`]) map to.

use thiserror::Error;

/// Errors that abort planning before or independently of a search loop
/// running to completion. These are recognized locally and surface
/// immediately to the top level; the engine never silently continues past
/// one. Non-fatal outcomes (unsolvable, timeout) are represented instead by
/// [`crate::search_engines::SearchStatus`], since they are ordinary,
/// expected results of a correct run rather than exceptional control flow.
#[derive(Debug, Error, Clone)]
pub enum PlannerError {
    #[error("input error: {0}")]
    InputError(String),
    #[error("out of memory: {0}")]
    OutOfMemory(String),
    #[error("critical internal error: {0}")]
    CriticalError(String),
}

/// Distinct process exit codes, one per terminal outcome named in the
/// external interface contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SOLVED: ExitCode = ExitCode(0);
    pub const UNSOLVABLE: ExitCode = ExitCode(10);
    pub const UNSOLVED_INCOMPLETE: ExitCode = ExitCode(11);
    pub const TIMEOUT: ExitCode = ExitCode(12);
    pub const MEMORY_LIMIT_EXCEEDED: ExitCode = ExitCode(13);
    pub const INPUT_ERROR: ExitCode = ExitCode(20);
    pub const OUT_OF_MEMORY: ExitCode = ExitCode(21);
    pub const CRITICAL_ERROR: ExitCode = ExitCode(22);
    pub const UNSUPPORTED: ExitCode = ExitCode(23);
}

impl From<&PlannerError> for ExitCode {
    fn from(error: &PlannerError) -> Self {
        match error {
            PlannerError::InputError(_) => ExitCode::INPUT_ERROR,
            PlannerError::OutOfMemory(_) => ExitCode::OUT_OF_MEMORY,
            PlannerError::CriticalError(_) => ExitCode::CRITICAL_ERROR,
        }
    }
}
