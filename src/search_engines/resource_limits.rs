//! Combines the wall-clock [`CountdownTimer`] with an optional soft memory
//! budget, checked cooperatively between search steps, mirroring the
//! teacher planner's `TerminationCondition`. Rust gives no portable
//! allocation-failure hook, so the memory budget is advisory: it polls the
//! process's current RSS via `memory_stats` rather than reacting to a true
//! allocator failure.

use crate::countdown_timer::CountdownTimer;
use crate::search_engines::SearchStatus;
use std::time::Duration;
use tracing::warn;

#[derive(Debug)]
pub struct ResourceLimits {
    timer: CountdownTimer,
    memory_limit_mb: Option<usize>,
}

impl ResourceLimits {
    pub fn new(max_time: Option<Duration>, memory_limit_mb: Option<usize>) -> Self {
        Self {
            timer: CountdownTimer::new(max_time),
            memory_limit_mb,
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None, None)
    }

    pub fn remaining_time(&self) -> Option<Duration> {
        self.timer.remaining()
    }

    /// Returns the terminal status the caller should report if a budget is
    /// exceeded, or `None` if the search may continue.
    pub fn check(&self) -> Option<SearchStatus> {
        if self.timer.is_expired() {
            return Some(SearchStatus::Timeout);
        }
        if let Some(limit_mb) = self.memory_limit_mb {
            if let Some(usage) = memory_stats::memory_stats() {
                let used_mb = usage.physical_mem / 1024 / 1024;
                if used_mb > limit_mb {
                    warn!(used_mb, limit_mb, "memory limit exceeded");
                    return Some(SearchStatus::MemoryLimitExceeded);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_never_trips() {
        let limits = ResourceLimits::unbounded();
        assert_eq!(limits.check(), None);
    }

    #[test]
    fn zero_time_budget_times_out_immediately() {
        let limits = ResourceLimits::new(Some(Duration::from_secs(0)), None);
        assert_eq!(limits.check(), Some(SearchStatus::Timeout));
    }

    #[test]
    fn zero_memory_budget_trips_immediately() {
        let limits = ResourceLimits::new(None, Some(0));
        assert_eq!(limits.check(), Some(SearchStatus::MemoryLimitExceeded));
    }
}
