//! Per-run counters a search engine reports at termination, mirroring the
//! teacher planner's `SearchStatistics`.

use std::time::{Duration, Instant};
use tracing::info;

#[derive(Debug)]
pub struct SearchStatistics {
    start_time: Instant,
    expanded: u64,
    generated: u64,
    evaluated: u64,
    reopened: u64,
    dead_ends: u64,
    wall_time: Option<Duration>,
}

impl Default for SearchStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchStatistics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            expanded: 0,
            generated: 0,
            evaluated: 0,
            reopened: 0,
            dead_ends: 0,
            wall_time: None,
        }
    }

    pub fn increment_expanded(&mut self) {
        self.expanded += 1;
    }

    pub fn increment_generated_by(&mut self, n: usize) {
        self.generated += n as u64;
    }

    pub fn increment_evaluated(&mut self) {
        self.evaluated += 1;
    }

    pub fn increment_reopened(&mut self) {
        self.reopened += 1;
    }

    pub fn increment_dead_ends(&mut self) {
        self.dead_ends += 1;
    }

    pub fn expanded(&self) -> u64 {
        self.expanded
    }

    pub fn generated(&self) -> u64 {
        self.generated
    }

    pub fn evaluated(&self) -> u64 {
        self.evaluated
    }

    pub fn reopened(&self) -> u64 {
        self.reopened
    }

    pub fn dead_ends(&self) -> u64 {
        self.dead_ends
    }

    pub fn wall_time(&self) -> Duration {
        self.wall_time.unwrap_or_else(|| self.start_time.elapsed())
    }

    /// Freezes `wall_time` and emits a `tracing::info!` line summarizing the
    /// run. Idempotent: calling it more than once just re-logs the same
    /// frozen duration.
    pub fn finalize(&mut self) {
        let elapsed = self.start_time.elapsed();
        self.wall_time.get_or_insert(elapsed);
        info!(
            expanded = self.expanded,
            generated = self.generated,
            evaluated = self.evaluated,
            reopened = self.reopened,
            dead_ends = self.dead_ends,
            wall_time_secs = self.wall_time().as_secs_f64(),
            "search terminated"
        );
    }

    /// Adds another phase's counts into this run's totals, e.g. for
    /// [`crate::search_engines::IteratedSearch`] aggregating across phases.
    pub fn accumulate(&mut self, other: &SearchStatistics) {
        self.expanded += other.expanded;
        self.generated += other.generated;
        self.evaluated += other.evaluated;
        self.reopened += other.reopened;
        self.dead_ends += other.dead_ends;
    }
}
