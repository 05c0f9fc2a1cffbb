//! A simple wall-clock deadline, queried cooperatively by search loops that
//! want to bail out once a time budget is exhausted.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct CountdownTimer {
    deadline: Option<Instant>,
}

impl CountdownTimer {
    /// `None` means no time limit: [`is_expired`](Self::is_expired) never
    /// returns true.
    pub fn new(budget: Option<Duration>) -> Self {
        Self {
            deadline: budget.map(|budget| Instant::now() + budget),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn is_expired(&self) -> bool {
        match self.deadline {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }
}
