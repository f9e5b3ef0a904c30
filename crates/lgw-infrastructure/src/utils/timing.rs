//! Latency measurement on the tokio clock
//!
//! Attempt and search latencies are read from `tokio::time::Instant`, so a
//! paused test runtime reports exactly the time it advanced.

use std::time::Duration;
use tokio::time::Instant;

/// Whole milliseconds of a duration, saturating at `u64::MAX`
pub fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Measures one attempt, search or other timed operation
#[derive(Debug, Clone, Copy)]
pub struct TimedOperation {
    started: Instant,
}

impl TimedOperation {
    /// Start measuring now
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// When measuring started
    pub fn started_at(&self) -> Instant {
        self.started
    }

    /// Time since start
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Time since start, as recorded in attempt records and telemetry
    pub fn elapsed_ms(&self) -> u64 {
        duration_ms(self.elapsed())
    }

    /// What is left of `budget`, `None` once it is used up
    pub fn remaining(&self, budget: Duration) -> Option<Duration> {
        budget.checked_sub(self.elapsed())
    }
}
