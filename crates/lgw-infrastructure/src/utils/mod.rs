//! Clocks and timing
//!
//! Wall-clock access for budget days and cache expiry, tokio-clock timing
//! for latencies.

mod clock;
mod timing;

pub use clock::{ManualClock, SystemClock};
pub use timing::{TimedOperation, duration_ms};
