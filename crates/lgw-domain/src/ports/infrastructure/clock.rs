//! Wall-clock port
//!
//! Ledger days, health rollover and cache expiry read time through this
//! trait so that tests can move the calendar.

use chrono::{DateTime, NaiveDate, Utc};

/// Source of wall-clock time
pub trait Clock: Send + Sync {
    /// Current UTC time
    fn now(&self) -> DateTime<Utc>;

    /// Current UTC day
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}
