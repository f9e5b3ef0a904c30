//! Cost ledger entries

use super::money::Usd;
use super::provider::ProviderId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Cumulative spend of one provider on one day
///
/// Day rollover starts a new entry; old entries are kept for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostLedgerEntry {
    /// Provider charged
    pub provider: ProviderId,
    /// UTC day
    pub date: NaiveDate,
    /// Spend recorded through `charge`
    pub spent: Usd,
    /// Budget held by in-flight calls, not yet spend
    pub reserved: Usd,
}
