//! Value objects
//!
//! Plain data shared across layers. Nothing here performs I/O.

pub mod attempt;
pub mod ledger;
pub mod money;
pub mod provider;
pub mod request;
pub mod search;
pub mod telemetry;

pub use attempt::{AttemptOutcome, AttemptRecord, FailureKind};
pub use ledger::CostLedgerEntry;
pub use money::Usd;
pub use provider::{
    Capability, CapabilitySet, ProviderDescriptor, ProviderHealth, ProviderId, ProviderKind,
};
pub use request::{Priority, RequestEnvelope, RequestId};
pub use search::{
    CacheEntry, CoverageStats, SearchItem, SearchQuery, SearchResult, SearchSource, SearchStats,
};
pub use telemetry::{Component, TelemetryLevel, TelemetryRecord};
