//! Provider Routing
//!
//! Health tracking and preference/fallback routing across providers.
//!
//! ## Components
//!
//! - [`InMemoryHealthMonitor`] - Per-provider health state machine
//! - [`RoutingTable`] - Task preferences and the fallback chain
//! - [`ProviderRouter`] - Candidate walk with budget holds and health updates

pub mod health;
pub mod router;

pub use health::{HealthMonitor, InMemoryHealthMonitor, ProviderHealthData};
pub use router::{ProviderRouter, RoutedResponse, RoutingTable, TaskRoute};
