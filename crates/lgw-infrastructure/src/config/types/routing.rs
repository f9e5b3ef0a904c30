//! Routing configuration

use crate::constants::{HEALTH_DEFAULT_DEGRADED_AFTER, HEALTH_DEFAULT_UNAVAILABLE_AFTER};
use lgw_domain::Capability;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Route of one task type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskRouteConfig {
    /// Capability the task needs
    pub capability: Capability,
    /// Provider tried before the fallback chain
    pub prefer: Option<String>,
}

impl Default for TaskRouteConfig {
    fn default() -> Self {
        Self {
            capability: Capability::Chat,
            prefer: None,
        }
    }
}

/// Routing configuration
///
/// ```toml
/// [routing]
/// fallback_chain = ["alpha", "beta"]
///
/// [routing.tasks.logistics]
/// prefer = "alpha"
///
/// [routing.tasks.finance]
/// prefer = "beta"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Task type preferences
    pub tasks: BTreeMap<String, TaskRouteConfig>,
    /// Providers tried in order after the preference; all providers in
    /// name order when empty
    pub fallback_chain: Vec<String>,
    /// Consecutive failed invocations before Degraded
    pub degraded_after: u32,
    /// Consecutive failed invocations before Unavailable
    pub unavailable_after: u32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            tasks: BTreeMap::new(),
            fallback_chain: Vec::new(),
            degraded_after: HEALTH_DEFAULT_DEGRADED_AFTER,
            unavailable_after: HEALTH_DEFAULT_UNAVAILABLE_AFTER,
        }
    }
}
