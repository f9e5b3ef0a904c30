//! Search gateway configuration

use crate::constants::{
    SEARCH_CACHE_DEFAULT_MAX_ENTRIES, SEARCH_CACHE_DEFAULT_TTL_SECS, SEARCH_DEFAULT_BACKEND_TIMEOUT_MS,
    SEARCH_DEFAULT_LIMIT, SEARCH_DEFAULT_PROBE_INTERVAL_SECS,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One HTTP search backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchBackendConfig {
    /// Service root; the backend is a no-op when unset
    pub base_url: Option<String>,
    /// Bearer token
    pub api_key: Option<String>,
}

/// Search gateway configuration
///
/// Flat environment override: `SEARCH_CACHE_TTL_S`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Vector similarity backend
    pub native: SearchBackendConfig,
    /// Keyword backend
    pub fallback: SearchBackendConfig,
    /// Result cache TTL
    pub cache_ttl_secs: u64,
    /// Maximum number of cached results
    pub cache_max_entries: u64,
    /// Items requested per query
    pub default_limit: usize,
    /// Interval between native health probes
    pub probe_interval_secs: u64,
    /// Per-call backend timeout
    pub backend_timeout_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            native: SearchBackendConfig::default(),
            fallback: SearchBackendConfig::default(),
            cache_ttl_secs: SEARCH_CACHE_DEFAULT_TTL_SECS,
            cache_max_entries: SEARCH_CACHE_DEFAULT_MAX_ENTRIES,
            default_limit: SEARCH_DEFAULT_LIMIT,
            probe_interval_secs: SEARCH_DEFAULT_PROBE_INTERVAL_SECS,
            backend_timeout_ms: SEARCH_DEFAULT_BACKEND_TIMEOUT_MS,
        }
    }
}

impl SearchConfig {
    /// Cache TTL
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Probe interval
    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs)
    }

    /// Backend call timeout
    pub fn backend_timeout(&self) -> Duration {
        Duration::from_millis(self.backend_timeout_ms)
    }
}
