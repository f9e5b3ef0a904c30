//! Connection pool configuration

use crate::constants::{
    POOL_CONNECT_TIMEOUT_SECS, POOL_DEFAULT_DNS_CACHE_TTL_SECS, POOL_DEFAULT_KEEPALIVE_SECS,
    POOL_DEFAULT_MAX_PER_HOST, POOL_DEFAULT_MAX_TOTAL, POOL_DEFAULT_SWEEP_INTERVAL_SECS,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection pool configuration
///
/// Flat environment overrides: `POOL_MAX_TOTAL`, `POOL_MAX_PER_HOST`,
/// `POOL_DNS_CACHE_TTL_S`, `POOL_KEEPALIVE_S`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Concurrent outbound requests across all hosts; idle keep-alive
    /// sockets are also held near this total (see [`Self::idle_per_host`])
    pub max_total: usize,
    /// Concurrent outbound requests to one host
    pub max_per_host: usize,
    /// Age after which a host client is rebuilt so DNS is resolved again
    pub dns_cache_ttl_secs: u64,
    /// Idle time after which a host client is dropped
    pub keepalive_secs: u64,
    /// Interval of the background sweep
    pub sweep_interval_secs: u64,
    /// TCP connect timeout
    pub connect_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_total: POOL_DEFAULT_MAX_TOTAL,
            max_per_host: POOL_DEFAULT_MAX_PER_HOST,
            dns_cache_ttl_secs: POOL_DEFAULT_DNS_CACHE_TTL_SECS,
            keepalive_secs: POOL_DEFAULT_KEEPALIVE_SECS,
            sweep_interval_secs: POOL_DEFAULT_SWEEP_INTERVAL_SECS,
            connect_timeout_secs: POOL_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    /// DNS cache TTL
    pub fn dns_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.dns_cache_ttl_secs)
    }

    /// Idle keep-alive
    pub fn keepalive(&self) -> Duration {
        Duration::from_secs(self.keepalive_secs)
    }

    /// Sweep interval
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Idle keep-alive sockets a host client may hold while `host_count`
    /// hosts are active: an even share of `max_total`, at least one and at
    /// most `max_per_host`
    pub fn idle_per_host(&self, host_count: usize) -> usize {
        (self.max_total / host_count.max(1)).clamp(1, self.max_per_host.max(1))
    }

    /// Connect timeout
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
