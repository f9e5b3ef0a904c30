//! Retry and backoff configuration

use crate::constants::{DEFAULT_ATTEMPT_TIMEOUT_MS, DEFAULT_JITTER_RATIO, DEFAULT_REQUEST_TIMEOUT_MS};
use lgw_domain::constants::{
    DEFAULT_BACKOFF_BASE_MS, DEFAULT_BACKOFF_CAP_MS, DEFAULT_BACKOFF_FACTOR, DEFAULT_MAX_RETRIES,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry and backoff configuration
///
/// Flat environment overrides: `GATEWAY_MAX_RETRIES`, `GATEWAY_BACKOFF_BASE_MS`,
/// `GATEWAY_BACKOFF_FACTOR`, `GATEWAY_BACKOFF_CAP_MS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Retries after the first attempt of one provider invocation
    pub max_retries: u32,
    /// Delay after the first failed attempt
    pub backoff_base_ms: u64,
    /// Multiplier applied per further attempt
    pub backoff_factor: f64,
    /// Upper bound of any single wait, jitter included
    pub backoff_cap_ms: u64,
    /// Maximum extra delay as a fraction of the un-jittered delay
    pub jitter_ratio: f64,
    /// Per-attempt timeout (clipped to the request deadline)
    pub attempt_timeout_ms: u64,
    /// Request deadline used when the caller gives none
    pub default_timeout_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            backoff_cap_ms: DEFAULT_BACKOFF_CAP_MS,
            jitter_ratio: DEFAULT_JITTER_RATIO,
            attempt_timeout_ms: DEFAULT_ATTEMPT_TIMEOUT_MS,
            default_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl GatewayConfig {
    /// Per-attempt timeout
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    /// Default request deadline
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }
}
