//! Main application configuration

use super::{
    GatewayConfig, LoggingConfig, PoolConfig, ProviderConfig, RoutingConfig, SearchConfig,
    TelemetryConfig,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Main application configuration
///
/// ```toml
/// [gateway]
/// max_retries = 3
///
/// [providers.alpha]
/// kind = "openai"
/// daily_budget_usd = 50.0
/// unit_cost_usd = 0.002
///
/// [routing]
/// fallback_chain = ["alpha", "beta"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Retry and backoff settings
    pub gateway: GatewayConfig,
    /// Outbound connection pool
    pub pool: PoolConfig,
    /// Configured providers keyed by lowercase name
    pub providers: BTreeMap<String, ProviderConfig>,
    /// Task preferences, fallback order and health thresholds
    pub routing: RoutingConfig,
    /// Document search backends and cache
    pub search: SearchConfig,
    /// Process logging
    pub logging: LoggingConfig,
    /// Telemetry records
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Enabled providers in name order
    pub fn enabled_providers(&self) -> impl Iterator<Item = (&String, &ProviderConfig)> {
        self.providers.iter().filter(|(_, provider)| provider.enabled)
    }
}
