//! Provider configuration

use lgw_domain::{CapabilitySet, ProviderDescriptor, ProviderId, ProviderKind, Usd};
use lgw_providers::HttpProviderTransport;
use serde::{Deserialize, Serialize};

/// One configured provider
///
/// Flat environment overrides, with `<NAME>` the upper-cased provider name:
/// `PROVIDER_<NAME>_API_KEY`, `PROVIDER_<NAME>_BASE_URL`,
/// `PROVIDER_<NAME>_DAILY_BUDGET_USD`, `PROVIDER_<NAME>_UNIT_COST_USD`,
/// `PROVIDER_<NAME>_KIND`, `PROVIDER_<NAME>_CAPABILITIES`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Wire dialect
    pub kind: ProviderKind,
    /// API root; the dialect's public endpoint when unset
    pub base_url: Option<String>,
    /// Credential
    pub api_key: Option<String>,
    /// Cost charged per successful call
    pub unit_cost_usd: f64,
    /// Daily spending cap
    pub daily_budget_usd: f64,
    /// Capabilities offered; everything the dialect supports when unset
    pub capabilities: Option<CapabilitySet>,
    /// Disabled providers are kept in config but never registered
    pub enabled: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            base_url: None,
            api_key: None,
            unit_cost_usd: 0.0,
            daily_budget_usd: 0.0,
            capabilities: None,
            enabled: true,
        }
    }
}

impl ProviderConfig {
    /// Base URL after applying the dialect default
    pub fn resolved_base_url(&self) -> String {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| HttpProviderTransport::default_base_url(self.kind))
            .to_string()
    }

    /// Capabilities after applying the dialect default
    pub fn resolved_capabilities(&self) -> CapabilitySet {
        self.capabilities
            .clone()
            .unwrap_or_else(|| self.kind.supported_capabilities())
    }

    /// Build the immutable descriptor for this provider
    pub fn to_descriptor(&self, name: &str) -> ProviderDescriptor {
        ProviderDescriptor {
            id: ProviderId::new(name),
            kind: self.kind,
            capabilities: self.resolved_capabilities(),
            unit_cost: Usd::from_dollars(self.unit_cost_usd),
            daily_budget: Usd::from_dollars(self.daily_budget_usd),
            base_url: self.resolved_base_url(),
        }
    }
}
