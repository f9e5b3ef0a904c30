//! Health Monitoring for Provider Routing
//!
//! Tracks provider health from the outcome of each provider invocation
//! (not each attempt). Transitions:
//!
//! - Healthy -> Degraded after `degraded_after` consecutive failed invocations
//! - Degraded -> Unavailable after `unavailable_after` consecutive failures,
//!   or when the daily budget is exhausted
//! - any -> Unavailable on an authentication failure, locked until manual reset
//! - Unavailable -> Healthy only at UTC day rollover (not for auth locks) or
//!   manual reset
//! - a success while Healthy or Degraded resets the failure count

use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use lgw_domain::ports::Clock;
use lgw_domain::{ProviderHealth, ProviderId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Health data for a single provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderHealthData {
    /// Current health status
    pub status: ProviderHealth,
    /// Consecutive failed invocations
    pub consecutive_failures: u32,
    /// Total successful invocations
    pub success_count: u64,
    /// Total failed invocations
    pub failure_count: u64,
    /// Unavailable because of rejected credentials
    pub auth_locked: bool,
    /// UTC day the status was last evaluated on
    pub day: NaiveDate,
    /// Last status change
    pub last_change: DateTime<Utc>,
}

impl ProviderHealthData {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            status: ProviderHealth::Healthy,
            consecutive_failures: 0,
            success_count: 0,
            failure_count: 0,
            auth_locked: false,
            day: now.date_naive(),
            last_change: now,
        }
    }

    fn set_status(&mut self, provider: &str, status: ProviderHealth, now: DateTime<Utc>) {
        if self.status != status {
            info!(provider, from = ?self.status, to = ?status, "Provider health changed");
            self.status = status;
            self.last_change = now;
        }
    }
}

/// Health monitor interface
///
/// # Example
///
/// ```ignore
/// let status = monitor.get_health(&ProviderId::new("alpha"));
/// if status == ProviderHealth::Unavailable {
///     // skip the provider
/// }
///
/// monitor.record_success(&ProviderId::new("alpha"));
/// monitor.record_failure(&ProviderId::new("beta"));
/// ```
pub trait HealthMonitor: Send + Sync {
    /// Get health status for a provider
    fn get_health(&self, provider: &ProviderId) -> ProviderHealth;

    /// Record a successful invocation
    fn record_success(&self, provider: &ProviderId);

    /// Record a failed invocation
    fn record_failure(&self, provider: &ProviderId);

    /// Record that the provider's daily budget cannot cover another call
    fn mark_budget_exhausted(&self, provider: &ProviderId);

    /// Record rejected credentials
    fn mark_auth_failure(&self, provider: &ProviderId);

    /// Return a provider to Healthy and clear its counters
    fn reset(&self, provider: &ProviderId);

    /// Get all provider health statuses
    fn get_all_health(&self) -> HashMap<String, ProviderHealth>;
}

/// In-memory health monitor implementation
///
/// Tracks provider health in a concurrent map; every update of one provider
/// runs under its entry lock.
pub struct InMemoryHealthMonitor {
    /// Health data per provider
    health_data: DashMap<ProviderId, ProviderHealthData>,
    /// Consecutive failures before Degraded
    degraded_threshold: u32,
    /// Consecutive failures before Unavailable
    unavailable_threshold: u32,
    /// Source of the current UTC day
    clock: Arc<dyn Clock>,
}

impl InMemoryHealthMonitor {
    /// Create with custom thresholds
    pub fn with_thresholds(
        degraded_threshold: u32,
        unavailable_threshold: u32,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            health_data: DashMap::new(),
            degraded_threshold: degraded_threshold.max(1),
            unavailable_threshold: unavailable_threshold.max(degraded_threshold.max(1)),
            clock,
        }
    }

    /// Full health data of a provider, if it was ever reported on
    pub fn snapshot(&self, provider: &ProviderId) -> Option<ProviderHealthData> {
        let now = self.clock.now();
        self.health_data.get_mut(provider).map(|mut data| {
            self.roll_over(provider, &mut *data, now);
            data.clone()
        })
    }

    /// Apply `update` to the provider's data after day rollover
    fn update<F>(&self, provider: &ProviderId, update: F)
    where
        F: FnOnce(&mut ProviderHealthData, DateTime<Utc>),
    {
        let now = self.clock.now();
        let mut data = self
            .health_data
            .entry(provider.clone())
            .or_insert_with(|| ProviderHealthData::new(now));
        self.roll_over(provider, &mut *data, now);
        update(&mut *data, now);
    }

    fn roll_over(&self, provider: &ProviderId, data: &mut ProviderHealthData, now: DateTime<Utc>) {
        let today = now.date_naive();
        if data.day == today {
            return;
        }
        data.day = today;
        if data.status == ProviderHealth::Unavailable && !data.auth_locked {
            data.consecutive_failures = 0;
            data.set_status(provider.as_str(), ProviderHealth::Healthy, now);
        }
    }

    /// Calculate status based on failure count
    fn calculate_status(&self, consecutive_failures: u32) -> ProviderHealth {
        if consecutive_failures >= self.unavailable_threshold {
            ProviderHealth::Unavailable
        } else if consecutive_failures >= self.degraded_threshold {
            ProviderHealth::Degraded
        } else {
            ProviderHealth::Healthy
        }
    }
}

impl HealthMonitor for InMemoryHealthMonitor {
    fn get_health(&self, provider: &ProviderId) -> ProviderHealth {
        self.snapshot(provider)
            .map_or(ProviderHealth::Healthy, |data| data.status)
    }

    fn record_success(&self, provider: &ProviderId) {
        self.update(provider, |data, now| {
            data.success_count += 1;
            if data.status != ProviderHealth::Unavailable {
                data.consecutive_failures = 0;
                data.set_status(provider.as_str(), ProviderHealth::Healthy, now);
            }
        });
    }

    fn record_failure(&self, provider: &ProviderId) {
        self.update(provider, |data, now| {
            data.failure_count += 1;
            data.consecutive_failures = data.consecutive_failures.saturating_add(1);
            if data.status != ProviderHealth::Unavailable {
                let status = self.calculate_status(data.consecutive_failures);
                data.set_status(provider.as_str(), status, now);
            }
        });
    }

    fn mark_budget_exhausted(&self, provider: &ProviderId) {
        self.update(provider, |data, now| {
            if data.status == ProviderHealth::Degraded {
                data.set_status(provider.as_str(), ProviderHealth::Unavailable, now);
            }
        });
    }

    fn mark_auth_failure(&self, provider: &ProviderId) {
        warn!(provider = %provider, "Provider rejected credentials; disabled until reset");
        self.update(provider, |data, now| {
            data.failure_count += 1;
            data.auth_locked = true;
            data.set_status(provider.as_str(), ProviderHealth::Unavailable, now);
        });
    }

    fn reset(&self, provider: &ProviderId) {
        if self.health_data.remove(provider).is_some() {
            info!(provider = %provider, "Provider health reset");
        }
    }

    fn get_all_health(&self) -> HashMap<String, ProviderHealth> {
        let now = self.clock.now();
        self.health_data
            .iter_mut()
            .map(|mut entry| {
                let provider = entry.key().clone();
                self.roll_over(&provider, entry.value_mut(), now);
                (provider.as_str().to_string(), entry.value().status)
            })
            .collect()
    }
}
