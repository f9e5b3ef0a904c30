//! Tests for provider health tracking

use crate::support::manual_clock;
use lgw_domain::{ProviderHealth, ProviderId};
use lgw_infrastructure::ManualClock;
use lgw_infrastructure::routing::{HealthMonitor, InMemoryHealthMonitor};
use std::sync::Arc;
use std::time::Duration;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

fn monitor() -> (InMemoryHealthMonitor, Arc<ManualClock>) {
    let clock = manual_clock();
    (InMemoryHealthMonitor::with_thresholds(3, 6, clock.clone()), clock)
}

fn alpha() -> ProviderId {
    ProviderId::new("alpha")
}

fn fail(monitor: &InMemoryHealthMonitor, times: usize) {
    for _ in 0..times {
        monitor.record_failure(&alpha());
    }
}

#[test]
fn test_unknown_provider_is_healthy() {
    let (monitor, _) = monitor();
    assert_eq!(monitor.get_health(&alpha()), ProviderHealth::Healthy);
    assert!(monitor.snapshot(&alpha()).is_none());
}

#[test]
fn test_consecutive_failures_degrade_then_disable() {
    let (monitor, _) = monitor();
    fail(&monitor, 2);
    assert_eq!(monitor.get_health(&alpha()), ProviderHealth::Healthy);
    fail(&monitor, 1);
    assert_eq!(monitor.get_health(&alpha()), ProviderHealth::Degraded);
    fail(&monitor, 3);
    assert_eq!(monitor.get_health(&alpha()), ProviderHealth::Unavailable);
}

#[test]
fn test_success_resets_failure_streak() {
    let (monitor, _) = monitor();
    fail(&monitor, 4);
    monitor.record_success(&alpha());

    let data = monitor.snapshot(&alpha()).unwrap();
    assert_eq!(data.status, ProviderHealth::Healthy);
    assert_eq!(data.consecutive_failures, 0);
    assert_eq!(data.failure_count, 4);
    assert_eq!(data.success_count, 1);
}

/// Only rollover or reset bring an unavailable provider back
#[test]
fn test_success_does_not_revive_unavailable() {
    let (monitor, _) = monitor();
    fail(&monitor, 6);
    monitor.record_success(&alpha());
    assert_eq!(monitor.get_health(&alpha()), ProviderHealth::Unavailable);
}

#[test]
fn test_day_rollover_revives_unavailable() {
    let (monitor, clock) = monitor();
    fail(&monitor, 6);

    clock.advance(DAY);
    assert_eq!(monitor.get_health(&alpha()), ProviderHealth::Healthy);
    assert_eq!(monitor.snapshot(&alpha()).unwrap().consecutive_failures, 0);
}

#[test]
fn test_rollover_keeps_degraded_streak() {
    let (monitor, clock) = monitor();
    fail(&monitor, 3);
    clock.advance(DAY);
    assert_eq!(monitor.get_health(&alpha()), ProviderHealth::Degraded);
}

#[test]
fn test_auth_failure_locks_until_reset() {
    let (monitor, clock) = monitor();
    monitor.mark_auth_failure(&alpha());
    assert_eq!(monitor.get_health(&alpha()), ProviderHealth::Unavailable);
    assert!(monitor.snapshot(&alpha()).unwrap().auth_locked);

    clock.advance(DAY);
    assert_eq!(monitor.get_health(&alpha()), ProviderHealth::Unavailable);

    monitor.reset(&alpha());
    assert_eq!(monitor.get_health(&alpha()), ProviderHealth::Healthy);
}

#[test]
fn test_budget_exhaustion_disables_degraded_only() {
    let (monitor, _) = monitor();
    monitor.mark_budget_exhausted(&alpha());
    assert_eq!(monitor.get_health(&alpha()), ProviderHealth::Healthy);

    fail(&monitor, 3);
    monitor.mark_budget_exhausted(&alpha());
    assert_eq!(monitor.get_health(&alpha()), ProviderHealth::Unavailable);
}

#[test]
fn test_get_all_health_lists_reported_providers() {
    let (monitor, _) = monitor();
    fail(&monitor, 3);
    monitor.record_success(&ProviderId::new("beta"));

    let all = monitor.get_all_health();
    assert_eq!(all.len(), 2);
    assert_eq!(all["alpha"], ProviderHealth::Degraded);
    assert_eq!(all["beta"], ProviderHealth::Healthy);
}
