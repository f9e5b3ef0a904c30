//! Provider Router
//!
//! Chooses providers for a request and walks the fallback chain. For each
//! candidate, in order, the router:
//!
//! 1. skips it without a call when its health is Unavailable, its unit cost
//!    exceeds the caller's ceiling, or the ledger cannot hold one unit cost;
//! 2. otherwise delegates to the executor;
//! 3. on success commits the held cost and returns with the full trail.
//!
//! A deadline or cancellation ends the walk at once. When every candidate
//! failed or was skipped the caller gets one aggregate error.

use super::health::HealthMonitor;
use crate::config::RoutingConfig;
use crate::executor::{RequestExecutor, RetryPolicy};
use crate::ledger::CostLedger;
use crate::registry::ProviderRegistry;
use crate::telemetry::TelemetryEmitter;
use bytes::Bytes;
use lgw_domain::constants::{TASK_TYPE_CHAT, TASK_TYPE_EMBEDDING};
use lgw_domain::error::{Error, ProviderFailure, Result};
use lgw_domain::{
    AttemptRecord, Capability, Component, FailureKind, ProviderHealth, ProviderId,
    RequestEnvelope, TelemetryLevel, TelemetryRecord, Usd,
};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error, warn};

/// Route of one task type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRoute {
    /// Capability the task needs
    pub capability: Capability,
    /// Provider tried first
    pub prefer: Option<ProviderId>,
}

/// Task preferences and the fallback chain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingTable {
    tasks: HashMap<String, TaskRoute>,
    chain: Vec<ProviderId>,
}

impl RoutingTable {
    /// Create a table with a fallback chain and no task preferences
    pub fn new(chain: Vec<ProviderId>) -> Self {
        Self {
            tasks: HashMap::new(),
            chain,
        }
    }

    /// Add or replace a task route
    pub fn with_task(
        mut self,
        task_type: impl Into<String>,
        capability: Capability,
        prefer: Option<ProviderId>,
    ) -> Self {
        self.tasks.insert(
            task_type.into().to_lowercase(),
            TaskRoute { capability, prefer },
        );
        self
    }

    /// Build from configuration
    ///
    /// An empty fallback chain means every registered provider in
    /// registration order.
    pub fn from_config(config: &RoutingConfig, registry: &ProviderRegistry) -> Self {
        let chain = if config.fallback_chain.is_empty() {
            registry.ids()
        } else {
            config.fallback_chain.iter().map(ProviderId::new).collect()
        };

        config
            .tasks
            .iter()
            .fold(Self::new(chain), |table, (task, route)| {
                table.with_task(
                    task.as_str(),
                    route.capability,
                    route.prefer.as_deref().map(ProviderId::new),
                )
            })
    }

    /// Fallback chain in declared order
    pub fn chain(&self) -> &[ProviderId] {
        &self.chain
    }

    /// Route of a configured task type
    pub fn task(&self, task_type: &str) -> Option<&TaskRoute> {
        self.tasks.get(&task_type.to_lowercase())
    }

    /// Capability needed by a task type
    ///
    /// Configured task types come first; `chat` and `embedding` are always
    /// known.
    pub fn capability_for(&self, task_type: &str) -> Option<Capability> {
        if let Some(route) = self.task(task_type) {
            return Some(route.capability);
        }
        match task_type.to_lowercase().as_str() {
            TASK_TYPE_CHAT => Some(Capability::Chat),
            TASK_TYPE_EMBEDDING | "embeddings" => Some(Capability::Embedding),
            _ => None,
        }
    }

    /// Ordered candidates for a task: the preference, then the chain
    ///
    /// Duplicates, unregistered ids and providers lacking `capability` are
    /// left out.
    pub fn candidates(
        &self,
        task_type: &str,
        capability: Capability,
        registry: &ProviderRegistry,
    ) -> Vec<ProviderId> {
        let mut seen = HashSet::new();
        self.task(task_type)
            .and_then(|route| route.prefer.as_ref())
            .into_iter()
            .chain(self.chain.iter())
            .filter(|id| {
                registry
                    .descriptor(id)
                    .is_some_and(|descriptor| descriptor.supports(capability))
            })
            .filter(|id| seen.insert((*id).clone()))
            .cloned()
            .collect()
    }
}

/// A provider reply with its routing trail
#[derive(Debug, Clone)]
pub struct RoutedResponse {
    /// Provider that answered
    pub provider: ProviderId,
    /// HTTP status of the reply
    pub status: u16,
    /// Raw reply body
    pub body: Bytes,
    /// Cost recorded on the ledger for this request
    pub cost: Usd,
    /// Every attempt across every provider tried, in order
    pub attempts: Vec<AttemptRecord>,
}

#[derive(Debug, Default)]
struct RouterCounters {
    routed: AtomicU64,
    fallbacks: AtomicU64,
    skipped: AtomicU64,
    exhausted: AtomicU64,
}

/// Health- and budget-aware provider router
pub struct ProviderRouter {
    registry: Arc<ProviderRegistry>,
    ledger: Arc<CostLedger>,
    executor: Arc<RequestExecutor>,
    health: Arc<dyn HealthMonitor>,
    table: RoutingTable,
    policy: RetryPolicy,
    telemetry: Arc<TelemetryEmitter>,
    counters: RouterCounters,
}

impl ProviderRouter {
    /// Create a router with injected dependencies
    pub fn new(
        registry: Arc<ProviderRegistry>,
        ledger: Arc<CostLedger>,
        executor: Arc<RequestExecutor>,
        health: Arc<dyn HealthMonitor>,
        table: RoutingTable,
        policy: RetryPolicy,
        telemetry: Arc<TelemetryEmitter>,
    ) -> Self {
        Self {
            registry,
            ledger,
            executor,
            health,
            table,
            policy,
            telemetry,
            counters: RouterCounters::default(),
        }
    }

    /// Routing table in use
    pub fn table(&self) -> &RoutingTable {
        &self.table
    }

    /// Capability needed by a task type
    pub fn capability_for(&self, task_type: &str) -> Result<Capability> {
        self.table.capability_for(task_type).ok_or_else(|| {
            Error::invalid_argument(format!("Unknown task type: {task_type}"))
        })
    }

    /// Route one request through the candidates until one succeeds
    pub async fn route(&self, envelope: &RequestEnvelope) -> Result<RoutedResponse> {
        let candidates =
            self.table
                .candidates(&envelope.task_type, envelope.capability, &self.registry);
        let mut failures: Vec<ProviderFailure> = Vec::new();
        let mut trail: Vec<AttemptRecord> = Vec::new();

        debug!(
            request_id = %envelope.request_id,
            task_type = %envelope.task_type,
            candidates = ?candidates.iter().map(ProviderId::as_str).collect::<Vec<_>>(),
            "Routing request"
        );

        for provider in candidates {
            if envelope.cancel.is_cancelled() {
                return Err(Error::Cancelled { attempts: trail });
            }
            if envelope.is_expired() {
                return Err(Error::DeadlineExceeded {
                    message: format!("deadline passed before trying {provider}"),
                    attempts: trail,
                });
            }

            let Some(transport) = self.registry.get(&provider) else {
                continue;
            };
            let unit_cost = transport.descriptor().unit_cost;

            if self.health.get_health(&provider) == ProviderHealth::Unavailable {
                self.skip(
                    envelope,
                    &mut failures,
                    provider,
                    FailureKind::ProviderUnavailable,
                    "provider unavailable",
                );
                continue;
            }
            if let Some(max_cost) = envelope.max_cost
                && unit_cost > max_cost
            {
                let message = format!("unit cost {unit_cost} above ceiling {max_cost}");
                self.skip(
                    envelope,
                    &mut failures,
                    provider,
                    FailureKind::CostCeiling,
                    message,
                );
                continue;
            }
            let reservation = match self.ledger.reserve(&provider, unit_cost) {
                Ok(reservation) => reservation,
                Err(e) => {
                    self.health.mark_budget_exhausted(&provider);
                    self.skip(
                        envelope,
                        &mut failures,
                        provider,
                        FailureKind::BudgetExceeded,
                        e.to_string(),
                    );
                    continue;
                }
            };

            match self
                .executor
                .execute_with_retry(transport.as_ref(), envelope, &self.policy)
                .await
            {
                Ok(success) => {
                    trail.extend(success.attempts);
                    let cost = match reservation.commit() {
                        Ok(total) => {
                            self.emit_charge(envelope, &provider, unit_cost, total);
                            unit_cost
                        }
                        Err(e) => {
                            error!(provider = %provider, error = %e, "Failed to record provider spend");
                            Usd::ZERO
                        }
                    };
                    self.health.record_success(&provider);
                    self.counters.routed.fetch_add(1, Ordering::Relaxed);
                    if !failures.is_empty() {
                        self.counters.fallbacks.fetch_add(1, Ordering::Relaxed);
                    }
                    self.emit(
                        TelemetryRecord::new(
                            TelemetryLevel::Info,
                            Component::Router,
                            &envelope.request_id,
                            "success",
                            format!("served by {provider}"),
                        )
                        .with_provider(&provider)
                        .with_cost_usd(cost.as_dollars())
                        .with_context(self.context(envelope, json!(failures.len()))),
                    );
                    return Ok(RoutedResponse {
                        provider,
                        status: success.reply.status,
                        body: success.reply.body,
                        cost,
                        attempts: trail,
                    });
                }
                Err(failure) => {
                    drop(reservation);
                    trail.extend(failure.attempts.iter().cloned());

                    if failure.kind.aborts_request() {
                        self.counters.exhausted.fetch_add(1, Ordering::Relaxed);
                        return Err(Error::from_failure(
                            &provider,
                            failure.kind,
                            failure.message,
                            trail,
                        ));
                    }

                    if matches!(failure.kind, FailureKind::Auth { .. }) {
                        self.health.mark_auth_failure(&provider);
                    } else {
                        self.health.record_failure(&provider);
                    }

                    warn!(
                        request_id = %envelope.request_id,
                        provider = %provider,
                        reason = %failure.kind,
                        attempts = failure.attempts.len(),
                        error = %Error::from_failure(
                            &provider,
                            failure.kind,
                            failure.message.as_str(),
                            Vec::new(),
                        ),
                        "Provider failed; trying next candidate"
                    );
                    self.emit(
                        TelemetryRecord::new(
                            TelemetryLevel::Warn,
                            Component::Router,
                            &envelope.request_id,
                            failure.kind.label(),
                            format!("falling back from {provider}: {}", failure.message),
                        )
                        .with_provider(&provider)
                        .with_context(
                            self.context(envelope, json!(failure.attempts.len())),
                        ),
                    );
                    failures.push(ProviderFailure {
                        provider,
                        reason: failure.kind,
                        attempts: failure.attempts,
                        message: failure.message,
                    });
                }
            }
        }

        self.counters.exhausted.fetch_add(1, Ordering::Relaxed);
        let error = Error::Aggregate { failures };
        self.emit(TelemetryRecord::new(
            TelemetryLevel::Error,
            Component::Router,
            &envelope.request_id,
            "exhausted",
            error.to_string(),
        ));
        Err(error)
    }

    fn skip(
        &self,
        envelope: &RequestEnvelope,
        failures: &mut Vec<ProviderFailure>,
        provider: ProviderId,
        reason: FailureKind,
        message: impl Into<String>,
    ) {
        let message = message.into();
        self.counters.skipped.fetch_add(1, Ordering::Relaxed);
        debug!(provider = %provider, reason = %reason, "Skipping provider");
        self.emit(
            TelemetryRecord::new(
                TelemetryLevel::Info,
                Component::Router,
                &envelope.request_id,
                reason.label(),
                format!("skipped {provider}: {message}"),
            )
            .with_provider(&provider)
            .with_context(self.context(envelope, json!(0))),
        );
        failures.push(ProviderFailure {
            provider,
            reason,
            attempts: Vec::new(),
            message,
        });
    }

    fn emit_charge(&self, envelope: &RequestEnvelope, provider: &ProviderId, amount: Usd, total: Usd) {
        self.emit(
            TelemetryRecord::new(
                TelemetryLevel::Info,
                Component::Ledger,
                &envelope.request_id,
                "charged",
                format!("charged {amount}, {total} spent today"),
            )
            .with_provider(provider)
            .with_cost_usd(amount.as_dollars())
            .with_context(json!({
                "spentToday": total.as_dollars(),
                "remaining": self.ledger.remaining(provider).as_dollars(),
            })),
        );
    }

    fn context(&self, envelope: &RequestEnvelope, attempts: Value) -> Value {
        json!({
            "taskType": envelope.task_type,
            "priority": envelope.priority,
            "attempts": attempts,
        })
    }

    fn emit(&self, record: TelemetryRecord) {
        self.telemetry.emit(record);
    }

    /// Health of a provider
    pub fn provider_health(&self, provider: &ProviderId) -> ProviderHealth {
        self.health.get_health(provider)
    }

    /// Health of every registered provider
    pub fn all_health(&self) -> Vec<(ProviderId, ProviderHealth)> {
        self.registry
            .ids()
            .into_iter()
            .map(|id| {
                let health = self.health.get_health(&id);
                (id, health)
            })
            .collect()
    }

    /// Return a provider to Healthy
    pub fn reset_provider(&self, provider: &ProviderId) -> Result<()> {
        if !self.registry.contains(provider) {
            return Err(Error::not_found(format!("provider {provider}")));
        }
        self.health.reset(provider);
        Ok(())
    }

    /// Router statistics
    pub fn stats(&self) -> HashMap<String, Value> {
        let mut stats = HashMap::new();
        stats.insert(
            "routed".to_string(),
            json!(self.counters.routed.load(Ordering::Relaxed)),
        );
        stats.insert(
            "fallbacks".to_string(),
            json!(self.counters.fallbacks.load(Ordering::Relaxed)),
        );
        stats.insert(
            "skipped".to_string(),
            json!(self.counters.skipped.load(Ordering::Relaxed)),
        );
        stats.insert(
            "exhausted".to_string(),
            json!(self.counters.exhausted.load(Ordering::Relaxed)),
        );
        stats.insert(
            "fallback_chain".to_string(),
            json!(self.table.chain().iter().map(ProviderId::as_str).collect::<Vec<_>>()),
        );
        stats.insert(
            "health_summary".to_string(),
            json!(self.health.get_all_health()),
        );
        stats
    }
}

impl std::fmt::Debug for ProviderRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRouter")
            .field("providers", &self.registry.ids())
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}
