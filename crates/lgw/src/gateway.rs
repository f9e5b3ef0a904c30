//! Caller-facing gateway API
//!
//! [`Gateway`] is the only entry point collaborators need. It validates the
//! caller's input, builds a [`RequestEnvelope`] and hands it to the router or
//! the search gateway. Provider identities, retry counts and pool internals
//! show up only in the returned [`ProviderResult`] trail and in telemetry.

use bytes::Bytes;
use lgw_domain::error::{Error, Result};
use lgw_domain::{
    AttemptRecord, CostLedgerEntry, Priority, ProviderHealth, ProviderId, RequestEnvelope,
    RequestId, SearchResult, Usd,
};
use lgw_infrastructure::config::{AppConfig, ConfigLoader};
use lgw_infrastructure::search::SearchGatewayStats;
use lgw_infrastructure::utils::duration_ms;
use lgw_infrastructure::{GatewayContext, GatewayContextBuilder};
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Per-request options
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Deadline for the whole request, fallback included; the configured
    /// default when unset
    pub timeout_ms: Option<u64>,
    /// Providers whose unit cost exceeds this are skipped
    pub max_cost_usd: Option<f64>,
    /// Carried into telemetry
    pub priority: Priority,
    /// Forwarded as `Idempotency-Key` on every attempt
    pub idempotency_key: Option<String>,
    /// Caller cancellation
    pub cancel: Option<CancellationToken>,
}

impl RequestOptions {
    /// Set the request deadline
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Set the per-call cost ceiling
    pub fn with_max_cost_usd(mut self, max_cost_usd: f64) -> Self {
        self.max_cost_usd = Some(max_cost_usd);
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the idempotency key
    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    /// Use a caller-owned cancellation token
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// A successful provider request
#[derive(Debug, Clone)]
pub struct ProviderResult {
    /// Correlation id of the request, as found in telemetry
    pub request_id: RequestId,
    /// Provider that answered
    pub provider: ProviderId,
    /// HTTP status of the reply
    pub status: u16,
    /// Raw reply body
    pub body: Bytes,
    /// Cost recorded on the ledger
    pub cost_usd: f64,
    /// Every attempt across every provider tried, in order
    pub attempts: Vec<AttemptRecord>,
}

/// The outbound provider gateway
pub struct Gateway {
    context: GatewayContext,
}

impl Gateway {
    /// Build a gateway from configuration
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        Ok(Self::from_context(GatewayContextBuilder::new(config).build()?))
    }

    /// Load configuration and build a gateway
    pub fn load(loader: &ConfigLoader) -> Result<Self> {
        Self::from_config(loader.load()?)
    }

    /// Wrap an already built context
    pub fn from_context(context: GatewayContext) -> Self {
        Self { context }
    }

    /// Shared components
    pub fn context(&self) -> &GatewayContext {
        &self.context
    }

    /// Submit one chat or embedding request
    ///
    /// The task type selects the capability and the preferred provider.
    /// Transient failures are retried and then handed to the next provider
    /// of the fallback chain; the caller only sees an error once every
    /// candidate failed, the deadline passed or the request was cancelled.
    pub async fn submit_provider_request(
        &self,
        task_type: &str,
        payload: impl Into<Bytes>,
        options: RequestOptions,
    ) -> Result<ProviderResult> {
        self.ensure_running()?;

        let task_type = task_type.trim();
        if task_type.is_empty() {
            return Err(Error::invalid_argument("Task type cannot be empty"));
        }
        let timeout = match options.timeout_ms {
            Some(0) => {
                return Err(Error::invalid_argument(
                    "timeout_ms must be greater than zero",
                ));
            }
            Some(timeout_ms) => Duration::from_millis(timeout_ms),
            None => self.context.config.gateway.default_timeout(),
        };
        let max_cost = match options.max_cost_usd {
            Some(max_cost) if !max_cost.is_finite() || max_cost < 0.0 => {
                return Err(Error::invalid_argument(format!(
                    "max_cost_usd must be a non-negative amount, got {max_cost}"
                )));
            }
            Some(max_cost) => Some(Usd::from_dollars(max_cost)),
            None => None,
        };
        let capability = self.context.router().capability_for(task_type)?;

        let mut envelope = RequestEnvelope::new(task_type, capability, payload, timeout)
            .with_priority(options.priority);
        if let Some(max_cost) = max_cost {
            envelope = envelope.with_max_cost(max_cost);
        }
        if let Some(key) = options.idempotency_key {
            envelope = envelope.with_idempotency_key(key);
        }
        if let Some(cancel) = options.cancel {
            envelope = envelope.with_cancel(cancel);
        }

        debug!(
            request_id = %envelope.request_id,
            task_type = %envelope.task_type,
            capability = ?capability,
            timeout_ms = duration_ms(timeout),
            "Submitting provider request"
        );

        let response = self.context.router().route(&envelope).await?;

        info!(
            request_id = %envelope.request_id,
            provider = %response.provider,
            attempts = response.attempts.len(),
            cost_usd = response.cost.as_dollars(),
            "Provider request served"
        );

        Ok(ProviderResult {
            request_id: envelope.request_id,
            provider: response.provider,
            status: response.status,
            body: response.body,
            cost_usd: response.cost.as_dollars(),
            attempts: response.attempts,
        })
    }

    /// Search documents, native backend first
    pub async fn submit_search(&self, query: &str, filters: Value) -> Result<SearchResult> {
        self.ensure_running()?;
        self.context.search().search(query, filters).await
    }

    /// Return a provider to Healthy after an operator fixed it
    pub fn reset_provider(&self, provider: &str) -> Result<()> {
        let provider = ProviderId::new(provider);
        self.context.router().reset_provider(&provider)?;
        info!(provider = %provider, "Provider reset to healthy");
        Ok(())
    }

    /// Health of every registered provider
    pub fn provider_health(&self) -> Vec<(ProviderId, ProviderHealth)> {
        self.context.router().all_health()
    }

    /// Spend per provider and day
    pub fn ledger_entries(&self) -> Vec<CostLedgerEntry> {
        self.context.ledger().entries()
    }

    /// Search gateway statistics
    pub async fn search_stats(&self) -> SearchGatewayStats {
        self.context.search().stats().await
    }

    /// Stop background tasks and flush telemetry
    pub async fn shutdown(&self) {
        self.context.shutdown().await;
    }

    fn ensure_running(&self) -> Result<()> {
        if self.context.is_shut_down() {
            return Err(Error::infrastructure("Gateway is shut down"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("providers", &self.context.registry().ids())
            .field("shut_down", &self.context.is_shut_down())
            .finish_non_exhaustive()
    }
}
