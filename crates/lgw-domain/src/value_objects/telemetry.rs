//! Telemetry record schema
//!
//! One JSON object per line:
//! `{timestamp, level, component, requestId, provider?, attempt?, outcome,
//! latencyMs, costUsd?, message, context}`.

use super::provider::ProviderId;
use super::request::RequestId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Record severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TelemetryLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Gateway component that produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Executor,
    Router,
    Ledger,
    Pool,
    SearchGateway,
}

/// A structured telemetry record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryRecord {
    pub timestamp: DateTime<Utc>,
    pub level: TelemetryLevel,
    pub component: Component,
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempt: Option<u32>,
    pub outcome: String,
    pub latency_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_usd: Option<f64>,
    pub message: String,
    #[serde(default)]
    pub context: Value,
}

impl TelemetryRecord {
    /// Start a record with the required fields
    pub fn new(
        level: TelemetryLevel,
        component: Component,
        request_id: &RequestId,
        outcome: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            component,
            request_id: request_id.as_str().to_string(),
            provider: None,
            attempt: None,
            outcome: outcome.into(),
            latency_ms: 0,
            cost_usd: None,
            message: message.into(),
            context: Value::Object(serde_json::Map::new()),
        }
    }

    /// Attach the provider
    pub fn with_provider(mut self, provider: &ProviderId) -> Self {
        self.provider = Some(provider.clone());
        self
    }

    /// Attach the attempt index
    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = Some(attempt);
        self
    }

    /// Attach latency
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Attach the billed cost
    pub fn with_cost_usd(mut self, cost_usd: f64) -> Self {
        self.cost_usd = Some(cost_usd);
        self
    }

    /// Replace the free-form context
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = context;
        self
    }

    /// Override the timestamp
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
