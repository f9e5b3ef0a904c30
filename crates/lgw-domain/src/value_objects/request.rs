//! Request envelopes
//!
//! One [`RequestEnvelope`] is created per caller request and owned by the
//! call that issued it. It carries the absolute deadline and the
//! cancellation token that every suspension point of the gateway races.

use super::money::Usd;
use super::provider::Capability;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Request correlation identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caller-assigned priority, carried into telemetry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

/// A single provider request as submitted by a collaborator
#[derive(Debug, Clone)]
pub struct RequestEnvelope {
    /// Correlation id shared by every attempt and telemetry record
    pub request_id: RequestId,
    /// Task type as named by the caller (e.g. `logistics`, `chat`)
    pub task_type: String,
    /// Capability the task needs
    pub capability: Capability,
    /// Provider-ready request body
    pub payload: Bytes,
    /// Caller priority
    pub priority: Priority,
    /// Absolute deadline for the whole request, fallback included
    pub deadline: Instant,
    /// Forwarded as `Idempotency-Key` on every attempt
    pub idempotency_key: Option<String>,
    /// Providers whose unit cost exceeds this are skipped
    pub max_cost: Option<Usd>,
    /// Caller cancellation
    pub cancel: CancellationToken,
}

impl RequestEnvelope {
    /// Create an envelope whose deadline is `timeout` from now
    pub fn new(
        task_type: impl Into<String>,
        capability: Capability,
        payload: impl Into<Bytes>,
        timeout: Duration,
    ) -> Self {
        Self {
            request_id: RequestId::generate(),
            task_type: task_type.into(),
            capability,
            payload: payload.into(),
            priority: Priority::default(),
            deadline: Instant::now() + timeout,
            idempotency_key: None,
            max_cost: None,
            cancel: CancellationToken::new(),
        }
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

    /// Set the per-call cost ceiling
    pub fn with_max_cost(mut self, max_cost: Usd) -> Self {
        self.max_cost = Some(max_cost);
        self
    }

    /// Use a caller-owned cancellation token
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Time left before the deadline, `None` once it has passed
    pub fn remaining(&self) -> Option<Duration> {
        let now = Instant::now();
        (now < self.deadline).then(|| self.deadline - now)
    }

    /// Whether the deadline has passed
    pub fn is_expired(&self) -> bool {
        self.remaining().is_none()
    }
}
