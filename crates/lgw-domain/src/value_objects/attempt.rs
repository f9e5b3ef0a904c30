//! Attempt records and failure classification

use super::provider::ProviderId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Why a provider call, or the decision to make one, failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FailureKind {
    /// Attempt exceeded its per-attempt timeout
    Timeout,
    /// Could not open a connection
    ConnectionRefused,
    /// Connection dropped or other transport-level failure
    Network,
    /// Upstream answered with 5xx
    ServerError { status: u16 },
    /// Upstream answered 429, optionally with a Retry-After hint
    RateLimited { retry_after_ms: Option<u64> },
    /// Upstream answered 401 or 403
    Auth { status: u16 },
    /// Upstream answered another 4xx
    ClientError { status: u16 },
    /// Request could not be built or response could not be read
    Malformed,
    /// The caller's deadline elapsed
    DeadlineExceeded,
    /// The caller cancelled the request
    Cancelled,
    /// Skipped: the daily budget cannot cover one more call
    BudgetExceeded,
    /// Skipped: provider health is unavailable
    ProviderUnavailable,
    /// Skipped: unit cost above the caller's ceiling
    CostCeiling,
}

impl FailureKind {
    /// Whether the executor retries this failure locally
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            FailureKind::Timeout
                | FailureKind::ConnectionRefused
                | FailureKind::Network
                | FailureKind::ServerError { .. }
                | FailureKind::RateLimited { .. }
        )
    }

    /// Whether the failure ends the whole request rather than one provider
    pub fn aborts_request(self) -> bool {
        matches!(self, FailureKind::DeadlineExceeded | FailureKind::Cancelled)
    }

    /// Server-supplied retry hint, if any
    pub fn retry_after(self) -> Option<Duration> {
        match self {
            FailureKind::RateLimited {
                retry_after_ms: Some(ms),
            } => Some(Duration::from_millis(ms)),
            _ => None,
        }
    }

    /// Short label used as telemetry `outcome`
    pub fn label(self) -> &'static str {
        match self {
            FailureKind::Timeout => "timeout",
            FailureKind::ConnectionRefused => "connection_refused",
            FailureKind::Network => "network_error",
            FailureKind::ServerError { .. } => "server_error",
            FailureKind::RateLimited { .. } => "rate_limited",
            FailureKind::Auth { .. } => "auth_error",
            FailureKind::ClientError { .. } => "client_error",
            FailureKind::Malformed => "malformed",
            FailureKind::DeadlineExceeded => "deadline_exceeded",
            FailureKind::Cancelled => "cancelled",
            FailureKind::BudgetExceeded => "budget_exceeded",
            FailureKind::ProviderUnavailable => "provider_unavailable",
            FailureKind::CostCeiling => "cost_ceiling",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::ServerError { status }
            | FailureKind::Auth { status }
            | FailureKind::ClientError { status } => write!(f, "{} ({status})", self.label()),
            _ => f.write_str(self.label()),
        }
    }
}

/// Outcome of one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    Failure(FailureKind),
}

impl AttemptOutcome {
    /// Whether the attempt succeeded
    pub fn is_success(self) -> bool {
        matches!(self, AttemptOutcome::Success)
    }

    /// Telemetry label
    pub fn label(self) -> &'static str {
        match self {
            AttemptOutcome::Success => "success",
            AttemptOutcome::Failure(kind) => kind.label(),
        }
    }
}

/// One attempt against one provider; never mutated after creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Provider the attempt went to
    pub provider: ProviderId,
    /// When the attempt started
    pub timestamp: DateTime<Utc>,
    /// Wall time spent in the attempt
    pub latency_ms: u64,
    /// Success or classified failure
    pub outcome: AttemptOutcome,
    /// 1-based index within the provider invocation
    pub attempt: u32,
}

impl AttemptRecord {
    /// Whether the attempt succeeded
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}
