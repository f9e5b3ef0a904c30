//! Request execution
//!
//! [`RequestExecutor::execute_with_retry`] runs one provider invocation: a
//! strictly sequential, bounded series of attempts separated by backoff
//! waits. Every suspension point (slot wait, outbound call, backoff wait)
//! races the envelope's deadline and cancellation token.
//!
//! The executor knows nothing about cost or provider selection; it only
//! turns a transport plus an envelope into a reply or a classified failure
//! with the attempt trail.

pub mod backoff;
pub mod pool;

pub use backoff::{BackoffPolicy, RetryPolicy};
pub use pool::{ConnectionLease, ConnectionPool, PoolStats};

use crate::telemetry::TelemetryEmitter;
use crate::utils::{TimedOperation, duration_ms};
use chrono::Utc;
use lgw_domain::{
    AttemptOutcome, AttemptRecord, Component, FailureKind, RequestEnvelope, TelemetryLevel,
    TelemetryRecord,
};
use lgw_providers::{ProviderCallError, ProviderReply, ProviderTransport};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// A provider invocation that produced a reply
#[derive(Debug, Clone)]
pub struct ExecutionSuccess {
    /// Reply of the successful attempt
    pub reply: ProviderReply,
    /// Every attempt made, the successful one last
    pub attempts: Vec<AttemptRecord>,
}

/// A provider invocation that ended without a reply
#[derive(Debug, Clone)]
pub struct ExecutionFailure {
    /// Classification of the final failure
    pub kind: FailureKind,
    /// Detail of the final failure
    pub message: String,
    /// Every attempt made; may be empty when nothing was sent
    pub attempts: Vec<AttemptRecord>,
}

impl ExecutionFailure {
    fn new(kind: FailureKind, message: impl Into<String>, attempts: Vec<AttemptRecord>) -> Self {
        Self {
            kind,
            message: message.into(),
            attempts,
        }
    }
}

/// Pooled, retrying execution primitive
pub struct RequestExecutor {
    pool: Arc<ConnectionPool>,
    telemetry: Arc<TelemetryEmitter>,
}

impl RequestExecutor {
    /// Create an executor over a shared pool
    pub fn new(pool: Arc<ConnectionPool>, telemetry: Arc<TelemetryEmitter>) -> Self {
        Self { pool, telemetry }
    }

    /// Shared connection pool
    pub fn pool(&self) -> &Arc<ConnectionPool> {
        &self.pool
    }

    /// Run one provider invocation with at most `policy.max_attempts()` attempts
    ///
    /// Non-retryable failures end the invocation immediately. Before each
    /// backoff wait the remaining deadline is compared with the delay; when
    /// the wait would outlive the deadline the invocation ends with
    /// [`FailureKind::DeadlineExceeded`] without sleeping.
    pub async fn execute_with_retry(
        &self,
        transport: &dyn ProviderTransport,
        envelope: &RequestEnvelope,
        policy: &RetryPolicy,
    ) -> Result<ExecutionSuccess, ExecutionFailure> {
        let provider = transport.id().clone();
        let Some(url) = transport.target_url(envelope.capability) else {
            return Err(ExecutionFailure::new(
                FailureKind::Malformed,
                format!("{provider} cannot serve {}", envelope.capability),
                Vec::new(),
            ));
        };

        let max_attempts = policy.max_attempts();
        let mut attempts = Vec::new();
        let mut attempt: u32 = 0;

        loop {
            if envelope.cancel.is_cancelled() {
                return Err(ExecutionFailure::new(
                    FailureKind::Cancelled,
                    "request cancelled",
                    attempts,
                ));
            }
            if envelope.is_expired() {
                return Err(ExecutionFailure::new(
                    FailureKind::DeadlineExceeded,
                    "deadline passed before the next attempt",
                    attempts,
                ));
            }

            attempt += 1;
            let timestamp = Utc::now();
            let timer = TimedOperation::start();
            let result = self
                .attempt_once(transport, &url, envelope, policy.attempt_timeout)
                .await;

            let record = AttemptRecord {
                provider: provider.clone(),
                timestamp,
                latency_ms: timer.elapsed_ms(),
                outcome: match &result {
                    Ok(_) => AttemptOutcome::Success,
                    Err(error) => AttemptOutcome::Failure(error.kind),
                },
                attempt,
            };
            self.emit_attempt(envelope, &record, result.as_ref().err());
            attempts.push(record);

            let error = match result {
                Ok(reply) => return Ok(ExecutionSuccess { reply, attempts }),
                Err(error) => error,
            };

            if error.kind.aborts_request() || !error.kind.is_retryable() || attempt >= max_attempts
            {
                return Err(ExecutionFailure::new(error.kind, error.message, attempts));
            }

            let delay = policy
                .backoff
                .delay_with_hint(attempt, error.kind.retry_after());
            if envelope.remaining().is_none_or(|remaining| remaining <= delay) {
                return Err(ExecutionFailure::new(
                    FailureKind::DeadlineExceeded,
                    format!(
                        "deadline would pass during {}ms backoff after {}",
                        delay.as_millis(),
                        error.kind
                    ),
                    attempts,
                ));
            }

            debug!(
                provider = %provider,
                attempt,
                delay_ms = duration_ms(delay),
                reason = %error.kind,
                "Retrying provider call"
            );

            tokio::select! {
                biased;
                () = envelope.cancel.cancelled() => {
                    return Err(ExecutionFailure::new(
                        FailureKind::Cancelled,
                        "request cancelled during backoff",
                        attempts,
                    ));
                }
                () = tokio::time::sleep(delay) => {}
            }
        }
    }

    async fn attempt_once(
        &self,
        transport: &dyn ProviderTransport,
        url: &str,
        envelope: &RequestEnvelope,
        attempt_timeout: Duration,
    ) -> Result<ProviderReply, ProviderCallError> {
        let lease = tokio::select! {
            biased;
            () = envelope.cancel.cancelled() => {
                return Err(ProviderCallError::new(
                    FailureKind::Cancelled,
                    "cancelled while waiting for a connection slot",
                ));
            }
            () = tokio::time::sleep_until(envelope.deadline) => {
                return Err(ProviderCallError::new(
                    FailureKind::DeadlineExceeded,
                    "deadline passed while waiting for a connection slot",
                ));
            }
            lease = self.pool.acquire(url) => lease
                .map_err(|e| ProviderCallError::new(FailureKind::Malformed, e.to_string()))?,
        };

        let Some(remaining) = envelope.remaining() else {
            return Err(ProviderCallError::new(
                FailureKind::DeadlineExceeded,
                "deadline passed before the call",
            ));
        };
        let budget = attempt_timeout.min(remaining);

        tokio::select! {
            biased;
            () = envelope.cancel.cancelled() => Err(ProviderCallError::new(
                FailureKind::Cancelled,
                "cancelled during the call",
            )),
            outcome = tokio::time::timeout(budget, transport.send(lease.client(), envelope, budget)) => {
                match outcome {
                    Ok(result) => result,
                    Err(_) if envelope.is_expired() => Err(ProviderCallError::new(
                        FailureKind::DeadlineExceeded,
                        "deadline passed during the call",
                    )),
                    Err(_) => Err(ProviderCallError::new(
                        FailureKind::Timeout,
                        format!("no response within {}ms", budget.as_millis()),
                    )),
                }
            }
        }
    }

    fn emit_attempt(
        &self,
        envelope: &RequestEnvelope,
        record: &AttemptRecord,
        error: Option<&ProviderCallError>,
    ) {
        let (level, message) = match error {
            None => (TelemetryLevel::Info, "attempt succeeded".to_string()),
            Some(error) if error.kind.aborts_request() || error.kind.is_retryable() => {
                (TelemetryLevel::Warn, error.message.clone())
            }
            Some(error) => (TelemetryLevel::Error, error.message.clone()),
        };

        self.telemetry.emit(
            TelemetryRecord::new(
                level,
                Component::Executor,
                &envelope.request_id,
                record.outcome.label(),
                message,
            )
            .at(record.timestamp)
            .with_provider(&record.provider)
            .with_attempt(record.attempt)
            .with_latency_ms(record.latency_ms)
            .with_context(json!({
                "taskType": envelope.task_type,
                "capability": envelope.capability,
                "priority": envelope.priority,
            })),
        );
    }
}
