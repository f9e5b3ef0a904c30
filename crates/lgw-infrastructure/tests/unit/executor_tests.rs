//! Tests for the retrying request executor
//!
//! Time is paused, so backoff waits complete instantly while the tokio clock
//! still reports their exact length.

use crate::support::{ScriptedTransport, Step, ok, server_error};
use lgw_domain::{
    AttemptOutcome, Capability, CapabilitySet, Component, FailureKind, RequestEnvelope,
    TelemetryLevel,
};
use lgw_infrastructure::config::PoolConfig;
use lgw_infrastructure::executor::{BackoffPolicy, ConnectionPool, RequestExecutor, RetryPolicy};
use lgw_infrastructure::telemetry::{MemorySink, TelemetryEmitter};
use std::sync::Arc;
use std::time::Duration;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn executor() -> RequestExecutor {
    RequestExecutor::new(
        Arc::new(ConnectionPool::new(PoolConfig::default()).without_system_proxy()),
        TelemetryEmitter::disabled(),
    )
}

fn policy(max_retries: u32, attempt_timeout_ms: u64) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        attempt_timeout: ms(attempt_timeout_ms),
        backoff: BackoffPolicy::new(ms(1000), 2.0, ms(8000), 0.0),
    }
}

fn envelope(timeout_ms: u64) -> RequestEnvelope {
    RequestEnvelope::new("logistics", Capability::Chat, r#"{"q":"eta"}"#, ms(timeout_ms))
}

fn gaps(transport: &ScriptedTransport) -> Vec<Duration> {
    transport
        .call_times()
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .collect()
}

fn assert_close(actual: Duration, expected: Duration) {
    assert!(
        actual >= expected && actual < expected + ms(5),
        "expected ~{expected:?}, got {actual:?}"
    );
}

// =============================================================================
// Retry schedule
// =============================================================================

/// max_retries = 3 against a steady 503 makes exactly four attempts
#[tokio::test(start_paused = true)]
async fn test_retries_then_gives_up_with_exponential_spacing() {
    let transport = ScriptedTransport::always("alpha", server_error());
    let failure = executor()
        .execute_with_retry(&transport, &envelope(60_000), &policy(3, 1000))
        .await
        .unwrap_err();

    assert_eq!(transport.calls(), 4);
    assert_eq!(failure.kind, FailureKind::ServerError { status: 503 });
    assert_eq!(failure.attempts.len(), 4);
    assert_eq!(
        failure.attempts.iter().map(|a| a.attempt).collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );

    let gaps = gaps(&transport);
    assert_eq!(gaps.len(), 3);
    for (gap, expected) in gaps.iter().zip([1000, 2000, 4000]) {
        assert_close(*gap, ms(expected));
    }
}

#[tokio::test(start_paused = true)]
async fn test_success_after_transient_failures() {
    let transport = ScriptedTransport::new("alpha", vec![server_error(), server_error(), ok()]);
    let success = executor()
        .execute_with_retry(&transport, &envelope(60_000), &policy(3, 1000))
        .await
        .unwrap();

    assert_eq!(success.reply.status, 200);
    assert_eq!(success.attempts.len(), 3);
    assert!(success.attempts.last().unwrap().is_success());
    assert_eq!(
        success.attempts[0].outcome,
        AttemptOutcome::Failure(FailureKind::ServerError { status: 503 })
    );
}

#[tokio::test(start_paused = true)]
async fn test_client_error_is_not_retried() {
    let transport =
        ScriptedTransport::always("alpha", Step::Fail(FailureKind::ClientError { status: 400 }));
    let failure = executor()
        .execute_with_retry(&transport, &envelope(60_000), &policy(3, 1000))
        .await
        .unwrap_err();

    assert_eq!(transport.calls(), 1);
    assert_eq!(failure.kind, FailureKind::ClientError { status: 400 });
}

#[tokio::test(start_paused = true)]
async fn test_auth_error_is_not_retried() {
    let transport = ScriptedTransport::always("alpha", Step::Fail(FailureKind::Auth { status: 401 }));
    let failure = executor()
        .execute_with_retry(&transport, &envelope(60_000), &policy(3, 1000))
        .await
        .unwrap_err();

    assert_eq!(transport.calls(), 1);
    assert_eq!(failure.kind, FailureKind::Auth { status: 401 });
}

// =============================================================================
// Retry-After
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_retry_after_hint_lengthens_the_wait() {
    let transport = ScriptedTransport::new(
        "alpha",
        vec![
            Step::Fail(FailureKind::RateLimited {
                retry_after_ms: Some(3000),
            }),
            ok(),
        ],
    );
    executor()
        .execute_with_retry(&transport, &envelope(60_000), &policy(3, 1000))
        .await
        .unwrap();

    assert_close(gaps(&transport)[0], ms(3000));
}

#[tokio::test(start_paused = true)]
async fn test_retry_after_hint_is_capped() {
    let transport = ScriptedTransport::new(
        "alpha",
        vec![
            Step::Fail(FailureKind::RateLimited {
                retry_after_ms: Some(20_000),
            }),
            ok(),
        ],
    );
    executor()
        .execute_with_retry(&transport, &envelope(60_000), &policy(3, 1000))
        .await
        .unwrap();

    assert_close(gaps(&transport)[0], ms(8000));
}

// =============================================================================
// Timeouts, deadlines and cancellation
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_hanging_call_times_out_per_attempt() {
    let transport = ScriptedTransport::always("alpha", Step::Hang);
    let failure = executor()
        .execute_with_retry(&transport, &envelope(60_000), &policy(1, 1000))
        .await
        .unwrap_err();

    assert_eq!(transport.calls(), 2);
    assert_eq!(failure.kind, FailureKind::Timeout);
    assert!(
        failure
            .attempts
            .iter()
            .all(|a| a.outcome == AttemptOutcome::Failure(FailureKind::Timeout))
    );
}

/// The attempt timeout is clipped to what is left of the deadline
#[tokio::test(start_paused = true)]
async fn test_hanging_call_hits_the_deadline() {
    let transport = ScriptedTransport::always("alpha", Step::Hang);
    let started = tokio::time::Instant::now();
    let failure = executor()
        .execute_with_retry(&transport, &envelope(500), &policy(3, 1000))
        .await
        .unwrap_err();

    assert_eq!(failure.kind, FailureKind::DeadlineExceeded);
    assert_eq!(transport.calls(), 1);
    assert_close(started.elapsed(), ms(500));
}

/// A backoff wait that would outlive the deadline is not started
#[tokio::test(start_paused = true)]
async fn test_deadline_shorter_than_backoff_stops_early() {
    let transport = ScriptedTransport::always("alpha", server_error());
    let started = tokio::time::Instant::now();
    let failure = executor()
        .execute_with_retry(&transport, &envelope(1500), &policy(3, 1000))
        .await
        .unwrap_err();

    assert_eq!(failure.kind, FailureKind::DeadlineExceeded);
    assert_eq!(transport.calls(), 2);
    assert_eq!(failure.attempts.len(), 2);
    assert!(started.elapsed() < ms(1500));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_backoff() {
    let transport = ScriptedTransport::always("alpha", server_error());
    let envelope = envelope(60_000);
    let cancel = envelope.cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(ms(500)).await;
        cancel.cancel();
    });

    let failure = executor()
        .execute_with_retry(&transport, &envelope, &policy(3, 1000))
        .await
        .unwrap_err();

    assert_eq!(failure.kind, FailureKind::Cancelled);
    assert_eq!(transport.calls(), 1);
    assert_eq!(failure.attempts.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_before_start_makes_no_call() {
    let transport = ScriptedTransport::always("alpha", ok());
    let envelope = envelope(60_000);
    envelope.cancel.cancel();

    let failure = executor()
        .execute_with_retry(&transport, &envelope, &policy(3, 1000))
        .await
        .unwrap_err();

    assert_eq!(failure.kind, FailureKind::Cancelled);
    assert_eq!(transport.calls(), 0);
    assert!(failure.attempts.is_empty());
}

// =============================================================================
// Request shape
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_unsupported_capability_is_malformed() {
    let transport =
        ScriptedTransport::always("alpha", ok()).with_capabilities(CapabilitySet::embedding());
    let failure = executor()
        .execute_with_retry(&transport, &envelope(60_000), &policy(3, 1000))
        .await
        .unwrap_err();

    assert_eq!(failure.kind, FailureKind::Malformed);
    assert_eq!(transport.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_idempotency_key_sent_on_every_attempt() {
    let transport = ScriptedTransport::new("alpha", vec![server_error(), server_error(), ok()]);
    let envelope = envelope(60_000).with_idempotency_key("order-42");
    executor()
        .execute_with_retry(&transport, &envelope, &policy(3, 1000))
        .await
        .unwrap();

    let keys = transport.idempotency_keys();
    assert_eq!(keys.len(), 3);
    assert!(keys.iter().all(|key| key.as_deref() == Some("order-42")));
}

// =============================================================================
// Telemetry
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_one_record_per_attempt() {
    let sink = Arc::new(MemorySink::new());
    let telemetry = TelemetryEmitter::spawn(sink.clone(), 64);
    let executor = RequestExecutor::new(
        Arc::new(ConnectionPool::new(PoolConfig::default()).without_system_proxy()),
        Arc::clone(&telemetry),
    );
    let transport = ScriptedTransport::new("alpha", vec![server_error(), ok()]);
    let envelope = envelope(60_000);

    executor
        .execute_with_retry(&transport, &envelope, &policy(3, 1000))
        .await
        .unwrap();
    telemetry.shutdown().await;

    let records = sink.records();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.component == Component::Executor));
    assert!(
        records
            .iter()
            .all(|r| r.request_id == envelope.request_id.as_str())
    );
    assert_eq!(records[0].level, TelemetryLevel::Warn);
    assert_eq!(records[0].outcome, "server_error");
    assert_eq!(records[0].attempt, Some(1));
    assert_eq!(records[1].level, TelemetryLevel::Info);
    assert_eq!(records[1].outcome, "success");
    assert_eq!(records[1].context["taskType"], "logistics");
}
