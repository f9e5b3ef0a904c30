//! Tests for failure classification

use lgw_domain::{AttemptOutcome, FailureKind};
use std::time::Duration;

#[test]
fn test_retryable_failures() {
    assert!(FailureKind::Timeout.is_retryable());
    assert!(FailureKind::ConnectionRefused.is_retryable());
    assert!(FailureKind::Network.is_retryable());
    assert!(FailureKind::ServerError { status: 503 }.is_retryable());
    assert!(FailureKind::RateLimited {
        retry_after_ms: None
    }
    .is_retryable());
}

#[test]
fn test_non_retryable_failures() {
    assert!(!FailureKind::Auth { status: 401 }.is_retryable());
    assert!(!FailureKind::ClientError { status: 400 }.is_retryable());
    assert!(!FailureKind::Malformed.is_retryable());
    assert!(!FailureKind::DeadlineExceeded.is_retryable());
    assert!(!FailureKind::BudgetExceeded.is_retryable());
}

#[test]
fn test_request_aborting_failures() {
    assert!(FailureKind::DeadlineExceeded.aborts_request());
    assert!(FailureKind::Cancelled.aborts_request());
    assert!(!FailureKind::Timeout.aborts_request());
}

#[test]
fn test_retry_after_hint() {
    let kind = FailureKind::RateLimited {
        retry_after_ms: Some(1500),
    };
    assert_eq!(kind.retry_after(), Some(Duration::from_millis(1500)));
    assert_eq!(FailureKind::Timeout.retry_after(), None);
}

#[test]
fn test_labels_and_display() {
    assert_eq!(AttemptOutcome::Success.label(), "success");
    assert_eq!(
        AttemptOutcome::Failure(FailureKind::Timeout).label(),
        "timeout"
    );
    assert_eq!(
        FailureKind::ServerError { status: 502 }.to_string(),
        "server_error (502)"
    );
}

#[test]
fn test_failure_kind_serde_is_tagged() {
    let json = serde_json::to_value(FailureKind::Auth { status: 403 }).unwrap();
    assert_eq!(json, serde_json::json!({"kind": "auth", "status": 403}));
}
