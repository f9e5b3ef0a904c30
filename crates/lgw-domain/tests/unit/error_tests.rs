//! Tests for the gateway error taxonomy

use chrono::Utc;
use lgw_domain::{
    AttemptOutcome, AttemptRecord, Error, FailureKind, ProviderFailure, ProviderId,
};

fn attempt(provider: &str, index: u32, outcome: AttemptOutcome) -> AttemptRecord {
    AttemptRecord {
        provider: ProviderId::new(provider),
        timestamp: Utc::now(),
        latency_ms: 5,
        outcome,
        attempt: index,
    }
}

#[test]
fn test_aggregate_lists_every_provider() {
    let error = Error::Aggregate {
        failures: vec![
            ProviderFailure {
                provider: ProviderId::new("alpha"),
                reason: FailureKind::Timeout,
                attempts: vec![
                    attempt("alpha", 1, AttemptOutcome::Failure(FailureKind::Timeout)),
                    attempt("alpha", 2, AttemptOutcome::Failure(FailureKind::Timeout)),
                ],
                message: String::new(),
            },
            ProviderFailure {
                provider: ProviderId::new("beta"),
                reason: FailureKind::BudgetExceeded,
                attempts: Vec::new(),
                message: "daily cap reached".to_string(),
            },
        ],
    };

    let text = error.to_string();
    assert!(text.contains("alpha: timeout after 2 attempt(s)"));
    assert!(text.contains("beta: budget_exceeded after 0 attempt(s) (daily cap reached)"));
    assert_eq!(error.attempts().len(), 2);
}

#[test]
fn test_empty_aggregate_message() {
    let error = Error::Aggregate {
        failures: Vec::new(),
    };
    assert_eq!(error.to_string(), "All providers failed: no eligible providers");
}

#[test]
fn test_from_failure_maps_taxonomy() {
    let alpha = ProviderId::new("alpha");

    let transient = Error::from_failure(&alpha, FailureKind::ServerError { status: 503 }, "boom", vec![]);
    assert!(matches!(transient, Error::TransientNetwork { .. }));

    let auth = Error::from_failure(&alpha, FailureKind::Auth { status: 401 }, "denied", vec![]);
    assert!(matches!(auth, Error::Authentication { .. }));

    let limited = Error::from_failure(
        &alpha,
        FailureKind::RateLimited {
            retry_after_ms: Some(2000),
        },
        "slow down",
        vec![],
    );
    assert!(matches!(
        limited,
        Error::RateLimit {
            retry_after_ms: Some(2000),
            ..
        }
    ));

    let trail = vec![attempt("alpha", 1, AttemptOutcome::Failure(FailureKind::Timeout))];
    let deadline = Error::from_failure(&alpha, FailureKind::DeadlineExceeded, "late", trail);
    assert!(deadline.is_deadline_exceeded());
    assert_eq!(deadline.attempts().len(), 1);
}
