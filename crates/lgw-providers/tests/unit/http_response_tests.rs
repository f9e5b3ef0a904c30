//! Tests for HTTP status classification

use lgw_domain::FailureKind;
use lgw_providers::utils::HttpResponseUtils;

#[test]
fn test_success_statuses_are_unclassified() {
    assert_eq!(HttpResponseUtils::classify_status(200, None), None);
    assert_eq!(HttpResponseUtils::classify_status(204, None), None);
}

#[test]
fn test_auth_statuses() {
    assert_eq!(
        HttpResponseUtils::classify_status(401, None),
        Some(FailureKind::Auth { status: 401 })
    );
    assert_eq!(
        HttpResponseUtils::classify_status(403, None),
        Some(FailureKind::Auth { status: 403 })
    );
}

#[test]
fn test_rate_limit_carries_retry_after() {
    assert_eq!(
        HttpResponseUtils::classify_status(429, Some("2")),
        Some(FailureKind::RateLimited {
            retry_after_ms: Some(2000)
        })
    );
    assert_eq!(
        HttpResponseUtils::classify_status(429, Some("soon")),
        Some(FailureKind::RateLimited {
            retry_after_ms: None
        })
    );
}

#[test]
fn test_server_and_client_errors() {
    assert_eq!(
        HttpResponseUtils::classify_status(503, None),
        Some(FailureKind::ServerError { status: 503 })
    );
    assert_eq!(
        HttpResponseUtils::classify_status(400, None),
        Some(FailureKind::ClientError { status: 400 })
    );
    assert_eq!(
        HttpResponseUtils::classify_status(408, None),
        Some(FailureKind::Timeout)
    );
}

#[test]
fn test_retry_after_http_date_in_the_past_is_zero() {
    assert_eq!(
        HttpResponseUtils::parse_retry_after("Sun, 06 Nov 1994 08:49:37 GMT"),
        Some(0)
    );
}
