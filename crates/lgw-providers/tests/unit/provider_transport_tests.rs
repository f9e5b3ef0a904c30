//! Tests for the HTTP provider transport

use crate::test_server::{Canned, TestServer, client};
use lgw_domain::{
    Capability, CapabilitySet, FailureKind, ProviderDescriptor, ProviderId, ProviderKind,
    RequestEnvelope, Usd,
};
use lgw_providers::{HttpProviderTransport, ProviderTransport};
use std::time::Duration;

fn descriptor(kind: ProviderKind, base_url: &str) -> ProviderDescriptor {
    ProviderDescriptor {
        id: ProviderId::new("alpha"),
        kind,
        capabilities: kind.supported_capabilities(),
        unit_cost: Usd::from_dollars(0.01),
        daily_budget: Usd::from_dollars(1.0),
        base_url: base_url.to_string(),
    }
}

fn chat_envelope() -> RequestEnvelope {
    RequestEnvelope::new(
        "logistics",
        Capability::Chat,
        r#"{"messages":[]}"#,
        Duration::from_secs(5),
    )
}

#[test]
fn test_target_url_per_kind() {
    let openai = HttpProviderTransport::new(descriptor(ProviderKind::OpenAi, "http://h/v1/"), None);
    assert_eq!(
        openai.target_url(Capability::Chat).as_deref(),
        Some("http://h/v1/chat/completions")
    );
    assert_eq!(
        openai.target_url(Capability::Embedding).as_deref(),
        Some("http://h/v1/embeddings")
    );

    let ollama = HttpProviderTransport::new(descriptor(ProviderKind::Ollama, "http://h"), None);
    assert_eq!(
        ollama.target_url(Capability::Embedding).as_deref(),
        Some("http://h/api/embed")
    );

    let anthropic =
        HttpProviderTransport::new(descriptor(ProviderKind::Anthropic, "http://h/v1"), None);
    assert_eq!(
        anthropic.target_url(Capability::Chat).as_deref(),
        Some("http://h/v1/messages")
    );
    assert_eq!(anthropic.target_url(Capability::Embedding), None);
}

#[test]
fn test_target_url_respects_configured_capabilities() {
    let mut desc = descriptor(ProviderKind::OpenAi, "http://h");
    desc.capabilities = CapabilitySet::embedding();
    let transport = HttpProviderTransport::new(desc, None);
    assert_eq!(transport.target_url(Capability::Chat), None);
}

#[tokio::test]
async fn test_send_forwards_payload_and_headers() {
    let server = TestServer::start(vec![Canned::json(200, r#"{"ok":true}"#)]).await;
    let transport = HttpProviderTransport::new(
        descriptor(ProviderKind::OpenAi, &server.base_url),
        Some("sk-test".to_string()),
    );
    let envelope = chat_envelope().with_idempotency_key("order-7");

    let reply = transport
        .send(&client(), &envelope, Duration::from_secs(5))
        .await
        .unwrap();

    assert_eq!(reply.status, 200);
    assert_eq!(&reply.body[..], br#"{"ok":true}"#);

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/chat/completions");
    assert_eq!(requests[0].header("authorization"), Some("Bearer sk-test"));
    assert_eq!(requests[0].header("idempotency-key"), Some("order-7"));
    assert_eq!(requests[0].body, r#"{"messages":[]}"#);
}

#[tokio::test]
async fn test_anthropic_uses_api_key_header() {
    let server = TestServer::start(vec![Canned::json(200, "{}")]).await;
    let transport = HttpProviderTransport::new(
        descriptor(ProviderKind::Anthropic, &server.base_url),
        Some("ant-key".to_string()),
    );

    transport
        .send(&client(), &chat_envelope(), Duration::from_secs(5))
        .await
        .unwrap();

    let requests = server.requests();
    assert_eq!(requests[0].path, "/messages");
    assert_eq!(requests[0].header("x-api-key"), Some("ant-key"));
    assert_eq!(requests[0].header("anthropic-version"), Some("2023-06-01"));
    assert_eq!(requests[0].header("authorization"), None);
}

#[tokio::test]
async fn test_error_statuses_are_classified() {
    let server = TestServer::start(vec![
        Canned::json(503, r#"{"error":"overloaded"}"#),
        Canned::json(429, "{}").with_header("Retry-After", "3"),
        Canned::json(401, "{}"),
    ])
    .await;
    let transport =
        HttpProviderTransport::new(descriptor(ProviderKind::OpenAi, &server.base_url), None);
    let http = client();

    let first = transport
        .send(&http, &chat_envelope(), Duration::from_secs(5))
        .await
        .unwrap_err();
    assert_eq!(first.kind, FailureKind::ServerError { status: 503 });
    assert!(first.message.contains("overloaded"));

    let second = transport
        .send(&http, &chat_envelope(), Duration::from_secs(5))
        .await
        .unwrap_err();
    assert_eq!(
        second.kind,
        FailureKind::RateLimited {
            retry_after_ms: Some(3000)
        }
    );

    let third = transport
        .send(&http, &chat_envelope(), Duration::from_secs(5))
        .await
        .unwrap_err();
    assert_eq!(third.kind, FailureKind::Auth { status: 401 });
}

#[tokio::test]
async fn test_connection_refused_is_classified() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport = HttpProviderTransport::new(
        descriptor(ProviderKind::OpenAi, &format!("http://{addr}")),
        None,
    );
    let error = transport
        .send(&client(), &chat_envelope(), Duration::from_secs(5))
        .await
        .unwrap_err();

    assert_eq!(error.kind, FailureKind::ConnectionRefused);
    assert!(error.kind.is_retryable());
}

#[tokio::test]
async fn test_unsupported_capability_is_malformed() {
    let transport =
        HttpProviderTransport::new(descriptor(ProviderKind::VoyageAi, "http://unused"), None);
    let error = transport
        .send(&client(), &chat_envelope(), Duration::from_secs(1))
        .await
        .unwrap_err();
    assert_eq!(error.kind, FailureKind::Malformed);
}
