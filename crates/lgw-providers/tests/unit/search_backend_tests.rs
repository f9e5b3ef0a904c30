//! Tests for HTTP search backends

use crate::test_server::{Canned, TestServer, client};
use lgw_domain::SearchQuery;
use lgw_domain::ports::SearchBackend;
use lgw_providers::{HttpSearchBackend, NullSearchBackend, SearchBackendKind};
use std::time::Duration;

fn query() -> SearchQuery {
    SearchQuery {
        query: "container MSCU1234567".to_string(),
        filters: serde_json::json!({"type": "bl"}),
        limit: 10,
    }
}

fn backend(kind: SearchBackendKind, base_url: &str) -> HttpSearchBackend {
    HttpSearchBackend::new(
        "index",
        kind,
        base_url,
        Duration::from_secs(5),
        client(),
    )
}

#[tokio::test]
async fn test_search_parses_items() {
    let server = TestServer::start(vec![Canned::json(
        200,
        r#"{"items":[{"id":"bl-1","score":0.9,"snippet":"MSCU1234567"}]}"#,
    )])
    .await;

    let items = backend(SearchBackendKind::Keyword, &server.base_url)
        .search(&query())
        .await
        .unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, "bl-1");

    let requests = server.requests();
    assert_eq!(requests[0].path, "/search");
    let sent: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(sent["query"], "container MSCU1234567");
    assert_eq!(sent["filters"]["type"], "bl");
    assert_eq!(sent["limit"], 10);
}

#[tokio::test]
async fn test_search_error_status_is_backend_error() {
    let server = TestServer::start(vec![Canned::json(500, "boom")]).await;

    let error = backend(SearchBackendKind::Vector, &server.base_url)
        .search(&query())
        .await
        .unwrap_err();

    assert!(matches!(error, lgw_domain::Error::SearchBackend { .. }));
    assert!(error.to_string().contains("server error (500)"));
}

#[tokio::test]
async fn test_vector_backend_reports_coverage() {
    let server = TestServer::start(vec![Canned::json(
        200,
        r#"{"total_documents":10,"native_ready_documents":4}"#,
    )])
    .await;

    let coverage = backend(SearchBackendKind::Vector, &server.base_url)
        .coverage()
        .await
        .unwrap()
        .unwrap();

    assert_eq!(coverage.total_documents, 10);
    assert_eq!(coverage.native_ready_documents, 4);
    assert_eq!(server.requests()[0].path, "/coverage");
}

#[tokio::test]
async fn test_keyword_backend_has_no_coverage() {
    let coverage = backend(SearchBackendKind::Keyword, "http://unused")
        .coverage()
        .await
        .unwrap();
    assert!(coverage.is_none());
}

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start(vec![Canned::json(200, "{}"), Canned::json(503, "{}")]).await;
    let backend = backend(SearchBackendKind::Vector, &server.base_url);

    assert!(backend.health_check().await.is_ok());
    assert!(backend.health_check().await.is_err());
}

#[tokio::test]
async fn test_null_backend_is_empty() {
    let backend = NullSearchBackend::new();
    assert!(backend.search(&query()).await.unwrap().is_empty());
    assert!(backend.health_check().await.is_ok());
}
