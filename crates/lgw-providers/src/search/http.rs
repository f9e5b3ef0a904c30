//! HTTP Search Backend
//!
//! Talks to a search service exposing:
//!
//! - `POST {base}/search` with `{query, filters, limit}` returning `{"items": [...]}`
//! - `GET {base}/health`
//! - `GET {base}/coverage` returning `{total_documents, native_ready_documents}`
//!   (vector backends only)

use async_trait::async_trait;
use lgw_domain::error::{Error, Result};
use lgw_domain::ports::SearchBackend;
use lgw_domain::{CoverageStats, SearchItem, SearchQuery};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::constants::{SEARCH_COVERAGE_PATH, SEARCH_HEALTH_PATH, SEARCH_QUERY_PATH};
use crate::utils::HttpResponseUtils;

/// Which kind of index the backend fronts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBackendKind {
    /// Vector similarity index (reports coverage)
    Vector,
    /// Keyword index
    Keyword,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

/// JSON-over-HTTP search backend
#[derive(Debug, Clone)]
pub struct HttpSearchBackend {
    name: String,
    kind: SearchBackendKind,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
    http_client: Client,
}

impl HttpSearchBackend {
    /// Create a backend
    ///
    /// # Arguments
    /// * `name` - Backend name used in errors and telemetry
    /// * `kind` - Vector or keyword index
    /// * `base_url` - Service root
    /// * `timeout` - Per-call timeout
    /// * `http_client` - Reqwest client used for every call
    pub fn new(
        name: impl Into<String>,
        kind: SearchBackendKind,
        base_url: impl Into<String>,
        timeout: Duration,
        http_client: Client,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            timeout,
            http_client,
        }
    }

    /// Authenticate with a bearer token
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|key| !key.trim().is_empty());
        self
    }

    /// Index kind
    pub fn kind(&self) -> SearchBackendKind {
        self.kind
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = builder.timeout(self.timeout);
        match self.api_key.as_deref() {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    fn send_error(&self, error: &reqwest::Error) -> Error {
        Error::search_backend(
            &self.name,
            format!(
                "{}: {error}",
                HttpResponseUtils::classify_transport_error(error)
            ),
        )
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    fn backend_name(&self) -> &str {
        &self.name
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchItem>> {
        let response = self
            .request(self.http_client.post(self.url(SEARCH_QUERY_PATH)))
            .json(query)
            .send()
            .await
            .map_err(|e| self.send_error(&e))?;

        let data = HttpResponseUtils::check_and_parse(response, &self.name).await?;
        let parsed: SearchResponse = serde_json::from_value(data).map_err(|e| {
            Error::search_backend(&self.name, format!("invalid search response: {e}"))
        })?;
        Ok(parsed.items)
    }

    async fn health_check(&self) -> Result<()> {
        let response = self
            .request(self.http_client.get(self.url(SEARCH_HEALTH_PATH)))
            .send()
            .await
            .map_err(|e| self.send_error(&e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Error::search_backend(
                &self.name,
                format!("health check returned {}", response.status().as_u16()),
            ))
        }
    }

    async fn coverage(&self) -> Result<Option<CoverageStats>> {
        if self.kind == SearchBackendKind::Keyword {
            return Ok(None);
        }

        let response = self
            .request(self.http_client.get(self.url(SEARCH_COVERAGE_PATH)))
            .send()
            .await
            .map_err(|e| self.send_error(&e))?;

        let data = HttpResponseUtils::check_and_parse(response, &self.name).await?;
        let coverage: CoverageStats = serde_json::from_value(data).map_err(|e| {
            Error::search_backend(&self.name, format!("invalid coverage response: {e}"))
        })?;
        Ok(Some(coverage))
    }
}
