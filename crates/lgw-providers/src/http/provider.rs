//! HTTP Provider Transport
//!
//! Implements [`ProviderTransport`] for every supported provider dialect.
//! The payload is already provider-ready; this adapter only chooses the
//! endpoint path and authentication scheme and classifies the response.

use async_trait::async_trait;
use lgw_domain::{Capability, FailureKind, ProviderDescriptor, ProviderKind, RequestEnvelope};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use std::time::Duration;

use super::transport::{ProviderCallError, ProviderReply, ProviderTransport};
use crate::constants::{
    ANTHROPIC_API_KEY_HEADER, ANTHROPIC_API_VERSION, ANTHROPIC_DEFAULT_BASE_URL,
    ANTHROPIC_MESSAGES_PATH, ANTHROPIC_VERSION_HEADER, CONTENT_TYPE_JSON, IDEMPOTENCY_KEY_HEADER,
    OLLAMA_CHAT_PATH, OLLAMA_DEFAULT_BASE_URL, OLLAMA_EMBED_PATH, OPENAI_CHAT_PATH,
    OPENAI_DEFAULT_BASE_URL, OPENAI_EMBEDDINGS_PATH, VOYAGEAI_DEFAULT_BASE_URL,
};
use crate::utils::HttpResponseUtils;

/// reqwest-based transport for a configured provider
///
/// ## Example
///
/// ```rust,no_run
/// use lgw_domain::{CapabilitySet, ProviderDescriptor, ProviderId, ProviderKind, Usd};
/// use lgw_providers::HttpProviderTransport;
///
/// let descriptor = ProviderDescriptor {
///     id: ProviderId::new("alpha"),
///     kind: ProviderKind::OpenAi,
///     capabilities: CapabilitySet::all(),
///     unit_cost: Usd::from_dollars(0.002),
///     daily_budget: Usd::from_dollars(50.0),
///     base_url: "https://api.openai.com/v1".to_string(),
/// };
/// let transport = HttpProviderTransport::new(descriptor, Some("sk-...".to_string()));
/// ```
pub struct HttpProviderTransport {
    descriptor: ProviderDescriptor,
    api_key: Option<String>,
}

impl HttpProviderTransport {
    /// Create a transport; blank API keys are treated as absent
    pub fn new(descriptor: ProviderDescriptor, api_key: Option<String>) -> Self {
        let api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        Self {
            descriptor,
            api_key,
        }
    }

    /// Public API root used when a provider has no configured base URL
    pub fn default_base_url(kind: ProviderKind) -> &'static str {
        match kind {
            ProviderKind::OpenAi => OPENAI_DEFAULT_BASE_URL,
            ProviderKind::Anthropic => ANTHROPIC_DEFAULT_BASE_URL,
            ProviderKind::Ollama => OLLAMA_DEFAULT_BASE_URL,
            ProviderKind::VoyageAi => VOYAGEAI_DEFAULT_BASE_URL,
        }
    }

    /// Endpoint path for a dialect and capability
    pub fn endpoint_path(kind: ProviderKind, capability: Capability) -> Option<&'static str> {
        match (kind, capability) {
            (ProviderKind::OpenAi, Capability::Chat) => Some(OPENAI_CHAT_PATH),
            (ProviderKind::OpenAi | ProviderKind::VoyageAi, Capability::Embedding) => {
                Some(OPENAI_EMBEDDINGS_PATH)
            }
            (ProviderKind::Anthropic, Capability::Chat) => Some(ANTHROPIC_MESSAGES_PATH),
            (ProviderKind::Ollama, Capability::Chat) => Some(OLLAMA_CHAT_PATH),
            (ProviderKind::Ollama, Capability::Embedding) => Some(OLLAMA_EMBED_PATH),
            (ProviderKind::Anthropic, Capability::Embedding)
            | (ProviderKind::VoyageAi, Capability::Chat) => None,
        }
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        let Some(api_key) = self.api_key.as_deref() else {
            return request;
        };
        match self.descriptor.kind {
            ProviderKind::Anthropic => request
                .header(ANTHROPIC_API_KEY_HEADER, api_key)
                .header(ANTHROPIC_VERSION_HEADER, ANTHROPIC_API_VERSION),
            ProviderKind::OpenAi | ProviderKind::Ollama | ProviderKind::VoyageAi => {
                request.bearer_auth(api_key)
            }
        }
    }
}

impl std::fmt::Debug for HttpProviderTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProviderTransport")
            .field("descriptor", &self.descriptor)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

#[async_trait]
impl ProviderTransport for HttpProviderTransport {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    fn target_url(&self, capability: Capability) -> Option<String> {
        if !self.descriptor.supports(capability) {
            return None;
        }
        let path = Self::endpoint_path(self.descriptor.kind, capability)?;
        Some(format!(
            "{}{path}",
            self.descriptor.base_url.trim_end_matches('/')
        ))
    }

    async fn send(
        &self,
        client: &Client,
        envelope: &RequestEnvelope,
        timeout: Duration,
    ) -> Result<ProviderReply, ProviderCallError> {
        let url = self.target_url(envelope.capability).ok_or_else(|| {
            ProviderCallError::new(
                FailureKind::Malformed,
                format!(
                    "{} cannot serve {}",
                    self.descriptor.id, envelope.capability
                ),
            )
        })?;

        let mut request = client
            .post(&url)
            .header(CONTENT_TYPE, CONTENT_TYPE_JSON)
            .timeout(timeout)
            .body(envelope.payload.clone());
        request = self.apply_auth(request);
        if let Some(key) = envelope.idempotency_key.as_deref() {
            request = request.header(IDEMPOTENCY_KEY_HEADER, key);
        }

        tracing::trace!(
            provider = %self.descriptor.id,
            request_id = %envelope.request_id,
            url = %url,
            "sending provider request"
        );

        let response = request
            .send()
            .await
            .map_err(HttpResponseUtils::transport_error)?;
        HttpResponseUtils::into_reply(response).await
    }
}
