//! Provider Transport Trait
//!
//! A transport performs exactly one attempt. Retries, backoff, pooling and
//! deadlines belong to the executor in `lgw-infrastructure`, which hands the
//! transport a pooled client for the target host.
//!
//! This trait lives here rather than in `lgw-domain` because its signature
//! carries a `reqwest::Client`.

use async_trait::async_trait;
use bytes::Bytes;
use lgw_domain::{Capability, FailureKind, ProviderDescriptor, ProviderId, RequestEnvelope};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// A successful (non-error status) provider response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderReply {
    /// HTTP status code
    pub status: u16,
    /// Raw response body, passed through to the caller untouched
    pub body: Bytes,
}

/// A classified attempt failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ProviderCallError {
    /// Classification driving retry and health decisions
    pub kind: FailureKind,
    /// Human-readable detail
    pub message: String,
}

impl ProviderCallError {
    /// Create a classified failure
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// One attempt against one provider
///
/// ## Thread Safety
///
/// Transports are shared across concurrent requests and must be `Send + Sync`.
#[async_trait]
pub trait ProviderTransport: Send + Sync {
    /// Descriptor this transport was built from
    fn descriptor(&self) -> &ProviderDescriptor;

    /// Provider identifier
    fn id(&self) -> &ProviderId {
        &self.descriptor().id
    }

    /// Full URL for a capability, `None` if the provider cannot serve it
    fn target_url(&self, capability: Capability) -> Option<String>;

    /// Send the envelope payload once
    ///
    /// `timeout` is the per-attempt budget already clipped to the envelope
    /// deadline.
    async fn send(
        &self,
        client: &Client,
        envelope: &RequestEnvelope,
        timeout: Duration,
    ) -> Result<ProviderReply, ProviderCallError>;
}
