//! Provider registry
//!
//! The configured provider catalog: one transport per enabled provider, in
//! configuration order (provider names sorted). Built once at startup and
//! immutable afterwards.

use crate::config::AppConfig;
use lgw_domain::error::{Error, Result};
use lgw_domain::{ProviderDescriptor, ProviderId};
use lgw_providers::{HttpProviderTransport, ProviderTransport};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Configured providers keyed by id
#[derive(Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn ProviderTransport>>,
    index: HashMap<ProviderId, usize>,
}

impl ProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build HTTP transports for every enabled provider in `config`
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let mut registry = Self::new();
        for (name, provider) in config.enabled_providers() {
            let descriptor = provider.to_descriptor(name);
            info!(
                provider = %descriptor.id,
                kind = descriptor.kind.as_str(),
                base_url = %descriptor.base_url,
                "Registering provider"
            );
            registry.register(Arc::new(HttpProviderTransport::new(
                descriptor,
                provider.api_key.clone(),
            )))?;
        }
        Ok(registry)
    }

    /// Add a provider; ids must be unique
    pub fn register(&mut self, transport: Arc<dyn ProviderTransport>) -> Result<()> {
        let id = transport.id().clone();
        if self.index.contains_key(&id) {
            return Err(Error::configuration(format!(
                "Provider registered twice: {id}"
            )));
        }
        if transport.descriptor().capabilities.is_empty() {
            return Err(Error::configuration(format!(
                "Provider {id} offers no capability"
            )));
        }
        self.index.insert(id, self.providers.len());
        self.providers.push(transport);
        Ok(())
    }

    /// Transport of a provider
    pub fn get(&self, id: &ProviderId) -> Option<Arc<dyn ProviderTransport>> {
        self.index
            .get(id)
            .map(|&position| Arc::clone(&self.providers[position]))
    }

    /// Descriptor of a provider
    pub fn descriptor(&self, id: &ProviderId) -> Option<&ProviderDescriptor> {
        self.index
            .get(id)
            .map(|&position| self.providers[position].descriptor())
    }

    /// Whether a provider is registered
    pub fn contains(&self, id: &ProviderId) -> bool {
        self.index.contains_key(id)
    }

    /// Descriptors in registration order
    pub fn descriptors(&self) -> impl Iterator<Item = &ProviderDescriptor> {
        self.providers.iter().map(|transport| transport.descriptor())
    }

    /// Ids in registration order
    pub fn ids(&self) -> Vec<ProviderId> {
        self.descriptors().map(|descriptor| descriptor.id.clone()).collect()
    }

    /// Number of providers
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether no provider is registered
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
