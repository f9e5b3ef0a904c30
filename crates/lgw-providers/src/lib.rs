//! # LGW - Provider Adapters
//!
//! Outbound adapters used by the gateway. Each adapter owns the wire format
//! of one external service; the gateway only sees a classified outcome.
//!
//! | Category | Trait | Implementations |
//! |----------|-------|-----------------|
//! | LLM providers | [`ProviderTransport`] | [`HttpProviderTransport`] (OpenAI, Anthropic, Ollama, VoyageAI) |
//! | Document search | [`SearchBackend`] | [`HttpSearchBackend`] (vector, keyword), [`NullSearchBackend`] |
//!
//! ## Usage
//!
//! ```ignore
//! use lgw_providers::{HttpProviderTransport, ProviderTransport};
//! use lgw_providers::search::{HttpSearchBackend, SearchBackendKind};
//! ```

pub use lgw_domain::error::{Error, Result};
pub use lgw_domain::ports::SearchBackend;

/// Provider-specific constants
pub mod constants;

/// Shared utilities for provider implementations
pub mod utils;

/// HTTP transports for LLM providers
pub mod http;

/// Document search backends
pub mod search;

pub use http::{HttpProviderTransport, ProviderCallError, ProviderReply, ProviderTransport};
pub use search::{HttpSearchBackend, NullSearchBackend, SearchBackendKind};
