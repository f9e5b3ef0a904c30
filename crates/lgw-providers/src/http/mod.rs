//! HTTP Provider Transports
//!
//! Defines the transport trait the executor drives and the HTTP adapter
//! implementing it for every [`lgw_domain::ProviderKind`].
//!
//! ## Contents
//!
//! - `ProviderTransport` - One attempt against one provider
//! - `HttpProviderTransport` - reqwest adapter selecting path and auth by kind
//! - `HttpResponseUtils` - Status and transport error classification (re-exported from utils)

pub mod provider;
pub mod transport;

pub use provider::HttpProviderTransport;
pub use transport::{ProviderCallError, ProviderReply, ProviderTransport};
// Re-export HttpResponseUtils from utils for convenience
pub use crate::utils::HttpResponseUtils;
