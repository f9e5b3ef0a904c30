//! # LGW
//!
//! Outbound provider gateway: every call to a third-party AI service
//! (chat completion, embeddings) and to the document search backends goes
//! through here.
//!
//! Callers hand over a task type and a payload and get back either a
//! provider reply or a typed error. Retries, budgets, provider fallback and
//! connection pooling stay behind the [`Gateway`].
//!
//! ## Example
//!
//! ```ignore
//! use lgw::{Gateway, RequestOptions};
//! use lgw::infrastructure::config::ConfigLoader;
//!
//! let gateway = Gateway::load(&ConfigLoader::new())?;
//! let result = gateway
//!     .submit_provider_request("logistics", payload, RequestOptions::default().with_timeout_ms(5_000))
//!     .await?;
//! println!("{} answered after {} attempt(s)", result.provider, result.attempts.len());
//! gateway.shutdown().await;
//! ```
//!
//! ## Architecture
//!
//! - `domain` - Error taxonomy, value objects and ports
//! - `providers` - HTTP transports per provider dialect and search backends
//! - `infrastructure` - Config, executor, ledger, routing, search, telemetry
//! - [`gateway`] - The caller-facing API
//! - [`cli`] - The `lgw` command line

pub mod cli;
pub mod gateway;

/// Domain layer - core types, errors and ports
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use lgw_domain::*;
}

/// Provider adapters - transports and search backends
///
/// Re-exports from the providers crate for convenience
pub mod providers {
    pub use lgw_providers::*;
}

/// Infrastructure layer - config, execution, routing and observability
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use lgw_infrastructure::*;
}

// Re-export commonly used domain types at the crate root
pub use domain::*;

// Re-export the caller API at the crate root
pub use gateway::{Gateway, ProviderResult, RequestOptions};
