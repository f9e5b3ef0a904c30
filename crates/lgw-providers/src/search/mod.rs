//! Document Search Backends
//!
//! Implementations of the [`lgw_domain::ports::SearchBackend`] port.
//!
//! | Backend | Description |
//! |---------|-------------|
//! | [`HttpSearchBackend`] | JSON-over-HTTP vector or keyword index |
//! | [`NullSearchBackend`] | Always empty, for unconfigured deployments and tests |

pub mod http;
pub mod null;

pub use http::{HttpSearchBackend, SearchBackendKind};
pub use null::NullSearchBackend;
