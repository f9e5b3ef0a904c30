//! Ports
//!
//! Traits implemented outside the domain:
//!
//! | Port | Implemented by |
//! |------|----------------|
//! | [`providers::SearchBackend`] | `lgw-providers` HTTP and null backends |
//! | [`infrastructure::TelemetrySink`] | `lgw-infrastructure` tracing, JSON-lines and memory sinks |
//! | [`infrastructure::Clock`] | `lgw-infrastructure` system and manual clocks |

pub mod infrastructure;
pub mod providers;

pub use infrastructure::{Clock, TelemetrySink};
pub use providers::SearchBackend;
