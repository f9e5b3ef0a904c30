//! # Infrastructure Layer
//!
//! Everything between a caller's request envelope and the provider adapters.
//!
//! ## Module Categories
//!
//! ### Execution
//! | Module | Description |
//! |--------|-------------|
//! | [`executor`] | Connection pool, backoff policy and the bounded retry loop |
//! | [`registry`] | Configured provider catalog |
//! | [`ledger`] | Per-provider, per-day spend with reservations |
//!
//! ### Routing & Search
//! | Module | Description |
//! |--------|-------------|
//! | [`routing`] | Health tracking and preference/fallback routing |
//! | [`search`] | Native/keyword search gateway with a TTL cache |
//!
//! ### Configuration & Observability
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Figment configuration (defaults, TOML, environment) |
//! | [`logging`] | Structured logging with tracing |
//! | [`telemetry`] | Non-blocking telemetry emitter and sinks |
//! | [`bootstrap`] | Wires every component from an [`config::AppConfig`] |
//! | [`constants`] | Centralized infrastructure defaults |

pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod error_ext;
pub mod executor;
pub mod ledger;
pub mod logging;
pub mod registry;
pub mod routing;
pub mod search;
pub mod telemetry;
pub mod utils;

// Re-export commonly used types
pub use bootstrap::{GatewayContext, GatewayContextBuilder};
pub use error_ext::ErrorContext;
pub use utils::{ManualClock, SystemClock, TimedOperation};
