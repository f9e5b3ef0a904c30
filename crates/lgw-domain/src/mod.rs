//! # LGW Domain Layer
//!
//! Core types shared by every layer of the outbound provider gateway.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Gateway error taxonomy and `Result` alias |
//! | [`value_objects`] | Providers, request envelopes, attempts, ledger, search and telemetry records |
//! | [`ports`] | Traits implemented by adapters and infrastructure (search backends, sinks, clocks) |
//! | [`constants`] | Domain-level defaults |

pub mod constants;
pub mod error;
pub mod ports;
pub mod value_objects;

pub use error::{Error, ProviderFailure, Result};
pub use value_objects::*;
