//! Domain layer constants
//!
//! Defaults that are part of the gateway contract rather than of any
//! particular infrastructure choice.

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay for exponential backoff in milliseconds
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 1000;

/// Default multiplier applied per retry
pub const DEFAULT_BACKOFF_FACTOR: f64 = 2.0;

/// Default upper bound for a single backoff wait in milliseconds
pub const DEFAULT_BACKOFF_CAP_MS: u64 = 8000;

/// Micro-dollars per dollar, the ledger's fixed-point unit
pub const MICROS_PER_USD: u64 = 1_000_000;

/// Task type that routes to any chat-capable provider
pub const TASK_TYPE_CHAT: &str = "chat";

/// Task type that routes to any embedding-capable provider
pub const TASK_TYPE_EMBEDDING: &str = "embedding";
