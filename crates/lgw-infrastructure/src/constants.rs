//! Infrastructure layer constants
//!
//! Contains constants that are part of the infrastructure implementation.
//! Gateway contract defaults are defined in `lgw_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "lgw.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "lgw";

/// Environment variable prefix for nested configuration (`LGW__SECTION__KEY`)
pub const CONFIG_ENV_PREFIX: &str = "LGW";

/// Separator between nested configuration keys in environment variables
pub const CONFIG_ENV_SEPARATOR: &str = "__";

/// Prefix of flat per-provider variables (`PROVIDER_<NAME>_<FIELD>`)
pub const PROVIDER_ENV_PREFIX: &str = "PROVIDER_";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Environment variable overriding the log filter
pub const LOG_ENV_FILTER: &str = "LGW_LOG";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default log file prefix when rotating
pub const DEFAULT_LOG_FILE_PREFIX: &str = "lgw";

// ============================================================================
// EXECUTOR CONSTANTS
// ============================================================================

/// Default per-attempt timeout in milliseconds
pub const DEFAULT_ATTEMPT_TIMEOUT_MS: u64 = 30_000;

/// Default whole-request timeout when the caller gives none, in milliseconds
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 60_000;

/// Default jitter as a fraction of the un-jittered backoff delay
pub const DEFAULT_JITTER_RATIO: f64 = 0.1;

// ============================================================================
// CONNECTION POOL CONSTANTS
// ============================================================================

/// Default cap on concurrent outbound requests
pub const POOL_DEFAULT_MAX_TOTAL: usize = 64;

/// Default cap on concurrent outbound requests per host
pub const POOL_DEFAULT_MAX_PER_HOST: usize = 8;

/// Default lifetime of a host client before DNS is re-resolved, in seconds
pub const POOL_DEFAULT_DNS_CACHE_TTL_SECS: u64 = 300;

/// Default idle keep-alive for a host client, in seconds
pub const POOL_DEFAULT_KEEPALIVE_SECS: u64 = 90;

/// Default interval between idle-client sweeps, in seconds
pub const POOL_DEFAULT_SWEEP_INTERVAL_SECS: u64 = 30;

/// Connection establishment timeout in seconds
pub const POOL_CONNECT_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// ROUTING CONSTANTS
// ============================================================================

/// Consecutive failed invocations before a provider is degraded
pub const HEALTH_DEFAULT_DEGRADED_AFTER: u32 = 3;

/// Consecutive failed invocations before a provider is unavailable
pub const HEALTH_DEFAULT_UNAVAILABLE_AFTER: u32 = 6;

// ============================================================================
// SEARCH CONSTANTS
// ============================================================================

/// Default search cache TTL in seconds
pub const SEARCH_CACHE_DEFAULT_TTL_SECS: u64 = 300;

/// Default maximum number of cached search results
pub const SEARCH_CACHE_DEFAULT_MAX_ENTRIES: u64 = 10_000;

/// Default number of items requested from a backend
pub const SEARCH_DEFAULT_LIMIT: usize = 20;

/// Default interval between native backend probes, in seconds
pub const SEARCH_DEFAULT_PROBE_INTERVAL_SECS: u64 = 60;

/// Default search backend call timeout in milliseconds
pub const SEARCH_DEFAULT_BACKEND_TIMEOUT_MS: u64 = 5_000;

/// Backend name used for the native search backend
pub const SEARCH_NATIVE_BACKEND_NAME: &str = "native";

/// Backend name used for the keyword search backend
pub const SEARCH_FALLBACK_BACKEND_NAME: &str = "keyword";

// ============================================================================
// TELEMETRY CONSTANTS
// ============================================================================

/// Default telemetry channel capacity
pub const TELEMETRY_DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Default telemetry file prefix when rotating
pub const TELEMETRY_DEFAULT_FILE_PREFIX: &str = "lgw-telemetry";

// ============================================================================
// HTTP CONSTANTS
// ============================================================================

/// User agent sent on every outbound request
pub const USER_AGENT: &str = concat!("lgw/", env!("CARGO_PKG_VERSION"));
