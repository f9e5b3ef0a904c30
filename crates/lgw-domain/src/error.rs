//! Error handling types

use crate::value_objects::{AttemptRecord, FailureKind, ProviderId, Usd};
use std::fmt;
use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Why one provider in a fallback chain did not produce a result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    /// Provider considered
    pub provider: ProviderId,
    /// Final failure reason (may be a skip reason with no attempts)
    pub reason: FailureKind,
    /// Attempts made against this provider
    pub attempts: Vec<AttemptRecord>,
    /// Last error message
    pub message: String,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} after {} attempt(s)",
            self.provider,
            self.reason,
            self.attempts.len()
        )?;
        if !self.message.is_empty() {
            write!(f, " ({})", self.message)?;
        }
        Ok(())
    }
}

/// Main error type for the provider gateway
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON parsing or serialization error
    #[error("JSON parsing error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// Invalid argument provided by a caller
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument
        message: String,
    },

    /// Resource not found error
    #[error("Not found: {resource}")]
    NotFound {
        /// The resource that was not found
        resource: String,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Timeout, connection refused or 5xx after local retries
    #[error("Transient network error from {provider}: {message}")]
    TransientNetwork {
        /// Provider that failed
        provider: ProviderId,
        /// Description of the failure
        message: String,
    },

    /// 429 after local retries
    #[error("Rate limited by {provider}")]
    RateLimit {
        /// Provider that throttled
        provider: ProviderId,
        /// Last server-supplied hint
        retry_after_ms: Option<u64>,
    },

    /// 401/403 from a provider
    #[error("Authentication error from {provider}: {message}")]
    Authentication {
        /// Provider that rejected the credentials
        provider: ProviderId,
        /// Description of the failure
        message: String,
    },

    /// A charge would take a provider past its daily budget
    #[error("Budget exceeded for {provider}: spent {spent} + requested {requested} > budget {budget}")]
    BudgetExceeded {
        /// Provider charged
        provider: ProviderId,
        /// Spend (and holds) already on the ledger today
        spent: Usd,
        /// Amount requested
        requested: Usd,
        /// Daily budget
        budget: Usd,
    },

    /// Provider health is unavailable
    #[error("Provider unavailable: {provider}")]
    ProviderUnavailable {
        /// Provider skipped
        provider: ProviderId,
    },

    /// Native search failed; non-fatal, reported through telemetry
    #[error("Search backend degraded: {backend}: {message}")]
    SearchBackendDegraded {
        /// Backend that failed
        backend: String,
        /// Description of the failure
        message: String,
    },

    /// A search backend call failed
    #[error("Search backend error: {backend}: {message}")]
    SearchBackend {
        /// Backend that failed
        backend: String,
        /// Description of the failure
        message: String,
    },

    /// The caller's absolute deadline elapsed
    #[error("Deadline exceeded: {message}")]
    DeadlineExceeded {
        /// Where the deadline hit
        message: String,
        /// Attempts made before the deadline
        attempts: Vec<AttemptRecord>,
    },

    /// The caller cancelled the request
    #[error("Request cancelled")]
    Cancelled {
        /// Attempts made before cancellation
        attempts: Vec<AttemptRecord>,
    },

    /// Every candidate failed or was skipped
    #[error("All providers failed: {}", format_failures(.failures))]
    Aggregate {
        /// One entry per provider considered, in order
        failures: Vec<ProviderFailure>,
    },

    /// Network-related error outside a provider call (client construction, probes)
    #[error("Network error: {message}")]
    Network {
        /// Description of the network error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Infrastructure operation error
    #[error("Infrastructure error: {message}")]
    Infrastructure {
        /// Description of the infrastructure error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

fn format_failures(failures: &[ProviderFailure]) -> String {
    if failures.is_empty() {
        return "no eligible providers".to_string();
    }
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// Basic error creation methods
impl Error {
    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

// I/O and configuration error creation methods
impl Error {
    /// Create an I/O error with source
    pub fn io_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Network and infrastructure error creation methods
impl Error {
    /// Create a network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Create a network error with source
    pub fn network_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an infrastructure error
    pub fn infrastructure<S: Into<String>>(message: S) -> Self {
        Self::Infrastructure {
            message: message.into(),
            source: None,
        }
    }

    /// Create an infrastructure error with source
    pub fn infrastructure_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Infrastructure {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a search backend error
    pub fn search_backend<B: Into<String>, S: Into<String>>(backend: B, message: S) -> Self {
        Self::SearchBackend {
            backend: backend.into(),
            message: message.into(),
        }
    }
}

// Gateway taxonomy
impl Error {
    /// Map a provider-level failure to the caller-facing taxonomy
    pub fn from_failure(
        provider: &ProviderId,
        kind: FailureKind,
        message: impl Into<String>,
        attempts: Vec<AttemptRecord>,
    ) -> Self {
        let message = message.into();
        match kind {
            FailureKind::Timeout
            | FailureKind::ConnectionRefused
            | FailureKind::Network
            | FailureKind::ServerError { .. } => Self::TransientNetwork {
                provider: provider.clone(),
                message,
            },
            FailureKind::RateLimited { retry_after_ms } => Self::RateLimit {
                provider: provider.clone(),
                retry_after_ms,
            },
            FailureKind::Auth { .. } => Self::Authentication {
                provider: provider.clone(),
                message,
            },
            FailureKind::ProviderUnavailable => Self::ProviderUnavailable {
                provider: provider.clone(),
            },
            FailureKind::DeadlineExceeded => Self::DeadlineExceeded { message, attempts },
            FailureKind::Cancelled => Self::Cancelled { attempts },
            FailureKind::BudgetExceeded
            | FailureKind::CostCeiling
            | FailureKind::ClientError { .. }
            | FailureKind::Malformed => Self::Aggregate {
                failures: vec![ProviderFailure {
                    provider: provider.clone(),
                    reason: kind,
                    attempts,
                    message,
                }],
            },
        }
    }

    /// Whether the error is a deadline expiry
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, Self::DeadlineExceeded { .. })
    }

    /// Whether the error is a budget rejection
    pub fn is_budget_exceeded(&self) -> bool {
        matches!(self, Self::BudgetExceeded { .. })
    }

    /// Attempts recorded before the error, when the variant carries them
    pub fn attempts(&self) -> Vec<AttemptRecord> {
        match self {
            Self::DeadlineExceeded { attempts, .. } | Self::Cancelled { attempts } => {
                attempts.clone()
            }
            Self::Aggregate { failures } => failures
                .iter()
                .flat_map(|failure| failure.attempts.iter().cloned())
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::internal(s)
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::internal(s)
    }
}
