//! HTTP Response Utilities
//!
//! Helper functions for classifying HTTP responses and transport errors from
//! upstream services. These are shared utilities, not ports.

use chrono::{DateTime, Utc};
use lgw_domain::FailureKind;
use lgw_domain::error::{Error, Result};
use reqwest::Response;
use reqwest::header::RETRY_AFTER;

use crate::constants::ERROR_BODY_PREVIEW_CHARS;
use crate::http::{ProviderCallError, ProviderReply};

/// Utilities for processing HTTP responses
///
/// Provides the response handling shared by provider transports and search
/// backends.
pub struct HttpResponseUtils;

impl HttpResponseUtils {
    /// Classify a status code, `None` meaning success
    ///
    /// | Status | Kind |
    /// |--------|------|
    /// | 401, 403 | `Auth` |
    /// | 408 | `Timeout` |
    /// | 429 | `RateLimited` (with `Retry-After`) |
    /// | 5xx | `ServerError` |
    /// | other 4xx | `ClientError` |
    pub fn classify_status(status: u16, retry_after: Option<&str>) -> Option<FailureKind> {
        match status {
            0..=399 => None,
            401 | 403 => Some(FailureKind::Auth { status }),
            408 => Some(FailureKind::Timeout),
            429 => Some(FailureKind::RateLimited {
                retry_after_ms: retry_after.and_then(Self::parse_retry_after),
            }),
            500..=599 => Some(FailureKind::ServerError { status }),
            _ => Some(FailureKind::ClientError { status }),
        }
    }

    /// Parse a `Retry-After` value (delta seconds or HTTP date) into milliseconds
    pub fn parse_retry_after(value: &str) -> Option<u64> {
        let value = value.trim();
        if let Ok(seconds) = value.parse::<u64>() {
            return Some(seconds.saturating_mul(1000));
        }
        let date = DateTime::parse_from_rfc2822(value).ok()?;
        let wait = date.with_timezone(&Utc) - Utc::now();
        Some(u64::try_from(wait.num_milliseconds()).unwrap_or(0))
    }

    /// Classify a reqwest error raised before a status was received
    pub fn classify_transport_error(error: &reqwest::Error) -> FailureKind {
        if error.is_timeout() {
            FailureKind::Timeout
        } else if error.is_connect() {
            FailureKind::ConnectionRefused
        } else if error.is_builder() || error.is_decode() {
            FailureKind::Malformed
        } else {
            FailureKind::Network
        }
    }

    /// Convert a reqwest error into a classified call failure
    pub fn transport_error(error: reqwest::Error) -> ProviderCallError {
        ProviderCallError::new(Self::classify_transport_error(&error), error.to_string())
    }

    /// Turn a response into a reply or a classified failure
    pub async fn into_reply(
        response: Response,
    ) -> std::result::Result<ProviderReply, ProviderCallError> {
        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        if let Some(kind) = Self::classify_status(status, retry_after.as_deref()) {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderCallError::new(
                kind,
                format!("HTTP {status}: {}", Self::preview(&error_text)),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(Self::transport_error)?;
        Ok(ProviderReply { status, body })
    }

    /// Check response status and parse JSON
    ///
    /// Used by search backends, which report failures as [`Error::SearchBackend`].
    pub async fn check_and_parse(response: Response, backend: &str) -> Result<serde_json::Value> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let code = status.as_u16();

            return Err(Error::search_backend(
                backend,
                match code {
                    401 | 403 => format!("authentication failed: {}", Self::preview(&error_text)),
                    429 => format!("rate limit exceeded: {}", Self::preview(&error_text)),
                    500..=599 => format!("server error ({code}): {}", Self::preview(&error_text)),
                    _ => format!("request failed ({code}): {}", Self::preview(&error_text)),
                },
            ));
        }

        response
            .json()
            .await
            .map_err(|e| Error::search_backend(backend, format!("response parse failed: {e}")))
    }

    fn preview(text: &str) -> String {
        text.chars().take(ERROR_BODY_PREVIEW_CHARS).collect()
    }
}
