//! Exponential backoff with bounded jitter

use crate::config::GatewayConfig;
use rand::Rng;
use std::time::Duration;

/// Delay schedule between attempts of one provider invocation
///
/// The delay after failed attempt `n` (1-based) is
/// `min(cap, base * factor^(n-1))` plus a uniform jitter of at most
/// `jitter_ratio` of that value, and never exceeds `cap`.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    base: Duration,
    factor: f64,
    cap: Duration,
    jitter_ratio: f64,
}

impl BackoffPolicy {
    /// Create a policy
    pub fn new(base: Duration, factor: f64, cap: Duration, jitter_ratio: f64) -> Self {
        Self {
            base,
            factor: if factor.is_finite() { factor.max(1.0) } else { 1.0 },
            cap: cap.max(base),
            jitter_ratio: jitter_ratio.clamp(0.0, 1.0),
        }
    }

    /// Build from gateway configuration
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(
            Duration::from_millis(config.backoff_base_ms),
            config.backoff_factor,
            Duration::from_millis(config.backoff_cap_ms),
            config.jitter_ratio,
        )
    }

    /// Policy without jitter, for deterministic schedules
    pub fn without_jitter(mut self) -> Self {
        self.jitter_ratio = 0.0;
        self
    }

    /// Upper bound of any single wait
    pub fn cap(&self) -> Duration {
        self.cap
    }

    /// Un-jittered delay after failed attempt `attempt` (1-based)
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let scaled = self.base.as_secs_f64() * self.factor.powi(exponent);
        if !scaled.is_finite() || scaled >= self.cap.as_secs_f64() {
            return self.cap;
        }
        Duration::from_secs_f64(scaled).min(self.cap)
    }

    /// Jittered delay after failed attempt `attempt` (1-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        let delay = self.base_delay(attempt);
        let max_jitter_ms = jitter_bound_ms(delay, self.jitter_ratio);
        if max_jitter_ms == 0 {
            return delay;
        }
        let jitter = rand::rng().random_range(0..=max_jitter_ms);
        (delay + Duration::from_millis(jitter)).min(self.cap)
    }

    /// Delay honoring a server hint: `max(delay, hint)`, capped
    pub fn delay_with_hint(&self, attempt: u32, hint: Option<Duration>) -> Duration {
        let delay = self.delay(attempt);
        match hint {
            Some(hint) => delay.max(hint).min(self.cap),
            None => delay,
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn jitter_bound_ms(delay: Duration, ratio: f64) -> u64 {
    (delay.as_secs_f64() * 1000.0 * ratio).floor() as u64
}

/// Retry settings applied to one provider invocation
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Per-attempt timeout before clipping to the deadline
    pub attempt_timeout: Duration,
    /// Delay schedule
    pub backoff: BackoffPolicy,
}

impl RetryPolicy {
    /// Build from gateway configuration
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            attempt_timeout: config.attempt_timeout(),
            backoff: BackoffPolicy::from_config(config),
        }
    }

    /// Total attempts allowed, first attempt included
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&GatewayConfig::default())
    }
}
