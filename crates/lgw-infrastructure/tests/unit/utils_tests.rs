//! Tests for logging helpers, error context and timing utilities

use chrono::Duration as ChronoDuration;
use lgw_domain::error::Error;
use lgw_domain::ports::Clock;
use lgw_infrastructure::error_ext::ErrorContext;
use lgw_infrastructure::logging::{env_filter, log_backend_probe, parse_log_level};
use lgw_infrastructure::utils::duration_ms;
use lgw_infrastructure::{ManualClock, TimedOperation};
use std::time::Duration;
use tracing::Level;
use tracing::level_filters::LevelFilter;

// =============================================================================
// Logging
// =============================================================================

#[test]
fn test_parse_log_level() {
    assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
    assert_eq!(parse_log_level("DEBUG").unwrap(), Level::DEBUG);
    assert_eq!(parse_log_level(" info ").unwrap(), Level::INFO);
    assert_eq!(parse_log_level("warning").unwrap(), Level::WARN);
    assert_eq!(parse_log_level("error").unwrap(), Level::ERROR);
    assert!(matches!(
        parse_log_level("verbose"),
        Err(Error::Configuration { .. })
    ));
}

/// `warning` must filter at WARN, not become a target directive
#[test]
fn test_env_filter_uses_parsed_level() {
    if std::env::var_os("LGW_LOG").is_some() {
        return;
    }
    let filter = env_filter(parse_log_level("warning").unwrap());
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));

    let filter = env_filter(parse_log_level("Debug").unwrap());
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
}

#[test]
fn test_log_backend_probe_accepts_both_outcomes() {
    log_backend_probe("native", None);
    log_backend_probe(
        "native",
        Some(&Error::search_backend("native", "connection refused")),
    );
}

// =============================================================================
// Error context
// =============================================================================

fn io_failure() -> std::result::Result<(), std::io::Error> {
    Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"))
}

#[test]
fn test_error_context_variants() {
    let error = io_failure().io_context("reading lgw.toml").unwrap_err();
    assert!(matches!(error, Error::Io { .. }));
    assert!(error.to_string().contains("reading lgw.toml: missing"));

    let error = io_failure().config_context("parsing").unwrap_err();
    assert!(matches!(error, Error::Configuration { .. }));

    let error = io_failure().network_context("connecting").unwrap_err();
    assert!(matches!(error, Error::Network { .. }));

    let error = io_failure()
        .with_context(|| format!("step {}", 3))
        .unwrap_err();
    assert!(matches!(error, Error::Infrastructure { .. }));
    assert!(error.to_string().contains("step 3"));
}

// =============================================================================
// Clocks and timing
// =============================================================================

#[test]
fn test_manual_clock_moves_only_when_told() {
    let start = crate::support::start_of_day();
    let clock = ManualClock::new(start);
    assert_eq!(clock.now(), start);

    clock.advance(Duration::from_secs(90));
    assert_eq!(clock.now(), start + ChronoDuration::seconds(90));

    clock.advance(Duration::from_secs(24 * 60 * 60));
    assert_eq!(clock.today(), start.date_naive().succ_opt().unwrap());

    clock.set(start);
    assert_eq!(clock.now(), start);
}

#[tokio::test(start_paused = true)]
async fn test_timed_operation_follows_tokio_clock() {
    let timer = TimedOperation::start();
    tokio::time::advance(Duration::from_millis(250)).await;

    assert_eq!(timer.elapsed_ms(), 250);
    assert_eq!(timer.elapsed(), Duration::from_millis(250));
    assert_eq!(
        timer.remaining(Duration::from_secs(1)),
        Some(Duration::from_millis(750))
    );
    assert_eq!(timer.remaining(Duration::from_millis(100)), None);
    assert_eq!(timer.started_at() + Duration::from_millis(250), tokio::time::Instant::now());
}

#[test]
fn test_duration_ms_truncates_and_saturates() {
    assert_eq!(duration_ms(Duration::from_micros(1_999)), 1);
    assert_eq!(duration_ms(Duration::from_secs(3)), 3_000);
    assert_eq!(duration_ms(Duration::MAX), u64::MAX);
}
