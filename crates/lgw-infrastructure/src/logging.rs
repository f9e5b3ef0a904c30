//! Structured logging with tracing
//!
//! Installs the global subscriber: an `LGW_LOG` filter override, a console
//! layer on stderr (text or JSON) and an optional daily rolling log file.
//! Stdout stays free for command output and JSON-lines telemetry.

use lgw_domain::error::{Error, Result};

// Re-export LoggingConfig for convenience
pub use crate::config::LoggingConfig;
use crate::constants::{DEFAULT_LOG_FILE_PREFIX, LOG_ENV_FILTER};
use std::ffi::OsStr;
use std::path::Path;
use tracing::level_filters::LevelFilter;
use tracing::{Level, debug, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initialize logging with the provided configuration
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = parse_log_level(&config.level)?;
    let filter = env_filter(level);

    let mut layers: Vec<BoxedLayer> = vec![console_layer(config)];
    if let Some(path) = &config.file_output {
        layers.push(file_layer(config, path));
    }

    Registry::default()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| Error::infrastructure_with_source("Failed to install logger", e))?;

    info!(
        level = %level,
        json = config.json_format,
        file = ?config.file_output,
        "Logging initialized"
    );
    Ok(())
}

/// `LGW_LOG` when set, otherwise a filter at `level`
pub fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_FILTER).unwrap_or_else(|_| {
        EnvFilter::default().add_directive(LevelFilter::from_level(level).into())
    })
}

fn console_layer(config: &LoggingConfig) -> BoxedLayer {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.ansi && !config.json_format)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);
    if config.json_format {
        layer.json().boxed()
    } else {
        layer.boxed()
    }
}

fn file_layer(config: &LoggingConfig, path: &Path) -> BoxedLayer {
    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let prefix = path
        .file_stem()
        .unwrap_or_else(|| OsStr::new(DEFAULT_LOG_FILE_PREFIX));
    let layer = fmt::layer()
        .with_writer(tracing_appender::rolling::daily(directory, prefix))
        .with_ansi(false)
        .with_target(true);
    if config.json_format {
        layer.json().boxed()
    } else {
        layer.boxed()
    }
}

/// Parse a level name (`warning` is accepted for `warn`)
pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(Error::configuration(format!(
            "Invalid log level: {level}. Use trace, debug, info, warn, or error"
        ))),
    }
}

/// Record which configuration file was merged
pub fn log_config_source(config_path: &Path, found: bool) {
    if found {
        info!(path = %config_path.display(), "Configuration file loaded");
    } else {
        warn!(path = %config_path.display(), "Configuration file not found; using defaults and environment");
    }
}

/// Record the outcome of a search backend health probe
pub fn log_backend_probe(backend: &str, failure: Option<&Error>) {
    match failure {
        None => debug!(backend = backend, "Backend probe passed"),
        Some(e) => warn!(backend = backend, error = %e, "Backend probe failed"),
    }
}
