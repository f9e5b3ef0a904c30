//! Telemetry
//!
//! Structured records of every attempt, routing decision, ledger charge and
//! search. Request paths call [`TelemetryEmitter::emit`], which never blocks;
//! a background worker drains the channel into a [`TelemetrySink`].

pub mod emitter;
pub mod sinks;

pub use emitter::TelemetryEmitter;
pub use sinks::{JsonLinesSink, MemorySink, TracingSink};

use crate::config::{TelemetryConfig, TelemetrySinkKind};
use crate::constants::TELEMETRY_DEFAULT_FILE_PREFIX;
use lgw_domain::ports::TelemetrySink;
use std::sync::Arc;

/// Build the sink selected by configuration
pub fn sink_from_config(config: &TelemetryConfig) -> Arc<dyn TelemetrySink> {
    match (config.sink, &config.file_output) {
        (TelemetrySinkKind::Tracing, _) => Arc::new(TracingSink),
        (TelemetrySinkKind::JsonLines, Some(path)) => {
            let directory = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let prefix = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or(TELEMETRY_DEFAULT_FILE_PREFIX);
            Arc::new(JsonLinesSink::rolling_daily(directory, prefix))
        }
        (TelemetrySinkKind::JsonLines, None) => Arc::new(JsonLinesSink::stdout()),
    }
}

/// Start the emitter described by configuration
///
/// Must be called from within a tokio runtime when telemetry is enabled.
pub fn emitter_from_config(
    config: &TelemetryConfig,
    sink: Option<Arc<dyn TelemetrySink>>,
) -> Arc<TelemetryEmitter> {
    if !config.enabled {
        return TelemetryEmitter::disabled();
    }
    let sink = sink.unwrap_or_else(|| sink_from_config(config));
    TelemetryEmitter::spawn(sink, config.channel_capacity)
}
