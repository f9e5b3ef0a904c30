//! Telemetry configuration types

use crate::constants::TELEMETRY_DEFAULT_CHANNEL_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where telemetry records go
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetrySinkKind {
    /// Forward as `tracing` events on target `lgw::telemetry`
    #[default]
    Tracing,
    /// One JSON object per line (file when `file_output` is set, else stdout)
    JsonLines,
}

/// Telemetry configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Disabled telemetry drops every record without counting it
    pub enabled: bool,
    /// Sink selection
    pub sink: TelemetrySinkKind,
    /// JSON-lines file, rotated daily
    pub file_output: Option<PathBuf>,
    /// Records buffered before new ones are dropped
    pub channel_capacity: usize,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sink: TelemetrySinkKind::default(),
            file_output: None,
            channel_capacity: TELEMETRY_DEFAULT_CHANNEL_CAPACITY,
        }
    }
}
