//! Telemetry sinks

use lgw_domain::ports::TelemetrySink;
use lgw_domain::{TelemetryLevel, TelemetryRecord};
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use tracing_appender::non_blocking::WorkerGuard;

/// Forwards records as `tracing` events on target `lgw::telemetry`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

macro_rules! telemetry_event {
    ($macro:ident, $record:expr) => {
        tracing::$macro!(
            target: "lgw::telemetry",
            request_id = %$record.request_id,
            component = ?$record.component,
            provider = ?$record.provider.as_ref().map(|p| p.as_str()),
            attempt = ?$record.attempt,
            outcome = %$record.outcome,
            latency_ms = $record.latency_ms,
            cost_usd = ?$record.cost_usd,
            context = %$record.context,
            "{}",
            $record.message
        )
    };
}

impl TelemetrySink for TracingSink {
    fn write(&self, record: &TelemetryRecord) {
        match record.level {
            TelemetryLevel::Debug => telemetry_event!(debug, record),
            TelemetryLevel::Info => telemetry_event!(info, record),
            TelemetryLevel::Warn => telemetry_event!(warn, record),
            TelemetryLevel::Error => telemetry_event!(error, record),
        }
    }
}

/// Writes one JSON object per line
pub struct JsonLinesSink {
    writer: Mutex<Box<dyn Write + Send>>,
    _guard: Mutex<Option<WorkerGuard>>,
}

impl JsonLinesSink {
    /// Write into any writer
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            _guard: Mutex::new(None),
        }
    }

    /// Write to standard output through a non-blocking writer
    pub fn stdout() -> Self {
        let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
        Self {
            writer: Mutex::new(Box::new(writer)),
            _guard: Mutex::new(Some(guard)),
        }
    }

    /// Write to `<directory>/<prefix>.<date>`, rotated daily
    pub fn rolling_daily(directory: &Path, prefix: &str) -> Self {
        let appender = tracing_appender::rolling::daily(directory, prefix);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        Self {
            writer: Mutex::new(Box::new(writer)),
            _guard: Mutex::new(Some(guard)),
        }
    }
}

impl TelemetrySink for JsonLinesSink {
    fn write(&self, record: &TelemetryRecord) {
        let mut line = match serde_json::to_vec(record) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize telemetry record");
                return;
            }
        };
        line.push(b'\n');

        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writer.write_all(&line) {
            tracing::warn!(error = %e, "Failed to write telemetry record");
        }
    }

    fn flush(&self) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writer.flush() {
            tracing::warn!(error = %e, "Failed to flush telemetry sink");
        }
    }
}

/// Keeps records in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<TelemetryRecord>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every record written so far
    pub fn records(&self) -> Vec<TelemetryRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of records written so far
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing was written
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TelemetrySink for MemorySink {
    fn write(&self, record: &TelemetryRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
    }
}
