//! Telemetry sink port

use crate::value_objects::TelemetryRecord;

/// Destination for telemetry records
///
/// Called from the emitter's background worker, never from a request path.
pub trait TelemetrySink: Send + Sync {
    /// Persist or forward one record
    fn write(&self, record: &TelemetryRecord);

    /// Flush buffered output, if any
    fn flush(&self) {}
}
