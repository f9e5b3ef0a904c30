//! Infrastructure ports

pub mod clock;
pub mod telemetry;

pub use clock::Clock;
pub use telemetry::TelemetrySink;
