//! Configuration types module

pub mod app;
pub mod gateway;
pub mod logging;
pub mod pool;
pub mod provider;
pub mod routing;
pub mod search;
pub mod telemetry;

// Re-export main types
pub use app::AppConfig;
pub use gateway::GatewayConfig;
pub use logging::LoggingConfig;
pub use pool::PoolConfig;
pub use provider::ProviderConfig;
pub use routing::{RoutingConfig, TaskRouteConfig};
pub use search::{SearchBackendConfig, SearchConfig};
pub use telemetry::{TelemetryConfig, TelemetrySinkKind};
