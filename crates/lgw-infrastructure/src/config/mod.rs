//! Configuration
//!
//! [`AppConfig`] is assembled by [`loader::ConfigLoader`] from defaults, an
//! optional TOML file and the environment.

pub mod loader;
pub mod types;

pub use loader::{
    ConfigBuilder, ConfigLoader, map_flat_env_key, validate_app_config, validate_routing_references,
    validate_settings,
};
pub use types::*;
