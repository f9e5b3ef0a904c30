//! Logging configuration

use crate::constants::DEFAULT_LOG_LEVEL;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Process logging
///
/// `LGW_LOG` (an `EnvFilter` directive such as `lgw_infrastructure=debug`)
/// takes precedence over `level` when set.
///
/// ```toml
/// [logging]
/// level = "debug"
/// json_format = true
/// file_output = "/var/log/lgw/gateway.log"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    pub level: String,
    /// JSON lines instead of human-readable text
    pub json_format: bool,
    /// Colored console output; ignored for JSON
    pub ansi: bool,
    /// Also write to this file, rotated daily (the stem is the file prefix)
    pub file_output: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            json_format: false,
            ansi: true,
            file_output: None,
        }
    }
}
