//! Search Backend Port
//!
//! Port for document search backends. The gateway uses two of them: a
//! native (vector similarity) backend and a traditional keyword backend
//! that serves as its fallback.

use crate::error::Result;
use crate::value_objects::{CoverageStats, SearchItem, SearchQuery};
use async_trait::async_trait;

/// Document search backend interface
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Backend name used in telemetry and errors
    fn backend_name(&self) -> &str;

    /// Run a query
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchItem>>;

    /// Probe the backend; `Ok(())` means it can serve queries
    async fn health_check(&self) -> Result<()>;

    /// Native-index coverage, `None` when the backend does not track it
    async fn coverage(&self) -> Result<Option<CoverageStats>> {
        Ok(None)
    }
}
