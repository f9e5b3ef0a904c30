//! Null search backend
//!
//! Serves empty results. Used when no search service is configured.

use async_trait::async_trait;
use lgw_domain::error::Result;
use lgw_domain::ports::SearchBackend;
use lgw_domain::{SearchItem, SearchQuery};

/// Search backend that never finds anything
#[derive(Debug, Clone, Default)]
pub struct NullSearchBackend;

impl NullSearchBackend {
    /// Create a new null backend
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SearchBackend for NullSearchBackend {
    fn backend_name(&self) -> &str {
        "null"
    }

    async fn search(&self, _query: &SearchQuery) -> Result<Vec<SearchItem>> {
        Ok(Vec::new())
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
