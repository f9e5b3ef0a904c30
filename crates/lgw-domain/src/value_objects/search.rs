//! Document search value objects

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Query sent to a search backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free text query
    pub query: String,
    /// Backend-specific filters (document type, date range, ...)
    #[serde(default)]
    pub filters: Value,
    /// Maximum number of items to return
    pub limit: usize,
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchItem {
    /// Document identifier
    pub id: String,
    /// Relevance score as reported by the backend
    #[serde(default)]
    pub score: f64,
    /// Short text excerpt
    #[serde(default)]
    pub snippet: String,
    /// Extra document fields
    #[serde(default)]
    pub metadata: Value,
}

/// Which backend served a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSource {
    /// Vector similarity backend
    Native,
    /// Traditional keyword backend
    Fallback,
}

/// Coverage of the native index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageStats {
    /// Documents known to the system
    pub total_documents: u64,
    /// Documents with a native-search-ready representation
    pub native_ready_documents: u64,
}

impl CoverageStats {
    /// Fraction of documents searchable natively, 0.0 when unknown
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> f64 {
        if self.total_documents == 0 {
            0.0
        } else {
            self.native_ready_documents as f64 / self.total_documents as f64
        }
    }
}

/// Statistics attached to every search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Whether the native backend is currently considered available
    pub vector_search_available: bool,
    /// Fraction of documents with native-search-ready representations
    pub coverage: f64,
    /// Number of items returned
    pub total: usize,
    /// Time spent in backends for this result
    pub latency_ms: u64,
}

/// Result returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Backend that served the items
    pub source: SearchSource,
    /// Hits
    pub items: Vec<SearchItem>,
    /// Side statistics
    pub stats: SearchStats,
}

/// A cached, serialized search result
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// SHA-256 of the canonical (query, filters) pair
    pub query_hash: String,
    /// Serialized [`SearchResult`]
    pub payload: Bytes,
    /// Insertion time
    pub created_at: DateTime<Utc>,
    /// Lifetime of the entry
    pub ttl: Duration,
}

impl CacheEntry {
    /// Whether the entry must no longer be served at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(self.ttl) {
            Ok(ttl) => now >= self.created_at + ttl,
            Err(_) => false,
        }
    }
}
