//! Search result cache
//!
//! Serialized [`lgw_domain::SearchResult`]s keyed by the SHA-256 of the
//! canonical JSON of `(query, filters)`. Expiry is checked against the
//! injected [`Clock`] on every read, so an entry is never served past its
//! TTL; the Moka TTL only bounds memory.

use bytes::Bytes;
use lgw_domain::CacheEntry;
use lgw_domain::ports::Clock;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCacheStats {
    /// Reads served from the cache
    pub hits: u64,
    /// Reads that found nothing servable
    pub misses: u64,
    /// Entries currently held
    pub entries: u64,
}

/// TTL cache of serialized search results
pub struct SearchCache {
    cache: Cache<String, CacheEntry>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SearchCache {
    /// Create a cache holding at most `max_entries` results for `ttl`
    pub fn new(ttl: Duration, max_entries: u64, clock: Arc<dyn Clock>) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();

        Self {
            cache,
            ttl,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Entry lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cache key of a query: hex SHA-256 over canonical JSON
    ///
    /// Object keys are sorted at every depth, so filters that differ only
    /// in key order share a key.
    pub fn query_hash(query: &str, filters: &Value) -> String {
        let canonical = json!({
            "f": canonicalize(filters),
            "q": query,
        });
        let mut hasher = Sha256::new();
        hasher.update(canonical.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Cached payload, if present and not expired
    pub async fn get(&self, query_hash: &str) -> Option<CacheEntry> {
        let entry = match self.cache.get(query_hash).await {
            Some(entry) if !entry.is_expired(self.clock.now()) => entry,
            Some(_) => {
                self.cache.invalidate(query_hash).await;
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };
        self.hits.fetch_add(1, Ordering::Relaxed);
        Some(entry)
    }

    /// Store a payload
    pub async fn insert(&self, query_hash: String, payload: Bytes) {
        let entry = CacheEntry {
            query_hash: query_hash.clone(),
            payload,
            created_at: self.clock.now(),
            ttl: self.ttl,
        };
        self.cache.insert(query_hash, entry).await;
    }

    /// Drop one entry
    pub async fn invalidate(&self, query_hash: &str) {
        self.cache.invalidate(query_hash).await;
    }

    /// Drop every entry
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }

    /// Current counters
    pub async fn stats(&self) -> SearchCacheStats {
        self.cache.run_pending_tasks().await;
        SearchCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.cache.entry_count(),
        }
    }
}

impl std::fmt::Debug for SearchCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
