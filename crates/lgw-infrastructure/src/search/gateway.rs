//! Search gateway
//!
//! Serves queries from the native backend while it is available and from
//! the keyword backend otherwise. A native failure flips the availability
//! flag until a health probe sees the backend again; the recovery clears the
//! cache so fallback-served results are not kept past it.

use super::cache::{SearchCache, SearchCacheStats};
use crate::logging::log_backend_probe;
use crate::telemetry::TelemetryEmitter;
use crate::utils::TimedOperation;
use bytes::Bytes;
use lgw_domain::error::{Error, ProviderFailure, Result};
use lgw_domain::ports::SearchBackend;
use lgw_domain::{
    Component, CoverageStats, FailureKind, ProviderId, RequestId, SearchItem, SearchQuery,
    SearchResult, SearchSource, SearchStats, TelemetryLevel, TelemetryRecord,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Side statistics of the search gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchGatewayStats {
    /// Whether the native backend is currently used
    pub vector_search_available: bool,
    /// Last coverage reported by the native backend
    pub coverage: CoverageStats,
    /// Fraction of documents searchable natively
    pub coverage_ratio: f64,
    /// Queries answered by the native backend
    pub native_served: u64,
    /// Queries answered by the keyword backend
    pub fallback_served: u64,
    /// Cache counters
    pub cache: SearchCacheStats,
}

/// Native/keyword search with a result cache
pub struct SearchGateway {
    native: Arc<dyn SearchBackend>,
    fallback: Arc<dyn SearchBackend>,
    cache: SearchCache,
    native_available: AtomicBool,
    coverage: Mutex<CoverageStats>,
    default_limit: usize,
    telemetry: Arc<TelemetryEmitter>,
    native_served: AtomicU64,
    fallback_served: AtomicU64,
}

impl SearchGateway {
    /// Create a gateway over two backends
    pub fn new(
        native: Arc<dyn SearchBackend>,
        fallback: Arc<dyn SearchBackend>,
        cache: SearchCache,
        default_limit: usize,
        telemetry: Arc<TelemetryEmitter>,
    ) -> Self {
        Self {
            native,
            fallback,
            cache,
            native_available: AtomicBool::new(true),
            coverage: Mutex::new(CoverageStats::default()),
            default_limit: default_limit.max(1),
            telemetry,
            native_served: AtomicU64::new(0),
            fallback_served: AtomicU64::new(0),
        }
    }

    /// Whether the native backend is currently used
    pub fn native_available(&self) -> bool {
        self.native_available.load(Ordering::Acquire)
    }

    /// Result cache
    pub fn cache(&self) -> &SearchCache {
        &self.cache
    }

    /// Run a query and decode the result
    pub async fn search(&self, query: &str, filters: Value) -> Result<SearchResult> {
        let payload = self.search_bytes(query, filters).await?;
        Ok(serde_json::from_slice(&payload)?)
    }

    /// Run a query and return the serialized result
    ///
    /// Identical `(query, filters)` within the cache TTL return the same
    /// bytes without a backend call.
    pub async fn search_bytes(&self, query: &str, filters: Value) -> Result<Bytes> {
        if query.trim().is_empty() {
            return Err(Error::invalid_argument("Search query cannot be empty"));
        }

        let query_hash = SearchCache::query_hash(query, &filters);
        let request_id = RequestId::generate();

        if let Some(entry) = self.cache.get(&query_hash).await {
            debug!(query_hash = %query_hash, "Search cache hit");
            self.emit(
                TelemetryRecord::new(
                    TelemetryLevel::Debug,
                    Component::SearchGateway,
                    &request_id,
                    "cache_hit",
                    "served from cache",
                )
                .with_context(json!({ "queryHash": query_hash })),
            );
            return Ok(entry.payload);
        }

        let search_query = SearchQuery {
            query: query.to_string(),
            filters,
            limit: self.default_limit,
        };
        let timer = TimedOperation::start();
        let (source, items) = self.run_backends(&request_id, &search_query).await?;

        let result = SearchResult {
            source,
            stats: SearchStats {
                vector_search_available: self.native_available(),
                coverage: self.coverage().ratio(),
                total: items.len(),
                latency_ms: timer.elapsed_ms(),
            },
            items,
        };
        let payload = Bytes::from(serde_json::to_vec(&result)?);
        self.cache.insert(query_hash.clone(), payload.clone()).await;

        let served = match source {
            SearchSource::Native => &self.native_served,
            SearchSource::Fallback => &self.fallback_served,
        };
        served.fetch_add(1, Ordering::Relaxed);

        self.emit(
            TelemetryRecord::new(
                TelemetryLevel::Info,
                Component::SearchGateway,
                &request_id,
                "success",
                format!("{} items", result.stats.total),
            )
            .with_latency_ms(result.stats.latency_ms)
            .with_context(json!({
                "source": source,
                "queryHash": query_hash,
                "vectorSearchAvailable": result.stats.vector_search_available,
            })),
        );

        Ok(payload)
    }

    /// Native first while available, then keyword, then native as a last
    /// resort when it was skipped
    async fn run_backends(
        &self,
        request_id: &RequestId,
        query: &SearchQuery,
    ) -> Result<(SearchSource, Vec<SearchItem>)> {
        let mut failures = Vec::new();
        let native_tried = self.native_available();

        if native_tried {
            match self.native.search(query).await {
                Ok(items) => return Ok((SearchSource::Native, items)),
                Err(e) => {
                    self.mark_native_unavailable(request_id, &e);
                    failures.push(backend_failure(self.native.as_ref(), &e));
                }
            }
        }

        match self.fallback.search(query).await {
            Ok(items) => return Ok((SearchSource::Fallback, items)),
            Err(e) => {
                warn!(backend = self.fallback.backend_name(), error = %e, "Fallback search failed");
                failures.push(backend_failure(self.fallback.as_ref(), &e));
            }
        }

        if !native_tried {
            match self.native.search(query).await {
                Ok(items) => {
                    self.set_native_available(true).await;
                    return Ok((SearchSource::Native, items));
                }
                Err(e) => failures.push(backend_failure(self.native.as_ref(), &e)),
            }
        }

        let error = Error::Aggregate { failures };
        self.emit(TelemetryRecord::new(
            TelemetryLevel::Error,
            Component::SearchGateway,
            request_id,
            "exhausted",
            error.to_string(),
        ));
        Err(error)
    }

    fn mark_native_unavailable(&self, request_id: &RequestId, error: &Error) {
        let degraded = Error::SearchBackendDegraded {
            backend: self.native.backend_name().to_string(),
            message: error.to_string(),
        };
        if self.native_available.swap(false, Ordering::AcqRel) {
            warn!(error = %degraded, "Native search unavailable; using keyword backend");
        }
        self.emit(TelemetryRecord::new(
            TelemetryLevel::Warn,
            Component::SearchGateway,
            request_id,
            "search_backend_degraded",
            degraded.to_string(),
        ));
    }

    async fn set_native_available(&self, available: bool) {
        let was_available = self.native_available.swap(available, Ordering::AcqRel);
        if available && !was_available {
            info!("Native search recovered; clearing search cache");
            self.cache.invalidate_all().await;
        }
    }

    /// Probe the native backend and refresh coverage
    ///
    /// Returns whether the native backend is available afterwards.
    pub async fn probe_native(&self) -> bool {
        let name = self.native.backend_name().to_string();
        match self.native.health_check().await {
            Ok(()) => {
                log_backend_probe(&name, None);
                self.set_native_available(true).await;
                match self.native.coverage().await {
                    Ok(Some(coverage)) => {
                        *self.coverage.lock().unwrap_or_else(PoisonError::into_inner) = coverage;
                    }
                    Ok(None) => {}
                    Err(e) => warn!(backend = %name, error = %e, "Coverage refresh failed"),
                }
                true
            }
            Err(e) => {
                log_backend_probe(&name, Some(&e));
                self.set_native_available(false).await;
                false
            }
        }
    }

    /// Probe the native backend every `interval` until `cancel` fires
    pub fn spawn_probe_loop(
        self: &Arc<Self>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let gateway = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        gateway.probe_native().await;
                    }
                }
            }
        })
    }

    /// Last known native coverage
    pub fn coverage(&self) -> CoverageStats {
        *self.coverage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Side statistics
    pub async fn stats(&self) -> SearchGatewayStats {
        let coverage = self.coverage();
        SearchGatewayStats {
            vector_search_available: self.native_available(),
            coverage,
            coverage_ratio: coverage.ratio(),
            native_served: self.native_served.load(Ordering::Relaxed),
            fallback_served: self.fallback_served.load(Ordering::Relaxed),
            cache: self.cache.stats().await,
        }
    }

    /// Drop the cached result of one query
    pub async fn invalidate(&self, query: &str, filters: &Value) {
        self.cache
            .invalidate(&SearchCache::query_hash(query, filters))
            .await;
    }

    /// Drop every cached result
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all().await;
    }

    fn emit(&self, record: TelemetryRecord) {
        self.telemetry.emit(record);
    }
}

fn backend_failure(backend: &dyn SearchBackend, error: &Error) -> ProviderFailure {
    ProviderFailure {
        provider: ProviderId::new(backend.backend_name()),
        reason: FailureKind::Network,
        attempts: Vec::new(),
        message: error.to_string(),
    }
}
