//! Gateway Bootstrap
//!
//! Composition root: builds every component once from an [`AppConfig`] and
//! wires them together. Nothing is global; the returned [`GatewayContext`]
//! owns the shared instances and the background tasks.
//!
//! ```text
//! AppConfig → ProviderRegistry ─┬→ CostLedger ──────┐
//!           → ConnectionPool → RequestExecutor ─────┼→ ProviderRouter
//!           → InMemoryHealthMonitor ────────────────┘
//!           → SearchBackends → SearchCache → SearchGateway
//!           → TelemetryEmitter (shared by all of the above)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let context = GatewayContextBuilder::new(config).build()?;
//! let response = context.router().route(&envelope).await?;
//! context.shutdown().await;
//! ```

use crate::config::{AppConfig, SearchBackendConfig, validate_routing_references, validate_settings};
use crate::constants::{SEARCH_FALLBACK_BACKEND_NAME, SEARCH_NATIVE_BACKEND_NAME, USER_AGENT};
use crate::error_ext::ErrorContext;
use crate::executor::{ConnectionPool, RequestExecutor, RetryPolicy};
use crate::ledger::CostLedger;
use crate::registry::ProviderRegistry;
use crate::routing::{InMemoryHealthMonitor, ProviderRouter, RoutingTable};
use crate::search::{SearchCache, SearchGateway};
use crate::telemetry::{TelemetryEmitter, emitter_from_config};
use crate::utils::SystemClock;
use lgw_domain::ProviderId;
use lgw_domain::error::{Error, Result};
use lgw_domain::ports::{Clock, SearchBackend, TelemetrySink};
use lgw_providers::{HttpSearchBackend, NullSearchBackend, ProviderTransport, SearchBackendKind};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Shared gateway components
pub struct GatewayContext {
    /// Application configuration
    pub config: Arc<AppConfig>,

    registry: Arc<ProviderRegistry>,
    ledger: Arc<CostLedger>,
    pool: Arc<ConnectionPool>,
    executor: Arc<RequestExecutor>,
    health: Arc<InMemoryHealthMonitor>,
    router: Arc<ProviderRouter>,
    search: Arc<SearchGateway>,
    telemetry: Arc<TelemetryEmitter>,
    clock: Arc<dyn Clock>,

    shutdown: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl GatewayContext {
    /// Provider catalog
    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// Cost ledger
    pub fn ledger(&self) -> &Arc<CostLedger> {
        &self.ledger
    }

    /// Connection pool
    pub fn pool(&self) -> &Arc<ConnectionPool> {
        &self.pool
    }

    /// Request executor
    pub fn executor(&self) -> &Arc<RequestExecutor> {
        &self.executor
    }

    /// Provider health monitor
    pub fn health(&self) -> &Arc<InMemoryHealthMonitor> {
        &self.health
    }

    /// Provider router
    pub fn router(&self) -> &Arc<ProviderRouter> {
        &self.router
    }

    /// Search gateway
    pub fn search(&self) -> &Arc<SearchGateway> {
        &self.search
    }

    /// Telemetry emitter
    pub fn telemetry(&self) -> &Arc<TelemetryEmitter> {
        &self.telemetry
    }

    /// Wall clock
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Whether [`Self::shutdown`] was called
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Stop background tasks and flush telemetry
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let tasks: Vec<JoinHandle<()>> = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for task in tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "Background task did not finish cleanly");
            }
        }
        self.telemetry.shutdown().await;
        info!("Gateway shut down");
    }
}

/// Builder for [`GatewayContext`]
///
/// Injected transports replace the HTTP transports built from the
/// `[providers]` section; injected search backends replace the configured
/// ones.
pub struct GatewayContextBuilder {
    config: AppConfig,
    transports: Vec<Arc<dyn ProviderTransport>>,
    native: Option<Arc<dyn SearchBackend>>,
    fallback: Option<Arc<dyn SearchBackend>>,
    clock: Option<Arc<dyn Clock>>,
    sink: Option<Arc<dyn TelemetrySink>>,
    background_tasks: bool,
    system_proxy: bool,
}

impl GatewayContextBuilder {
    /// Start from a configuration
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            transports: Vec::new(),
            native: None,
            fallback: None,
            clock: None,
            sink: None,
            background_tasks: true,
            system_proxy: true,
        }
    }

    /// Use a provider transport instead of configured providers
    pub fn with_transport(mut self, transport: Arc<dyn ProviderTransport>) -> Self {
        self.transports.push(transport);
        self
    }

    /// Use a native search backend
    pub fn with_native_search(mut self, backend: Arc<dyn SearchBackend>) -> Self {
        self.native = Some(backend);
        self
    }

    /// Use a keyword search backend
    pub fn with_fallback_search(mut self, backend: Arc<dyn SearchBackend>) -> Self {
        self.fallback = Some(backend);
        self
    }

    /// Use a clock other than the system clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Use a telemetry sink other than the configured one
    pub fn with_telemetry_sink(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Do not start the pool sweeper or the search probe loop
    pub fn without_background_tasks(mut self) -> Self {
        self.background_tasks = false;
        self
    }

    /// Ignore proxy settings from the environment for outbound calls
    pub fn without_system_proxy(mut self) -> Self {
        self.system_proxy = false;
        self
    }

    /// Build every component
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> Result<GatewayContext> {
        tokio::runtime::Handle::try_current()
            .context("Gateway must be built inside a tokio runtime")?;

        let config = self.config;
        validate_settings(&config)?;

        let registry = if self.transports.is_empty() {
            ProviderRegistry::from_config(&config)?
        } else {
            let mut registry = ProviderRegistry::new();
            for transport in self.transports {
                registry.register(transport)?;
            }
            registry
        };
        validate_routing_references(&config.routing, |name| {
            registry.contains(&ProviderId::new(name))
        })?;
        if registry.is_empty() {
            warn!("No providers configured; provider requests will fail");
        }
        let registry = Arc::new(registry);

        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);
        let telemetry = emitter_from_config(&config.telemetry, self.sink);
        let ledger = Arc::new(CostLedger::from_descriptors(
            registry.descriptors(),
            Arc::clone(&clock),
        ));

        let mut pool = ConnectionPool::new(config.pool.clone());
        if !self.system_proxy {
            pool = pool.without_system_proxy();
        }
        let pool = Arc::new(pool);
        let executor = Arc::new(RequestExecutor::new(
            Arc::clone(&pool),
            Arc::clone(&telemetry),
        ));

        let health = Arc::new(InMemoryHealthMonitor::with_thresholds(
            config.routing.degraded_after,
            config.routing.unavailable_after,
            Arc::clone(&clock),
        ));
        let router = Arc::new(ProviderRouter::new(
            Arc::clone(&registry),
            Arc::clone(&ledger),
            Arc::clone(&executor),
            Arc::clone(&health) as _,
            RoutingTable::from_config(&config.routing, &registry),
            RetryPolicy::from_config(&config.gateway),
            Arc::clone(&telemetry),
        ));

        let native = match self.native {
            Some(backend) => backend,
            None => search_backend(
                &config.search.native,
                SEARCH_NATIVE_BACKEND_NAME,
                SearchBackendKind::Vector,
                config.search.backend_timeout(),
                self.system_proxy,
            )?,
        };
        let fallback = match self.fallback {
            Some(backend) => backend,
            None => search_backend(
                &config.search.fallback,
                SEARCH_FALLBACK_BACKEND_NAME,
                SearchBackendKind::Keyword,
                config.search.backend_timeout(),
                self.system_proxy,
            )?,
        };
        let search = Arc::new(SearchGateway::new(
            native,
            fallback,
            SearchCache::new(
                config.search.cache_ttl(),
                config.search.cache_max_entries,
                Arc::clone(&clock),
            ),
            config.search.default_limit,
            Arc::clone(&telemetry),
        ));

        let shutdown = CancellationToken::new();
        let mut tasks = Vec::new();
        if self.background_tasks {
            tasks.push(pool.spawn_sweeper(shutdown.child_token()));
            tasks.push(search.spawn_probe_loop(
                config.search.probe_interval(),
                shutdown.child_token(),
            ));
        }

        info!(
            providers = registry.len(),
            max_total = config.pool.max_total,
            max_per_host = config.pool.max_per_host,
            "Gateway initialized"
        );

        Ok(GatewayContext {
            config: Arc::new(config),
            registry,
            ledger,
            pool,
            executor,
            health,
            router,
            search,
            telemetry,
            clock,
            shutdown,
            tasks: Mutex::new(tasks),
        })
    }
}

fn search_backend(
    config: &SearchBackendConfig,
    name: &str,
    kind: SearchBackendKind,
    timeout: Duration,
    system_proxy: bool,
) -> Result<Arc<dyn SearchBackend>> {
    let Some(base_url) = config.base_url.as_deref().filter(|url| !url.trim().is_empty()) else {
        return Ok(Arc::new(NullSearchBackend::new()));
    };
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(Error::configuration(format!(
            "Search backend {name}: base URL must be http(s), got {base_url}"
        )));
    }

    let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
    if !system_proxy {
        builder = builder.no_proxy();
    }
    let client = builder
        .build()
        .network_context("Failed to build search HTTP client")?;

    Ok(Arc::new(
        HttpSearchBackend::new(name, kind, base_url, timeout, client)
            .with_api_key(config.api_key.clone()),
    ))
}
