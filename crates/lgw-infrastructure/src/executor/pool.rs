//! Bounded connection pool
//!
//! Every outbound provider call holds a [`ConnectionLease`]: one permit of the
//! global semaphore and one of the target host's semaphore. Tokio semaphores
//! are fair, so saturated callers queue in arrival order.
//!
//! Each host gets its own `reqwest::Client` whose keep-alive connections are
//! reused until the keep-alive TTL. Host clients older than the DNS cache TTL
//! are rebuilt on next use so the host name is resolved again, and a periodic
//! sweep drops host clients that are idle or DNS-stale and not leased.

use crate::config::PoolConfig;
use crate::constants::USER_AGENT;
use crate::error_ext::ErrorContext;
use dashmap::DashMap;
use lgw_domain::error::{Error, Result};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

struct HostClient {
    client: Client,
    created_at: Instant,
}

struct HostSlot {
    permits: Arc<Semaphore>,
    client: Mutex<HostClient>,
    last_used: Mutex<Instant>,
}

impl HostSlot {
    fn idle_for(&self, now: Instant) -> std::time::Duration {
        let last_used = *self.last_used.lock().unwrap_or_else(PoisonError::into_inner);
        now.saturating_duration_since(last_used)
    }

    fn age(&self, now: Instant) -> std::time::Duration {
        let created_at = self
            .client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .created_at;
        now.saturating_duration_since(created_at)
    }
}

/// Point-in-time pool statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Host clients currently held
    pub hosts: usize,
    /// Leases currently held across all hosts
    pub in_flight: usize,
    /// Global concurrency cap
    pub max_total: usize,
    /// Per-host concurrency cap
    pub max_per_host: usize,
}

/// A held connection slot
///
/// Dropping the lease returns both permits and marks the host as used.
pub struct ConnectionLease {
    client: Client,
    host: String,
    slot: Arc<HostSlot>,
    _host_permit: OwnedSemaphorePermit,
    _global_permit: OwnedSemaphorePermit,
}

impl ConnectionLease {
    /// Client bound to the leased host
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// `host:port` of the lease
    pub fn host(&self) -> &str {
        &self.host
    }
}

impl Drop for ConnectionLease {
    fn drop(&mut self) {
        *self
            .slot
            .last_used
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }
}

/// Connection pool shared by every provider call
pub struct ConnectionPool {
    config: PoolConfig,
    global: Arc<Semaphore>,
    hosts: DashMap<String, Arc<HostSlot>>,
    system_proxy: bool,
}

impl ConnectionPool {
    /// Create a pool with the given caps
    pub fn new(config: PoolConfig) -> Self {
        Self {
            global: Arc::new(Semaphore::new(config.max_total.max(1))),
            hosts: DashMap::new(),
            config,
            system_proxy: true,
        }
    }

    /// Ignore proxy settings from the environment
    pub fn without_system_proxy(mut self) -> Self {
        self.system_proxy = false;
        self
    }

    /// Pool configuration
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Normalized `host:port` key of a URL
    pub fn host_key(url: &str) -> Result<String> {
        let parsed = Url::parse(url)
            .map_err(|e| Error::invalid_argument(format!("Invalid provider URL {url}: {e}")))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| Error::invalid_argument(format!("Provider URL has no host: {url}")))?;
        let port = parsed
            .port_or_known_default()
            .ok_or_else(|| Error::invalid_argument(format!("Provider URL has no port: {url}")))?;
        Ok(format!("{}:{port}", host.to_lowercase()))
    }

    /// Wait for a slot to the host of `url`
    ///
    /// The host permit is taken before the global one so that callers queued
    /// on a saturated host do not hold global capacity.
    pub async fn acquire(&self, url: &str) -> Result<ConnectionLease> {
        let host = Self::host_key(url)?;
        let slot = self.slot_for(&host)?;

        let host_permit = Arc::clone(&slot.permits)
            .acquire_owned()
            .await
            .map_err(|_| Error::internal("Host semaphore closed"))?;
        let global_permit = Arc::clone(&self.global)
            .acquire_owned()
            .await
            .map_err(|_| Error::internal("Pool semaphore closed"))?;

        let client = self.current_client(&slot)?;
        trace!(host = %host, "Connection slot acquired");

        Ok(ConnectionLease {
            client,
            host,
            slot,
            _host_permit: host_permit,
            _global_permit: global_permit,
        })
    }

    fn slot_for(&self, host: &str) -> Result<Arc<HostSlot>> {
        if let Some(slot) = self.hosts.get(host) {
            return Ok(Arc::clone(slot.value()));
        }

        let now = Instant::now();
        let slot = Arc::new(HostSlot {
            permits: Arc::new(Semaphore::new(self.config.max_per_host.max(1))),
            client: Mutex::new(HostClient {
                client: self.build_client(self.hosts.len() + 1)?,
                created_at: now,
            }),
            last_used: Mutex::new(now),
        });

        Ok(Arc::clone(
            self.hosts.entry(host.to_string()).or_insert(slot).value(),
        ))
    }

    fn current_client(&self, slot: &HostSlot) -> Result<Client> {
        let mut current = slot.client.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        if now.saturating_duration_since(current.created_at) >= self.config.dns_cache_ttl() {
            *current = HostClient {
                client: self.build_client(self.hosts.len())?,
                created_at: now,
            };
            debug!("Host client rebuilt after DNS cache TTL");
        }
        Ok(current.client.clone())
    }

    fn build_client(&self, host_count: usize) -> Result<Client> {
        let mut builder = Client::builder()
            .pool_max_idle_per_host(self.config.idle_per_host(host_count))
            .pool_idle_timeout(self.config.keepalive())
            .tcp_keepalive(self.config.keepalive())
            .connect_timeout(self.config.connect_timeout())
            .user_agent(USER_AGENT);
        if !self.system_proxy {
            builder = builder.no_proxy();
        }
        builder.build().network_context("Failed to build HTTP client")
    }

    /// Drop host clients that are idle past keep-alive or older than the DNS
    /// cache TTL and not currently leased. Returns the number removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let keepalive = self.config.keepalive();
        let dns_ttl = self.config.dns_cache_ttl();
        let before = self.hosts.len();

        self.hosts.retain(|host, slot| {
            let leased = Arc::strong_count(slot) > 1;
            let stale = slot.idle_for(now) >= keepalive || slot.age(now) >= dns_ttl;
            if !leased && stale {
                debug!(host = %host, "Evicting idle host client");
                return false;
            }
            true
        });

        before.saturating_sub(self.hosts.len())
    }

    /// Run [`Self::sweep`] every `sweep_interval` until `cancel` fires
    pub fn spawn_sweeper(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let pool = Arc::clone(self);
        let period = self.config.sweep_interval();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let removed = pool.sweep();
                        if removed > 0 {
                            debug!(removed, "Connection pool sweep");
                        }
                    }
                }
            }
        })
    }

    /// Current statistics
    pub fn stats(&self) -> PoolStats {
        let max_total = self.config.max_total.max(1);
        PoolStats {
            hosts: self.hosts.len(),
            in_flight: max_total.saturating_sub(self.global.available_permits()),
            max_total,
            max_per_host: self.config.max_per_host.max(1),
        }
    }

    /// Leases currently held against one host
    pub fn host_in_flight(&self, host: &str) -> usize {
        self.hosts.get(host).map_or(0, |slot| {
            self.config
                .max_per_host
                .max(1)
                .saturating_sub(slot.permits.available_permits())
        })
    }
}
