//! Configuration loader
//!
//! Handles loading configuration from various sources including
//! TOML files, environment variables, and default values.
//!
//! Sources are merged in this order (later sources override earlier):
//! 1. Default values from `AppConfig::default()`
//! 2. TOML configuration file (explicit path, or the first `lgw.toml` found)
//! 3. Nested variables with prefix (e.g., `LGW__GATEWAY__MAX_RETRIES`)
//! 4. Flat deployment variables (e.g., `GATEWAY_MAX_RETRIES`,
//!    `PROVIDER_ALPHA_API_KEY`)

use crate::config::{
    AppConfig, GatewayConfig, LoggingConfig, PoolConfig, ProviderConfig, RoutingConfig,
    SearchConfig, TelemetryConfig,
};
use crate::constants::{
    CONFIG_ENV_PREFIX, CONFIG_ENV_SEPARATOR, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILENAME,
    PROVIDER_ENV_PREFIX,
};
use crate::error_ext::ErrorContext;
use crate::logging::{log_config_source, parse_log_level};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::value::Uncased;
use lgw_domain::error::{Error, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Flat variables outside the provider namespace
const FLAT_ENV_KEYS: [(&str, &str); 9] = [
    ("GATEWAY_MAX_RETRIES", "gateway.max_retries"),
    ("GATEWAY_BACKOFF_BASE_MS", "gateway.backoff_base_ms"),
    ("GATEWAY_BACKOFF_FACTOR", "gateway.backoff_factor"),
    ("GATEWAY_BACKOFF_CAP_MS", "gateway.backoff_cap_ms"),
    ("POOL_MAX_TOTAL", "pool.max_total"),
    ("POOL_MAX_PER_HOST", "pool.max_per_host"),
    ("POOL_DNS_CACHE_TTL_S", "pool.dns_cache_ttl_secs"),
    ("POOL_KEEPALIVE_S", "pool.keepalive_secs"),
    ("SEARCH_CACHE_TTL_S", "search.cache_ttl_secs"),
];

/// `PROVIDER_<NAME>_<SUFFIX>` fields
const PROVIDER_ENV_FIELDS: [(&str, &str); 6] = [
    ("_API_KEY", "api_key"),
    ("_BASE_URL", "base_url"),
    ("_DAILY_BUDGET_USD", "daily_budget_usd"),
    ("_UNIT_COST_USD", "unit_cost_usd"),
    ("_KIND", "kind"),
    ("_CAPABILITIES", "capabilities"),
];

/// Map a flat deployment variable to its dotted configuration key
///
/// Returns `None` for variables the gateway does not read.
pub fn map_flat_env_key(key: &str) -> Option<String> {
    let upper = key.to_ascii_uppercase();

    if let Some(rest) = upper.strip_prefix(PROVIDER_ENV_PREFIX) {
        return PROVIDER_ENV_FIELDS.iter().find_map(|(suffix, field)| {
            let name = rest.strip_suffix(suffix)?;
            (!name.is_empty() && !name.contains('.'))
                .then(|| format!("providers.{}.{field}", name.to_ascii_lowercase()))
        });
    }

    FLAT_ENV_KEYS
        .iter()
        .find(|(flat, _)| *flat == upper)
        .map(|(_, dotted)| (*dotted).to_string())
}

/// Configuration loader service
#[derive(Clone)]
pub struct ConfigLoader {
    /// Configuration file path
    config_path: Option<PathBuf>,

    /// Environment prefix
    env_prefix: String,

    /// Whether environment variables are read at all
    use_environment: bool,
}

impl ConfigLoader {
    /// Create a new configuration loader with default settings
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
            use_environment: true,
        }
    }

    /// Set the configuration file path
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enable or disable environment variable sources
    pub fn with_environment(mut self, enabled: bool) -> Self {
        self.use_environment = enabled;
        self
    }

    /// Load configuration from all sources
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        if let Some(config_path) = &self.config_path {
            if config_path.exists() {
                figment = figment.merge(Toml::file(config_path));
                log_config_source(config_path, true);
            } else {
                log_config_source(config_path, false);
            }
        } else if let Some(default_path) = Self::find_default_config_path() {
            figment = figment.merge(Toml::file(&default_path));
            log_config_source(&default_path, true);
        }

        if self.use_environment {
            let prefix = format!("{}{CONFIG_ENV_SEPARATOR}", self.env_prefix);
            figment = figment
                .merge(Env::prefixed(&prefix).split(CONFIG_ENV_SEPARATOR))
                .merge(
                    Env::raw()
                        .filter_map(|key| map_flat_env_key(key.as_str()).map(Uncased::from)),
                );
        }

        let app_config: AppConfig = figment
            .extract()
            .config_context("Failed to extract configuration")?;

        validate_app_config(&app_config)?;

        Ok(app_config)
    }

    /// Reload configuration
    pub fn reload(&self) -> Result<AppConfig> {
        self.load()
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &AppConfig, path: P) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(config).config_context("Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), toml_string).io_context(format!(
            "Failed to write config file {}",
            path.as_ref().display()
        ))?;

        Ok(())
    }

    /// Get the current configuration file path
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Find the first existing default configuration file
    fn find_default_config_path() -> Option<PathBuf> {
        let current_dir = env::current_dir().ok()?;

        let candidates = [
            Some(current_dir.join(DEFAULT_CONFIG_FILENAME)),
            Some(
                current_dir
                    .join(DEFAULT_CONFIG_DIR)
                    .join(DEFAULT_CONFIG_FILENAME),
            ),
            dirs::config_dir().map(|d| d.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME)),
            dirs::home_dir().map(|d| {
                d.join(format!(".{DEFAULT_CONFIG_DIR}"))
                    .join(DEFAULT_CONFIG_FILENAME)
            }),
        ];

        candidates.into_iter().flatten().find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate application configuration
///
/// Performs validation of all configuration sections, including that the
/// routing section only names configured providers.
pub fn validate_app_config(config: &AppConfig) -> Result<()> {
    validate_settings(config)?;
    validate_routing_references(&config.routing, |name| {
        config
            .providers
            .get(&name.to_lowercase())
            .is_some_and(|provider| provider.enabled)
    })
}

/// Validate every section except cross references between routing and
/// providers
pub fn validate_settings(config: &AppConfig) -> Result<()> {
    validate_gateway_config(&config.gateway)?;
    validate_pool_config(&config.pool)?;
    validate_provider_configs(config)?;
    validate_routing_thresholds(&config.routing)?;
    validate_search_config(&config.search)?;
    validate_telemetry_config(&config.telemetry)?;
    parse_log_level(&config.logging.level)?;
    Ok(())
}

/// Check that the fallback chain and task preferences only name providers
/// accepted by `known`
pub fn validate_routing_references<F>(routing: &RoutingConfig, known: F) -> Result<()>
where
    F: Fn(&str) -> bool,
{
    for name in &routing.fallback_chain {
        if !known(name) {
            return Err(Error::configuration(format!(
                "Fallback chain names unknown provider: {name}"
            )));
        }
    }
    for (task, route) in &routing.tasks {
        if let Some(prefer) = &route.prefer
            && !known(prefer)
        {
            return Err(Error::configuration(format!(
                "Task {task} prefers unknown provider: {prefer}"
            )));
        }
    }
    Ok(())
}

fn validate_gateway_config(gateway: &GatewayConfig) -> Result<()> {
    if !gateway.backoff_factor.is_finite() || gateway.backoff_factor < 1.0 {
        return Err(Error::configuration(format!(
            "Backoff factor must be at least 1.0, got {}",
            gateway.backoff_factor
        )));
    }
    if gateway.backoff_base_ms > gateway.backoff_cap_ms {
        return Err(Error::configuration(format!(
            "Backoff base ({}ms) cannot exceed backoff cap ({}ms)",
            gateway.backoff_base_ms, gateway.backoff_cap_ms
        )));
    }
    if !(0.0..=1.0).contains(&gateway.jitter_ratio) {
        return Err(Error::configuration(format!(
            "Jitter ratio must be within 0.0..=1.0, got {}",
            gateway.jitter_ratio
        )));
    }
    if gateway.attempt_timeout_ms == 0 {
        return Err(Error::configuration("Attempt timeout cannot be 0"));
    }
    if gateway.default_timeout_ms == 0 {
        return Err(Error::configuration("Default request timeout cannot be 0"));
    }
    Ok(())
}

fn validate_pool_config(pool: &PoolConfig) -> Result<()> {
    if pool.max_total == 0 {
        return Err(Error::configuration("Pool max_total cannot be 0"));
    }
    if pool.max_per_host == 0 {
        return Err(Error::configuration("Pool max_per_host cannot be 0"));
    }
    if pool.sweep_interval_secs == 0 {
        return Err(Error::configuration("Pool sweep interval cannot be 0"));
    }
    Ok(())
}

fn validate_provider_configs(config: &AppConfig) -> Result<()> {
    for (name, provider) in config.enabled_providers() {
        if name.trim().is_empty() || name.contains('.') {
            return Err(Error::configuration(format!(
                "Invalid provider name: {name:?}"
            )));
        }
        for (field, value) in [
            ("unit_cost_usd", provider.unit_cost_usd),
            ("daily_budget_usd", provider.daily_budget_usd),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::configuration(format!(
                    "Provider {name}: {field} must be a non-negative amount, got {value}"
                )));
            }
        }
        let base_url = provider.resolved_base_url();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(Error::configuration(format!(
                "Provider {name}: base URL must be http(s), got {base_url}"
            )));
        }
        let capabilities = provider.resolved_capabilities();
        if capabilities.is_empty() {
            return Err(Error::configuration(format!(
                "Provider {name}: capability set cannot be empty"
            )));
        }
        if !capabilities.is_subset(&provider.kind.supported_capabilities()) {
            return Err(Error::configuration(format!(
                "Provider {name}: {} providers cannot serve every configured capability",
                provider.kind.as_str()
            )));
        }
    }
    Ok(())
}

fn validate_routing_thresholds(routing: &RoutingConfig) -> Result<()> {
    if routing.degraded_after == 0 {
        return Err(Error::configuration("Routing degraded_after cannot be 0"));
    }
    if routing.unavailable_after < routing.degraded_after {
        return Err(Error::configuration(format!(
            "Routing unavailable_after ({}) cannot be below degraded_after ({})",
            routing.unavailable_after, routing.degraded_after
        )));
    }
    Ok(())
}

fn validate_search_config(search: &SearchConfig) -> Result<()> {
    if search.cache_ttl_secs == 0 {
        return Err(Error::configuration("Search cache TTL cannot be 0"));
    }
    if search.default_limit == 0 {
        return Err(Error::configuration("Search default limit cannot be 0"));
    }
    if search.probe_interval_secs == 0 {
        return Err(Error::configuration("Search probe interval cannot be 0"));
    }
    Ok(())
}

fn validate_telemetry_config(telemetry: &TelemetryConfig) -> Result<()> {
    if telemetry.enabled && telemetry.channel_capacity == 0 {
        return Err(Error::configuration(
            "Telemetry channel capacity cannot be 0 when telemetry is enabled",
        ));
    }
    Ok(())
}

/// Configuration builder for programmatic configuration
pub struct ConfigBuilder {
    config: AppConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with defaults
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    /// Set retry and backoff configuration
    pub fn with_gateway(mut self, gateway: GatewayConfig) -> Self {
        self.config.gateway = gateway;
        self
    }

    /// Set connection pool configuration
    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.config.pool = pool;
        self
    }

    /// Add a provider
    pub fn with_provider<S: Into<String>>(mut self, name: S, provider: ProviderConfig) -> Self {
        self.config
            .providers
            .insert(name.into().to_lowercase(), provider);
        self
    }

    /// Set routing configuration
    pub fn with_routing(mut self, routing: RoutingConfig) -> Self {
        self.config.routing = routing;
        self
    }

    /// Set search configuration
    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.config.search = search;
        self
    }

    /// Set logging configuration
    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.config.logging = logging;
        self
    }

    /// Set telemetry configuration
    pub fn with_telemetry(mut self, telemetry: TelemetryConfig) -> Self {
        self.config.telemetry = telemetry;
        self
    }

    /// Build the configuration
    pub fn build(self) -> AppConfig {
        self.config
    }

    /// Build and validate the configuration
    pub fn build_validated(self) -> Result<AppConfig> {
        validate_app_config(&self.config)?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
