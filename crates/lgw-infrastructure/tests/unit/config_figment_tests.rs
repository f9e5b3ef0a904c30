//! Tests for layered configuration loading
//!
//! Each test runs inside a `figment::Jail`, which gives it a scratch working
//! directory and restores any environment variable it sets.

use figment::Jail;
use lgw_domain::{Capability, CapabilitySet, ProviderKind};
use lgw_infrastructure::config::{
    AppConfig, ConfigBuilder, ConfigLoader, GatewayConfig, ProviderConfig, RoutingConfig,
    TaskRouteConfig, map_flat_env_key, validate_app_config,
};

const CONFIG: &str = r#"
[gateway]
max_retries = 1
backoff_base_ms = 500

[pool]
max_per_host = 4

[providers.alpha]
kind = "openai"
base_url = "https://alpha.example.com/v1"
unit_cost_usd = 0.002
daily_budget_usd = 50.0

[providers.beta]
kind = "anthropic"
unit_cost_usd = 0.003
daily_budget_usd = 20.0

[routing]
fallback_chain = ["alpha", "beta"]

[routing.tasks.logistics]
prefer = "alpha"

[routing.tasks.vectors]
capability = "embedding"
prefer = "alpha"
"#;

fn load(jail: &Jail) -> figment::error::Result<AppConfig> {
    ConfigLoader::new()
        .with_config_path(jail.directory().join("lgw.toml"))
        .load()
        .map_err(|e| e.to_string().into())
}

fn load_err(jail: &Jail) -> String {
    match load(jail) {
        Ok(_) => panic!("configuration should have been rejected"),
        Err(e) => e.to_string(),
    }
}

// =============================================================================
// Sources
// =============================================================================

#[test]
fn test_defaults_without_file() {
    Jail::expect_with(|jail| {
        let config = load(jail)?;
        assert_eq!(config.gateway, GatewayConfig::default());
        assert_eq!(config.gateway.max_retries, 3);
        assert_eq!(config.gateway.backoff_base_ms, 1000);
        assert_eq!(config.gateway.backoff_cap_ms, 8000);
        assert!(config.providers.is_empty());
        assert_eq!(config.search.cache_ttl_secs, 300);
        Ok(())
    });
}

#[test]
fn test_toml_file_is_loaded() {
    Jail::expect_with(|jail| {
        jail.create_file("lgw.toml", CONFIG)?;
        let config = load(jail)?;

        assert_eq!(config.gateway.max_retries, 1);
        assert_eq!(config.gateway.backoff_base_ms, 500);
        assert_eq!(config.gateway.backoff_cap_ms, 8000);
        assert_eq!(config.pool.max_per_host, 4);

        let alpha = &config.providers["alpha"];
        assert_eq!(alpha.kind, ProviderKind::OpenAi);
        assert!((alpha.daily_budget_usd - 50.0).abs() < f64::EPSILON);
        assert_eq!(alpha.resolved_capabilities(), CapabilitySet::all());

        let beta = &config.providers["beta"];
        assert_eq!(beta.kind, ProviderKind::Anthropic);
        assert_eq!(beta.resolved_capabilities(), CapabilitySet::chat());

        assert_eq!(config.routing.fallback_chain, vec!["alpha", "beta"]);
        assert_eq!(config.routing.tasks["logistics"].capability, Capability::Chat);
        assert_eq!(
            config.routing.tasks["vectors"].capability,
            Capability::Embedding
        );
        Ok(())
    });
}

#[test]
fn test_nested_env_overrides_file() {
    Jail::expect_with(|jail| {
        jail.create_file("lgw.toml", CONFIG)?;
        jail.set_env("LGW__GATEWAY__MAX_RETRIES", "5");
        jail.set_env("LGW__SEARCH__DEFAULT_LIMIT", "7");

        let config = load(jail)?;
        assert_eq!(config.gateway.max_retries, 5);
        assert_eq!(config.search.default_limit, 7);
        Ok(())
    });
}

#[test]
fn test_custom_env_prefix() {
    Jail::expect_with(|jail| {
        jail.create_file("lgw.toml", CONFIG)?;
        jail.set_env("LGW__GATEWAY__MAX_RETRIES", "5");
        jail.set_env("EDGE__GATEWAY__MAX_RETRIES", "4");

        let config = ConfigLoader::new()
            .with_env_prefix("EDGE")
            .with_config_path(jail.directory().join("lgw.toml"))
            .load()
            .map_err(|e| e.to_string())?;
        assert_eq!(config.gateway.max_retries, 4);
        Ok(())
    });
}

/// Flat deployment variables win over both the file and nested variables
#[test]
fn test_flat_env_overrides_everything() {
    Jail::expect_with(|jail| {
        jail.create_file("lgw.toml", CONFIG)?;
        jail.set_env("LGW__GATEWAY__MAX_RETRIES", "5");
        jail.set_env("GATEWAY_MAX_RETRIES", "4");
        jail.set_env("GATEWAY_BACKOFF_FACTOR", "3.0");
        jail.set_env("POOL_MAX_TOTAL", "16");
        jail.set_env("POOL_DNS_CACHE_TTL_S", "120");
        jail.set_env("SEARCH_CACHE_TTL_S", "30");

        let config = load(jail)?;
        assert_eq!(config.gateway.max_retries, 4);
        assert!((config.gateway.backoff_factor - 3.0).abs() < f64::EPSILON);
        assert_eq!(config.pool.max_total, 16);
        assert_eq!(config.pool.dns_cache_ttl_secs, 120);
        assert_eq!(config.search.cache_ttl_secs, 30);
        Ok(())
    });
}

#[test]
fn test_provider_env_variables() {
    Jail::expect_with(|jail| {
        jail.create_file("lgw.toml", CONFIG)?;
        jail.set_env("PROVIDER_ALPHA_API_KEY", "sk-alpha-test");
        jail.set_env("PROVIDER_ALPHA_DAILY_BUDGET_USD", "12.5");
        jail.set_env("PROVIDER_ALPHA_CAPABILITIES", "chat");
        jail.set_env("PROVIDER_GAMMA_KIND", "ollama");
        jail.set_env("PROVIDER_GAMMA_BASE_URL", "http://localhost:11434");

        let config = load(jail)?;
        let alpha = &config.providers["alpha"];
        assert_eq!(alpha.api_key.as_deref(), Some("sk-alpha-test"));
        assert!((alpha.daily_budget_usd - 12.5).abs() < f64::EPSILON);
        assert_eq!(alpha.capabilities, Some(CapabilitySet::chat()));
        // untouched fields keep their file values
        assert!((alpha.unit_cost_usd - 0.002).abs() < f64::EPSILON);

        let gamma = &config.providers["gamma"];
        assert_eq!(gamma.kind, ProviderKind::Ollama);
        assert_eq!(gamma.base_url.as_deref(), Some("http://localhost:11434"));
        Ok(())
    });
}

#[test]
fn test_environment_can_be_ignored() {
    Jail::expect_with(|jail| {
        jail.create_file("lgw.toml", CONFIG)?;
        jail.set_env("GATEWAY_MAX_RETRIES", "9");

        let config = ConfigLoader::new()
            .with_config_path(jail.directory().join("lgw.toml"))
            .with_environment(false)
            .load()
            .map_err(|e| e.to_string())?;
        assert_eq!(config.gateway.max_retries, 1);
        Ok(())
    });
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_backoff_factor_below_one_is_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file("lgw.toml", "[gateway]\nbackoff_factor = 0.5\n")?;
        assert!(load_err(jail).contains("Backoff factor"));
        Ok(())
    });
}

#[test]
fn test_base_above_cap_is_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "lgw.toml",
            "[gateway]\nbackoff_base_ms = 9000\nbackoff_cap_ms = 8000\n",
        )?;
        assert!(load_err(jail).contains("cannot exceed backoff cap"));
        Ok(())
    });
}

#[test]
fn test_unknown_provider_in_chain_is_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "lgw.toml",
            "[providers.alpha]\ndaily_budget_usd = 1.0\n\n[routing]\nfallback_chain = [\"alpha\", \"ghost\"]\n",
        )?;
        assert!(load_err(jail).contains("ghost"));
        Ok(())
    });
}

#[test]
fn test_capability_outside_dialect_is_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "lgw.toml",
            "[providers.claude]\nkind = \"anthropic\"\ncapabilities = [\"embedding\"]\n",
        )?;
        assert!(load_err(jail).contains("claude"));
        Ok(())
    });
}

#[test]
fn test_invalid_log_level_is_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file("lgw.toml", "[logging]\nlevel = \"loud\"\n")?;
        assert!(load_err(jail).contains("Invalid log level"));
        Ok(())
    });
}

#[test]
fn test_disabled_provider_cannot_be_routed_to() {
    let config = ConfigBuilder::new()
        .with_provider(
            "alpha",
            ProviderConfig {
                enabled: false,
                ..ProviderConfig::default()
            },
        )
        .with_routing(RoutingConfig {
            fallback_chain: vec!["alpha".to_string()],
            ..RoutingConfig::default()
        })
        .build();
    assert!(validate_app_config(&config).is_err());
}

#[test]
fn test_builder_validates_task_preferences() {
    let mut routing = RoutingConfig::default();
    routing.tasks.insert(
        "finance".to_string(),
        TaskRouteConfig {
            capability: Capability::Chat,
            prefer: Some("beta".to_string()),
        },
    );
    let result = ConfigBuilder::new()
        .with_provider("Alpha", ProviderConfig::default())
        .with_routing(routing)
        .build_validated();
    assert!(result.is_err());
}

// =============================================================================
// Persistence and flat keys
// =============================================================================

#[test]
fn test_save_and_reload_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lgw.toml");
    let config = ConfigBuilder::new()
        .with_provider(
            "alpha",
            ProviderConfig {
                kind: ProviderKind::OpenAi,
                base_url: Some("https://alpha.example.com/v1".to_string()),
                unit_cost_usd: 0.25,
                daily_budget_usd: 10.0,
                capabilities: Some(CapabilitySet::chat()),
                ..ProviderConfig::default()
            },
        )
        .with_routing(RoutingConfig {
            fallback_chain: vec!["alpha".to_string()],
            ..RoutingConfig::default()
        })
        .build_validated()
        .unwrap();

    let loader = ConfigLoader::new()
        .with_config_path(&path)
        .with_environment(false);
    loader.save_to_file(&config, &path).unwrap();

    assert_eq!(loader.config_path(), Some(path.as_path()));
    assert_eq!(loader.reload().unwrap(), config);
}

#[test]
fn test_flat_key_mapping() {
    assert_eq!(
        map_flat_env_key("GATEWAY_MAX_RETRIES").as_deref(),
        Some("gateway.max_retries")
    );
    assert_eq!(
        map_flat_env_key("pool_keepalive_s").as_deref(),
        Some("pool.keepalive_secs")
    );
    assert_eq!(
        map_flat_env_key("PROVIDER_ALPHA_API_KEY").as_deref(),
        Some("providers.alpha.api_key")
    );
    assert_eq!(
        map_flat_env_key("PROVIDER_MY_BOT_UNIT_COST_USD").as_deref(),
        Some("providers.my_bot.unit_cost_usd")
    );
    assert_eq!(map_flat_env_key("PROVIDER__API_KEY"), None);
    assert_eq!(map_flat_env_key("PROVIDER_ALPHA_COLOR"), None);
    assert_eq!(map_flat_env_key("HOME"), None);
}
