//! `lgw` command line
//!
//! | Command | Description |
//! |---------|-------------|
//! | `lgw check-config` | Load and validate configuration, print the effective routing |
//! | `lgw route --task <TASK>` | Submit one provider request and print the reply body |
//! | `lgw search <QUERY>` | Run one document search and print the result |
//!
//! Output goes to stdout; logs go to stderr.

use crate::gateway::{Gateway, RequestOptions};
use clap::{Parser, Subcommand};
use lgw_domain::error::{Error, Result};
use lgw_domain::Priority;
use lgw_infrastructure::GatewayContextBuilder;
use lgw_infrastructure::config::{AppConfig, ConfigLoader};
use serde_json::{Value, json};
use std::io::Write;
use std::path::PathBuf;

/// Command line interface for the LGW provider gateway
#[derive(Parser, Debug)]
#[command(name = "lgw")]
#[command(about = "LGW - Outbound provider gateway")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Ignore environment variable overrides
    #[arg(long, global = true)]
    pub no_env: bool,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Load and validate configuration, then print the effective routing
    CheckConfig,

    /// Submit one provider request and print the reply body
    Route {
        /// Task type (a configured task, `chat` or `embedding`)
        #[arg(short, long)]
        task: String,

        /// Provider-ready JSON payload
        #[arg(short, long, conflicts_with = "payload_file")]
        payload: Option<String>,

        /// Read the payload from a file
        #[arg(long)]
        payload_file: Option<PathBuf>,

        /// Deadline for the whole request in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Skip providers whose unit cost exceeds this
        #[arg(long)]
        max_cost_usd: Option<f64>,

        /// Forwarded as `Idempotency-Key` on every attempt
        #[arg(long)]
        idempotency_key: Option<String>,

        /// low, normal or high
        #[arg(long, default_value = "normal", value_parser = parse_priority)]
        priority: Priority,
    },

    /// Run one document search and print the result as JSON
    Search {
        /// Free text query
        query: String,

        /// Backend filters as a JSON object
        #[arg(short, long)]
        filters: Option<String>,
    },
}

/// Parse a priority name
pub fn parse_priority(value: &str) -> std::result::Result<Priority, String> {
    match value.trim().to_lowercase().as_str() {
        "low" => Ok(Priority::Low),
        "normal" => Ok(Priority::Normal),
        "high" => Ok(Priority::High),
        other => Err(format!(
            "unknown priority '{other}', expected low, normal or high"
        )),
    }
}

/// Parse search filters; an absent value means no filters
pub fn parse_filters(filters: Option<&str>) -> Result<Value> {
    let Some(raw) = filters else {
        return Ok(json!({}));
    };
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| Error::invalid_argument(format!("Filters are not valid JSON: {e}")))?;
    if !value.is_object() {
        return Err(Error::invalid_argument("Filters must be a JSON object"));
    }
    Ok(value)
}

/// Load configuration the way the command line asks for
pub fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut loader = ConfigLoader::new().with_environment(!cli.no_env);
    if let Some(path) = &cli.config {
        if !path.exists() {
            return Err(Error::configuration(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }
        loader = loader.with_config_path(path);
    }
    loader.load()
}

/// Effective configuration summary, without credentials
pub fn summarize(gateway: &Gateway) -> Value {
    let context = gateway.context();
    let providers: Vec<Value> = context
        .registry()
        .descriptors()
        .map(|descriptor| {
            json!({
                "name": descriptor.id,
                "kind": descriptor.kind,
                "baseUrl": descriptor.base_url,
                "capabilities": descriptor.capabilities,
                "unitCostUsd": descriptor.unit_cost.as_dollars(),
                "dailyBudgetUsd": descriptor.daily_budget.as_dollars(),
            })
        })
        .collect();
    let tasks: serde_json::Map<String, Value> = context
        .config
        .routing
        .tasks
        .iter()
        .map(|(name, route)| {
            (
                name.clone(),
                json!({ "capability": route.capability, "prefer": route.prefer }),
            )
        })
        .collect();
    let gateway_config = &context.config.gateway;

    json!({
        "providers": providers,
        "fallbackChain": context.router().table().chain(),
        "tasks": tasks,
        "retry": {
            "maxRetries": gateway_config.max_retries,
            "backoffBaseMs": gateway_config.backoff_base_ms,
            "backoffFactor": gateway_config.backoff_factor,
            "backoffCapMs": gateway_config.backoff_cap_ms,
        },
        "pool": {
            "maxTotal": context.config.pool.max_total,
            "maxPerHost": context.config.pool.max_per_host,
        },
        "searchCacheTtlSecs": context.config.search.cache_ttl_secs,
    })
}

/// Run one command against a loaded configuration, writing results to `out`
///
/// Must be called from within a tokio runtime.
pub async fn execute<W: Write>(command: Command, config: AppConfig, out: &mut W) -> Result<()> {
    let gateway = Gateway::from_context(
        GatewayContextBuilder::new(config)
            .without_background_tasks()
            .build()?,
    );
    let outcome = run_command(&gateway, command, out).await;
    gateway.shutdown().await;
    outcome
}

async fn run_command<W: Write>(gateway: &Gateway, command: Command, out: &mut W) -> Result<()> {
    match command {
        Command::CheckConfig => write_json(out, &summarize(gateway)),
        Command::Route {
            task,
            payload,
            payload_file,
            timeout_ms,
            max_cost_usd,
            idempotency_key,
            priority,
        } => {
            let payload = match (payload, payload_file) {
                (Some(payload), _) => payload.into_bytes(),
                (None, Some(path)) => tokio::fs::read(&path).await.map_err(|e| {
                    Error::io_with_source(format!("Failed to read {}", path.display()), e)
                })?,
                (None, None) => {
                    return Err(Error::invalid_argument(
                        "A payload is required (--payload or --payload-file)",
                    ));
                }
            };

            let mut options = RequestOptions::default().with_priority(priority);
            options.timeout_ms = timeout_ms;
            options.max_cost_usd = max_cost_usd;
            options.idempotency_key = idempotency_key;

            let result = gateway
                .submit_provider_request(&task, payload, options)
                .await?;
            tracing::info!(
                request_id = %result.request_id,
                provider = %result.provider,
                status = result.status,
                attempts = result.attempts.len(),
                cost_usd = result.cost_usd,
                "Request complete"
            );
            out.write_all(&result.body)
                .and_then(|()| out.write_all(b"\n"))
                .map_err(|e| Error::io_with_source("Failed to write reply", e))
        }
        Command::Search { query, filters } => {
            let filters = parse_filters(filters.as_deref())?;
            let result = gateway.submit_search(&query, filters).await?;
            write_json(out, &serde_json::to_value(&result)?)
        }
    }
}

fn write_json<W: Write>(out: &mut W, value: &Value) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out).map_err(|e| Error::io_with_source("Failed to write output", e))
}
