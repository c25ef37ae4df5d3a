//! Subcommand handlers
//!
//! This is the composition root: it resolves the config, builds the one
//! shared client and hands it to the adapter factory.

use crate::adapters::{AdapterBase, adapter_for, create_database_adapter};
use crate::commands::{Cli, Command};
use crate::config::connection::{get_connection_string, migration_url, redact_url};
use crate::config::database::{DatabaseConfig, ENV_PROVIDER, Provider};
use crate::config::{OutputFormat, Settings, all_providers, validate_database_config};
use crate::db::{HealthCheckResult, PostgresClient, ValidationResult};
use crate::error::ConfigResult;
use crate::manager::{
    AdapterComparison, DatabaseAdapterManager, DatabaseStatus, InitializationResult,
    MaintenanceResult,
};
use anyhow::Context;
use serde::Serialize;
use std::fmt::Write;
use std::sync::Arc;
use std::time::Duration;

/// Run a parsed command. Returns whether it succeeded.
pub async fn run(cli: Cli, settings: &Settings) -> anyhow::Result<bool> {
    let format = if cli.json {
        OutputFormat::Json
    } else {
        settings.output
    };

    match cli.command {
        Command::Providers => {
            let providers: Vec<_> = all_providers().map(|(_, c)| c).collect();
            emit(format, &providers, |p| {
                let mut out = String::new();
                for c in p.iter() {
                    let _ = writeln!(out, "{} - {}", c.name, c.description);
                    let _ = writeln!(
                        out,
                        "  migrations: {}  pooling: {}",
                        yes_no(c.migration_support),
                        yes_no(c.pooling_support)
                    );
                    let params: Vec<String> = c
                        .connection_params
                        .iter()
                        .map(|p| format!("{}={}", p.key, p.value))
                        .collect();
                    let _ = writeln!(out, "  params: {}", params.join("&"));
                    for f in c.features {
                        let _ = writeln!(out, "  * {}", f);
                    }
                }
                out
            })?;
            Ok(true)
        }
        Command::Compare { from, to } => {
            let cmp = DatabaseAdapterManager::compare_adapters(from, to);
            emit(format, &cmp, render_comparison)?;
            Ok(true)
        }
        Command::Config => {
            let config = resolve_config(cli.provider)?;
            let report = ConfigReport {
                provider: config.provider(),
                url: redact_url(config.url()),
                direct_url: config.direct_url().map(redact_url),
                connection_string: redact_url(&get_connection_string(&config)?),
                migration_url: redact_url(&migration_url(&config)?),
                pooling: config.pooling(),
                ssl: config.ssl(),
                max_connections: config.max_connections(),
            };
            emit(format, &report, render_config)?;
            Ok(true)
        }
        Command::Validate => {
            let result = validate(resolve_config(cli.provider)?);
            emit(format, &result, render_validation)?;
            Ok(result.is_valid())
        }
        Command::Health => {
            let manager = build_manager(resolve_config(cli.provider)?, settings)?;
            let health = match manager.adapter().connect().await {
                Ok(()) => manager.adapter().health_check().await,
                Err(e) => HealthCheckResult::unhealthy(Duration::ZERO, e.to_string()),
            };
            let _ = manager.adapter().disconnect().await;
            emit(format, &health, render_health)?;
            Ok(health.healthy)
        }
        Command::Init => {
            let mut manager = build_manager(resolve_config(cli.provider)?, settings)?;
            let result = manager.initialize().await;
            let _ = manager.adapter().disconnect().await;
            emit(format, &result, render_initialization)?;
            Ok(result.success)
        }
        Command::Status => {
            let manager = build_manager(resolve_config(cli.provider)?, settings)?;
            let status = status_report(&manager).await;
            let _ = manager.adapter().disconnect().await;
            emit(format, &status, render_status)?;
            Ok(status.health.healthy)
        }
        Command::Maintain => {
            let manager = build_manager(resolve_config(cli.provider)?, settings)?;
            let result = maintenance_report(&manager).await;
            let _ = manager.adapter().disconnect().await;
            emit(format, &result, render_maintenance)?;
            Ok(result.success)
        }
    }
}

/// Resolve the config from the environment, honoring `--provider`
pub fn resolve_config(provider: Option<Provider>) -> ConfigResult<DatabaseConfig> {
    DatabaseConfig::from_lookup(|key| match provider {
        Some(p) if key == ENV_PROVIDER => Some(p.as_str().to_string()),
        _ => std::env::var(key).ok(),
    })
}

/// Generic checks plus the provider's own rules
///
/// Nothing is connected. Provider rules run only once the URL passes the
/// generic checks; a URL with placeholders still gets them.
pub fn validate(config: DatabaseConfig) -> ValidationResult {
    let mut result = validate_database_config(&config);
    if result.is_valid() {
        let client = PostgresClient::new(config.url(), config.ssl());
        let adapter = create_database_adapter(config.provider(), Arc::new(client), config);
        result.merge(adapter.validate_configuration());
    }
    result
}

/// Build the shared client and wrap it in the configured provider's adapter
///
/// With `DIRECT_URL` set, a second client on that URL is attached for
/// migrations.
pub fn build_manager(
    config: DatabaseConfig,
    settings: &Settings,
) -> anyhow::Result<DatabaseAdapterManager> {
    let url = get_connection_string(&config).context("building connection string")?;
    let client = PostgresClient::new(&url, config.ssl());
    let direct = match config.direct_url() {
        Some(_) => {
            let direct_url = migration_url(&config).context("reading DIRECT_URL")?;
            Some(PostgresClient::new(&direct_url, config.ssl()))
        }
        None => None,
    };

    let provider = config.provider();
    let mut base = AdapterBase::new(config, Arc::new(client))
        .with_health_check_timeout(Duration::from_millis(settings.health_check_timeout_ms));
    if let Some(direct) = direct {
        base = base.with_migration_client(Arc::new(direct));
    }
    Ok(DatabaseAdapterManager::new(adapter_for(provider, base)))
}

/// Connect and report status; a failed connect shows up as the health error
pub async fn status_report(manager: &DatabaseAdapterManager) -> DatabaseStatus {
    let connect_error = manager.adapter().connect().await.err();
    let mut status = manager.status().await;
    if let Some(e) = connect_error {
        status.health = HealthCheckResult::unhealthy(Duration::ZERO, e.to_string());
    }
    status
}

/// Connect and run maintenance; a failed connect shows up as the health error
pub async fn maintenance_report(manager: &DatabaseAdapterManager) -> MaintenanceResult {
    let connect_error = manager.adapter().connect().await.err();
    let mut result = manager.perform_maintenance().await;
    if let Some(e) = connect_error {
        result.health = HealthCheckResult::unhealthy(Duration::ZERO, e.to_string());
    }
    result
}

#[derive(Debug, Serialize)]
struct ConfigReport {
    provider: Provider,
    url: String,
    direct_url: Option<String>,
    connection_string: String,
    migration_url: String,
    pooling: bool,
    ssl: bool,
    max_connections: u32,
}

fn emit<T: Serialize>(
    format: OutputFormat,
    value: &T,
    text: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => print!("{}", text(value)),
    }
    Ok(())
}

fn yes_no(b: bool) -> &'static str {
    if b { "yes" } else { "no" }
}

fn push_list(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "{}:", heading);
    for item in items {
        let _ = writeln!(out, "  - {}", item);
    }
}

fn render_config(r: &ConfigReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "provider:          {}", r.provider);
    let _ = writeln!(out, "url:               {}", r.url);
    let _ = writeln!(
        out,
        "direct url:        {}",
        r.direct_url.as_deref().unwrap_or("(not set)")
    );
    let _ = writeln!(out, "connection string: {}", r.connection_string);
    let _ = writeln!(out, "migration url:     {}", r.migration_url);
    let _ = writeln!(out, "pooling:           {}", yes_no(r.pooling));
    let _ = writeln!(out, "ssl:               {}", yes_no(r.ssl));
    let _ = writeln!(out, "max connections:   {}", r.max_connections);
    out
}

fn render_validation(r: &ValidationResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "configuration {}",
        if r.is_valid() { "valid" } else { "INVALID" }
    );
    push_list(&mut out, "errors", r.errors());
    push_list(&mut out, "warnings", r.warnings());
    push_list(&mut out, "recommendations", r.recommendations());
    out
}

fn render_health(h: &HealthCheckResult) -> String {
    match &h.error {
        None => format!("healthy ({} ms)\n", h.latency.as_millis()),
        Some(e) => format!("unhealthy: {}\n", e),
    }
}

fn render_initialization(r: &InitializationResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} initialization {} (state: {:?})",
        r.provider,
        if r.success { "succeeded" } else { "FAILED" },
        r.state
    );
    push_list(&mut out, "errors", &r.errors);
    push_list(&mut out, "warnings", &r.warnings);
    out
}

fn render_status(s: &DatabaseStatus) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "provider:  {} ({})", s.provider, s.provider_config.name);
    let _ = writeln!(out, "connected: {}", yes_no(s.connected));
    out.push_str("health:    ");
    out.push_str(&render_health(&s.health));
    if let Some(stats) = &s.stats {
        if let Some(v) = &stats.version {
            let _ = writeln!(out, "version:   {}", v);
        }
        if let Some(size) = &stats.database_size {
            let _ = writeln!(out, "size:      {}", size);
        }
        if let Some(n) = stats.active_connections {
            let _ = writeln!(out, "sessions:  {}", n);
        }
    }
    out.push_str(&render_validation(&s.validation));
    out
}

fn render_maintenance(r: &MaintenanceResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} maintenance {}",
        r.provider,
        if r.success { "completed" } else { "FAILED" }
    );
    if !r.health.healthy {
        out.push_str(&render_health(&r.health));
    }
    push_list(&mut out, "applied", &r.operations);
    push_list(&mut out, "warnings", &r.warnings);
    out
}

fn render_comparison(c: &AdapterComparison) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} -> {}", c.from, c.to);
    let as_strings = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    push_list(&mut out, "lost features", &as_strings(c.lost_features.as_slice()));
    push_list(&mut out, "gained features", &as_strings(c.gained_features.as_slice()));
    let _ = writeln!(out, "migration steps:");
    for (i, step) in c.migration_steps.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, step);
    }
    out
}
