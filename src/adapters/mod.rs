//! Provider adapters
//!
//! A [`DatabaseAdapter`] is the provider-specific implementation of the
//! common database-operations interface. Adapters share an
//! [`AdapterBase`] holding the config and the client; they differ in how
//! they validate configuration and which extensions and tuning
//! statements they issue.

pub mod base;
pub mod local;
pub mod supabase;
pub mod vercel;

pub use base::{AdapterBase, Statement, TuningLog};
pub use local::LocalAdapter;
pub use supabase::SupabaseAdapter;
pub use vercel::VercelAdapter;

use crate::config::{DatabaseConfig, Provider, ProviderConfig, get_provider_config};
use crate::db::{
    DatabaseStats, HealthCheckResult, MigrationResult, OptimizationResult, SqlClient,
    ValidationResult,
};
use crate::error::{AdapterError, AdapterResult, DbError, DbResult};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// Provider-specific database operations
#[async_trait]
pub trait DatabaseAdapter: Send + Sync {
    /// Shared config/client state
    fn base(&self) -> &AdapterBase;

    /// Which provider this adapter implements
    fn provider(&self) -> Provider;

    /// The config this adapter was built with
    fn configuration(&self) -> &DatabaseConfig {
        self.base().config()
    }

    /// Registry entry for this adapter's provider
    fn provider_config(&self) -> &'static ProviderConfig {
        get_provider_config(self.provider())
    }

    async fn connect(&self) -> DbResult<()> {
        self.base().connect().await
    }

    async fn disconnect(&self) -> DbResult<()> {
        self.base().disconnect().await
    }

    async fn is_connected(&self) -> bool {
        self.base().is_connected().await
    }

    /// Probe the connection and measure latency
    ///
    /// Never fails; connection problems come back as `healthy: false`.
    async fn health_check(&self) -> HealthCheckResult {
        self.base().health_check().await
    }

    /// Check the config against this provider's requirements
    ///
    /// Errors make the result invalid; warnings and recommendations don't.
    fn validate_configuration(&self) -> ValidationResult;

    /// Whether `migrate` can run with the current config
    fn can_migrate(&self) -> bool;

    /// Enable the extensions this provider's schema relies on
    ///
    /// Idempotent and best-effort: each statement that fails is recorded
    /// as a warning and the rest still run.
    async fn migrate(&self) -> MigrationResult;

    /// Apply provider-appropriate tuning
    ///
    /// Same best-effort semantics as [`DatabaseAdapter::migrate`].
    async fn optimize(&self) -> OptimizationResult;

    async fn stats(&self) -> DbResult<DatabaseStats> {
        self.base().stats().await
    }
}

/// Run `statements` as a migration
///
/// Fails when the adapter isn't connected or its direct connection can't
/// be opened; individual statement failures are only warnings.
pub(crate) async fn run_migration(base: &AdapterBase, statements: &[Statement]) -> MigrationResult {
    if !base.is_connected().await {
        return MigrationResult {
            error: Some(DbError::NotConnected.to_string()),
            ..MigrationResult::default()
        };
    }
    match base.run_migration_statements(statements).await {
        Ok(log) => MigrationResult {
            success: true,
            applied: log.applied,
            warnings: log.warnings,
            error: None,
        },
        Err(e) => MigrationResult {
            error: Some(e.to_string()),
            ..MigrationResult::default()
        },
    }
}

/// Run `statements` as an optimization pass, failing only when not connected
pub(crate) async fn run_optimization(
    base: &AdapterBase,
    statements: &[Statement],
) -> OptimizationResult {
    if !base.is_connected().await {
        return OptimizationResult {
            error: Some(DbError::NotConnected.to_string()),
            ..OptimizationResult::default()
        };
    }
    let log = base.run_statements(statements).await;
    OptimizationResult {
        success: true,
        applied: log.applied,
        warnings: log.warnings,
        error: None,
    }
}

/// Build the adapter for `provider`
pub fn create_database_adapter(
    provider: Provider,
    client: Arc<dyn SqlClient>,
    config: DatabaseConfig,
) -> Box<dyn DatabaseAdapter> {
    if provider != config.provider() {
        warn!(
            adapter = %provider,
            configured = %config.provider(),
            "adapter provider differs from configured provider"
        );
    }
    adapter_for(provider, AdapterBase::new(config, client))
}

/// Build the adapter for a provider given by name
///
/// # Errors
/// Returns `AdapterError::UnknownProvider` if `name` isn't a supported provider
pub fn create_adapter_by_name(
    name: &str,
    client: Arc<dyn SqlClient>,
    config: DatabaseConfig,
) -> AdapterResult<Box<dyn DatabaseAdapter>> {
    let provider: Provider = name
        .parse()
        .map_err(|_| AdapterError::UnknownProvider(name.to_string()))?;
    Ok(create_database_adapter(provider, client, config))
}

/// Build the adapter for an already assembled base
pub fn adapter_for(provider: Provider, base: AdapterBase) -> Box<dyn DatabaseAdapter> {
    match provider {
        Provider::Supabase => Box::new(SupabaseAdapter::from_base(base)),
        Provider::Vercel => Box::new(VercelAdapter::from_base(base)),
        Provider::Local => Box::new(LocalAdapter::from_base(base)),
    }
}
