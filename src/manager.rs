//! Adapter manager
//!
//! Owns the current adapter and sequences the aggregate operations:
//! initialization, status, maintenance and cross-provider comparison.
//!
//! Initialization walks `Uninitialized → Connected → Validated →
//! (Migrated) → Optimized`. A failed connect or health check is terminal;
//! everything else is recorded and the sequence continues.

use crate::adapters::DatabaseAdapter;
use crate::config::{Provider, ProviderConfig, get_provider_config};
use crate::db::{DatabaseStats, HealthCheckResult, ValidationResult};
use serde::Serialize;
use tracing::{info, warn};

/// Fixed checklist for moving between providers
const MIGRATION_STEPS: [&str; 7] = [
    "Back up the current database (pg_dump)",
    "Provision the target database and note its connection strings",
    "Update DATABASE_PROVIDER, DATABASE_URL and DIRECT_URL",
    "Run schema migrations against the target",
    "Restore data into the target database",
    "Verify connectivity and data with a health check",
    "Update deployment environment variables and redeploy",
];

/// Where the manager is in the initialization sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ManagerState {
    Uninitialized,
    Connected,
    Validated,
    Migrated,
    Optimized,
    Failed,
}

/// Outcome of [`DatabaseAdapterManager::initialize`]
///
/// Callers are expected to halt startup when `success` is false.
#[derive(Debug, Clone, Serialize)]
pub struct InitializationResult {
    pub success: bool,
    pub provider: Provider,
    pub state: ManagerState,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Snapshot of the current adapter
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseStatus {
    pub provider: Provider,
    pub state: ManagerState,
    pub connected: bool,
    pub health: HealthCheckResult,
    pub validation: ValidationResult,
    pub provider_config: &'static ProviderConfig,
    pub stats: Option<DatabaseStats>,
}

/// Outcome of [`DatabaseAdapterManager::perform_maintenance`]
#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceResult {
    pub success: bool,
    pub provider: Provider,
    pub health: HealthCheckResult,
    pub operations: Vec<String>,
    pub warnings: Vec<String>,
}

/// Feature diff between two providers
#[derive(Debug, Clone, Serialize)]
pub struct AdapterComparison {
    pub from: Provider,
    pub to: Provider,
    pub lost_features: Vec<&'static str>,
    pub gained_features: Vec<&'static str>,
    pub migration_steps: Vec<&'static str>,
}

/// Holds the one current adapter
pub struct DatabaseAdapterManager {
    adapter: Box<dyn DatabaseAdapter>,
    state: ManagerState,
}

impl DatabaseAdapterManager {
    pub fn new(adapter: Box<dyn DatabaseAdapter>) -> Self {
        Self {
            adapter,
            state: ManagerState::Uninitialized,
        }
    }

    pub fn adapter(&self) -> &dyn DatabaseAdapter {
        self.adapter.as_ref()
    }

    pub fn state(&self) -> ManagerState {
        self.state
    }

    pub fn provider(&self) -> Provider {
        self.adapter.provider()
    }

    /// Connect, validate, health-check, migrate and optimize
    pub async fn initialize(&mut self) -> InitializationResult {
        let provider = self.adapter.provider();
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        info!(%provider, "initializing database adapter");

        if let Err(e) = self.adapter.connect().await {
            errors.push(format!("Failed to connect: {}", e));
            return self.finish(provider, ManagerState::Failed, errors, warnings);
        }
        self.state = ManagerState::Connected;

        let validation = self.adapter.validate_configuration();
        errors.extend(validation.errors().iter().cloned());
        warnings.extend(validation.warnings().iter().cloned());
        self.state = ManagerState::Validated;

        let health = self.adapter.health_check().await;
        if !health.healthy {
            errors.push(format!(
                "Health check failed: {}",
                health.error.as_deref().unwrap_or("unknown error")
            ));
            return self.finish(provider, ManagerState::Failed, errors, warnings);
        }

        if self.adapter.can_migrate() {
            let migration = self.adapter.migrate().await;
            warnings.extend(migration.warnings);
            if let Some(e) = migration.error {
                errors.push(format!("Migration failed: {}", e));
            } else {
                self.state = ManagerState::Migrated;
            }
        }

        let optimization = self.adapter.optimize().await;
        warnings.extend(optimization.warnings);
        match optimization.error {
            Some(e) => errors.push(format!("Optimization failed: {}", e)),
            None => self.state = ManagerState::Optimized,
        }

        let state = self.state;
        self.finish(provider, state, errors, warnings)
    }

    fn finish(
        &mut self,
        provider: Provider,
        state: ManagerState,
        errors: Vec<String>,
        warnings: Vec<String>,
    ) -> InitializationResult {
        self.state = state;
        let success = errors.is_empty();
        if success {
            info!(%provider, warnings = warnings.len(), "database adapter initialized");
        } else {
            warn!(%provider, errors = ?errors, "database adapter initialization failed");
        }
        InitializationResult {
            success,
            provider,
            state,
            errors,
            warnings,
        }
    }

    /// Health, validation and basic statistics for the current adapter
    pub async fn status(&self) -> DatabaseStatus {
        let connected = self.adapter.is_connected().await;
        let health = self.adapter.health_check().await;
        let stats = if health.healthy {
            self.adapter.stats().await.ok()
        } else {
            None
        };

        DatabaseStatus {
            provider: self.adapter.provider(),
            state: self.state,
            connected,
            health,
            validation: self.adapter.validate_configuration(),
            provider_config: self.adapter.provider_config(),
            stats,
        }
    }

    /// Re-apply tuning if the database is reachable
    pub async fn perform_maintenance(&self) -> MaintenanceResult {
        let provider = self.adapter.provider();
        let health = self.adapter.health_check().await;
        if !health.healthy {
            warn!(%provider, "skipping maintenance, database unhealthy");
            return MaintenanceResult {
                success: false,
                provider,
                health,
                operations: Vec::new(),
                warnings: Vec::new(),
            };
        }

        let optimization = self.adapter.optimize().await;
        let mut warnings = optimization.warnings;
        if let Some(e) = &optimization.error {
            warnings.push(format!("Optimization failed: {}", e));
        }
        MaintenanceResult {
            success: optimization.success,
            provider,
            health,
            operations: optimization.applied,
            warnings,
        }
    }

    /// Replace the current adapter
    ///
    /// The old adapter is disconnected first; a disconnect error is logged
    /// and does not prevent the switch.
    pub async fn switch_adapter(&mut self, adapter: Box<dyn DatabaseAdapter>) {
        let from = self.adapter.provider();
        if let Err(e) = self.adapter.disconnect().await {
            warn!(%from, error = %e, "disconnect failed while switching adapters");
        }
        info!(%from, to = %adapter.provider(), "switched database adapter");
        self.adapter = adapter;
        self.state = ManagerState::Uninitialized;
    }

    /// Features lost and gained moving from one provider to another
    pub fn compare_adapters(from: Provider, to: Provider) -> AdapterComparison {
        let from_features = get_provider_config(from).features;
        let to_features = get_provider_config(to).features;

        AdapterComparison {
            from,
            to,
            lost_features: from_features
                .iter()
                .filter(|f| !to_features.contains(*f))
                .copied()
                .collect(),
            gained_features: to_features
                .iter()
                .filter(|f| !from_features.contains(*f))
                .copied()
                .collect(),
            migration_steps: MIGRATION_STEPS.to_vec(),
        }
    }
}
