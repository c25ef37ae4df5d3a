//! Supabase adapter
//!
//! Supabase fronts Postgres with PgBouncer and requires TLS.

use crate::adapters::base::{AdapterBase, Statement};
use crate::adapters::{DatabaseAdapter, run_migration, run_optimization};
use crate::config::{DatabaseConfig, Provider};
use crate::db::{MigrationResult, OptimizationResult, SqlClient, ValidationResult};
use async_trait::async_trait;
use std::sync::Arc;

/// Connections Supabase's free and pro tiers allow through the pooler
const MAX_RECOMMENDED_CONNECTIONS: u32 = 20;

const MIGRATIONS: &[Statement] = &[
    Statement::new(
        "uuid-ossp extension",
        "CREATE EXTENSION IF NOT EXISTS \"uuid-ossp\"",
    ),
    Statement::new("pgcrypto extension", "CREATE EXTENSION IF NOT EXISTS pgcrypto"),
    Statement::new(
        "pg_stat_statements extension",
        "CREATE EXTENSION IF NOT EXISTS pg_stat_statements",
    ),
];

const OPTIMIZATIONS: &[Statement] = &[
    Statement::new("statement timeout", "SET statement_timeout = '30s'"),
    Statement::new(
        "idle transaction timeout",
        "SET idle_in_transaction_session_timeout = '60s'",
    ),
    Statement::new("analyze", "ANALYZE"),
];

pub struct SupabaseAdapter {
    base: AdapterBase,
}

impl SupabaseAdapter {
    pub fn new(config: DatabaseConfig, client: Arc<dyn SqlClient>) -> Self {
        Self::from_base(AdapterBase::new(config, client))
    }

    pub fn from_base(base: AdapterBase) -> Self {
        Self { base }
    }
}

#[async_trait]
impl DatabaseAdapter for SupabaseAdapter {
    fn base(&self) -> &AdapterBase {
        &self.base
    }

    fn provider(&self) -> Provider {
        Provider::Supabase
    }

    fn validate_configuration(&self) -> ValidationResult {
        let config = self.base.config();
        let mut result = self.base.validate_common();

        if !config.ssl() {
            result.error("SSL is required for Supabase connections");
        }
        if !config.pooling() {
            result.warn("Connection pooling is recommended for Supabase");
        }
        if let Some(host) = self.base.host()
            && !host.contains("supabase.co")
            && !host.contains("supabase.com")
        {
            result.warn(format!("Host '{}' does not look like a Supabase host", host));
        }
        if config.max_connections() > MAX_RECOMMENDED_CONNECTIONS {
            result.warn(format!(
                "max_connections {} exceeds the recommended {} for Supabase",
                config.max_connections(),
                MAX_RECOMMENDED_CONNECTIONS
            ));
        }
        if config.direct_url().is_none() {
            result.recommend("Set DIRECT_URL so migrations bypass PgBouncer");
        }

        result
    }

    fn can_migrate(&self) -> bool {
        true
    }

    async fn migrate(&self) -> MigrationResult {
        run_migration(&self.base, MIGRATIONS).await
    }

    async fn optimize(&self) -> OptimizationResult {
        run_optimization(&self.base, OPTIMIZATIONS).await
    }
}
