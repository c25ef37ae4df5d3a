//! Local PostgreSQL adapter
//!
//! A self-managed server we have full control over, so tuning goes as far
//! as `ALTER SYSTEM`. Those statements need superuser; when the role lacks
//! it they're skipped with a warning.

use crate::adapters::base::{AdapterBase, Statement};
use crate::adapters::{DatabaseAdapter, run_migration, run_optimization};
use crate::config::{DatabaseConfig, Provider};
use crate::db::{MigrationResult, OptimizationResult, SqlClient, ValidationResult};
use async_trait::async_trait;
use std::sync::Arc;

/// Hostnames that count as "this machine" (including compose service names)
const LOCAL_HOSTS: &[&str] = &[
    "localhost",
    "127.0.0.1",
    "::1",
    "[::1]",
    "host.docker.internal",
    "postgres",
    "db",
];

const MIGRATIONS: &[Statement] = &[
    Statement::new(
        "uuid-ossp extension",
        "CREATE EXTENSION IF NOT EXISTS \"uuid-ossp\"",
    ),
    Statement::new("pgcrypto extension", "CREATE EXTENSION IF NOT EXISTS pgcrypto"),
    Statement::new("pg_trgm extension", "CREATE EXTENSION IF NOT EXISTS pg_trgm"),
];

const OPTIMIZATIONS: &[Statement] = &[
    Statement::new("work_mem", "SET work_mem = '16MB'"),
    Statement::new("maintenance_work_mem", "SET maintenance_work_mem = '128MB'"),
    Statement::new(
        "shared_buffers",
        "ALTER SYSTEM SET shared_buffers = '256MB'",
    ),
    Statement::new(
        "random_page_cost",
        "ALTER SYSTEM SET random_page_cost = 1.1",
    ),
    Statement::new(
        "effective_cache_size",
        "ALTER SYSTEM SET effective_cache_size = '1GB'",
    ),
    Statement::new("reload configuration", "SELECT pg_reload_conf()"),
    Statement::new("vacuum analyze", "VACUUM ANALYZE"),
];

pub struct LocalAdapter {
    base: AdapterBase,
}

impl LocalAdapter {
    pub fn new(config: DatabaseConfig, client: Arc<dyn SqlClient>) -> Self {
        Self::from_base(AdapterBase::new(config, client))
    }

    pub fn from_base(base: AdapterBase) -> Self {
        Self { base }
    }
}

#[async_trait]
impl DatabaseAdapter for LocalAdapter {
    fn base(&self) -> &AdapterBase {
        &self.base
    }

    fn provider(&self) -> Provider {
        Provider::Local
    }

    fn validate_configuration(&self) -> ValidationResult {
        let config = self.base.config();
        let mut result = self.base.validate_common();

        if config.url().to_ascii_lowercase().contains("production") {
            result.error("Local adapter must not point at a production database");
        }
        if let Some(host) = self.base.host()
            && !LOCAL_HOSTS.contains(&host.as_str())
        {
            result.warn(format!(
                "Host '{}' is not local; the local adapter is meant for development",
                host
            ));
        }
        if config.ssl() {
            result.recommend("SSL is usually unnecessary for a local database");
        }
        if config.pooling() {
            result.recommend("Connection pooling adds little for a local database");
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
