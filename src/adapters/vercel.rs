//! Vercel Postgres adapter
//!
//! Vercel Postgres is serverless: every function invocation may open its
//! own connection, so pooling is mandatory and timeouts are kept short.
//! Migrations need the non-pooled `DIRECT_URL`.

use crate::adapters::base::{AdapterBase, Statement};
use crate::adapters::{DatabaseAdapter, run_migration, run_optimization};
use crate::config::{DatabaseConfig, Provider};
use crate::db::{MigrationResult, OptimizationResult, SqlClient, ValidationResult};
use async_trait::async_trait;
use std::sync::Arc;

const MAX_RECOMMENDED_CONNECTIONS: u32 = 10;

const MIGRATIONS: &[Statement] = &[
    Statement::new(
        "uuid-ossp extension",
        "CREATE EXTENSION IF NOT EXISTS \"uuid-ossp\"",
    ),
    Statement::new("pgcrypto extension", "CREATE EXTENSION IF NOT EXISTS pgcrypto"),
];

const OPTIMIZATIONS: &[Statement] = &[
    Statement::new("statement timeout", "SET statement_timeout = '10s'"),
    Statement::new("lock timeout", "SET lock_timeout = '5s'"),
    Statement::new(
        "idle transaction timeout",
        "SET idle_in_transaction_session_timeout = '15s'",
    ),
    Statement::new("analyze", "ANALYZE"),
];

pub struct VercelAdapter {
    base: AdapterBase,
}

impl VercelAdapter {
    pub fn new(config: DatabaseConfig, client: Arc<dyn SqlClient>) -> Self {
        Self::from_base(AdapterBase::new(config, client))
    }

    pub fn from_base(base: AdapterBase) -> Self {
        Self { base }
    }
}

#[async_trait]
impl DatabaseAdapter for VercelAdapter {
    fn base(&self) -> &AdapterBase {
        &self.base
    }

    fn provider(&self) -> Provider {
        Provider::Vercel
    }

    fn validate_configuration(&self) -> ValidationResult {
        let config = self.base.config();
        let mut result = self.base.validate_common();

        if !config.pooling() {
            result.error("Connection pooling is required for Vercel Postgres");
        }
        if !config.ssl() {
            result.error("SSL is required for Vercel Postgres");
        }
        if config.max_connections() > MAX_RECOMMENDED_CONNECTIONS {
            result.warn(format!(
                "max_connections {} is high for serverless; {} or fewer is recommended",
                config.max_connections(),
                MAX_RECOMMENDED_CONNECTIONS
            ));
        }
        if config.direct_url().is_none() {
            result.warn("DIRECT_URL is not set; migrations are disabled");
        }
        result.recommend("Keep queries short; serverless functions time out");

        result
    }

    fn can_migrate(&self) -> bool {
        self.base.config().direct_url().is_some()
    }

    async fn migrate(&self) -> MigrationResult {
        if !self.can_migrate() {
            return MigrationResult {
                error: Some("DIRECT_URL is required to run migrations on Vercel Postgres".into()),
                ..MigrationResult::default()
            };
        }
        run_migration(&self.base, MIGRATIONS).await
    }

    async fn optimize(&self) -> OptimizationResult {
        run_optimization(&self.base, OPTIMIZATIONS).await
    }
}
