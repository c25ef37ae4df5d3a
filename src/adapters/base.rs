//! Shared adapter state and behavior
//!
//! Every provider adapter wraps an [`AdapterBase`], which owns the
//! resolved config and the shared client and implements the operations
//! that don't vary by provider. When `DIRECT_URL` is set the base also
//! carries a second client for migrations, opened on that URL.

use crate::config::DatabaseConfig;
use crate::config::database::is_postgres_url;
use crate::db::{DatabaseStats, HealthCheckResult, SqlClient, ValidationResult};
use crate::error::{DbError, DbResult};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const HEALTH_CHECK_SQL: &str = "SELECT 1";
const DEFAULT_HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// One tuning or migration statement
#[derive(Debug, Clone, Copy)]
pub struct Statement {
    /// Short description used in results and logs
    pub label: &'static str,
    pub sql: &'static str,
}

impl Statement {
    pub const fn new(label: &'static str, sql: &'static str) -> Self {
        Self { label, sql }
    }
}

/// Config + client pair shared by all adapters
pub struct AdapterBase {
    config: DatabaseConfig,
    client: Arc<dyn SqlClient>,
    /// Non-pooled client for DDL; `None` runs migrations on `client`
    migration_client: Option<Arc<dyn SqlClient>>,
    health_check_timeout: Duration,
}

impl AdapterBase {
    pub fn new(config: DatabaseConfig, client: Arc<dyn SqlClient>) -> Self {
        Self {
            config,
            client,
            migration_client: None,
            health_check_timeout: DEFAULT_HEALTH_CHECK_TIMEOUT,
        }
    }

    pub fn with_migration_client(mut self, client: Arc<dyn SqlClient>) -> Self {
        self.migration_client = Some(client);
        self
    }

    pub fn with_health_check_timeout(mut self, timeout: Duration) -> Self {
        self.health_check_timeout = timeout;
        self
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn client(&self) -> &dyn SqlClient {
        self.client.as_ref()
    }

    pub async fn connect(&self) -> DbResult<()> {
        self.client.connect().await
    }

    pub async fn disconnect(&self) -> DbResult<()> {
        self.client.disconnect().await
    }

    pub async fn is_connected(&self) -> bool {
        self.client.is_connected().await
    }

    /// Issue a trivial query and time it
    pub async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        let outcome = tokio::time::timeout(
            self.health_check_timeout,
            self.client.query_text(HEALTH_CHECK_SQL),
        )
        .await
        .unwrap_or(Err(DbError::Timeout));
        let latency = start.elapsed();

        match outcome {
            Ok(_) => {
                debug!(latency_ms = latency.as_millis() as u64, "health check passed");
                HealthCheckResult::healthy(latency)
            }
            Err(e) => {
                warn!(error = %e, "health check failed");
                HealthCheckResult::unhealthy(latency, e.to_string())
            }
        }
    }

    /// Server version, database size and connection count
    ///
    /// Each value is fetched independently; one failing query only blanks
    /// its own field.
    pub async fn stats(&self) -> DbResult<DatabaseStats> {
        if !self.is_connected().await {
            return Err(DbError::NotConnected);
        }
        let version = self.scalar("SELECT version()").await;
        let database_size = self
            .scalar("SELECT pg_size_pretty(pg_database_size(current_database()))")
            .await;
        let active_connections = self
            .scalar("SELECT count(*) FROM pg_stat_activity WHERE datname = current_database()")
            .await
            .and_then(|n| n.parse().ok());

        Ok(DatabaseStats {
            version,
            database_size,
            active_connections,
        })
    }

    async fn scalar(&self, sql: &str) -> Option<String> {
        match self.client.query_text(sql).await {
            Ok(rows) => rows.into_iter().next().flatten(),
            Err(e) => {
                debug!(sql, error = %e, "stats query failed");
                None
            }
        }
    }

    /// Checks every provider shares: URL present and well-formed, sane
    /// connection count
    pub fn validate_common(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        let url = self.config.url();

        if url.trim().is_empty() {
            result.error("Database URL is required");
        } else if !is_postgres_url(url) {
            result.error("Database URL must use the postgres:// or postgresql:// scheme");
        }

        if self.config.max_connections() == 0 {
            result.error("max_connections must be at least 1");
        }

        result
    }

    /// Run `statements` in order, collecting failures instead of aborting
    pub async fn run_statements(&self, statements: &[Statement]) -> TuningLog {
        run_all(self.client.as_ref(), statements).await
    }

    /// Like [`AdapterBase::run_statements`], but on the migration client
    /// when there is one
    ///
    /// The migration client is connected for this batch only.
    ///
    /// # Errors
    /// Returns the connect error if the migration client can't connect
    pub async fn run_migration_statements(&self, statements: &[Statement]) -> DbResult<TuningLog> {
        let Some(direct) = &self.migration_client else {
            return Ok(self.run_statements(statements).await);
        };
        direct.connect().await?;
        debug!("running migrations over the direct connection");
        let log = run_all(direct.as_ref(), statements).await;
        if let Err(e) = direct.disconnect().await {
            warn!(error = %e, "closing the direct connection failed");
        }
        Ok(log)
    }

    /// Host part of the configured URL, if it has one
    pub fn host(&self) -> Option<String> {
        url::Url::parse(self.config.url())
            .ok()
            .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
    }
}

async fn run_all(client: &dyn SqlClient, statements: &[Statement]) -> TuningLog {
    let mut log = TuningLog::default();
    for stmt in statements {
        log.attempt(client, stmt).await;
    }
    log
}

/// Applied/skipped record for a best-effort statement batch
#[derive(Debug, Default, Clone)]
pub struct TuningLog {
    pub applied: Vec<String>,
    pub warnings: Vec<String>,
}

impl TuningLog {
    /// Run one statement; a failure becomes a warning, never an error
    pub async fn attempt(&mut self, client: &dyn SqlClient, stmt: &Statement) {
        match client.execute(stmt.sql).await {
            Ok(()) => {
                debug!(statement = stmt.label, "applied");
                self.applied.push(stmt.label.to_string());
            }
            Err(e) => {
                warn!(statement = stmt.label, error = %e, "statement skipped");
                self.warnings.push(format!("{} skipped: {}", stmt.label, e));
            }
        }
    }
}
