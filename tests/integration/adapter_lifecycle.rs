//! Adapter operations against the recording client

use crate::common::{RecordingClient, config_for};
use pgadapt::adapters::{AdapterBase, DatabaseAdapter, adapter_for, create_database_adapter};
use pgadapt::config::Provider;
use pgadapt::db::SqlClient;
use std::sync::Arc;
use std::time::Duration;

const VERCEL_DIRECT_URL: &str =
    "postgres://default:pw@ep-cool-1.us-east-1.vercel-storage.com/verceldb";

fn adapter_with(provider: Provider, client: &Arc<RecordingClient>) -> Box<dyn DatabaseAdapter> {
    create_database_adapter(provider, client.clone(), config_for(provider))
}

#[tokio::test]
async fn test_health_check_measures_select_one() {
    let client = Arc::new(RecordingClient::new());
    let adapter = adapter_with(Provider::Supabase, &client);
    adapter.connect().await.unwrap();

    let health = adapter.health_check().await;
    assert!(health.healthy);
    assert!(health.error.is_none());
    assert_eq!(client.statements(), vec!["SELECT 1".to_string()]);
}

#[tokio::test]
async fn test_health_check_surfaces_query_error() {
    let client = Arc::new(RecordingClient::new().failing_on("SELECT 1"));
    let adapter = adapter_with(Provider::Local, &client);
    adapter.connect().await.unwrap();

    let health = adapter.health_check().await;
    assert!(!health.healthy);
    assert!(health.error.unwrap().contains("permission denied"));
}

#[tokio::test]
async fn test_health_check_times_out() {
    let client = Arc::new(RecordingClient::new().slow_queries(Duration::from_millis(500)));
    let base = AdapterBase::new(config_for(Provider::Local), client.clone())
        .with_health_check_timeout(Duration::from_millis(10));
    let adapter = adapter_for(Provider::Local, base);
    adapter.connect().await.unwrap();

    let health = adapter.health_check().await;
    assert!(!health.healthy);
    assert_eq!(health.error.as_deref(), Some("Operation timed out"));
    assert!(health.latency < Duration::from_millis(500));
}

#[tokio::test]
async fn test_connect_failure_is_returned() {
    let client = Arc::new(RecordingClient::new().refusing_connections());
    let adapter = adapter_with(Provider::Vercel, &client);
    assert!(adapter.connect().await.is_err());
    assert!(!adapter.is_connected().await);
}

#[tokio::test]
async fn test_supabase_migrate_enables_extensions() {
    let client = Arc::new(RecordingClient::new());
    let adapter = adapter_with(Provider::Supabase, &client);
    adapter.connect().await.unwrap();

    let result = adapter.migrate().await;
    assert!(result.success);
    assert_eq!(result.applied.len(), 3);
    assert!(result.warnings.is_empty());
    assert!(client.issued("\"uuid-ossp\""));
    assert!(client.issued("pg_stat_statements"));
}

#[tokio::test]
async fn test_migrate_is_repeatable() {
    let client = Arc::new(RecordingClient::new());
    let adapter = adapter_with(Provider::Local, &client);
    adapter.connect().await.unwrap();

    let first = adapter.migrate().await;
    let second = adapter.migrate().await;
    assert!(first.success && second.success);
    assert_eq!(first.applied, second.applied);
    assert!(client.statements().iter().all(|s| s.contains("IF NOT EXISTS")));
}

#[tokio::test]
async fn test_local_optimize_skips_alter_system_without_permission() {
    let client = Arc::new(RecordingClient::new().failing_on("ALTER SYSTEM"));
    let adapter = adapter_with(Provider::Local, &client);
    adapter.connect().await.unwrap();

    let result = adapter.optimize().await;
    assert!(result.success);
    assert!(result.error.is_none());
    assert_eq!(result.warnings.len(), 3);
    assert!(result.warnings.iter().all(|w| w.contains("skipped")));
    assert!(result.applied.contains(&"work_mem".to_string()));
    assert!(result.applied.contains(&"vacuum analyze".to_string()));

    // Statements after the failing ones still ran
    let statements = client.statements();
    assert_eq!(statements.len(), 7);
    assert_eq!(statements.last().map(String::as_str), Some("VACUUM ANALYZE"));
}

#[tokio::test]
async fn test_optimize_every_statement_failing_still_succeeds() {
    let client = Arc::new(RecordingClient::new().failing_on("SET").failing_on("ANALYZE"));
    let adapter = adapter_with(Provider::Supabase, &client);
    adapter.connect().await.unwrap();

    let result = adapter.optimize().await;
    assert!(result.success);
    assert!(result.applied.is_empty());
    assert_eq!(result.warnings.len(), 3);
}

#[tokio::test]
async fn test_vercel_migrate_refused_without_direct_url() {
    let client = Arc::new(RecordingClient::new());
    let adapter = adapter_with(Provider::Vercel, &client);
    adapter.connect().await.unwrap();

    let result = adapter.migrate().await;
    assert!(!result.success);
    assert!(result.error.unwrap().contains("DIRECT_URL"));
    assert!(client.statements().is_empty());
}

#[tokio::test]
async fn test_vercel_with_direct_url_migrates() {
    let client = Arc::new(RecordingClient::new());
    let config = config_for(Provider::Vercel).with_direct_url(VERCEL_DIRECT_URL);
    let adapter = create_database_adapter(Provider::Vercel, client.clone(), config);
    adapter.connect().await.unwrap();

    let result = adapter.migrate().await;
    assert!(result.success);
    assert_eq!(result.applied.len(), 2);
}

#[tokio::test]
async fn test_migrations_go_to_migration_client() {
    let pooled = Arc::new(RecordingClient::new());
    let direct = Arc::new(RecordingClient::new());
    let config = config_for(Provider::Vercel).with_direct_url(VERCEL_DIRECT_URL);
    let base = AdapterBase::new(config, pooled.clone()).with_migration_client(direct.clone());
    let adapter = adapter_for(Provider::Vercel, base);
    adapter.connect().await.unwrap();

    let result = adapter.migrate().await;
    assert!(result.success, "{:?}", result.error);
    assert!(direct.issued("uuid-ossp"));
    assert!(direct.issued("pgcrypto"));
    assert!(pooled.statements().is_empty());
    // Opened for the batch, closed afterwards
    assert!(!direct.is_connected().await);
    assert_eq!(direct.disconnects(), 1);

    adapter.optimize().await;
    assert!(pooled.issued("statement_timeout"));
    assert!(!direct.issued("statement_timeout"));
}

#[tokio::test]
async fn test_migration_fails_when_direct_connection_refused() {
    let pooled = Arc::new(RecordingClient::new());
    let direct = Arc::new(RecordingClient::new().refusing_connections());
    let config = config_for(Provider::Supabase)
        .with_direct_url("postgres://u:p@db.abcd.supabase.co/postgres");
    let base = AdapterBase::new(config, pooled.clone()).with_migration_client(direct);
    let adapter = adapter_for(Provider::Supabase, base);
    adapter.connect().await.unwrap();

    let result = adapter.migrate().await;
    assert!(!result.success);
    assert!(result.error.unwrap().contains("connection refused"));
    assert!(pooled.statements().is_empty());
}

#[tokio::test]
async fn test_stats_read_from_server() {
    let client = Arc::new(RecordingClient::new());
    let adapter = adapter_with(Provider::Local, &client);
    adapter.connect().await.unwrap();

    let stats = adapter.stats().await.unwrap();
    assert!(stats.version.unwrap().starts_with("PostgreSQL 16"));
    assert_eq!(stats.database_size.as_deref(), Some("8 MB"));
    assert_eq!(stats.active_connections, Some(3));
}

#[tokio::test]
async fn test_stats_tolerate_single_failing_query() {
    let client = Arc::new(RecordingClient::new().failing_on("pg_stat_activity"));
    let adapter = adapter_with(Provider::Local, &client);
    adapter.connect().await.unwrap();

    let stats = adapter.stats().await.unwrap();
    assert!(stats.version.is_some());
    assert_eq!(stats.active_connections, None);
}

#[tokio::test]
async fn test_configuration_is_the_one_passed_in() {
    let client = Arc::new(RecordingClient::new());
    let adapter = adapter_with(Provider::Supabase, &client);
    assert_eq!(adapter.configuration(), &config_for(Provider::Supabase));
}
