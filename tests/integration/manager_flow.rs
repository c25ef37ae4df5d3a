//! Manager sequencing against the recording client

use crate::common::{RecordingClient, config_for};
use pgadapt::adapters::create_database_adapter;
use pgadapt::commands::handlers::{maintenance_report, status_report};
use pgadapt::config::Provider;
use pgadapt::db::SqlClient;
use pgadapt::manager::{DatabaseAdapterManager, ManagerState};
use std::sync::Arc;

fn manager_with(provider: Provider, client: &Arc<RecordingClient>) -> DatabaseAdapterManager {
    DatabaseAdapterManager::new(create_database_adapter(
        provider,
        client.clone(),
        config_for(provider),
    ))
}

#[tokio::test]
async fn test_initialize_runs_full_sequence() {
    let client = Arc::new(RecordingClient::new());
    let mut manager = manager_with(Provider::Supabase, &client);
    assert_eq!(manager.state(), ManagerState::Uninitialized);

    let result = manager.initialize().await;
    assert!(result.success, "{:?}", result.errors);
    assert_eq!(result.provider, Provider::Supabase);
    assert_eq!(result.state, ManagerState::Optimized);
    assert_eq!(manager.state(), ManagerState::Optimized);

    let statements = client.statements();
    assert_eq!(statements.first().map(String::as_str), Some("SELECT 1"));
    let first_extension = statements
        .iter()
        .position(|s| s.starts_with("CREATE EXTENSION"))
        .unwrap();
    let analyze = statements.iter().position(|s| s == "ANALYZE").unwrap();
    assert!(first_extension < analyze);
}

#[tokio::test]
async fn test_initialize_stops_on_connect_failure() {
    let client = Arc::new(RecordingClient::new().refusing_connections());
    let mut manager = manager_with(Provider::Local, &client);

    let result = manager.initialize().await;
    assert!(!result.success);
    assert_eq!(result.state, ManagerState::Failed);
    assert!(result.errors[0].starts_with("Failed to connect"));
    assert!(client.statements().is_empty());
}

#[tokio::test]
async fn test_initialize_stops_on_health_failure() {
    let client = Arc::new(RecordingClient::new().failing_on("SELECT 1"));
    let mut manager = manager_with(Provider::Local, &client);

    let result = manager.initialize().await;
    assert!(!result.success);
    assert_eq!(manager.state(), ManagerState::Failed);
    assert!(result.errors.iter().any(|e| e.starts_with("Health check failed")));
    assert!(!client.issued("CREATE EXTENSION"));
    assert!(!client.issued("VACUUM"));
}

#[tokio::test]
async fn test_initialize_continues_past_validation_errors() {
    let client = Arc::new(RecordingClient::new());
    let config = config_for(Provider::Vercel).with_pooling(false);
    let mut manager = DatabaseAdapterManager::new(create_database_adapter(
        Provider::Vercel,
        client.clone(),
        config,
    ));

    let result = manager.initialize().await;
    assert!(!result.success);
    assert!(
        result
            .errors
            .contains(&"Connection pooling is required for Vercel Postgres".to_string())
    );
    assert_eq!(result.state, ManagerState::Optimized);
    assert!(client.issued("ANALYZE"));
}

#[tokio::test]
async fn test_initialize_skips_migration_when_unavailable() {
    let client = Arc::new(RecordingClient::new());
    let mut manager = manager_with(Provider::Vercel, &client);

    let result = manager.initialize().await;
    assert!(result.success, "{:?}", result.errors);
    assert!(result.warnings.iter().any(|w| w.contains("DIRECT_URL")));
    assert!(!client.issued("CREATE EXTENSION"));
}

#[tokio::test]
async fn test_initialize_collects_tuning_warnings() {
    let client = Arc::new(RecordingClient::new().failing_on("ALTER SYSTEM"));
    let mut manager = manager_with(Provider::Local, &client);

    let result = manager.initialize().await;
    assert!(result.success);
    assert_eq!(result.warnings.len(), 3);
    assert_eq!(result.state, ManagerState::Optimized);
}

#[tokio::test]
async fn test_status_includes_stats_when_healthy() {
    let client = Arc::new(RecordingClient::new());
    let mut manager = manager_with(Provider::Local, &client);
    manager.initialize().await;

    let status = manager.status().await;
    assert!(status.connected);
    assert!(status.health.healthy);
    assert!(status.validation.is_valid());
    assert_eq!(status.provider_config.name, "Local PostgreSQL");
    assert_eq!(status.stats.unwrap().active_connections, Some(3));
}

#[tokio::test]
async fn test_status_when_disconnected() {
    let client = Arc::new(RecordingClient::new());
    let manager = manager_with(Provider::Supabase, &client);

    let status = manager.status().await;
    assert!(!status.connected);
    assert!(!status.health.healthy);
    assert!(status.stats.is_none());
    assert_eq!(status.state, ManagerState::Uninitialized);
}

#[tokio::test]
async fn test_status_report_keeps_connect_error() {
    let client = Arc::new(RecordingClient::new().refusing_connections());
    let manager = manager_with(Provider::Supabase, &client);

    let status = status_report(&manager).await;
    assert!(!status.connected);
    assert!(!status.health.healthy);
    assert!(status.health.error.unwrap().contains("connection refused"));
}

#[tokio::test]
async fn test_status_report_connects_first() {
    let client = Arc::new(RecordingClient::new());
    let manager = manager_with(Provider::Local, &client);

    let status = status_report(&manager).await;
    assert!(status.connected);
    assert!(status.health.healthy);
}

#[tokio::test]
async fn test_maintenance_report_keeps_connect_error() {
    let client = Arc::new(RecordingClient::new().refusing_connections());
    let manager = manager_with(Provider::Local, &client);

    let result = maintenance_report(&manager).await;
    assert!(!result.success);
    assert!(result.health.error.unwrap().contains("connection refused"));
    assert!(client.statements().is_empty());
}

#[tokio::test]
async fn test_maintenance_requires_healthy_database() {
    let client = Arc::new(RecordingClient::new());
    let manager = manager_with(Provider::Local, &client);

    let result = manager.perform_maintenance().await;
    assert!(!result.success);
    assert!(result.operations.is_empty());
    assert!(client.statements().is_empty());
}

#[tokio::test]
async fn test_maintenance_reapplies_tuning() {
    let client = Arc::new(RecordingClient::new());
    let manager = manager_with(Provider::Vercel, &client);
    manager.adapter().connect().await.unwrap();

    let result = manager.perform_maintenance().await;
    assert!(result.success);
    assert!(result.health.healthy);
    assert_eq!(result.operations.len(), 4);
}

#[tokio::test]
async fn test_switch_adapter_replaces_wholesale() {
    let old_client = Arc::new(RecordingClient::new());
    let mut manager = manager_with(Provider::Supabase, &old_client);
    manager.initialize().await;
    assert_eq!(manager.state(), ManagerState::Optimized);

    let new_client = Arc::new(RecordingClient::new());
    let replacement = create_database_adapter(
        Provider::Local,
        new_client.clone(),
        config_for(Provider::Local),
    );
    manager.switch_adapter(replacement).await;

    assert_eq!(old_client.disconnects(), 1);
    assert!(!old_client.is_connected().await);
    assert_eq!(manager.provider(), Provider::Local);
    assert_eq!(manager.state(), ManagerState::Uninitialized);
    assert_eq!(manager.adapter().configuration().max_connections(), 5);
}

#[test]
fn test_compare_supabase_to_local() {
    let cmp = DatabaseAdapterManager::compare_adapters(Provider::Supabase, Provider::Local);
    assert!(cmp.lost_features.contains(&"Row Level Security"));
    assert!(cmp.lost_features.contains(&"Real-time Subscriptions"));
    assert_eq!(cmp.migration_steps.len(), 7);
}
