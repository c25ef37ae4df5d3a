//! pgadapt - provider-aware PostgreSQL configuration and adapter layer
//!
//! pgadapt resolves a database configuration from the environment, builds
//! provider-tuned connection strings, and wraps a shared Postgres client in
//! an adapter for the hosting provider in use: Supabase, Vercel Postgres,
//! or a local server.
//!
//! # Features
//!
//! - **Config resolution**: `DATABASE_PROVIDER`, `DATABASE_URL` and
//!   `DIRECT_URL` with per-provider defaults for pooling, SSL and
//!   connection count
//! - **Connection strings**: idempotent merging of `pgbouncer`, `sslmode`
//!   and `connection_limit` parameters
//! - **Adapters**: health checks, provider-specific validation, and
//!   best-effort extension migrations and tuning
//! - **Manager**: initialization sequence, status, maintenance and
//!   cross-provider comparison
//!
//! # Architecture
//!
//! - [`config`]: Environment config, provider registry, connection strings, CLI settings
//! - [`db`]: Client trait, tokio-postgres client, result records
//! - [`adapters`]: Provider adapters and the factory
//! - [`manager`]: The adapter manager
//! - [`commands`]: Command-line interface
//! - [`error`]: Error types and result aliases
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pgadapt::adapters::create_database_adapter;
//! use pgadapt::config::{get_connection_string, get_database_config};
//! use pgadapt::db::PostgresClient;
//! use pgadapt::manager::DatabaseAdapterManager;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = get_database_config()?;
//! let client = PostgresClient::new(&get_connection_string(&config)?, config.ssl());
//!
//! let adapter = create_database_adapter(config.provider(), Arc::new(client), config);
//! let mut manager = DatabaseAdapterManager::new(adapter);
//!
//! let result = manager.initialize().await;
//! if !result.success {
//!     eprintln!("database not ready: {:?}", result.errors);
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod manager;

pub use error::{AdapterError, ConfigError, DbError, PgAdaptError, Result};
