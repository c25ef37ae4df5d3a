//! Database abstraction layer
//!
//! This module provides the narrow client trait adapters talk to, the
//! tokio-postgres implementation of it, and the result records adapter
//! operations return.

pub mod client;
pub mod postgres;
pub mod types;

// Re-export main types
pub use client::SqlClient;
pub use postgres::PostgresClient;
pub use types::{
    DatabaseStats, HealthCheckResult, MigrationResult, OptimizationResult, ValidationResult,
};
