//! Error types for pgadapt
//!
//! This module defines the error hierarchy used throughout the crate.
//! We use `thiserror` for library-style errors with clear error chains.

use std::io;

/// Main error type for pgadapt
#[derive(Debug, thiserror::Error)]
pub enum PgAdaptError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// Adapter selection errors
    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Configuration resolution/parsing errors
///
/// These are fatal: the application should not start with a broken
/// database configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is unset or blank
    #[error("Required environment variable {0} is not set")]
    MissingVar(&'static str),

    /// `DATABASE_PROVIDER` names a provider we don't support
    #[error("Unknown database provider '{0}' (expected supabase, vercel or local)")]
    UnknownProvider(String),

    /// URL could not be parsed or has the wrong scheme
    #[error("Invalid database URL: {0}")]
    InvalidUrl(String),

    /// An override variable holds a value we can't interpret
    #[error("Invalid value '{value}' for {var}")]
    InvalidValue { var: &'static str, value: String },

    /// Home directory not found
    #[error("Could not determine home directory")]
    NoHomeDir,

    /// Failed to parse TOML
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to read a config file
    #[error("Failed to read configuration: {0}")]
    Io(#[from] io::Error),
}

/// Database operation errors
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Failed to establish connection
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Statement or query execution failed
    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    /// Not connected to a database
    #[error("Not connected to database")]
    NotConnected,

    /// Operation timed out
    #[error("Operation timed out")]
    Timeout,
}

/// Adapter factory errors
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// No adapter exists for this provider name
    #[error("Unsupported database provider: {0}")]
    UnknownProvider(String),
}

/// Specialized Result type for pgadapt operations
pub type Result<T> = std::result::Result<T, PgAdaptError>;

/// Specialized Result type for config operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized Result type for database operations
pub type DbResult<T> = std::result::Result<T, DbError>;

/// Specialized Result type for adapter operations
pub type AdapterResult<T> = std::result::Result<T, AdapterError>;
