//! Configuration management
//!
//! Environment-driven database configuration, the provider registry,
//! connection-string building and CLI settings.

pub mod connection;
pub mod database;
pub mod providers;
pub mod settings;

pub use connection::{get_connection_string, optimize_connection_string, redact_url};
pub use database::{DatabaseConfig, Provider, get_database_config, validate_database_config};
pub use providers::{
    ConnectionParam, ParamValue, ProviderConfig, all_providers, get_provider_config,
};
pub use settings::{OutputFormat, Settings};
