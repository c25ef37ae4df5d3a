//! Command-line interface
//!
//! Parses arguments into a [`Cli`]; [`handlers`] executes the subcommands.

pub mod handlers;

use crate::config::Provider;
use clap::{Parser, Subcommand};

/// Inspect, validate and initialize the configured Postgres provider
#[derive(Debug, Parser)]
#[command(name = "pgadapt", version, about)]
pub struct Cli {
    /// Print reports as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use this provider instead of DATABASE_PROVIDER
    #[arg(long, global = true, value_name = "NAME")]
    pub provider: Option<Provider>,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Show the resolved configuration and connection string
    Config,

    /// List supported providers
    Providers,

    /// Check the configuration without connecting
    Validate,

    /// Connect and run a health check
    Health,

    /// Connect, validate, migrate and optimize
    Init,

    /// Show health, validation and server statistics
    Status,

    /// Re-apply provider tuning
    Maintain,

    /// Compare the features of two providers
    Compare {
        /// Provider you're moving from
        from: Provider,
        /// Provider you're moving to
        to: Provider,
    },
}
