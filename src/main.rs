//! pgadapt - provider-aware PostgreSQL configuration and adapter CLI
//!
//! This is the main entry point for the pgadapt binary.
//! The actual logic is in the library modules for better testability.

use anyhow::Result;
use clap::Parser;
use pgadapt::commands::{Cli, handlers};
use pgadapt::config::settings::load_settings;
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let (settings, settings_err) = match load_settings() {
        Ok(s) => (s, None),
        Err(e) => (Default::default(), Some(e)),
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_level(true)
                .with_target(false),
        )
        .init();

    if let Some(e) = settings_err {
        warn!(error = %e, "ignoring unreadable settings file, using defaults");
    }

    let ok = handlers::run(cli, &settings).await?;
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
