//! Database configuration
//!
//! Resolves the process-wide [`DatabaseConfig`] from environment variables:
//!
//! - `DATABASE_PROVIDER`: `supabase` (default), `vercel` or `local`
//! - `DATABASE_URL`: required Postgres connection string
//! - `DIRECT_URL`: optional non-pooled URL used for migrations
//!
//! Provider defaults for pooling, SSL and connection count can be
//! overridden with `DATABASE_POOLING`, `DATABASE_SSL` and
//! `DATABASE_MAX_CONNECTIONS`.

use crate::db::types::ValidationResult;
use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const ENV_PROVIDER: &str = "DATABASE_PROVIDER";
pub const ENV_URL: &str = "DATABASE_URL";
pub const ENV_DIRECT_URL: &str = "DIRECT_URL";
pub const ENV_POOLING: &str = "DATABASE_POOLING";
pub const ENV_SSL: &str = "DATABASE_SSL";
pub const ENV_MAX_CONNECTIONS: &str = "DATABASE_MAX_CONNECTIONS";

/// Substrings that mark a URL copied from a template and never filled in
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "username:password@localhost",
    "[password]",
    "[host]",
    "[project-ref]",
];

/// Postgres hosting strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Supabase,
    Vercel,
    Local,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Supabase, Provider::Vercel, Provider::Local];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Supabase => "supabase",
            Provider::Vercel => "vercel",
            Provider::Local => "local",
        }
    }

    /// Pooling, SSL and connection-count defaults for this provider
    fn defaults(&self) -> (bool, bool, u32) {
        match self {
            Provider::Supabase => (true, true, 20),
            Provider::Vercel => (true, true, 10),
            Provider::Local => (false, false, 5),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "supabase" => Ok(Provider::Supabase),
            "vercel" => Ok(Provider::Vercel),
            "local" => Ok(Provider::Local),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

/// Resolved database configuration
///
/// Built once at startup and shared read-only by every adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseConfig {
    provider: Provider,
    url: String,
    direct_url: Option<String>,
    pooling: bool,
    ssl: bool,
    max_connections: u32,
}

impl DatabaseConfig {
    /// Build a config for `provider` using that provider's defaults
    pub fn new(provider: Provider, url: impl Into<String>) -> Self {
        let (pooling, ssl, max_connections) = provider.defaults();
        Self {
            provider,
            url: url.into(),
            direct_url: None,
            pooling,
            ssl,
            max_connections,
        }
    }

    /// Resolve from the process environment
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve using an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let provider = match get(ENV_PROVIDER) {
            Some(name) => name.parse()?,
            None => Provider::default(),
        };
        let url = get(ENV_URL).ok_or(ConfigError::MissingVar(ENV_URL))?;

        let mut config = Self::new(provider, url);
        config.direct_url = get(ENV_DIRECT_URL);

        if let Some(v) = get(ENV_POOLING) {
            config.pooling = parse_bool(ENV_POOLING, &v)?;
        }
        if let Some(v) = get(ENV_SSL) {
            config.ssl = parse_bool(ENV_SSL, &v)?;
        }
        if let Some(v) = get(ENV_MAX_CONNECTIONS) {
            config.max_connections = v
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidValue {
                    var: ENV_MAX_CONNECTIONS,
                    value: v,
                })?;
        }

        Ok(config)
    }

    pub fn with_direct_url(mut self, direct_url: impl Into<String>) -> Self {
        self.direct_url = Some(direct_url.into());
        self
    }

    pub fn with_pooling(mut self, pooling: bool) -> Self {
        self.pooling = pooling;
        self
    }

    pub fn with_ssl(mut self, ssl: bool) -> Self {
        self.ssl = ssl;
        self
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn direct_url(&self) -> Option<&str> {
        self.direct_url.as_deref()
    }

    pub fn pooling(&self) -> bool {
        self.pooling
    }

    pub fn ssl(&self) -> bool {
        self.ssl
    }

    pub fn max_connections(&self) -> u32 {
        self.max_connections
    }
}

/// Resolve the database configuration from the environment
pub fn get_database_config() -> ConfigResult<DatabaseConfig> {
    DatabaseConfig::from_env()
}

/// Structural check of a resolved config, independent of provider rules
pub fn validate_database_config(config: &DatabaseConfig) -> ValidationResult {
    let mut result = ValidationResult::new();

    check_url(&mut result, ENV_URL, config.url());
    if let Some(direct) = config.direct_url() {
        check_url(&mut result, ENV_DIRECT_URL, direct);
    }

    if config.max_connections() == 0 {
        result.error("max_connections must be at least 1");
    }

    result
}

/// True when `url` is `postgres://` or `postgresql://` followed by something
pub fn is_postgres_url(url: &str) -> bool {
    url.strip_prefix("postgresql://")
        .or_else(|| url.strip_prefix("postgres://"))
        .is_some_and(|rest| !rest.is_empty())
}

fn check_url(result: &mut ValidationResult, var: &str, url: &str) {
    if url.trim().is_empty() {
        result.error(format!("{} is empty", var));
        return;
    }
    if !is_postgres_url(url) {
        result.error(format!(
            "{} must be a PostgreSQL connection string (postgres:// or postgresql://)",
            var
        ));
        return;
    }
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| url.contains(*p)) {
        result.warn(format!(
            "{} looks like a template placeholder ({}); replace it with real credentials",
            var, pattern
        ));
    }
}

fn parse_bool(var: &'static str, value: &str) -> ConfigResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: value.to_string(),
        }),
    }
}
