//! Provider registry
//!
//! Static, read-only metadata for each supported hosting provider. The
//! connection-string builder reads `connection_params` from here.

use crate::config::database::{DatabaseConfig, Provider};
use serde::{Serialize, Serializer};
use std::fmt;

/// Registry entry describing what a provider offers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderConfig {
    pub name: &'static str,
    pub description: &'static str,
    pub features: &'static [&'static str],
    /// Query parameters the connection-string builder adds when absent
    pub connection_params: &'static [ConnectionParam],
    pub migration_support: bool,
    pub pooling_support: bool,
}

/// One default query parameter of a provider's connection string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConnectionParam {
    pub key: &'static str,
    pub value: ParamValue,
    /// Skipped when the config has pooling turned off
    pub pooled_only: bool,
}

impl ConnectionParam {
    const fn always(key: &'static str, value: ParamValue) -> Self {
        Self {
            key,
            value,
            pooled_only: false,
        }
    }

    const fn pooled(key: &'static str, value: ParamValue) -> Self {
        Self {
            key,
            value,
            pooled_only: true,
        }
    }

    /// Whether the builder should add this parameter for `config`
    pub fn applies_to(&self, config: &DatabaseConfig) -> bool {
        !self.pooled_only || config.pooling()
    }
}

/// Where a connection parameter's value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamValue {
    Fixed(&'static str),
    /// `require` with SSL on, `disable` with it off
    SslMode,
    /// The config's `max_connections`
    MaxConnections,
}

impl ParamValue {
    pub fn resolve(&self, config: &DatabaseConfig) -> String {
        match self {
            ParamValue::Fixed(v) => (*v).to_string(),
            ParamValue::SslMode => String::from(if config.ssl() { "require" } else { "disable" }),
            ParamValue::MaxConnections => config.max_connections().to_string(),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Fixed(v) => f.write_str(v),
            ParamValue::SslMode => f.write_str("require|disable"),
            ParamValue::MaxConnections => f.write_str("<max_connections>"),
        }
    }
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

const POOLED_PARAMS: &[ConnectionParam] = &[
    ConnectionParam::pooled("pgbouncer", ParamValue::Fixed("true")),
    ConnectionParam::always("sslmode", ParamValue::SslMode),
    ConnectionParam::pooled("connection_limit", ParamValue::MaxConnections),
];

static SUPABASE: ProviderConfig = ProviderConfig {
    name: "Supabase",
    description: "Hosted Postgres with PgBouncer pooling, auth, storage and realtime",
    features: &[
        "Connection Pooling (PgBouncer)",
        "Row Level Security",
        "Real-time Subscriptions",
        "Built-in Authentication",
        "File Storage",
        "Edge Functions",
        "Automatic Backups",
        "Point-in-Time Recovery",
    ],
    connection_params: POOLED_PARAMS,
    migration_support: true,
    pooling_support: true,
};

static VERCEL: ProviderConfig = ProviderConfig {
    name: "Vercel Postgres",
    description: "Serverless Postgres tuned for short-lived edge and lambda workloads",
    features: &[
        "Connection Pooling",
        "Serverless Optimized",
        "Edge Network",
        "Automatic Scaling",
        "Automatic Backups",
    ],
    connection_params: POOLED_PARAMS,
    migration_support: true,
    pooling_support: true,
};

static LOCAL: ProviderConfig = ProviderConfig {
    name: "Local PostgreSQL",
    description: "Self-managed Postgres for development and testing",
    features: &[
        "Full PostgreSQL Feature Set",
        "No Network Latency",
        "Offline Development",
        "Complete Administrative Control",
    ],
    connection_params: &[
        ConnectionParam::always("sslmode", ParamValue::SslMode),
        ConnectionParam::always("connection_limit", ParamValue::MaxConnections),
    ],
    migration_support: true,
    pooling_support: false,
};

/// Look up the registry entry for a provider
pub fn get_provider_config(provider: Provider) -> &'static ProviderConfig {
    match provider {
        Provider::Supabase => &SUPABASE,
        Provider::Vercel => &VERCEL,
        Provider::Local => &LOCAL,
    }
}

/// All registry entries in declaration order
pub fn all_providers() -> impl Iterator<Item = (Provider, &'static ProviderConfig)> {
    Provider::ALL
        .into_iter()
        .map(|p| (p, get_provider_config(p)))
}
