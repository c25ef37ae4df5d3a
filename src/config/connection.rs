//! Connection-string building
//!
//! Rewrites a base `postgres://` URL so it carries the query parameters the
//! provider's registry entry lists (`pgbouncer`, `sslmode`,
//! `connection_limit`). The URL is parsed and its query merged key by key,
//! so a parameter that is already present keeps its value and no key is
//! ever duplicated. Running the builder on its own output returns the same
//! string.
//!
//! Existing query segments are kept byte for byte. Re-serializing them as
//! form data would turn `%20` into `+`, which the driver doesn't decode
//! back to a space.
//!
//! One exception to "explicit wins": Supabase pooler hosts
//! (`*.pooler.supabase.com`) are transaction-mode PgBouncer, so the
//! result always carries `pgbouncer=true` there, even if the input said
//! otherwise.

use crate::config::database::{DatabaseConfig, Provider};
use crate::config::providers::get_provider_config;
use crate::error::{ConfigError, ConfigResult};
use url::Url;

const SUPABASE_POOLER_HOST: &str = "pooler.supabase.com";

/// Parameters understood by the ORM layer but rejected by the Postgres driver
const ORM_ONLY_PARAMS: &[&str] = &["pgbouncer", "connection_limit", "pool_timeout", "schema"];

/// Build the connection string for the configured URL
pub fn get_connection_string(config: &DatabaseConfig) -> ConfigResult<String> {
    optimize_connection_string(config.url(), config)
}

/// Merge provider parameters into `base_url`
pub fn optimize_connection_string(base_url: &str, config: &DatabaseConfig) -> ConfigResult<String> {
    let mut url = parse_postgres_url(base_url)?;
    let original = QueryParams::of(&url);
    let mut params = original.clone();

    if is_supabase_pooler(config.provider(), &url) {
        params.set("pgbouncer", "true");
    }
    for param in get_provider_config(config.provider()).connection_params {
        if param.applies_to(config) {
            params.add(param.key, &param.value.resolve(config));
        }
    }

    if params != original {
        params.write_to(&mut url);
    }
    Ok(url.to_string())
}

/// URL to run migrations against
///
/// Prefers `DIRECT_URL`; otherwise the pooled URL with `pgbouncer` removed,
/// since DDL through a transaction pooler is unreliable.
pub fn migration_url(config: &DatabaseConfig) -> ConfigResult<String> {
    match config.direct_url() {
        Some(direct) => Ok(direct.to_string()),
        None => strip_params(config.url(), &["pgbouncer"]),
    }
}

/// Strip parameters the Postgres driver doesn't understand
pub fn driver_url(url: &str) -> ConfigResult<String> {
    strip_params(url, ORM_ONLY_PARAMS)
}

/// Replace the password in a URL with `****` for display
pub fn redact_url(url: &str) -> String {
    match Url::parse(url.trim()) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("****"));
            }
            parsed.to_string()
        }
        Err(_) => match url.split_once("://") {
            Some((scheme, rest)) => match rest.rsplit_once('@') {
                Some((_, host)) => format!("{}://****@{}", scheme, host),
                None => url.to_string(),
            },
            None => url.to_string(),
        },
    }
}

fn parse_postgres_url(raw: &str) -> ConfigResult<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidUrl(format!("{} ({})", redact_url(raw), e)))?;
    match url.scheme() {
        "postgres" | "postgresql" => Ok(url),
        other => Err(ConfigError::InvalidUrl(format!(
            "unsupported scheme '{}', expected postgres:// or postgresql://",
            other
        ))),
    }
}

fn is_supabase_pooler(provider: Provider, url: &Url) -> bool {
    provider == Provider::Supabase
        && url
            .host_str()
            .is_some_and(|host| host.contains(SUPABASE_POOLER_HOST))
}

fn strip_params(raw: &str, keys: &[&str]) -> ConfigResult<String> {
    let mut url = parse_postgres_url(raw)?;
    let original = QueryParams::of(&url);
    let mut params = original.clone();
    params.remove(keys);

    if params != original {
        params.write_to(&mut url);
    }
    Ok(url.to_string())
}

/// Raw `key=value` segments of a URL query, in order and as written
#[derive(Debug, Clone, PartialEq, Eq)]
struct QueryParams(Vec<String>);

impl QueryParams {
    fn of(url: &Url) -> Self {
        let segments = url
            .query()
            .map(|q| {
                q.split('&')
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        Self(segments)
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.0.iter().position(|segment| segment_key(segment) == key)
    }

    /// Add `key=value` unless `key` is already present
    fn add(&mut self, key: &str, value: &str) {
        if self.position(key).is_none() {
            self.0.push(format!("{}={}", key, value));
        }
    }

    /// Force `key=value`, replacing an existing value in place
    fn set(&mut self, key: &str, value: &str) {
        let segment = format!("{}={}", key, value);
        match self.position(key) {
            Some(i) => self.0[i] = segment,
            None => self.0.push(segment),
        }
    }

    fn remove(&mut self, keys: &[&str]) {
        self.0.retain(|segment| !keys.contains(&segment_key(segment)));
    }

    fn write_to(&self, url: &mut Url) {
        if self.0.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&self.0.join("&")));
        }
    }
}

fn segment_key(segment: &str) -> &str {
    segment.split_once('=').map_or(segment, |(key, _)| key)
}
