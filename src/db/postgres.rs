//! PostgreSQL client
//!
//! Concrete [`SqlClient`] using tokio-postgres.

use crate::config::connection::driver_url;
use crate::db::SqlClient;
use crate::error::{DbError, DbResult};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio_postgres::{Client, SimpleQueryMessage};
use tracing::{debug, info, warn};
use url::Url;

/// PostgreSQL client shared by adapters
pub struct PostgresClient {
    /// Connection string as built for the provider
    url: String,
    /// Whether to negotiate TLS when the URL doesn't say
    ssl: bool,
    /// Live driver handle, `None` until connected
    client: RwLock<Option<Client>>,
}

impl PostgresClient {
    /// Create an unconnected client for `url`
    ///
    /// Nothing is parsed until [`SqlClient::connect`], so a client can be
    /// built for a config that is only being validated.
    pub fn new(url: &str, ssl: bool) -> Self {
        Self {
            url: url.to_string(),
            ssl,
            client: RwLock::new(None),
        }
    }

    async fn open(&self) -> DbResult<Client> {
        let url = driver_url(&self.url).map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
        let client = if wants_tls(&url, self.ssl) {
            let tls = tokio_postgres_rustls::MakeRustlsConnect::new(make_tls_config());
            let (client, connection) = tokio_postgres::connect(&url, tls)
                .await
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
            tokio::spawn(async move {
                if let Err(e) = connection.await {
                    warn!(error = %e, "postgres connection lost");
                }
            });
            info!(tls = true, "connected to postgres");
            client
        } else {
            let (client, connection) = tokio_postgres::connect(&url, tokio_postgres::NoTls)
                .await
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
            tokio::spawn(async move {
                if let Err(e) = connection.await {
                    warn!(error = %e, "postgres connection lost");
                }
            });
            info!(tls = false, "connected to postgres");
            client
        };
        Ok(client)
    }
}

/// TLS follows an explicit `sslmode` in the URL, otherwise the ssl flag
fn wants_tls(url: &str, ssl: bool) -> bool {
    let sslmode = Url::parse(url).ok().and_then(|u| {
        u.query_pairs()
            .find(|(k, _)| k == "sslmode")
            .map(|(_, v)| v.into_owned())
    });
    match sslmode.as_deref() {
        Some("disable") => false,
        Some("require" | "verify-ca" | "verify-full") => true,
        _ => ssl,
    }
}

#[async_trait]
impl SqlClient for PostgresClient {
    async fn connect(&self) -> DbResult<()> {
        let mut guard = self.client.write().await;
        if guard.as_ref().is_some_and(|c| !c.is_closed()) {
            return Ok(());
        }
        *guard = Some(self.open().await?);
        Ok(())
    }

    async fn disconnect(&self) -> DbResult<()> {
        // Dropping the client closes the connection task
        if self.client.write().await.take().is_some() {
            info!("disconnected from postgres");
        }
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.client
            .read()
            .await
            .as_ref()
            .is_some_and(|c| !c.is_closed())
    }

    async fn execute(&self, sql: &str) -> DbResult<()> {
        let guard = self.client.read().await;
        let client = guard.as_ref().ok_or(DbError::NotConnected)?;
        debug!(sql, "execute");
        client
            .batch_execute(sql)
            .await
            .map_err(|e| DbError::QueryFailed(describe(&e)))
    }

    async fn query_text(&self, sql: &str) -> DbResult<Vec<Option<String>>> {
        let guard = self.client.read().await;
        let client = guard.as_ref().ok_or(DbError::NotConnected)?;
        debug!(sql, "query");
        let messages = client
            .simple_query(sql)
            .await
            .map_err(|e| DbError::QueryFailed(describe(&e)))?;

        Ok(messages
            .iter()
            .filter_map(|m| match m {
                SimpleQueryMessage::Row(row) => Some(row.get(0).map(String::from)),
                _ => None,
            })
            .collect())
    }
}

/// Prefer the server's message over the driver's generic "db error"
fn describe(e: &tokio_postgres::Error) -> String {
    match e.as_db_error() {
        Some(db) => db.message().to_string(),
        None => e.to_string(),
    }
}

/// Build a rustls ClientConfig that trusts OS certificates (with Mozilla roots as fallback)
fn make_tls_config() -> rustls::ClientConfig {
    let mut root_store = rustls::RootCertStore::empty();

    let native_certs = rustls_native_certs::load_native_certs();
    let mut loaded = 0;
    for cert in native_certs.certs {
        if root_store.add(cert).is_ok() {
            loaded += 1;
        }
    }
    if loaded == 0 {
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    }

    rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth()
}
