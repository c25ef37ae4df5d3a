//! SQL client trait
//!
//! The narrow surface adapters need from a database client. Keeping it
//! this small allows:
//! - Sharing one connection across every adapter via `Arc<dyn SqlClient>`
//! - Easy testing with fake implementations
//! - Swapping the driver without touching adapter logic

use crate::error::DbResult;
use async_trait::async_trait;

/// Minimal client capability set used by adapters
#[async_trait]
pub trait SqlClient: Send + Sync {
    /// Establish the connection
    ///
    /// Calling this on an already connected client is a no-op.
    ///
    /// # Errors
    /// Returns `DbError::ConnectionFailed` if the connection cannot be established
    async fn connect(&self) -> DbResult<()>;

    /// Close the connection
    async fn disconnect(&self) -> DbResult<()>;

    /// Check if the connection is open
    ///
    /// Does not touch the network.
    async fn is_connected(&self) -> bool;

    /// Execute a statement that returns no rows
    ///
    /// # Errors
    /// Returns `DbError::NotConnected` before `connect`, or
    /// `DbError::QueryFailed` if the server rejects the statement
    async fn execute(&self, sql: &str) -> DbResult<()>;

    /// Run a query and return the first column of each row as text
    ///
    /// # Errors
    /// Same as [`SqlClient::execute`]
    async fn query_text(&self, sql: &str) -> DbResult<Vec<Option<String>>>;
}
