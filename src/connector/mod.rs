//! Dialect-aware connection handling.
//!
//! The pipeline never talks to a database directly. A [`Driver`] opens
//! [`Connection`]s for a dialect and connection target; the [`Connector`]
//! builds that target from a [`DataSourceConnection`] and adds the
//! probe-and-close `test_connection` check.
//!
//! The production driver is [`crate::worker::WorkerDriver`], which forwards
//! everything to the database worker process.

mod error;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::DataSourceConnection;
use crate::data::ResultSet;
use crate::sql::dialect::{Dialect, SqlDialect};

pub use error::{ConnectionError, ConnectionResult, QueryError, QueryResult};

/// Message returned by a successful [`Connector::test_connection`].
pub const CONNECTION_OK: &str = "Connection successful";

/// Opens connections for a dialect.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Open a connection to `target` (the dialect's connection string).
    async fn open(&self, dialect: Dialect, target: &str) -> ConnectionResult<Box<dyn Connection>>;
}

/// An open database connection.
#[async_trait]
pub trait Connection: Send {
    /// Execute `sql` and materialize every row.
    async fn query(&mut self, sql: &str) -> QueryResult<ResultSet>;

    /// Release the connection. Must be safe to call once per connection.
    async fn close(&mut self) -> ConnectionResult<()>;
}

/// Opens connections to data sources through a [`Driver`].
#[derive(Clone)]
pub struct Connector {
    driver: Arc<dyn Driver>,
}

impl std::fmt::Debug for Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector").finish_non_exhaustive()
    }
}

impl Connector {
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self { driver }
    }

    /// Open a connection to `conn`.
    pub async fn connect(&self, conn: &DataSourceConnection) -> ConnectionResult<Box<dyn Connection>> {
        debug!(dialect = %conn.dialect, target = %conn.display_target(), "opening connection");
        let target = conn.connection_string();
        self.driver
            .open(conn.dialect, &target)
            .await
            .map_err(|e| match e {
                // Drivers see only the connection string; name the data source instead.
                ConnectionError::Refused { message, .. } => {
                    ConnectionError::refused(conn.display_target(), message)
                }
                other => other,
            })
    }

    /// Connect, run the dialect's probe query, and always close.
    ///
    /// Returns `(true, "Connection successful")` or `(false, <reason>)`.
    pub async fn test_connection(&self, conn: &DataSourceConnection) -> (bool, String) {
        let mut connection = match self.connect(conn).await {
            Ok(c) => c,
            Err(e) => {
                warn!(target = %conn.display_target(), error = %e, "connection test failed");
                return (false, e.to_string());
            }
        };

        let probe = connection.query(conn.dialect.probe_query()).await;
        let closed = connection.close().await;

        match (probe, closed) {
            (Ok(_), Ok(())) => {
                info!(target = %conn.display_target(), "connection test succeeded");
                (true, CONNECTION_OK.to_string())
            }
            (Err(e), _) => (false, e.to_string()),
            (Ok(_), Err(e)) => (false, e.to_string()),
        }
    }
}
