//! Query execution inside a dialect-correct envelope.
//!
//! Caller SQL is never edited in place. It is trimmed, stripped of one
//! trailing `;`, and wrapped as a derived table so filters and a row limit
//! can be applied without parsing it.

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::DataSourceConnection;
use crate::connector::{ConnectionError, Connector, QueryError};
use crate::data::ResultSet;
use crate::sql::dialect::{Dialect, SqlDialect};
use crate::sql::filter::{build_conditions, Filter};

/// Errors from [`QueryExecutor::execute`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecuteError {
    /// The connection could not be opened.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// The statement failed on an open connection.
    #[error(transparent)]
    Query(#[from] QueryError),
}

/// Trim and drop one trailing statement terminator.
pub fn normalize_sql(sql: &str) -> &str {
    let trimmed = sql.trim();
    trimmed.strip_suffix(';').map(str::trim_end).unwrap_or(trimmed)
}

/// Build the envelope SQL for `dialect` without executing it.
///
/// A limit of 0 means no limit.
pub fn wrap_query(dialect: Dialect, sql: &str, limit: Option<u64>, filters: &[Filter]) -> String {
    let conditions = build_conditions(filters, &dialect);
    let limit = limit.filter(|n| *n > 0);
    dialect.wrap_query(normalize_sql(sql), &conditions, limit)
}

/// Runs caller SQL against a data source through a [`Connector`].
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    connector: Connector,
}

impl QueryExecutor {
    pub fn new(connector: Connector) -> Self {
        Self { connector }
    }

    pub fn connector(&self) -> &Connector {
        &self.connector
    }

    /// Wrap `sql`, run it, and return every row.
    ///
    /// The connection is closed on every path once it has been opened.
    pub async fn execute(
        &self,
        conn: &DataSourceConnection,
        sql: &str,
        limit: Option<u64>,
        filters: &[Filter],
    ) -> Result<ResultSet, ExecuteError> {
        let final_sql = wrap_query(conn.dialect, sql, limit, filters);
        debug!(dialect = %conn.dialect, sql = %final_sql, "executing wrapped query");

        let mut connection = self.connector.connect(conn).await?;
        let result = connection.query(&final_sql).await;

        if let Err(e) = connection.close().await {
            warn!(target = %conn.display_target(), error = %e, "failed to close connection");
        }

        let rows = result?;
        debug!(columns = rows.columns.len(), rows = rows.len(), "query returned");
        Ok(rows)
    }
}
