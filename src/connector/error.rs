//! Connection and query error types.

use thiserror::Error;

/// Result type for connection operations.
pub type ConnectionResult<T> = Result<T, ConnectionError>;

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors raised while opening or closing a connection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// The driver has no support for this backend.
    #[error("database driver not available: {0}")]
    DriverNotFound(String),

    /// The backend refused or could not be reached.
    #[error("failed to connect to {target}: {message}")]
    Refused {
        /// `host:port/database`, without credentials.
        target: String,
        message: String,
    },

    /// The driver transport failed.
    #[error("driver error: {0}")]
    Driver(String),

    /// Releasing the connection failed.
    #[error("failed to close connection: {0}")]
    Close(String),
}

impl ConnectionError {
    pub fn refused(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Refused {
            target: target.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while executing a statement on an open connection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The backend rejected the statement (syntax, permissions, missing objects).
    #[error("{0}")]
    Rejected(String),

    /// The driver transport failed mid-query.
    #[error("driver error: {0}")]
    Driver(String),

    /// The driver returned rows that do not match the column list.
    #[error("malformed result: {0}")]
    Malformed(String),
}
