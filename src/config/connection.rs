//! Data source connection configuration.
//!
//! Supports configuration via environment variables:
//! - `REPORTFLOW_DB_TYPE`: Database type (mssql, mysql, postgresql, oracle)
//! - `REPORTFLOW_DB_HOST`: Database server hostname
//! - `REPORTFLOW_DB_NAME`: Database (or Oracle service) name
//! - `REPORTFLOW_DB_PORT`: Port (optional, uses dialect default)
//! - `REPORTFLOW_DB_USER` / `REPORTFLOW_DB_PASSWORD`: Credentials (optional)

use std::env;

use serde::{Deserialize, Serialize};

use crate::sql::dialect::{Dialect, SqlDialect, UnsupportedDialect};

/// Error type for connection configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error(transparent)]
    UnsupportedDialect(#[from] UnsupportedDialect),

    #[error("Invalid port: {0}")]
    InvalidPort(String),
}

/// Where and how to reach one relational database.
///
/// Long-lived and externally managed; the pipeline only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceConnection {
    /// Backend dialect (`db_type` in stored data source records).
    #[serde(alias = "db_type", alias = "driver")]
    pub dialect: Dialect,
    /// Server hostname.
    pub host: String,
    /// Port (dialect default when absent).
    #[serde(default)]
    pub port: Option<u16>,
    /// Database name; the service name for Oracle.
    #[serde(default, alias = "database_name")]
    pub database: String,
    /// Login name.
    #[serde(default, alias = "user")]
    pub username: String,
    /// Login secret.
    #[serde(default)]
    pub password: String,
}

impl DataSourceConnection {
    /// Create a connection without credentials.
    pub fn new(dialect: Dialect, host: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            dialect,
            host: host.into(),
            port: None,
            database: database.into(),
            username: String::new(),
            password: String::new(),
        }
    }

    /// Set login credentials.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Set an explicit port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// The configured port, or the dialect default.
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.dialect.default_port())
    }

    /// Driver-specific connection target for the database worker.
    pub fn connection_string(&self) -> String {
        self.dialect.connection_string(self)
    }

    /// Driver name for the worker.
    pub fn driver_name(&self) -> &'static str {
        self.dialect.driver_name()
    }

    /// `host:port/database` without credentials, for logs and error messages.
    pub fn display_target(&self) -> String {
        format!("{}:{}/{}", self.host, self.effective_port(), self.database)
    }

    /// Load configuration from environment variables.
    ///
    /// Required: `REPORTFLOW_DB_TYPE`, `REPORTFLOW_DB_HOST`, `REPORTFLOW_DB_NAME`.
    /// Optional: `REPORTFLOW_DB_PORT`, `REPORTFLOW_DB_USER`, `REPORTFLOW_DB_PASSWORD`.
    pub fn from_env() -> Result<Self, ConnectionConfigError> {
        let dialect: Dialect = required_var("REPORTFLOW_DB_TYPE")?.parse()?;
        let host = required_var("REPORTFLOW_DB_HOST")?;
        let database = required_var("REPORTFLOW_DB_NAME")?;

        let port = match env::var("REPORTFLOW_DB_PORT") {
            Ok(p) => Some(
                p.trim()
                    .parse()
                    .map_err(|_| ConnectionConfigError::InvalidPort(p.clone()))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            dialect,
            host,
            port,
            database,
            username: env::var("REPORTFLOW_DB_USER").unwrap_or_default(),
            password: env::var("REPORTFLOW_DB_PASSWORD").unwrap_or_default(),
        })
    }
}

fn required_var(name: &str) -> Result<String, ConnectionConfigError> {
    env::var(name).map_err(|_| ConnectionConfigError::MissingEnvVar(name.to_string()))
}
