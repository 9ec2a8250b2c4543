//! SQL dialect definitions for the four supported backends.
//!
//! Each dialect implements `SqlDialect` to describe how caller SQL is wrapped
//! and how a connection target is addressed:
//!
//! - Row limiting: `TOP n` (SQL Server), `ROWNUM <= n` (Oracle), `LIMIT n` (MySQL, PostgreSQL)
//! - Derived-table aliasing: `AS _wrapper_` everywhere except Oracle, which rejects `AS` on tables
//! - Connection targets: ODBC string (SQL Server), URLs (MySQL, PostgreSQL), EZConnect DSN (Oracle)
//! - Liveness probe: `SELECT 1`, or `SELECT 1 FROM DUAL` on Oracle
//!
//! # Usage
//!
//! ```ignore
//! use reportflow::sql::dialect::{Dialect, SqlDialect};
//!
//! let dialect: Dialect = "postgresql".parse()?;
//! let sql = dialect.wrap_query("SELECT * FROM sales", &[], Some(10));
//! assert_eq!(sql, "SELECT * FROM (SELECT * FROM sales) AS _wrapper_ LIMIT 10");
//! ```

pub mod helpers;
mod mysql;
mod oracle;
mod postgres;
mod tsql;

pub use mysql::MySql;
pub use oracle::Oracle;
pub use postgres::Postgres;
pub use tsql::TSql;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::DataSourceConnection;

/// Alias given to the caller's query when it is wrapped as a derived table.
pub const WRAPPER_ALIAS: &str = "_wrapper_";

/// SQL dialect trait - defines how a backend is addressed and how caller
/// SQL is wrapped in a filter/limit envelope.
pub trait SqlDialect: std::fmt::Debug + Send + Sync {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    /// Driver identifier understood by the database worker.
    fn driver_name(&self) -> &'static str;

    /// Default TCP port of the backend.
    fn default_port(&self) -> u16;

    // =========================================================================
    // Connection
    // =========================================================================

    /// Build the driver-specific connection target for a data source.
    fn connection_string(&self, conn: &DataSourceConnection) -> String;

    /// Statement used to check that a connection is usable.
    fn probe_query(&self) -> &'static str {
        "SELECT 1"
    }

    // =========================================================================
    // Literals
    // =========================================================================

    /// Quote a string literal.
    ///
    /// All dialects use single quotes with `''` for escaping.
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    // =========================================================================
    // Envelope
    // =========================================================================

    /// Wrap `sql` as a derived table, applying `conditions` (already rendered,
    /// joined with `AND`) and an optional row limit.
    fn wrap_query(&self, sql: &str, conditions: &[String], limit: Option<u64>) -> String;
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Dialect {
    #[default]
    TSql,
    MySql,
    Postgres,
    Oracle,
}

impl Dialect {
    /// Every supported dialect, in declaration order.
    pub const ALL: [Dialect; 4] = [Dialect::TSql, Dialect::MySql, Dialect::Postgres, Dialect::Oracle];

    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::TSql => &TSql,
            Dialect::MySql => &MySql,
            Dialect::Postgres => &Postgres,
            Dialect::Oracle => &Oracle,
        }
    }

    /// Canonical data-source tag (`mssql`, `mysql`, `postgresql`, `oracle`).
    pub fn tag(&self) -> &'static str {
        match self {
            Dialect::TSql => "mssql",
            Dialect::MySql => "mysql",
            Dialect::Postgres => "postgresql",
            Dialect::Oracle => "oracle",
        }
    }
}

/// Raised when a data-source tag names no supported dialect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported database type: {0}. Supported: mssql, mysql, postgresql, oracle")]
pub struct UnsupportedDialect(pub String);

impl FromStr for Dialect {
    type Err = UnsupportedDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mssql" | "sqlserver" | "sql_server" | "tsql" => Ok(Dialect::TSql),
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "postgresql" | "postgres" | "pg" => Ok(Dialect::Postgres),
            "oracle" => Ok(Dialect::Oracle),
            other => Err(UnsupportedDialect(other.to_string())),
        }
    }
}

impl TryFrom<String> for Dialect {
    type Error = UnsupportedDialect;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Dialect> for String {
    fn from(dialect: Dialect) -> Self {
        dialect.tag().to_string()
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn driver_name(&self) -> &'static str {
        self.dialect().driver_name()
    }

    fn default_port(&self) -> u16 {
        self.dialect().default_port()
    }

    fn connection_string(&self, conn: &DataSourceConnection) -> String {
        self.dialect().connection_string(conn)
    }

    fn probe_query(&self) -> &'static str {
        self.dialect().probe_query()
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn wrap_query(&self, sql: &str, conditions: &[String], limit: Option<u64>) -> String {
        self.dialect().wrap_query(sql, conditions, limit)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}
