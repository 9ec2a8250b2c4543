//! Oracle dialect.
//!
//! Oracle differences from ANSI:
//! - No `LIMIT` before 12c; rows are capped with the `ROWNUM` pseudo-column
//! - `AS` is not allowed when aliasing a derived table, so the envelope is unaliased
//! - `SELECT` requires a `FROM`, so the liveness probe reads `DUAL`
//! - Connections use an EZConnect DSN (`host:port/service`)

use super::helpers;
use super::SqlDialect;
use crate::config::DataSourceConnection;

/// Oracle dialect.
#[derive(Debug, Clone, Copy)]
pub struct Oracle;

impl SqlDialect for Oracle {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn driver_name(&self) -> &'static str {
        "oracle"
    }

    fn default_port(&self) -> u16 {
        1521
    }

    fn connection_string(&self, conn: &DataSourceConnection) -> String {
        helpers::ezconnect_target(conn, self.default_port())
    }

    fn probe_query(&self) -> &'static str {
        "SELECT 1 FROM DUAL"
    }

    fn wrap_query(&self, sql: &str, conditions: &[String], limit: Option<u64>) -> String {
        helpers::wrap_rownum(sql, conditions, limit)
    }
}
