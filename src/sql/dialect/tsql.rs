//! T-SQL (SQL Server / Azure SQL) dialect.
//!
//! Differences that matter for report queries:
//! - No `LIMIT`; rows are capped with `SELECT TOP n`
//! - Derived tables require an alias
//! - Connections go through ODBC (`DRIVER={...};SERVER=host,port;...`)

use super::helpers;
use super::SqlDialect;
use crate::config::DataSourceConnection;

/// ODBC driver named in SQL Server connection strings.
pub const ODBC_DRIVER: &str = "ODBC Driver 17 for SQL Server";

/// T-SQL (SQL Server) dialect.
#[derive(Debug, Clone, Copy)]
pub struct TSql;

impl SqlDialect for TSql {
    fn name(&self) -> &'static str {
        "tsql"
    }

    fn driver_name(&self) -> &'static str {
        "mssql"
    }

    fn default_port(&self) -> u16 {
        1433
    }

    fn connection_string(&self, conn: &DataSourceConnection) -> String {
        helpers::odbc_target(ODBC_DRIVER, conn, self.default_port())
    }

    fn wrap_query(&self, sql: &str, conditions: &[String], limit: Option<u64>) -> String {
        helpers::wrap_top(sql, conditions, limit)
    }
}
