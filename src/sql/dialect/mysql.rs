//! MySQL dialect.
//!
//! MySQL differences from ANSI:
//! - `LIMIT n` pagination
//! - Derived tables require an alias
//! - Connections request the `utf8mb4` charset so multi-byte labels survive

use super::helpers;
use super::SqlDialect;
use crate::config::DataSourceConnection;

/// MySQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct MySql;

impl SqlDialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn driver_name(&self) -> &'static str {
        "mysql"
    }

    fn default_port(&self) -> u16 {
        3306
    }

    fn connection_string(&self, conn: &DataSourceConnection) -> String {
        format!(
            "{}?charset=utf8mb4",
            helpers::url_target("mysql", conn, self.default_port())
        )
    }

    fn wrap_query(&self, sql: &str, conditions: &[String], limit: Option<u64>) -> String {
        helpers::wrap_limit(sql, conditions, limit)
    }
}
