//! PostgreSQL dialect.

use super::helpers;
use super::SqlDialect;
use crate::config::DataSourceConnection;

/// PostgreSQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn driver_name(&self) -> &'static str {
        "postgres"
    }

    fn default_port(&self) -> u16 {
        5432
    }

    fn connection_string(&self, conn: &DataSourceConnection) -> String {
        helpers::url_target("postgres", conn, self.default_port())
    }

    fn wrap_query(&self, sql: &str, conditions: &[String], limit: Option<u64>) -> String {
        helpers::wrap_limit(sql, conditions, limit)
    }
}
