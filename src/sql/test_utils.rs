//! Test utilities for generated SQL validation.
//!
//! Provides helpers for checking that wrapped queries are syntactically
//! correct using sqlparser-rs.

use sqlparser::dialect::{GenericDialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;

use super::dialect::Dialect;

/// Validates that a SQL string is syntactically valid for the given dialect.
pub fn validate_sql(sql: &str, dialect: Dialect) -> Result<(), String> {
    let parser_dialect: Box<dyn sqlparser::dialect::Dialect> = match dialect {
        Dialect::Postgres => Box::new(PostgreSqlDialect {}),
        Dialect::MySql => Box::new(MySqlDialect {}),
        Dialect::TSql => Box::new(MsSqlDialect {}),
        Dialect::Oracle => Box::new(GenericDialect {}), // sqlparser has no Oracle dialect
    };

    Parser::parse_sql(&*parser_dialect, sql)
        .map(|_| ())
        .map_err(|e| format!("Invalid SQL for {:?}: {}\nSQL: {}", dialect, e, sql))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::dialect::SqlDialect;
    use crate::sql::filter::{build_conditions, Filter, FilterOp};

    #[test]
    fn test_validate_invalid_sql() {
        let result = validate_sql("SELEC * FORM users", Dialect::Postgres);
        assert!(result.is_err());
    }

    #[test]
    fn test_every_envelope_parses() {
        let filters = vec![
            Filter::new("region", FilterOp::Eq, "East"),
            Filter::new("amount", FilterOp::Gt, 10),
            Filter::new("name", FilterOp::Contains, "co"),
            Filter::new("closed_at", FilterOp::IsNull, serde_json::Value::Null),
        ];
        for dialect in Dialect::ALL {
            let conditions = build_conditions(&filters, &dialect);
            for limit in [None, Some(50)] {
                let sql = dialect.wrap_query("SELECT region, amount, name, closed_at FROM orders", &conditions, limit);
                validate_sql(&sql, dialect).unwrap();
            }
        }
    }
}
