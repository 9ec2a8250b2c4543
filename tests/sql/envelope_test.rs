//! Envelope SQL for every dialect, checked for exact text and for syntax.

use reportflow::execute::wrap_query;
use reportflow::sql::{parse_filters, Dialect, Filter, FilterOp};
use serde_json::{json, Value};
use sqlparser::dialect::{GenericDialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;

const BASE: &str = "SELECT region, amount, name, closed_at FROM orders";

fn assert_parses(sql: &str, dialect: Dialect) {
    let parser_dialect: Box<dyn sqlparser::dialect::Dialect> = match dialect {
        Dialect::Postgres => Box::new(PostgreSqlDialect {}),
        Dialect::MySql => Box::new(MySqlDialect {}),
        Dialect::TSql => Box::new(MsSqlDialect {}),
        Dialect::Oracle => Box::new(GenericDialect {}),
    };
    if let Err(e) = Parser::parse_sql(&*parser_dialect, sql) {
        panic!("invalid SQL for {dialect:?}: {e}\nSQL: {sql}");
    }
}

fn mixed_filters() -> Vec<Filter> {
    vec![
        Filter::new("region", FilterOp::Eq, "East"),
        Filter::new("amount", FilterOp::Gte, "1000"),
        Filter::new("name", FilterOp::StartsWith, "O'Br"),
        Filter::new("closed_at", FilterOp::IsNull, Value::Null),
    ]
}

#[test]
fn test_tsql_envelope() {
    insta::assert_snapshot!(
        wrap_query(Dialect::TSql, BASE, Some(100), &mixed_filters()),
        @"SELECT TOP 100 * FROM (SELECT region, amount, name, closed_at FROM orders) AS _wrapper_ WHERE region = 'East' AND amount >= 1000 AND name LIKE 'O''Br%' AND closed_at IS NULL"
    );
}

#[test]
fn test_mysql_envelope() {
    insta::assert_snapshot!(
        wrap_query(Dialect::MySql, BASE, Some(100), &mixed_filters()),
        @"SELECT * FROM (SELECT region, amount, name, closed_at FROM orders) AS _wrapper_ WHERE region = 'East' AND amount >= 1000 AND name LIKE 'O''Br%' AND closed_at IS NULL LIMIT 100"
    );
}

#[test]
fn test_postgres_envelope_without_limit() {
    insta::assert_snapshot!(
        wrap_query(Dialect::Postgres, &format!("{BASE};"), None, &mixed_filters()[..1]),
        @"SELECT * FROM (SELECT region, amount, name, closed_at FROM orders) AS _wrapper_ WHERE region = 'East'"
    );
}

#[test]
fn test_oracle_envelope() {
    insta::assert_snapshot!(
        wrap_query(Dialect::Oracle, BASE, Some(100), &mixed_filters()),
        @"SELECT * FROM (SELECT region, amount, name, closed_at FROM orders) WHERE region = 'East' AND amount >= 1000 AND name LIKE 'O''Br%' AND closed_at IS NULL AND ROWNUM <= 100"
    );
}

#[test]
fn test_every_envelope_parses() {
    let filter_sets = [Vec::new(), mixed_filters()];
    for dialect in Dialect::ALL {
        for filters in &filter_sets {
            for limit in [None, Some(1), Some(5000)] {
                let sql = wrap_query(dialect, BASE, limit, filters);
                assert_parses(&sql, dialect);
            }
        }
    }
}

#[test]
fn test_caller_sql_is_not_edited() {
    let caller = "SELECT a, b FROM t WHERE a > 1 ORDER BY b";
    for dialect in Dialect::ALL {
        let sql = wrap_query(dialect, &format!("  {caller} ;  "), Some(10), &[]);
        assert!(sql.contains(&format!("({caller})")), "{dialect:?}: {sql}");
    }
}

#[test]
fn test_filters_from_json() {
    let filters = parse_filters(&json!([
        {"col": "qty", "op": "gt", "val": 10},
        {"col": "code", "op": "ne", "val": "007x"},
        {"column": "note", "op": "contains", "value": "50%"},
        {"col": "city", "op": "endswith", "val": "ton"},
        {"col": "deleted_at", "op": "is_not_null"},
        {"col": "bad", "op": "between", "val": 1},
        "not a filter"
    ]));
    assert_eq!(filters.len(), 5);

    insta::assert_snapshot!(
        wrap_query(Dialect::Postgres, "SELECT * FROM stock", None, &filters),
        @"SELECT * FROM (SELECT * FROM stock) AS _wrapper_ WHERE qty > 10 AND code != '007x' AND note LIKE '%50%%' AND city LIKE '%ton' AND deleted_at IS NOT NULL"
    );
}

#[test]
fn test_filter_without_column_is_dropped() {
    let filters = [
        Filter::new("  ", FilterOp::Eq, 1),
        Filter::new("x", FilterOp::Lt, 2.5),
    ];
    assert_eq!(
        wrap_query(Dialect::MySql, "SELECT x FROM t", None, &filters),
        "SELECT * FROM (SELECT x FROM t) AS _wrapper_ WHERE x < 2.5"
    );
}
