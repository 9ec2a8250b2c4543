use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reportflow::config::DataSourceConnection;
use reportflow::connector::{
    Connection, ConnectionError, ConnectionResult, Connector, Driver, QueryError, QueryResult,
};
use reportflow::data::ResultSet;
use reportflow::execute::{ExecuteError, QueryExecutor};
use reportflow::sql::{Dialect, Filter, FilterOp};
use serde_json::json;

#[derive(Clone, Copy, PartialEq)]
enum Mode {
    Ok,
    RefuseConnect,
    RejectQuery,
    FailClose,
}

#[derive(Default)]
struct Log {
    targets: Mutex<Vec<String>>,
    statements: Mutex<Vec<String>>,
    closes: AtomicUsize,
}

struct FakeDriver {
    mode: Mode,
    log: Arc<Log>,
}

struct FakeConnection {
    mode: Mode,
    log: Arc<Log>,
}

#[async_trait]
impl Driver for FakeDriver {
    async fn open(&self, _dialect: Dialect, target: &str) -> ConnectionResult<Box<dyn Connection>> {
        self.log.targets.lock().unwrap().push(target.to_string());
        if self.mode == Mode::RefuseConnect {
            return Err(ConnectionError::refused(target, "timeout expired"));
        }
        Ok(Box::new(FakeConnection {
            mode: self.mode,
            log: self.log.clone(),
        }))
    }
}

#[async_trait]
impl Connection for FakeConnection {
    async fn query(&mut self, sql: &str) -> QueryResult<ResultSet> {
        self.log.statements.lock().unwrap().push(sql.to_string());
        if self.mode == Mode::RejectQuery {
            return Err(QueryError::Rejected("Invalid column name 'regoin'".to_string()));
        }
        Ok(ResultSet::new(
            vec!["region".into(), "total".into()],
            vec![vec![json!("East"), json!(1200)], vec![json!("West"), json!(null)]],
        ))
    }

    async fn close(&mut self) -> ConnectionResult<()> {
        self.log.closes.fetch_add(1, Ordering::SeqCst);
        if self.mode == Mode::FailClose {
            return Err(ConnectionError::Close("socket already closed".to_string()));
        }
        Ok(())
    }
}

fn executor(mode: Mode) -> (QueryExecutor, Arc<Log>) {
    let log = Arc::new(Log::default());
    let driver = FakeDriver {
        mode,
        log: log.clone(),
    };
    (QueryExecutor::new(Connector::new(Arc::new(driver))), log)
}

fn sql_server() -> DataSourceConnection {
    DataSourceConnection::new(Dialect::TSql, "sql01", "sales").with_credentials("report", "s3cret")
}

#[tokio::test]
async fn test_execute_wraps_and_closes() {
    let (executor, log) = executor(Mode::Ok);
    let filters = [Filter::new("region", FilterOp::Ne, "North")];

    let result = executor
        .execute(&sql_server(), "SELECT region, total FROM v_sales;", Some(50), &filters)
        .await
        .unwrap();

    assert_eq!(result.columns, vec!["region", "total"]);
    assert_eq!(result.len(), 2);
    let records = result.to_records();
    assert_eq!(records[0]["region"], json!("East"));
    assert_eq!(records[1]["total"], json!(null));

    assert_eq!(
        log.statements.lock().unwrap().as_slice(),
        ["SELECT TOP 50 * FROM (SELECT region, total FROM v_sales) AS _wrapper_ WHERE region != 'North'"]
    );
    assert_eq!(log.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_query_error_still_closes() {
    let (executor, log) = executor(Mode::RejectQuery);

    let err = executor
        .execute(&sql_server(), "SELECT regoin FROM v_sales", None, &[])
        .await
        .unwrap_err();

    assert!(matches!(err, ExecuteError::Query(QueryError::Rejected(_))));
    assert!(err.to_string().contains("regoin"));
    assert_eq!(log.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_connect_failure_is_a_connection_error() {
    let (executor, log) = executor(Mode::RefuseConnect);

    let err = executor
        .execute(&sql_server(), "SELECT 1", None, &[])
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ExecuteError::Connection(ConnectionError::refused("sql01:1433/sales", "timeout expired"))
    );
    assert!(!err.to_string().contains("s3cret"));
    assert!(log.statements.lock().unwrap().is_empty());
    assert_eq!(log.closes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_close_failure_does_not_hide_rows() {
    let (executor, log) = executor(Mode::FailClose);

    let result = executor
        .execute(&sql_server(), "SELECT region, total FROM v_sales", None, &[])
        .await
        .unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(log.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_driver_receives_dialect_target() {
    let (executor, log) = executor(Mode::Ok);
    let pg = DataSourceConnection::new(Dialect::Postgres, "db.internal", "analytics")
        .with_credentials("bi", "pw")
        .with_port(6432);

    executor.execute(&pg, "SELECT 1 AS x", Some(1), &[]).await.unwrap();

    assert_eq!(
        log.targets.lock().unwrap().as_slice(),
        ["postgres://bi:pw@db.internal:6432/analytics"]
    );
    assert_eq!(
        log.statements.lock().unwrap().as_slice(),
        ["SELECT * FROM (SELECT 1 AS x) AS _wrapper_ LIMIT 1"]
    );
}

#[tokio::test]
async fn test_connection_probe() {
    let (executor, log) = executor(Mode::Ok);
    let (ok, message) = executor.connector().test_connection(&sql_server()).await;

    assert!(ok);
    assert_eq!(message, reportflow::connector::CONNECTION_OK);
    assert_eq!(log.statements.lock().unwrap().as_slice(), ["SELECT 1"]);
    assert_eq!(log.closes.load(Ordering::SeqCst), 1);
}
