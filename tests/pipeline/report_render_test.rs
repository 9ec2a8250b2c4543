use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reportflow::config::DataSourceConnection;
use reportflow::connector::{
    Connection, ConnectionResult, Connector, Driver, QueryError, QueryResult,
};
use reportflow::data::ResultSet;
use reportflow::dataset::{DatasetDefinition, DatasetId, InMemoryRepository, Params};
use reportflow::execute::QueryExecutor;
use reportflow::report::{ReportDefinition, ReportRenderer, DEFAULT_TITLE};
use reportflow::sql::Dialect;
use serde_json::{json, Value};

/// Answers every statement with a fixed sales table; statements that read
/// `missing_table` are rejected.
#[derive(Default)]
struct SalesDriver {
    statements: Arc<Mutex<Vec<String>>>,
}

struct SalesConnection {
    statements: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Driver for SalesDriver {
    async fn open(&self, _dialect: Dialect, _target: &str) -> ConnectionResult<Box<dyn Connection>> {
        Ok(Box::new(SalesConnection {
            statements: self.statements.clone(),
        }))
    }
}

#[async_trait]
impl Connection for SalesConnection {
    async fn query(&mut self, sql: &str) -> QueryResult<ResultSet> {
        self.statements.lock().unwrap().push(sql.to_string());
        if sql.contains("missing_table") {
            return Err(QueryError::Rejected("relation \"missing_table\" does not exist".to_string()));
        }
        Ok(ResultSet::new(
            vec!["month".into(), "region".into(), "sales".into()],
            vec![
                vec![json!("Jan"), json!("East"), json!(100)],
                vec![json!("Jan"), json!("West"), json!("1,000")],
                vec![json!("Feb"), json!("East"), json!(50)],
            ],
        ))
    }

    async fn close(&mut self) -> ConnectionResult<()> {
        Ok(())
    }
}

fn dataset(id: DatasetId, datasource: &str, sql: &str) -> DatasetDefinition {
    DatasetDefinition {
        id,
        name: format!("dataset {id}"),
        datasource: datasource.to_string(),
        sql: sql.to_string(),
        params: vec![],
    }
}

fn renderer() -> (ReportRenderer, Arc<Mutex<Vec<String>>>) {
    let repository = InMemoryRepository::new()
        .with(dataset(1, "warehouse", "SELECT month, region, sales FROM sales WHERE year = {{param:year}}"))
        .with(dataset(2, "warehouse", "SELECT * FROM {{dataset:1}} s WHERE region <> 'North'"))
        .with(dataset(3, "warehouse", "SELECT * FROM missing_table"))
        .with(dataset(4, "nowhere", "SELECT 1"));

    let mut connections = HashMap::new();
    connections.insert(
        "warehouse".to_string(),
        DataSourceConnection::new(Dialect::Postgres, "pg", "dw"),
    );

    let driver = SalesDriver::default();
    let statements = driver.statements.clone();
    let executor = QueryExecutor::new(Connector::new(Arc::new(driver)));
    let renderer = ReportRenderer::new(Arc::new(repository), Arc::new(connections), executor);
    (renderer, statements)
}

fn params(value: Value) -> Params {
    value.as_object().cloned().unwrap_or_default()
}

#[tokio::test]
async fn test_chart_runs_full_pipeline() {
    let (renderer, statements) = renderer();
    let chart = renderer
        .render_chart(
            &json!({
                "type": "bar",
                "title": "Sales by month",
                "dataset_id": 1,
                "x_axis": "month",
                "y_axis": "sales",
                "aggregation": "sum",
                "filters": [{"col": "region", "op": "ne", "val": "South"}],
                "limit": "500"
            }),
            &params(json!({"year": 2024})),
        )
        .await;

    assert!(chart.is_ok(), "{:?}", chart.error);
    assert_eq!(chart.title, "Sales by month");
    assert_eq!(chart.chart_type, "bar");
    assert_eq!(chart.columns, vec!["month", "region", "sales"]);
    assert_eq!(
        Value::Array(chart.data.iter().cloned().map(Value::Object).collect()),
        json!([{"month": "Jan", "sales": 1100}, {"month": "Feb", "sales": 50}])
    );

    let options = chart.options.unwrap().into_value();
    assert_eq!(options["xAxis"][0]["data"], json!(["Jan", "Feb"]));
    assert_eq!(options["series"][0]["data"], json!([1100, 50]));

    assert_eq!(
        statements.lock().unwrap().as_slice(),
        ["SELECT * FROM (SELECT month, region, sales FROM sales WHERE year = 2024) AS _wrapper_ WHERE region != 'South' LIMIT 500"]
    );
}

#[tokio::test]
async fn test_multi_column_category_aggregates_on_every_column() {
    let (renderer, _) = renderer();
    let chart = renderer
        .render_chart(
            &json!({
                "type": "bar",
                "dataset_id": 1,
                "x_axis": ["month", "region"],
                "y_axis": "sales",
                "aggregation": "sum"
            }),
            &params(json!({"year": 2024})),
        )
        .await;

    assert!(chart.is_ok(), "{:?}", chart.error);
    assert_eq!(chart.data.len(), 3);
    let options = chart.options.unwrap().into_value();
    assert_eq!(options["xAxis"][0]["data"], json!(["Jan-East", "Jan-West", "Feb-East"]));
    assert_eq!(options["series"][0]["data"], json!([100, 1000, 50]));
}

#[tokio::test]
async fn test_nested_dataset_and_default_limit() {
    let (renderer, statements) = renderer();
    let renderer = renderer.with_default_limit(Some(1000));

    let chart = renderer
        .render_chart(
            &json!({"type": "table", "dataset_id": "2"}),
            &params(json!({"year": 2023})),
        )
        .await;

    assert!(chart.is_ok());
    assert_eq!(chart.title, DEFAULT_TITLE);
    assert!(chart.options.unwrap().is_table());
    assert_eq!(
        statements.lock().unwrap()[0],
        "SELECT * FROM (SELECT * FROM (SELECT month, region, sales FROM sales WHERE year = 2023) s \
         WHERE region <> 'North') AS _wrapper_ LIMIT 1000"
    );
}

#[tokio::test]
async fn test_chart_errors_are_reported_per_chart() {
    let (renderer, _) = renderer();
    let report = ReportDefinition {
        name: "Quarterly".to_string(),
        datasets: vec![],
        charts: vec![
            json!({"title": "No binding", "type": "bar"}),
            json!({"title": "Unknown dataset", "dataset_id": 99}),
            json!({"title": "Broken query", "dataset_id": 3}),
            json!({"title": "No connection", "dataset_id": 4}),
            json!({"title": "Bad type", "type": "donut", "dataset_id": 1}),
            json!("not a chart"),
            json!({"title": "Good", "type": "pie", "dataset_id": 1, "x_axis": "region", "y_axis": "sales"}),
        ],
    };

    let rendered = renderer.render(&report, &params(json!({"year": 2024}))).await;
    let errors: Vec<Option<&str>> = rendered.charts.iter().map(|c| c.error.as_deref()).collect();

    assert_eq!(rendered.name, "Quarterly");
    assert_eq!(rendered.failed_charts(), 6);
    assert_eq!(errors[0], Some("dataset binding required"));
    assert_eq!(errors[1], Some("dataset not found"));
    assert!(errors[2].unwrap().starts_with("query failed: "));
    assert!(errors[2].unwrap().contains("missing_table"));
    assert_eq!(errors[3], Some("query failed: Connection not found: nowhere"));
    assert_eq!(errors[4], Some("chart generation failed: unknown chart type: donut"));
    assert!(errors[5].unwrap().starts_with("chart generation failed: "));
    assert_eq!(errors[6], None);

    let good = &rendered.charts[6];
    assert_eq!(good.chart_type, "pie");
    let options = good.options.as_ref().unwrap().as_value();
    assert_eq!(options["series"][0]["data"][1], json!({"name": "West", "value": 1000}));
    assert!(rendered.charts[0].options.is_none());
}

#[tokio::test]
async fn test_static_charts_skip_the_database() {
    let (renderer, statements) = renderer();

    let prebuilt = renderer
        .render_chart(
            &json!({"title": "Prebuilt", "options": {"series": [{"type": "bar", "data": [1]}]}}),
            &Params::new(),
        )
        .await;
    assert!(prebuilt.is_ok());
    assert_eq!(
        prebuilt.options.unwrap().into_value(),
        json!({"series": [{"type": "bar", "data": [1]}]})
    );

    let inline = renderer
        .render_chart(
            &json!({
                "type": "line",
                "x_axis": "d",
                "y_axis": "v",
                "source": [{"d": "Mon", "v": 3}, {"d": "Tue", "v": 5}]
            }),
            &Params::new(),
        )
        .await;
    assert!(inline.is_ok());
    assert_eq!(inline.data.len(), 2);
    assert_eq!(inline.options.unwrap().into_value()["series"][0]["data"], json!([3, 5]));

    assert!(statements.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_dataset_tables() {
    let (renderer, _) = renderer();
    let report = ReportDefinition {
        name: "Tables".to_string(),
        datasets: vec![1, 3, 42],
        charts: vec![],
    };

    let rendered = renderer.render(&report, &params(json!({"year": 2024}))).await;
    let tables = &rendered.datasets;

    assert_eq!(tables.len(), 3);
    assert_eq!(tables[0].dataset_name, "dataset 1");
    assert_eq!(tables[0].columns, vec!["month", "region", "sales"]);
    assert_eq!(tables[0].rows.len(), 3);
    assert_eq!(tables[0].error, None);

    assert!(tables[1].error.as_deref().unwrap().starts_with("execution failed: "));
    assert!(tables[1].rows.is_empty());

    assert_eq!(tables[2].dataset_id, 42);
    assert_eq!(tables[2].error.as_deref(), Some("dataset not found"));
}

#[tokio::test]
async fn test_report_definition_from_json() {
    let report: ReportDefinition = serde_json::from_value(json!({
        "name": "From JSON",
        "charts": [{"type": "bar", "data": [{"k": "a", "v": 1}]}]
    }))
    .unwrap();
    assert!(report.datasets.is_empty());

    let (renderer, _) = renderer();
    let rendered = renderer.render(&report, &Params::new()).await;
    assert_eq!(rendered.failed_charts(), 0);

    let json = serde_json::to_value(&rendered).unwrap();
    assert_eq!(json["charts"][0]["type"], json!("bar"));
    assert_eq!(json["charts"][0]["options"]["series"][0]["data"], json!([1]));
}
