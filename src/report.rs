//! Report rendering: every chart of a report runs the full pipeline
//! (resolve, execute, aggregate, build) on its own, concurrently.
//!
//! A failing chart never affects its siblings. Its error is reported as a
//! string on the chart entry:
//!
//! - `dataset binding required` when there is neither static data nor a dataset id
//! - `dataset not found` when the id is unknown
//! - `query failed: ...` for resolution, connection and query errors
//! - `chart generation failed: ...` for descriptor and build errors

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::aggregate::aggregate_by;
use crate::chart::{self, ChartDefaults, ChartDescriptor, ChartSpec, TimelineGuard};
use crate::config::{DataSourceConnection, Settings, SettingsError};
use crate::data::Record;
use crate::dataset::{DatasetDefinition, DatasetId, DatasetRepository, Params};
use crate::execute::QueryExecutor;
use crate::sql::filter::parse_filters;
use crate::sql::template::{DepthGuard, TemplateResolver};

/// Title of charts that do not set one.
pub const DEFAULT_TITLE: &str = "Untitled chart";

/// A report: bound datasets for table mode plus chart configs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportDefinition {
    #[serde(default)]
    pub name: String,
    /// Datasets rendered as plain tables.
    #[serde(default)]
    pub datasets: Vec<DatasetId>,
    /// Flat chart configs: binding, style, `dataset_id`, `filters`, `limit`,
    /// and optional static `data`/`source` rows or prebuilt `options`.
    #[serde(default)]
    pub charts: Vec<Value>,
}

/// A dataset rendered in table mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetTable {
    pub dataset_id: DatasetId,
    pub dataset_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One chart of a rendered report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedChart {
    pub title: String,
    #[serde(rename = "type")]
    pub chart_type: String,
    /// The option tree; `None` on error or when there was nothing to draw.
    pub options: Option<ChartSpec>,
    /// Rows the chart was built from, after aggregation.
    pub data: Vec<Record>,
    pub columns: Vec<String>,
    pub error: Option<String>,
}

impl RenderedChart {
    fn new(config: &Map<String, Value>) -> Self {
        let text = |key: &str, default: &str| {
            config
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(default)
                .to_string()
        };
        Self {
            title: text("title", DEFAULT_TITLE),
            chart_type: text("type", "bar"),
            options: None,
            data: Vec::new(),
            columns: Vec::new(),
            error: None,
        }
    }

    fn failed(mut self, error: String) -> Self {
        warn!(title = %self.title, error = %error, "chart failed");
        self.error = Some(error);
        self
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// The output of [`ReportRenderer::render`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderedReport {
    pub name: String,
    pub datasets: Vec<DatasetTable>,
    pub charts: Vec<RenderedChart>,
}

impl RenderedReport {
    pub fn failed_charts(&self) -> usize {
        self.charts.iter().filter(|c| !c.is_ok()).count()
    }
}

// ============================================================================
// Connection lookup
// ============================================================================

/// Resolves a dataset's data source name to a connection.
pub trait ConnectionProvider: Send + Sync {
    fn connection(&self, name: &str) -> Result<DataSourceConnection, SettingsError>;
}

impl ConnectionProvider for Settings {
    fn connection(&self, name: &str) -> Result<DataSourceConnection, SettingsError> {
        Settings::connection(self, name)
    }
}

impl ConnectionProvider for HashMap<String, DataSourceConnection> {
    fn connection(&self, name: &str) -> Result<DataSourceConnection, SettingsError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| SettingsError::ConnectionNotFound(name.to_string()))
    }
}

// ============================================================================
// Renderer
// ============================================================================

/// Why a chart produced no rows.
enum RowsError {
    BindingRequired,
    DatasetNotFound,
    Query(String),
}

impl RowsError {
    fn message(self) -> String {
        match self {
            Self::BindingRequired => "dataset binding required".to_string(),
            Self::DatasetNotFound => "dataset not found".to_string(),
            Self::Query(message) => format!("query failed: {message}"),
        }
    }
}

/// Renders reports against a dataset repository and a query executor.
#[derive(Clone)]
pub struct ReportRenderer {
    repository: Arc<dyn DatasetRepository>,
    connections: Arc<dyn ConnectionProvider>,
    executor: QueryExecutor,
    defaults: ChartDefaults,
    depth: DepthGuard,
    default_limit: Option<u64>,
}

impl ReportRenderer {
    pub fn new(
        repository: Arc<dyn DatasetRepository>,
        connections: Arc<dyn ConnectionProvider>,
        executor: QueryExecutor,
    ) -> Self {
        Self {
            repository,
            connections,
            executor,
            defaults: ChartDefaults::default(),
            depth: DepthGuard::default(),
            default_limit: None,
        }
    }

    /// Take chart defaults, resolver depth and the default row limit from settings.
    pub fn with_settings(self, settings: &Settings) -> Self {
        self.with_defaults(settings.chart.clone())
            .with_depth_guard(settings.resolver.guard())
            .with_default_limit(settings.executor.default_limit)
    }

    pub fn with_defaults(mut self, defaults: ChartDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_depth_guard(mut self, guard: DepthGuard) -> Self {
        self.depth = guard;
        self
    }

    pub fn with_default_limit(mut self, limit: Option<u64>) -> Self {
        self.default_limit = limit;
        self
    }

    /// Render the dataset tables and every chart of `report`.
    pub async fn render(&self, report: &ReportDefinition, params: &Params) -> RenderedReport {
        info!(
            report = %report.name,
            datasets = report.datasets.len(),
            charts = report.charts.len(),
            "rendering report"
        );
        let tables = join_all(report.datasets.iter().map(|id| self.render_dataset(*id, params)));
        let charts = join_all(report.charts.iter().map(|c| self.render_chart(c, params)));
        let (datasets, charts) = futures::join!(tables, charts);

        let rendered = RenderedReport {
            name: report.name.clone(),
            datasets,
            charts,
        };
        info!(
            report = %report.name,
            failed = rendered.failed_charts(),
            "report rendered"
        );
        rendered
    }

    /// Resolve and run one dataset for table mode.
    pub async fn render_dataset(&self, id: DatasetId, params: &Params) -> DatasetTable {
        let mut table = DatasetTable {
            dataset_id: id,
            dataset_name: String::new(),
            columns: Vec::new(),
            rows: Vec::new(),
            error: None,
        };
        let dataset = match self.repository.dataset(id) {
            Ok(Some(d)) => d,
            Ok(None) => {
                table.error = Some("dataset not found".to_string());
                return table;
            }
            Err(e) => {
                table.error = Some(format!("execution failed: {e}"));
                return table;
            }
        };
        table.dataset_name = dataset.name.clone();

        match self.run_dataset(&dataset, params, &Map::new()).await {
            Ok(result) => {
                table.columns = result.columns;
                table.rows = result.rows;
            }
            Err(message) => {
                warn!(dataset_id = id, error = %message, "dataset table failed");
                table.error = Some(format!("execution failed: {message}"));
            }
        }
        table
    }

    /// Run the pipeline for one chart config. Never fails; errors are
    /// reported on the returned entry.
    pub async fn render_chart(&self, config: &Value, params: &Params) -> RenderedChart {
        let Some(map) = config.as_object() else {
            return RenderedChart::new(&Map::new())
                .failed("chart generation failed: chart config must be a JSON object".to_string());
        };
        let mut chart = RenderedChart::new(map);

        if let Some(options) = map.get("options").filter(|o| o.is_object()) {
            debug!(title = %chart.title, "using static chart options");
            chart.options = Some(ChartSpec::new(options.clone()));
            return chart;
        }

        let descriptor = match ChartDescriptor::from_map(map.clone()) {
            Ok(d) => d,
            Err(e) => return chart.failed(format!("chart generation failed: {e}")),
        };

        let rows = match static_rows(map) {
            Some(rows) => rows,
            None => match self.query_rows(map, &descriptor, params, &mut chart).await {
                Ok(rows) => rows,
                Err(e) => return chart.failed(e.message()),
            },
        };

        match chart::build(&descriptor, &rows, &self.defaults, TimelineGuard::default()) {
            Ok(spec) => chart.options = spec,
            Err(e) => return chart.failed(format!("chart generation failed: {e}")),
        }
        chart.data = rows;
        chart
    }

    async fn query_rows(
        &self,
        map: &Map<String, Value>,
        descriptor: &ChartDescriptor,
        params: &Params,
        chart: &mut RenderedChart,
    ) -> Result<Vec<Record>, RowsError> {
        let id = dataset_id(map).ok_or(RowsError::BindingRequired)?;
        let dataset = self
            .repository
            .dataset(id)
            .map_err(|e| RowsError::Query(e.to_string()))?
            .ok_or(RowsError::DatasetNotFound)?;

        let result = self
            .run_dataset(&dataset, params, map)
            .await
            .map_err(RowsError::Query)?;
        chart.columns = result.columns.clone();

        let binding = &descriptor.binding;
        let rows = aggregate_by(
            result.to_records(),
            &binding.category,
            &binding.value_columns(),
            binding.aggregation,
            binding.series.as_deref(),
        );
        debug!(title = %chart.title, dataset_id = id, rows = rows.len(), "chart rows ready");
        Ok(rows)
    }

    /// Resolve the dataset template and execute it with the chart's filters and limit.
    async fn run_dataset(
        &self,
        dataset: &DatasetDefinition,
        params: &Params,
        chart: &Map<String, Value>,
    ) -> Result<crate::data::ResultSet, String> {
        let params = dataset.effective_params(params);
        let resolved = TemplateResolver::new(self.repository.as_ref())
            .with_guard(self.depth)
            .resolve(&dataset.sql, &params);
        if !resolved.is_complete() {
            warn!(
                dataset_id = dataset.id,
                unresolved = resolved.unresolved.len(),
                "running dataset with unresolved references"
            );
        }

        let conn = self
            .connections
            .connection(&dataset.datasource)
            .map_err(|e| e.to_string())?;
        let filters = chart.get("filters").map(parse_filters).unwrap_or_default();
        let limit = chart
            .get("limit")
            .and_then(|v| v.as_u64().or_else(|| v.as_str()?.trim().parse().ok()))
            .or(self.default_limit);

        self.executor
            .execute(&conn, &resolved.sql, limit, &filters)
            .await
            .map_err(|e| e.to_string())
    }
}

/// Static rows under `data` or `source`, when the chart carries any.
fn static_rows(map: &Map<String, Value>) -> Option<Vec<Record>> {
    ["data", "source"].iter().find_map(|key| {
        let rows: Vec<Record> = map
            .get(*key)?
            .as_array()?
            .iter()
            .filter_map(|r| r.as_object().cloned())
            .collect();
        (!rows.is_empty()).then_some(rows)
    })
}

fn dataset_id(map: &Map<String, Value>) -> Option<DatasetId> {
    match map.get("dataset_id")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
