//! reportflow CLI - resolve dataset SQL, preview envelopes, build charts, render reports
//!
//! Usage:
//!   reportflow resolve <datasets.json> --dataset <id> [--param key=value]...
//!   reportflow wrap <sql> [--dialect <dialect>] [--limit <n>] [--filters <json>]
//!   reportflow chart <chart.json> <rows.json>
//!   reportflow render <report.json> --datasets <datasets.json> [--param key=value]...
//!   reportflow test-connection <name>
//!
//! Examples:
//!   reportflow resolve datasets.json --dataset 3 --param year=2024
//!   reportflow wrap "SELECT * FROM orders" --dialect oracle --limit 100
//!   reportflow chart sales_chart.json rows.json
//!   reportflow render monthly.json --datasets datasets.json

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use tracing::{info, warn};

use reportflow::chart::{self, ChartDescriptor, TimelineGuard};
use reportflow::config::Settings;
use reportflow::connector::Connector;
use reportflow::data::Record;
use reportflow::dataset::{DatasetDefinition, DatasetId, DatasetRepository, InMemoryRepository, Params};
use reportflow::execute::{wrap_query, QueryExecutor};
use reportflow::report::{ReportDefinition, ReportRenderer};
use reportflow::sql::{parse_filters, Dialect, TemplateResolver};
use reportflow::worker::{WorkerClient, WorkerDriver};
use reportflow::{ReportflowError, Result};

#[derive(Parser)]
#[command(name = "reportflow")]
#[command(about = "reportflow - SQL templates to chart option trees")]
#[command(version)]
struct Cli {
    /// Config file (defaults to REPORTFLOW_CONFIG, ./reportflow.toml, ~/.config/reportflow/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand a dataset's SQL template
    Resolve {
        /// JSON array of dataset definitions
        datasets: PathBuf,

        /// Dataset to resolve
        #[arg(short, long)]
        dataset: DatasetId,

        /// Parameter values as key=value
        #[arg(short, long = "param")]
        params: Vec<String>,
    },

    /// Print the dialect envelope for a query without running it
    Wrap {
        sql: String,

        #[arg(short, long, default_value = "tsql")]
        dialect: DialectArg,

        #[arg(short, long)]
        limit: Option<u64>,

        /// Filters as a JSON array of {col, op, val}
        #[arg(short, long)]
        filters: Option<String>,
    },

    /// Build chart options from a chart config and a JSON array of rows
    Chart {
        config: PathBuf,
        rows: PathBuf,

        /// Print the option tree with scripts left as marker strings
        #[arg(long)]
        raw: bool,
    },

    /// Render every chart of a report through the database worker
    Render {
        report: PathBuf,

        /// JSON array of dataset definitions
        #[arg(short, long)]
        datasets: PathBuf,

        #[arg(short, long = "param")]
        params: Vec<String>,
    },

    /// Open a configured connection, run the probe query and close it
    TestConnection {
        /// Connection name from the [connections] config section
        name: String,
    },
}

#[derive(Clone, ValueEnum)]
enum DialectArg {
    Tsql,
    Mysql,
    Postgres,
    Oracle,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Tsql => Dialect::TSql,
            DialectArg::Mysql => Dialect::MySql,
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Oracle => Dialect::Oracle,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Resolve {
            datasets,
            dataset,
            params,
        } => cmd_resolve(&datasets, dataset, &params),
        Commands::Wrap {
            sql,
            dialect,
            limit,
            filters,
        } => cmd_wrap(&sql, dialect, limit, filters.as_deref()),
        Commands::Chart { config, rows, raw } => cmd_chart(cli.config.as_deref(), &config, &rows, raw),
        Commands::Render {
            report,
            datasets,
            params,
        } => cmd_render(cli.config.as_deref(), &report, &datasets, &params).await,
        Commands::TestConnection { name } => cmd_test_connection(cli.config.as_deref(), &name).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    Ok(match path {
        Some(p) => Settings::from_file(p)?,
        None => Settings::load()?,
    })
}

fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)
        .map_err(|e| ReportflowError::io(format!("reading '{}'", path.display()), e))?;
    serde_json::from_str(&text).map_err(|e| ReportflowError::json(path.display().to_string(), e))
}

fn load_repository(path: &Path) -> Result<InMemoryRepository> {
    let datasets: Vec<DatasetDefinition> = serde_json::from_value(read_json(path)?)
        .map_err(|e| ReportflowError::json(path.display().to_string(), e))?;
    Ok(datasets.into_iter().collect())
}

/// `key=value` pairs; values that parse as JSON keep their type.
fn parse_params(pairs: &[String]) -> Params {
    let mut params = Params::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            warn!(param = %pair, "ignoring parameter without '='");
            continue;
        };
        let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
        params.insert(key.trim().to_string(), value);
    }
    params
}

fn cmd_resolve(datasets: &Path, id: DatasetId, params: &[String]) -> Result<ExitCode> {
    let repository = load_repository(datasets)?;
    let Some(dataset) = repository.dataset(id)? else {
        eprintln!("Dataset {id} not found");
        return Ok(ExitCode::FAILURE);
    };

    let params = dataset.effective_params(&parse_params(params));
    let resolved = TemplateResolver::new(&repository).resolve(&dataset.sql, &params);
    println!("{}", resolved.sql);
    for unresolved in &resolved.unresolved {
        eprintln!(
            "-- unresolved dataset:{} at depth {} ({:?})",
            unresolved.id, unresolved.depth, unresolved.reason
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_wrap(sql: &str, dialect: DialectArg, limit: Option<u64>, filters: Option<&str>) -> Result<ExitCode> {
    let filters = match filters {
        Some(text) => {
            let value: Value =
                serde_json::from_str(text).map_err(|e| ReportflowError::json("--filters", e))?;
            parse_filters(&value)
        }
        None => Vec::new(),
    };
    println!("{}", wrap_query(dialect.into(), sql, limit, &filters));
    Ok(ExitCode::SUCCESS)
}

fn cmd_chart(settings: Option<&Path>, config: &Path, rows: &Path, raw: bool) -> Result<ExitCode> {
    let settings = load_settings(settings)?;
    let descriptor = ChartDescriptor::from_value(&read_json(config)?)?;
    let rows: Vec<Record> = match read_json(rows)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        _ => {
            eprintln!("Rows file must contain a JSON array of objects");
            return Ok(ExitCode::FAILURE);
        }
    };

    match chart::build(&descriptor, &rows, &settings.chart, TimelineGuard::default())? {
        Some(spec) if raw => println!("{}", spec.as_value()),
        Some(spec) => println!("{}", spec.dump_options()?),
        None => {
            eprintln!("Nothing to draw");
            return Ok(ExitCode::FAILURE);
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn connector(settings: &Settings) -> Result<Connector> {
    let client = WorkerClient::spawn_with_settings(settings).await?;
    Ok(Connector::new(Arc::new(WorkerDriver::new(Arc::new(client)))))
}

async fn cmd_render(
    settings: Option<&Path>,
    report: &Path,
    datasets: &Path,
    params: &[String],
) -> Result<ExitCode> {
    let settings = load_settings(settings)?;
    let report: ReportDefinition = serde_json::from_value(read_json(report)?)
        .map_err(|e| ReportflowError::json(report.display().to_string(), e))?;
    let repository = Arc::new(load_repository(datasets)?);

    let executor = QueryExecutor::new(connector(&settings).await?);
    let renderer = ReportRenderer::new(repository, Arc::new(settings.clone()), executor)
        .with_settings(&settings);
    let rendered = renderer.render(&report, &parse_params(params)).await;

    let mut charts = Vec::with_capacity(rendered.charts.len());
    for chart in &rendered.charts {
        let options = match &chart.options {
            Some(spec) => Some(spec.dump_options()?),
            None => None,
        };
        charts.push(json!({
            "title": chart.title,
            "type": chart.chart_type,
            "options": options,
            "error": chart.error,
        }));
    }
    let output = json!({
        "name": rendered.name,
        "datasets": rendered.datasets,
        "charts": charts,
    });
    println!("{output:#}");

    let failed = rendered.failed_charts();
    if failed > 0 {
        warn!(failed, "some charts failed");
    }
    info!(charts = rendered.charts.len(), "done");
    Ok(ExitCode::SUCCESS)
}

async fn cmd_test_connection(settings: Option<&Path>, name: &str) -> Result<ExitCode> {
    let settings = load_settings(settings)?;
    let conn = settings.connection(name)?;
    let connector = connector(&settings).await?;

    let (ok, message) = connector.test_connection(&conn).await;
    if ok {
        println!("OK: {message}");
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("FAILED: {message}");
        Ok(ExitCode::FAILURE)
    }
}
