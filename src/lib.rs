//! # reportflow
//!
//! Report data pipeline: parameterized SQL templates in, chart option trees out.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │   DatasetDefinition (SQL template + data source name)     │
//! └──────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [sql::template]
//! ┌──────────────────────────────────────────────────────────┐
//! │   Resolved SQL ({{param:..}} and {{dataset:..}} expanded) │
//! └──────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [execute + connector + worker]
//! ┌──────────────────────────────────────────────────────────┐
//! │   Dialect envelope (filters, row limit) → ResultSet       │
//! └──────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [aggregate]
//! ┌──────────────────────────────────────────────────────────┐
//! │   Grouped records                                         │
//! └──────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [chart]
//! ┌──────────────────────────────────────────────────────────┐
//! │   ChartSpec (ECharts option tree, deferred JS scripts)    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! [`report::ReportRenderer`] runs this pipeline for every chart of a report.

pub mod aggregate;
pub mod chart;
pub mod config;
pub mod connector;
pub mod data;
pub mod dataset;
pub mod error;
pub mod execute;
pub mod report;
pub mod sql;
pub mod worker;

pub use error::{ReportflowError, Result};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::aggregate::{aggregate, AggregateOp};
    pub use crate::chart::{build as build_chart, ChartDefaults, ChartDescriptor, ChartSpec, ChartType};
    pub use crate::config::{DataSourceConnection, Settings};
    pub use crate::connector::{Connection, Connector, Driver};
    pub use crate::data::{Record, ResultSet};
    pub use crate::dataset::{DatasetDefinition, DatasetRepository, InMemoryRepository, Params};
    pub use crate::execute::QueryExecutor;
    pub use crate::report::{ReportDefinition, ReportRenderer};
    pub use crate::sql::{Dialect, Filter, FilterOp, SqlDialect, TemplateResolver};
}
