//! Chart specification builder.
//!
//! Turns a flat chart config plus query rows into an ECharts option tree:
//!
//! ```text
//! descriptor + rows ──► [timeline split] ──► [grid promotion]
//!                                                 │
//!                                                 ▼
//!                         BuildContext (shaped data, style, defaults)
//!                                                 │
//!                                                 ▼ archetype::build
//!                                             ChartSpec
//! ```
//!
//! Function-valued options (formatters, symbol sizes) are carried as
//! [`JsFunction`] marker strings and spliced back in by [`dump_options`].

mod archetype;
mod calc;
mod context;
mod defaults;
mod descriptor;
mod error;
mod kind;
mod options;
mod script;
mod shape;
mod style;
mod timeline;

pub use calc::apply_calculation;
pub use context::BuildContext;
pub use defaults::ChartDefaults;
pub use descriptor::{Binding, ChartDescriptor, StyleOptions, ValueBinding};
pub use error::{ChartError, ChartResult};
pub use kind::ChartType;
pub use script::{dump_options, FormatType, JsFunction};
pub use shape::ShapedData;
pub use timeline::TimelineGuard;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::data::Record;

/// A finished option tree: a chart, a timeline wrapper, or a table block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChartSpec(Value);

impl ChartSpec {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        self.0.clone()
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// JSON text with deferred scripts spliced in as live functions.
    pub fn dump_options(&self) -> ChartResult<String> {
        dump_options(&self.0)
    }

    pub fn is_table(&self) -> bool {
        self.0.get("type").and_then(Value::as_str) == Some("table")
    }

    pub fn is_timeline(&self) -> bool {
        self.0.get("baseOption").is_some()
    }
}

/// Build a chart from a descriptor and rows.
///
/// Returns `Ok(None)` when there is nothing to draw.
pub fn build(
    descriptor: &ChartDescriptor,
    rows: &[Record],
    defaults: &ChartDefaults,
    guard: TimelineGuard,
) -> ChartResult<Option<ChartSpec>> {
    if rows.is_empty() {
        return Ok(None);
    }

    if let Some(field) = timeline_field(descriptor, rows) {
        match guard.descend() {
            Some(inner) => {
                let result = timeline::build(descriptor, rows, field, |frame, frame_rows| {
                    Ok(build(frame, frame_rows, defaults, inner)?.map(ChartSpec::into_value))
                });
                return match result {
                    Ok(value) => Ok(Some(ChartSpec::new(value))),
                    Err(e) => build_single(&timeline::fallback(descriptor, &e)?, rows, defaults),
                };
            }
            None => debug!(field, "timeline depth exhausted, ignoring timeline field"),
        }
    }

    build_single(descriptor, rows, defaults)
}

/// Parse a chart config and build it with a default timeline guard.
pub fn build_from_config(
    config: &Value,
    rows: &[Record],
    defaults: &ChartDefaults,
) -> ChartResult<Option<ChartSpec>> {
    let descriptor = ChartDescriptor::from_value(config)?;
    build(&descriptor, rows, defaults, TimelineGuard::default())
}

fn timeline_field<'d>(descriptor: &'d ChartDescriptor, rows: &[Record]) -> Option<&'d str> {
    let field = descriptor.style.timeline.field.as_deref()?;
    rows.first()?.contains_key(field).then_some(field)
}

fn build_single(
    descriptor: &ChartDescriptor,
    rows: &[Record],
    defaults: &ChartDefaults,
) -> ChartResult<Option<ChartSpec>> {
    let promoted = promote_to_grid(descriptor)?;
    let descriptor = promoted.as_ref().unwrap_or(descriptor);

    let ctx = BuildContext::new(descriptor, rows, defaults);
    debug!(
        chart = %descriptor.chart_type,
        rows = rows.len(),
        series = ctx.data.columns.len(),
        "building chart"
    );
    Ok(archetype::build(&ctx)?.map(ChartSpec::new))
}

/// Bar, line and scatter charts asking for a right-hand axis become grid
/// charts whose default series type is the original type.
fn promote_to_grid(descriptor: &ChartDescriptor) -> ChartResult<Option<ChartDescriptor>> {
    let style = &descriptor.style;
    let wants_dual_axis =
        style.series.has_right_axis() || style.grid.grid_type == "multi_yaxis";
    if !descriptor.chart_type.promotes_to_grid() || !wants_dual_axis {
        return Ok(None);
    }

    let mut raw: Map<String, Value> = descriptor.raw().clone();
    raw.remove("chart_type");
    raw.insert("type".into(), Value::String(ChartType::Grid.to_string()));
    raw.entry("default_series_type")
        .or_insert_with(|| Value::String(descriptor.chart_type.to_string()));
    debug!(from = %descriptor.chart_type, "promoting chart to grid");
    ChartDescriptor::from_map(raw).map(Some)
}
