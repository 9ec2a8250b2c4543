//! One module per chart archetype.
//!
//! Every archetype has the same shape, `fn build(ctx) -> ChartResult<Option<Value>>`,
//! and returns `None` when the shaped data gives it nothing to draw.

mod bar;
mod calendar;
mod funnel;
mod gauge;
mod graph;
mod grid;
mod heatmap;
mod line;
mod liquid;
mod map;
mod parallel;
mod pictorial;
mod pie;
mod radar;
mod sankey;
mod scatter;
mod table;

use serde_json::Value;

use super::context::BuildContext;
use super::error::ChartResult;
use super::kind::ChartType;

pub fn build(ctx: &BuildContext<'_>) -> ChartResult<Option<Value>> {
    match ctx.kind() {
        ChartType::Bar => bar::build(ctx),
        ChartType::Line => line::build(ctx),
        ChartType::Pie => pie::build(ctx),
        ChartType::Scatter => scatter::build(ctx),
        ChartType::Radar => radar::build(ctx),
        ChartType::Funnel => funnel::build(ctx),
        ChartType::Gauge => gauge::build(ctx),
        ChartType::Heatmap => heatmap::build(ctx),
        ChartType::Calendar => calendar::build(ctx),
        ChartType::Graph => graph::build(ctx),
        ChartType::Liquid => liquid::build(ctx),
        ChartType::Parallel => parallel::build(ctx),
        ChartType::PictorialBar => pictorial::build(ctx),
        ChartType::Sankey => sankey::build(ctx),
        ChartType::Map => map::build(ctx),
        ChartType::Table => table::build(ctx),
        ChartType::Grid => grid::build(ctx),
    }
}

/// `[{name, value}]` pairs of category and the first series.
fn name_value_pairs(ctx: &BuildContext<'_>, values: &[f64]) -> Value {
    Value::Array(
        ctx.data
            .categories
            .iter()
            .zip(values)
            .map(|(name, v)| serde_json::json!({"name": name, "value": crate::data::number_value(*v)}))
            .collect(),
    )
}

/// Name of the first category column: the bound one, or the first key of the first row.
fn category_column(ctx: &BuildContext<'_>) -> Option<String> {
    ctx.descriptor
        .binding
        .category_col()
        .map(str::to_string)
        .or_else(|| ctx.rows.first()?.keys().next().cloned())
}
