use serde_json::{json, Value};

use crate::chart::calc::parse_number;
use crate::chart::context::BuildContext;
use crate::chart::error::ChartResult;
use crate::chart::options;
use crate::data::number_value;

pub fn build(ctx: &BuildContext<'_>) -> ChartResult<Option<Value>> {
    let columns = &ctx.data.columns;
    let axes: Vec<Value> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| json!({"dim": i, "name": ctx.series_name(col)}))
        .collect();
    let lines: Vec<Value> = ctx
        .rows
        .iter()
        .map(|row| {
            Value::Array(
                columns
                    .iter()
                    .map(|c| number_value(row.get(c).and_then(parse_number).unwrap_or(0.0)))
                    .collect(),
            )
        })
        .collect();
    let placeholder = &ctx.defaults.placeholder_series_name;
    let name = ctx
        .style()
        .series
        .names
        .get(placeholder)
        .cloned()
        .unwrap_or_else(|| placeholder.clone());

    let mut root = options::base(ctx);
    root.insert("parallelAxis".into(), Value::Array(axes));
    root.insert(
        "series".into(),
        json!([{
            "type": "parallel",
            "name": name,
            "data": lines,
            "lineStyle": options::line_style(ctx),
        }]),
    );
    Ok(Some(Value::Object(root)))
}
