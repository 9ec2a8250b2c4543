use serde_json::{json, Value};

use crate::chart::context::BuildContext;
use crate::chart::error::ChartResult;
use crate::chart::options::{self, set_opt};
use crate::data::number_value;

/// `[x, y, value]` cells: categories across, series down.
pub(super) fn matrix_points(ctx: &BuildContext<'_>) -> Vec<Value> {
    ctx.data
        .values
        .iter()
        .enumerate()
        .flat_map(|(j, series)| {
            series
                .iter()
                .enumerate()
                .map(move |(i, v)| json!([i, j, number_value(*v)]))
        })
        .collect()
}

pub fn build(ctx: &BuildContext<'_>) -> ChartResult<Option<Value>> {
    let binding = &ctx.descriptor.binding;
    let column = if binding.is_pivot() {
        binding.single_value()
    } else {
        ctx.data.columns.first().map(String::as_str)
    };
    let name = match column {
        Some(col) => ctx.series_name(col).to_string(),
        None => ctx.defaults.placeholder_series_name.clone(),
    };

    let mut x_axis = options::category_x_axis(ctx);
    x_axis["type"] = json!("category");
    let mut y_axis = options::y_axis(ctx);
    y_axis["type"] = json!("category");
    y_axis["data"] = json!(ctx.data.columns);

    let mut root = options::base(ctx);
    root.insert("grid".into(), options::grid(ctx));
    root.insert("xAxis".into(), json!([x_axis]));
    root.insert("yAxis".into(), json!([y_axis]));
    set_opt(&mut root, "visualMap", options::visual_map(ctx));
    root.insert(
        "series".into(),
        json!([{
            "type": "heatmap",
            "name": name,
            "data": matrix_points(ctx),
            "label": options::label(ctx),
        }]),
    );
    Ok(Some(Value::Object(root)))
}
