use serde_json::{json, Value};

use crate::chart::context::BuildContext;
use crate::chart::error::ChartResult;
use crate::chart::options::{self, set_opt};
use crate::data::number_value;

pub fn build(ctx: &BuildContext<'_>) -> ChartResult<Option<Value>> {
    let Some((col, values)) = ctx.data.series().next() else {
        return Ok(None);
    };
    let c = &ctx.style().calendar;
    let data: Vec<Value> = ctx
        .data
        .categories
        .iter()
        .zip(values)
        .map(|(day, v)| json!([day, number_value(*v)]))
        .collect();

    let mut root = options::base(ctx);
    root.insert(
        "calendar".into(),
        json!({
            "range": c.range,
            "cellSize": ["auto", number_value(c.cell_size)],
            "yearLabel": {"show": false},
        }),
    );
    set_opt(&mut root, "visualMap", options::visual_map(ctx));
    root.insert(
        "series".into(),
        json!([{
            "type": "heatmap",
            "coordinateSystem": "calendar",
            "name": ctx.series_name(col),
            "data": data,
        }]),
    );
    Ok(Some(Value::Object(root)))
}
