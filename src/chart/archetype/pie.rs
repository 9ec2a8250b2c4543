use serde_json::{json, Value};

use super::name_value_pairs;
use crate::chart::context::BuildContext;
use crate::chart::error::ChartResult;
use crate::chart::options;

pub fn build(ctx: &BuildContext<'_>) -> ChartResult<Option<Value>> {
    let Some((col, values)) = ctx.data.series().next() else {
        return Ok(None);
    };
    let pie = &ctx.style().pie;
    let radius = if pie.radius_type == "ring" {
        json!(["40%", "75%"])
    } else {
        json!(["0%", "75%"])
    };

    let mut series = json!({
        "type": "pie",
        "name": ctx.series_name(col),
        "data": name_value_pairs(ctx, values),
        "radius": radius,
        "center": pie.center,
        "label": options::series_label(ctx, col, Some("{b}: {c}")),
    });
    if matches!(pie.rosetype.as_str(), "radius" | "area") {
        series["roseType"] = json!(pie.rosetype);
    }
    if let Some(style) = options::item_style(ctx) {
        series["itemStyle"] = style;
    }

    let mut root = options::base(ctx);
    root.insert("series".into(), json!([series]));
    Ok(Some(Value::Object(root)))
}
