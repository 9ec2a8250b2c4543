use serde_json::{json, Value};

use crate::chart::context::BuildContext;
use crate::chart::error::{ChartError, ChartResult};
use crate::chart::options;
use crate::data::number_value;

pub fn build(ctx: &BuildContext<'_>) -> ChartResult<Option<Value>> {
    let g = &ctx.style().gauge;
    if g.min >= g.max {
        return Err(ChartError::archetype(
            "gauge",
            format!("min ({}) must be below max ({})", g.min, g.max),
        ));
    }
    let primary = ctx.data.columns.first().map(String::as_str).unwrap_or_default();
    let value = ctx
        .data
        .values
        .first()
        .and_then(|v| v.first())
        .copied()
        .unwrap_or(0.0);
    let name = ctx
        .data
        .categories
        .first()
        .cloned()
        .unwrap_or_else(|| primary.to_string());

    let mut detail = options::series_label(ctx, primary, None);
    if detail["formatter"] == json!("{c}") {
        detail["formatter"] = json!("{value}");
    }

    let mut root = options::base(ctx);
    root.insert(
        "series".into(),
        json!([{
            "type": "gauge",
            "name": ctx.series_name(primary),
            "data": [{"name": name, "value": number_value(value)}],
            "min": number_value(g.min),
            "max": number_value(g.max),
            "splitNumber": number_value(g.split_number),
            "radius": g.radius,
            "startAngle": number_value(g.start_angle),
            "endAngle": number_value(g.end_angle),
            "detail": detail,
        }]),
    );
    Ok(Some(Value::Object(root)))
}
