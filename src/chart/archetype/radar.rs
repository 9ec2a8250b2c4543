use serde_json::{json, Value};

use crate::chart::context::BuildContext;
use crate::chart::error::ChartResult;
use crate::chart::options::{self, numbers, set_opt};
use crate::data::number_value;

pub fn build(ctx: &BuildContext<'_>) -> ChartResult<Option<Value>> {
    let radar = &ctx.style().radar;
    let max = ctx.data.max_value().unwrap_or(100.0);
    let indicator: Vec<Value> = ctx
        .data
        .categories
        .iter()
        .map(|name| json!({"name": name, "max": number_value(max)}))
        .collect();

    let series: Vec<Value> = ctx
        .data
        .series()
        .map(|(col, values)| {
            let mut s = json!({
                "type": "radar",
                "name": ctx.series_name(col),
                "data": [{"name": ctx.series_name(col), "value": numbers(values)}],
                "label": options::series_label(ctx, col, None),
                "lineStyle": options::line_style(ctx),
                "symbol": ctx.style().line.symbol,
                "symbolSize": options::symbol_size(ctx),
            });
            if let Some(obj) = s.as_object_mut() {
                set_opt(obj, "areaStyle", options::area_style(ctx));
            }
            s
        })
        .collect();

    let mut root = options::base(ctx);
    root.insert(
        "radar".into(),
        json!({
            "indicator": indicator,
            "shape": radar.shape,
            "splitLine": {"show": radar.splitline_show},
            "splitArea": {"show": radar.splitarea_show, "areaStyle": {"opacity": 1}},
        }),
    );
    root.insert("series".into(), Value::Array(series));
    Ok(Some(Value::Object(root)))
}
