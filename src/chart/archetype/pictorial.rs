use serde_json::{json, Value};

use crate::chart::context::BuildContext;
use crate::chart::error::ChartResult;
use crate::chart::options::{self, numbers};

/// A `pictorialBar` series: bars drawn with repeated or stretched symbols.
pub(super) fn series(ctx: &BuildContext<'_>, col: &str, values: &[f64]) -> Value {
    let p = &ctx.style().pictorial;
    json!({
        "type": "pictorialBar",
        "name": ctx.series_name(col),
        "data": numbers(values),
        "label": options::series_label(ctx, col, None),
        "symbol": ctx.style().line.symbol,
        "symbolSize": options::symbol_size(ctx),
        "symbolRepeat": p.symbol_repeat,
        "symbolMargin": p.symbol_margin,
        "symbolClip": p.symbol_clip,
    })
}

pub fn build(ctx: &BuildContext<'_>) -> ChartResult<Option<Value>> {
    let mut series: Vec<Value> = ctx
        .data
        .series()
        .map(|(col, values)| series(ctx, col, values))
        .collect();
    options::apply_color_by(ctx, &mut series);

    let mut root = options::base(ctx);
    root.insert("grid".into(), options::grid(ctx));
    root.insert("xAxis".into(), json!([options::category_x_axis(ctx)]));
    root.insert("yAxis".into(), json!([options::y_axis(ctx)]));
    root.insert("series".into(), Value::Array(series));
    Ok(Some(Value::Object(root)))
}
