use serde_json::{json, Map, Value};

use crate::chart::context::BuildContext;
use crate::chart::error::ChartResult;
use crate::chart::options::{self, numbers, set_opt};

pub(super) fn series(ctx: &BuildContext<'_>, col: &str, values: &[f64]) -> Value {
    let line = &ctx.style().line;
    let mut s = Map::new();
    s.insert("type".into(), json!("line"));
    s.insert("name".into(), json!(ctx.series_name(col)));
    s.insert("data".into(), numbers(values));
    s.insert("label".into(), options::series_label(ctx, col, None));
    set_opt(&mut s, "stack", ctx.style().stack.clone().map(Value::String));
    s.insert("smooth".into(), json!(line.smooth));
    s.insert("step".into(), json!(line.step));
    s.insert("connectNulls".into(), json!(line.connect_nones));
    s.insert("symbol".into(), json!(line.symbol));
    s.insert("symbolSize".into(), options::symbol_size(ctx));
    s.insert("lineStyle".into(), options::line_style(ctx));
    set_opt(&mut s, "areaStyle", options::area_style(ctx));
    set_opt(&mut s, "markPoint", options::mark_point(ctx));
    set_opt(&mut s, "markLine", options::mark_line(ctx));
    set_opt(&mut s, "itemStyle", options::item_style(ctx));
    Value::Object(s)
}

pub fn build(ctx: &BuildContext<'_>) -> ChartResult<Option<Value>> {
    let mut series: Vec<Value> = ctx
        .data
        .series()
        .map(|(col, values)| series(ctx, col, values))
        .collect();
    options::apply_color_by(ctx, &mut series);

    let mut root = options::cartesian(ctx, options::category_x_axis(ctx), options::y_axis(ctx));
    root.insert("series".into(), Value::Array(series));
    Ok(Some(Value::Object(root)))
}
