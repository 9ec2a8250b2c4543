use serde_json::{json, Map, Value};
use tracing::debug;

use super::pictorial;
use crate::chart::context::BuildContext;
use crate::chart::error::ChartResult;
use crate::chart::options::{self, numbers, set_opt};

/// Symbols that keep a bar chart a plain bar chart.
const PLAIN_SYMBOLS: &[&str] = &["", "none", "emptycircle", "null"];

fn uses_pictorial(ctx: &BuildContext<'_>) -> bool {
    let symbol = ctx.style().line.symbol.to_lowercase();
    !PLAIN_SYMBOLS.contains(&symbol.as_str())
}

fn bar_item_style(ctx: &BuildContext<'_>) -> Option<Value> {
    let radius = ctx.style().bar.border_radius.clone();
    match (options::item_style(ctx), radius) {
        (Some(mut style), Some(r)) => {
            style["borderRadius"] = r;
            Some(style)
        }
        (None, Some(r)) => Some(json!({"borderRadius": r})),
        (style, None) => style,
    }
}

pub(super) fn series(ctx: &BuildContext<'_>, col: &str, values: &[f64]) -> Value {
    let bar = &ctx.style().bar;
    let mut s = Map::new();
    s.insert("type".into(), json!("bar"));
    s.insert("name".into(), json!(ctx.series_name(col)));
    s.insert("data".into(), numbers(values));
    s.insert("label".into(), options::series_label(ctx, col, None));
    set_opt(&mut s, "stack", ctx.style().stack.clone().map(Value::String));
    s.insert("barGap".into(), json!(bar.bar_gap));
    s.insert("barCategoryGap".into(), json!(bar.category_gap));
    set_opt(&mut s, "barWidth", bar.width.clone());
    set_opt(&mut s, "barMaxWidth", bar.max_width.clone());
    set_opt(&mut s, "barMinWidth", bar.min_width.clone());
    set_opt(&mut s, "markPoint", options::mark_point(ctx));
    set_opt(&mut s, "markLine", options::mark_line(ctx));
    set_opt(&mut s, "itemStyle", bar_item_style(ctx));
    if bar.realtime_sort {
        s.insert("realtimeSort".into(), json!(true));
    }
    Value::Object(s)
}

pub fn build(ctx: &BuildContext<'_>) -> ChartResult<Option<Value>> {
    let style = ctx.style();
    let pictorial = uses_pictorial(ctx);

    let mut data = ctx.data.clone();
    let percent = style.is_percent_stack() && !data.is_empty();
    if percent {
        data.normalize_percent();
    }
    debug!(
        stack = ?style.stack,
        percent,
        pictorial,
        reversal = style.bar.reversal_axis,
        "building bar chart"
    );

    let mut series: Vec<Value> = data
        .series()
        .map(|(col, values)| {
            if pictorial {
                let mut s = pictorial::series(ctx, col, values);
                s["barGap"] = json!(style.bar.bar_gap);
                s["barCategoryGap"] = json!(style.bar.category_gap);
                if let Some(obj) = s.as_object_mut() {
                    set_opt(obj, "markPoint", options::mark_point(ctx));
                    set_opt(obj, "markLine", options::mark_line(ctx));
                    set_opt(obj, "itemStyle", options::item_style(ctx));
                }
                s
            } else {
                series(ctx, col, values)
            }
        })
        .collect();
    options::apply_color_by(ctx, &mut series);

    let y_axis = if percent {
        options::percent_y_axis(ctx)
    } else {
        options::y_axis(ctx)
    };
    let mut root = options::cartesian(ctx, options::category_x_axis(ctx), y_axis);
    root.insert("series".into(), Value::Array(series));

    if style.bar.reversal_axis {
        swap_axes(&mut root);
    }
    Ok(Some(Value::Object(root)))
}

/// Exchange the finished x and y axis blocks.
pub(super) fn swap_axes(root: &mut Map<String, Value>) {
    let x = root.remove("xAxis");
    let y = root.remove("yAxis");
    set_opt(root, "xAxis", y);
    set_opt(root, "yAxis", x);
}
