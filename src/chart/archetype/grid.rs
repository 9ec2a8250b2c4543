//! Composite layouts: dual value axes, two stacked grids, or a basic bar grid.

use serde_json::{json, Map, Value};
use tracing::debug;

use super::{bar, line, scatter};
use crate::chart::context::BuildContext;
use crate::chart::error::ChartResult;
use crate::chart::options::{self, set_opt};
use crate::data::number_value;

const OVERLAP_TYPES: &[&str] = &["bar_line", "line_scatter"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    DualAxis,
    Vertical,
    Horizontal,
    Basic,
}

fn layout(ctx: &BuildContext<'_>) -> Layout {
    let g = &ctx.style().grid;
    match g.grid_type.as_str() {
        "vertical" => Layout::Vertical,
        "horizontal" => Layout::Horizontal,
        "multi_yaxis" => Layout::DualAxis,
        _ if OVERLAP_TYPES.contains(&g.overlap_type.as_str()) => Layout::DualAxis,
        _ if ctx.style().series.has_right_axis() => Layout::DualAxis,
        _ => Layout::Basic,
    }
}

pub fn build(ctx: &BuildContext<'_>) -> ChartResult<Option<Value>> {
    let layout = layout(ctx);
    debug!(?layout, series = ctx.data.columns.len(), "building grid chart");
    match layout {
        Layout::DualAxis => Ok(dual_axis(ctx)),
        Layout::Vertical | Layout::Horizontal => Ok(Some(split(ctx, layout))),
        Layout::Basic => Ok(Some(basic(ctx))),
    }
}

/// `{value}` templated with a suffix, the way dual-axis labels render it.
fn value_template(fmt: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        fmt.to_string()
    } else if fmt.contains("{value}") {
        fmt.replace("{value}", &format!("{{value}}{suffix}"))
    } else {
        format!("{{value}}{suffix}")
    }
}

/// Split columns between the left (0) and right (1) value axes.
fn split_axes<'a>(ctx: &'a BuildContext<'_>) -> (Vec<&'a str>, Vec<&'a str>) {
    let axis = &ctx.style().series.axis;
    let columns: Vec<&str> = ctx.data.columns.iter().map(String::as_str).collect();
    if axis.is_empty() {
        let (first, rest) = columns.split_at(1.min(columns.len()));
        return (first.to_vec(), rest.to_vec());
    }
    columns
        .into_iter()
        .partition(|col| axis.get(*col).map(String::as_str) != Some("right"))
}

fn series_kind(ctx: &BuildContext<'_>, col: &str, axis_index: usize) -> String {
    let style = ctx.style();
    let types = &style.series.types;
    if style.grid.grid_type == "multi_yaxis" && types.is_empty() && axis_index == 1 {
        return "line".to_string();
    }
    types
        .get(col)
        .or_else(|| types.get(ctx.series_name(col)))
        .or(style.grid.default_series_type.as_ref())
        .cloned()
        .unwrap_or_else(|| "bar".to_string())
}

fn dual_axis_series(ctx: &BuildContext<'_>, col: &str, axis_index: usize) -> Option<Value> {
    let values = ctx.data.column(col)?;
    let mut s = match series_kind(ctx, col, axis_index).as_str() {
        "line" => {
            let mut s = line::series(ctx, col, values);
            s["z"] = json!(10);
            s
        }
        "scatter" => scatter::series(ctx, col, values),
        _ => {
            let mut s = bar::series(ctx, col, values);
            s["z"] = json!(0);
            s
        }
    };
    s["yAxisIndex"] = json!(axis_index);
    Some(s)
}

fn dual_axis(ctx: &BuildContext<'_>) -> Option<Value> {
    let style = ctx.style();
    let defaults = ctx.defaults;
    let (left, right) = split_axes(ctx);

    let mut series: Vec<Value> = left
        .iter()
        .filter_map(|col| dual_axis_series(ctx, col, 0))
        .chain(right.iter().filter_map(|col| dual_axis_series(ctx, col, 1)))
        .collect();
    if series.is_empty() {
        return None;
    }
    options::apply_color_by(ctx, &mut series);

    let y = &style.y_axis;
    let primary_color = y
        .label_color
        .clone()
        .unwrap_or_else(|| defaults.primary_axis_color.clone());
    let primary_name = match (y.name.as_str(), left.first()) {
        ("", Some(col)) => ctx.series_name(col).to_string(),
        (name, _) => name.to_string(),
    };
    let mut primary = json!({
        "type": "value",
        "name": primary_name,
        "position": "left",
        "axisLine": {"lineStyle": {"color": primary_color}},
        "axisLabel": {
            "formatter": value_template(y.formatter.as_deref().unwrap_or("{value}"), &y.suffix),
            "fontSize": number_value(y.label_size),
            "color": primary_color,
        },
        "splitLine": {"show": y.splitline_show.unwrap_or(true)},
    });
    if let Some(obj) = primary.as_object_mut() {
        set_opt(obj, "min", y.min.clone());
        set_opt(obj, "max", y.max.clone());
    }
    let mut y_axes = vec![primary];

    if let Some(first_right) = right.first() {
        let y2 = &style.y2_axis;
        let color = y2
            .label_color
            .clone()
            .unwrap_or_else(|| defaults.secondary_axis_color.clone());
        let mut secondary = json!({
            "type": "value",
            "name": y2.name.clone().unwrap_or_else(|| ctx.series_name(first_right).to_string()),
            "position": "right",
            "axisLine": {"lineStyle": {"color": color}},
            "axisLabel": {
                "formatter": value_template(&y2.formatter, &y2.suffix),
                "fontSize": number_value(y2.label_size),
                "color": color,
            },
            "splitLine": {"show": y2.splitline_show},
        });
        if let Some(obj) = secondary.as_object_mut() {
            set_opt(obj, "min", y2.min.clone());
            set_opt(obj, "max", y2.max.clone());
        }
        y_axes.push(secondary);
    }

    let mut root = options::base(ctx);
    let mut tooltip = options::tooltip(ctx);
    tooltip["trigger"] = json!("axis");
    tooltip["axisPointer"] = json!({"type": "cross"});
    root.insert("tooltip".into(), tooltip);

    let mut grid = options::grid(ctx);
    grid["right"] = json!(style.grid.right.clone().unwrap_or_else(|| {
        if right.is_empty() {
            defaults.dual_axis_left.clone()
        } else {
            defaults.dual_axis_right.clone()
        }
    }));
    root.insert("grid".into(), grid);
    root.insert("xAxis".into(), json!([options::category_x_axis(ctx)]));
    root.insert("yAxis".into(), Value::Array(y_axes));
    set_opt(&mut root, "dataZoom", options::data_zoom(ctx));
    root.insert("series".into(), Value::Array(series));
    Some(Value::Object(root))
}

/// Bars in one grid, lines in the other.
fn split(ctx: &BuildContext<'_>, layout: Layout) -> Value {
    let columns = &ctx.data.columns;
    let mid = (columns.len() / 2).max(1).min(columns.len());
    let (first, second) = columns.split_at(mid);

    let grids = if layout == Layout::Vertical {
        json!([{"bottom": "60%"}, {"top": "60%"}])
    } else {
        json!([{"right": "55%"}, {"left": "55%"}])
    };

    let mut series = Vec::new();
    for (index, group) in [first, second].into_iter().enumerate() {
        for col in group {
            let Some(values) = ctx.data.column(col) else {
                continue;
            };
            let mut s = if index == 0 {
                bar::series(ctx, col, values)
            } else {
                line::series(ctx, col, values)
            };
            if let Some(obj) = s.as_object_mut() {
                obj.remove("stack");
            }
            s["xAxisIndex"] = json!(index);
            s["yAxisIndex"] = json!(index);
            series.push(s);
        }
    }
    options::apply_color_by(ctx, &mut series);

    let axes = |f: &dyn Fn() -> Value| -> Value {
        Value::Array(
            (0..2)
                .map(|i| {
                    let mut axis = f();
                    axis["gridIndex"] = json!(i);
                    axis
                })
                .collect(),
        )
    };

    let mut root = options::base(ctx);
    root.insert("grid".into(), grids);
    root.insert("xAxis".into(), axes(&|| options::category_x_axis(ctx)));
    root.insert("yAxis".into(), axes(&|| options::y_axis(ctx)));
    root.insert("series".into(), Value::Array(series));
    Value::Object(root)
}

fn basic(ctx: &BuildContext<'_>) -> Value {
    let mut series: Vec<Value> = ctx
        .data
        .series()
        .map(|(col, values)| bar::series(ctx, col, values))
        .collect();
    options::apply_color_by(ctx, &mut series);

    let mut root: Map<String, Value> =
        options::cartesian(ctx, options::category_x_axis(ctx), options::y_axis(ctx));
    root.insert("series".into(), Value::Array(series));
    Value::Object(root)
}
