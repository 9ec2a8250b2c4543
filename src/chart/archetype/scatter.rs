use serde_json::{json, Map, Value};

use crate::chart::calc::parse_number;
use crate::chart::context::BuildContext;
use crate::chart::error::ChartResult;
use crate::chart::options::{self, numbers, set_opt};
use crate::chart::script::{matrix_label, matrix_symbol_size, FormatType};
use crate::data::number_value;

pub(super) fn series(ctx: &BuildContext<'_>, col: &str, values: &[f64]) -> Value {
    let mut s = Map::new();
    s.insert("type".into(), json!("scatter"));
    s.insert("name".into(), json!(ctx.series_name(col)));
    s.insert("data".into(), numbers(values));
    s.insert("label".into(), options::series_label(ctx, col, None));
    s.insert("symbol".into(), json!(ctx.style().line.symbol));
    s.insert("symbolSize".into(), options::symbol_size(ctx));
    set_opt(&mut s, "markPoint", options::mark_point(ctx));
    set_opt(&mut s, "markLine", options::mark_line(ctx));
    set_opt(&mut s, "itemStyle", options::item_style(ctx));
    Value::Object(s)
}

pub fn build(ctx: &BuildContext<'_>) -> ChartResult<Option<Value>> {
    if ctx.is_scatter_matrix() {
        return Ok(Some(matrix(ctx)));
    }
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

/// Punch card: categories across, series down, symbol size by value.
fn matrix(ctx: &BuildContext<'_>) -> Value {
    let style = ctx.style();
    let data = &ctx.data;
    let value_col = ctx.descriptor.binding.single_value();

    let name = match value_col {
        Some(col) => ctx.series_name(col).to_string(),
        None => ctx.defaults.placeholder_series_name.clone(),
    };

    let points: Vec<Value> = data
        .values
        .iter()
        .enumerate()
        .flat_map(|(j, series)| {
            series
                .iter()
                .enumerate()
                .map(move |(i, v)| json!([i, j, number_value(*v)]))
        })
        .collect();

    let default_size = style
        .line
        .symbol_size
        .as_ref()
        .map_or(true, |v| parse_number(v) == Some(10.0));
    let symbol_size = if default_size {
        let max = data.max_value().filter(|m| *m != 0.0).unwrap_or(1.0);
        matrix_symbol_size(style.min_symbol_size, style.max_symbol_size, max).into()
    } else {
        options::symbol_size(ctx)
    };

    let label_formatter = if ctx.label_formatter_is_plain() {
        let format = value_col.and_then(|col| {
            let f = style.series.formats.get(col).copied()?;
            let suffix = style
                .series
                .suffixes
                .get(col)
                .map(String::as_str)
                .unwrap_or(&style.y_axis.suffix);
            Some((f, suffix))
        });
        matrix_label(format.filter(|(f, _)| *f != FormatType::None)).into()
    } else {
        ctx.label_formatter()
    };

    let mut x_axis = options::category_x_axis(ctx);
    x_axis["type"] = json!("category");
    let mut y_axis = options::y_axis(ctx);
    y_axis["type"] = json!("category");
    y_axis["data"] = json!(data.columns);

    let mut root = options::cartesian(ctx, x_axis, y_axis);
    root.insert(
        "series".into(),
        json!([{
            "type": "scatter",
            "name": name,
            "data": points,
            "symbolSize": symbol_size,
            "label": {
                "show": true,
                "position": style.label.position,
                "formatter": label_formatter,
            },
        }]),
    );
    Value::Object(root)
}
