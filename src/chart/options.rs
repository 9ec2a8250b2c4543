//! Option blocks shared by the archetypes: title, legend, tooltip, axes,
//! labels and the other global components.

use serde_json::{json, Map, Value};

use super::context::BuildContext;
use super::kind::ChartType;
use super::script::{
    formatter_value, js_formatter, matrix_tooltip, percent_tooltip, series_tooltip, FormatType,
    FormatterMode,
};
use crate::data::number_value;

/// Insert `value` under `key` when present.
pub fn set_opt(map: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(v) = value {
        map.insert(key.to_string(), v);
    }
}

/// Numbers for a series `data` array.
pub fn numbers(values: &[f64]) -> Value {
    Value::Array(values.iter().copied().map(number_value).collect())
}

pub fn title(ctx: &BuildContext<'_>) -> Value {
    let t = &ctx.style().title;
    json!({
        "show": t.show,
        "text": ctx.title(),
        "subtext": t.subtitle,
        "left": t.position,
        "textStyle": {"color": t.color, "fontSize": number_value(t.size)},
        "subtextStyle": {"color": t.subtitle_color, "fontSize": number_value(t.subtitle_size)},
    })
}

pub fn legend(ctx: &BuildContext<'_>) -> Value {
    let l = &ctx.style().legend;
    let mut legend = json!({
        "show": l.show,
        "type": l.kind,
        "orient": l.orient,
        "textStyle": {"fontSize": number_value(l.text_size), "color": l.text_color},
    });
    let placement = match l.position.as_str() {
        "bottom" => json!({"bottom": "10px", "left": "center"}),
        "left" => json!({"left": "left", "top": "middle"}),
        "right" => json!({"right": "10px", "top": "middle"}),
        "center" => json!({"left": "center", "top": "top"}),
        _ => json!({"top": "top", "left": "center"}),
    };
    if let (Some(obj), Value::Object(place)) = (legend.as_object_mut(), placement) {
        obj.extend(place);
    }
    legend
}

/// `axis` for cartesian archetypes, `item` otherwise. Matrix layouts always use `item`.
pub fn tooltip_trigger(ctx: &BuildContext<'_>) -> String {
    if ctx.kind() == ChartType::Heatmap || ctx.is_scatter_matrix() {
        return "item".to_string();
    }
    match &ctx.style().tooltip.trigger {
        Some(t) => t.clone(),
        None if ctx.kind().is_cartesian() => "axis".to_string(),
        None => "item".to_string(),
    }
}

pub fn tooltip(ctx: &BuildContext<'_>) -> Value {
    let t = &ctx.style().tooltip;
    let mut tooltip = json!({
        "show": t.show,
        "trigger": tooltip_trigger(ctx),
        "backgroundColor": t.background_color,
        "borderColor": t.border_color,
        "borderWidth": number_value(t.border_width),
        "textStyle": {"fontSize": number_value(t.text_size), "color": t.text_color},
    });
    if let Some(obj) = tooltip.as_object_mut() {
        set_opt(obj, "formatter", tooltip_formatter(ctx));
    }
    tooltip
}

fn format_entry(ctx: &BuildContext<'_>, key: &str) -> Option<Value> {
    let series = &ctx.style().series;
    let format = series.formats.get(key).copied().unwrap_or_default();
    let suffix = series
        .suffixes
        .get(key)
        .cloned()
        .unwrap_or_else(|| ctx.style().y_axis.suffix.clone());
    if format == FormatType::None && suffix.is_empty() {
        return None;
    }
    let mut entry = json!({"type": format.as_str(), "suffix": suffix});
    if format == FormatType::Custom {
        entry["script"] = json!(series.calculations.get(key).cloned().unwrap_or_default());
    }
    Some(entry)
}

/// Tooltip formatter honoring per-series formats and suffixes. `None`
/// leaves the client default in place.
pub fn tooltip_formatter(ctx: &BuildContext<'_>) -> Option<Value> {
    let style = ctx.style();
    if let Some(user) = &style.tooltip.formatter {
        return Some(formatter_value(user));
    }
    if style.is_percent_stack() {
        return Some(percent_tooltip().into());
    }

    let mut config = Map::new();
    for col in &ctx.data.columns {
        let key = ctx.override_key(col);
        if let Some(entry) = format_entry(ctx, key) {
            config.insert(ctx.series_name(col).to_string(), entry);
        }
    }
    let matrix = ctx.kind() == ChartType::Heatmap || ctx.is_scatter_matrix();
    if ctx.is_scatter_matrix() {
        if let Some(value_col) = ctx.descriptor.binding.single_value() {
            if let Some(entry) = format_entry(ctx, value_col) {
                config.insert(ctx.series_name(value_col).to_string(), entry);
            }
        }
    }

    let suffix = &style.y_axis.suffix;
    if config.is_empty() && suffix.is_empty() && ctx.kind() != ChartType::Heatmap {
        return None;
    }
    let f = if matrix {
        matrix_tooltip(&config, suffix)
    } else {
        series_tooltip(&config, suffix)
    };
    Some(f.into())
}

pub fn toolbox(ctx: &BuildContext<'_>) -> Value {
    json!({
        "show": ctx.style().toolbox_show,
        "feature": {
            "saveAsImage": {},
            "restore": {},
            "dataView": {"readOnly": false},
            "dataZoom": {},
            "magicType": {"type": ["line", "bar", "stack"]},
        },
    })
}

pub fn brush(ctx: &BuildContext<'_>) -> Option<Value> {
    let b = &ctx.style().brush;
    b.show
        .then(|| json!({"toolbox": [b.kind], "xAxisIndex": "all"}))
}

pub fn data_zoom(ctx: &BuildContext<'_>) -> Option<Value> {
    let z = &ctx.style().data_zoom;
    if !z.show {
        return None;
    }
    let zooms = if z.kind == "both" {
        vec![
            json!({"type": "slider", "orient": z.orient}),
            json!({"type": "inside", "orient": z.orient}),
        ]
    } else {
        vec![json!({"type": z.kind, "orient": z.orient})]
    };
    Some(Value::Array(zooms))
}

pub fn visual_map(ctx: &BuildContext<'_>) -> Option<Value> {
    let v = &ctx.style().visual_map;
    if !v.show {
        return None;
    }
    let in_range = if v.kind == "size" {
        json!({"symbolSize": [20, 50]})
    } else {
        json!({"color": ["#50a3ba", "#eac763", "#d94e5d"]})
    };
    Some(json!({
        "show": true,
        "type": "continuous",
        "min": number_value(v.min),
        "max": number_value(v.max),
        "calculable": true,
        "inRange": in_range,
    }))
}

pub fn grid(ctx: &BuildContext<'_>) -> Value {
    let g = &ctx.style().grid;
    let d = ctx.defaults;
    json!({
        "left": g.left.as_deref().unwrap_or(&d.grid_left),
        "right": g.right.as_deref().unwrap_or(&d.grid_right),
        "top": g.top.as_deref().unwrap_or(&d.grid_top),
        "bottom": g.bottom.as_deref().unwrap_or(&d.grid_bottom),
    })
}

pub fn x_axis(ctx: &BuildContext<'_>) -> Value {
    let a = &ctx.style().x_axis;
    json!({
        "type": a.kind,
        "name": a.name,
        "inverse": a.inverse,
        "boundaryGap": a.boundary_gap,
        "axisLabel": {
            "rotate": number_value(a.rotate),
            "fontSize": number_value(a.label_size),
            "color": ctx.text_color(&a.label_color),
            "formatter": ctx.x_axis_formatter(),
        },
        "splitLine": {"show": a.splitline_show.unwrap_or(false)},
        "axisLine": {"show": a.line_show, "onZero": a.line_on_zero},
        "axisTick": {"show": a.tick_show},
    })
}

/// Category axis carrying the shaped categories.
pub fn category_x_axis(ctx: &BuildContext<'_>) -> Value {
    let mut axis = x_axis(ctx);
    axis["data"] = json!(ctx.data.categories);
    axis
}

pub fn y_axis(ctx: &BuildContext<'_>) -> Value {
    let a = &ctx.style().y_axis;
    let mut axis = json!({
        "type": a.kind,
        "name": a.name,
        "inverse": a.inverse,
        "axisLabel": {
            "fontSize": number_value(a.label_size),
            "color": ctx.text_color(&a.label_color),
            "formatter": ctx.y_axis_formatter(),
        },
        "splitLine": {"show": a.splitline_show.unwrap_or(false)},
        "axisLine": {"show": a.line_show, "onZero": a.line_on_zero},
        "axisTick": {"show": a.tick_show},
    });
    if let Some(obj) = axis.as_object_mut() {
        set_opt(obj, "min", a.min.clone());
        set_opt(obj, "max", a.max.clone());
        if a.rotate != 0.0 {
            obj["axisLabel"]["rotate"] = number_value(a.rotate);
        }
    }
    axis
}

/// Value axis fixed to 0-100% for percent stacks.
pub fn percent_y_axis(ctx: &BuildContext<'_>) -> Value {
    let a = &ctx.style().y_axis;
    json!({
        "type": "value",
        "name": a.name,
        "min": 0,
        "max": 100,
        "axisLabel": {
            "fontSize": number_value(a.label_size),
            "color": ctx.text_color(&a.label_color),
            "formatter": "{value}%",
        },
        "splitLine": {"show": a.splitline_show.unwrap_or(false)},
    })
}

/// Chart-wide label block.
pub fn label(ctx: &BuildContext<'_>) -> Value {
    let l = &ctx.style().label;
    let mut label = json!({
        "show": l.show,
        "position": l.position,
        "formatter": ctx.label_formatter(),
    });
    if l.value_animation {
        label["valueAnimation"] = json!(true);
    }
    label
}

/// Label block for one series, applying that series' format, suffix and
/// label style. `default_format` replaces a plain chart-wide `{c}`.
pub fn series_label(ctx: &BuildContext<'_>, col: &str, default_format: Option<&str>) -> Value {
    let style = ctx.style();
    let key = ctx.override_key(col);
    let global_suffix = &style.y_axis.suffix;

    let format = style.series.formats.get(key).copied();
    let suffix = style.series.suffixes.get(key).unwrap_or(global_suffix);
    let own_style = style.series.label_styles.get(key);

    let show = own_style.and_then(|s| s.show).unwrap_or(style.label.show);
    let position = own_style
        .and_then(|s| s.position.clone())
        .unwrap_or_else(|| style.label.position.clone());

    let has_format = format.is_some_and(|f| f != FormatType::None);
    let mut out = if has_format || (!suffix.is_empty() && suffix != global_suffix) {
        let format = format.unwrap_or_default();
        let script = match format {
            FormatType::Custom => style.series.calculations.get(key).map(String::as_str).unwrap_or(""),
            _ => "",
        };
        json!({
            "show": show,
            "position": position,
            "formatter": js_formatter(format, script, suffix, FormatterMode::Series),
        })
    } else if own_style.is_some() {
        json!({"show": show, "position": position, "formatter": ctx.label_formatter()})
    } else if let Some(fmt) = default_format.filter(|_| ctx.label_formatter_is_plain()) {
        json!({"show": style.label.show, "position": style.label.position, "formatter": fmt})
    } else {
        return label(ctx);
    };

    if let (Some(obj), Some(own)) = (out.as_object_mut(), own_style) {
        set_opt(obj, "fontSize", own.size.map(number_value));
        set_opt(obj, "color", own.color.clone().map(Value::String));
    }
    if style.label.value_animation {
        out["valueAnimation"] = json!(true);
    }
    out
}

pub fn mark_point(ctx: &BuildContext<'_>) -> Option<Value> {
    let m = &ctx.style().mark;
    m.point_show.then(|| json!({"data": [{"type": m.point_type}]}))
}

pub fn mark_line(ctx: &BuildContext<'_>) -> Option<Value> {
    let m = &ctx.style().mark;
    m.line_show.then(|| json!({"data": [{"type": m.line_type}]}))
}

pub fn item_style(ctx: &BuildContext<'_>) -> Option<Value> {
    let i = &ctx.style().item;
    if i.is_empty() {
        return None;
    }
    let mut style = Map::new();
    set_opt(&mut style, "color", i.color.clone().map(Value::String));
    set_opt(&mut style, "borderColor", i.border_color.clone().map(Value::String));
    set_opt(&mut style, "borderWidth", i.border_width.map(number_value));
    set_opt(&mut style, "opacity", i.opacity.map(number_value));
    Some(Value::Object(style))
}

pub fn line_style(ctx: &BuildContext<'_>) -> Value {
    let l = &ctx.style().line;
    json!({"width": number_value(l.width), "type": l.line_type})
}

pub fn area_style(ctx: &BuildContext<'_>) -> Option<Value> {
    let l = &ctx.style().line;
    l.area_style
        .then(|| json!({"opacity": number_value(l.area_opacity)}))
}

/// `symbolSize` as configured; function source becomes a deferred script.
pub fn symbol_size(ctx: &BuildContext<'_>) -> Value {
    match &ctx.style().line.symbol_size {
        Some(Value::String(s)) => match s.trim().parse::<f64>() {
            Ok(n) => number_value(n),
            Err(_) => formatter_value(s),
        },
        Some(other) => other.clone(),
        None => json!(10),
    }
}

/// Options every archetype carries: background, palette, animation,
/// title, legend, tooltip and toolbox.
pub fn base(ctx: &BuildContext<'_>) -> Map<String, Value> {
    let style = ctx.style();
    let a = &style.animation;
    let mut root = Map::new();
    root.insert("backgroundColor".into(), json!(style.background_color));
    root.insert("color".into(), json!(ctx.colors()));
    root.insert("animation".into(), json!(a.enabled));
    root.insert("animationDuration".into(), number_value(a.duration));
    root.insert("animationEasing".into(), json!(a.easing));
    root.insert("animationDurationUpdate".into(), number_value(a.duration_update));
    root.insert("animationEasingUpdate".into(), json!(a.easing_update));
    root.insert("title".into(), title(ctx));
    root.insert("legend".into(), legend(ctx));
    root.insert("tooltip".into(), tooltip(ctx));
    root.insert("toolbox".into(), toolbox(ctx));
    root
}

/// [`base`] plus a grid, single x/y axes and the optional zoom, visual map
/// and brush components.
pub fn cartesian(ctx: &BuildContext<'_>, x_axis: Value, y_axis: Value) -> Map<String, Value> {
    let mut root = base(ctx);
    root.insert("grid".into(), grid(ctx));
    root.insert("xAxis".into(), json!([x_axis]));
    root.insert("yAxis".into(), json!([y_axis]));
    set_opt(&mut root, "dataZoom", data_zoom(ctx));
    set_opt(&mut root, "visualMap", visual_map(ctx));
    set_opt(&mut root, "brush", brush(ctx));
    root
}

/// Set `colorBy: data` on every series when configured.
pub fn apply_color_by(ctx: &BuildContext<'_>, series: &mut [Value]) {
    if ctx.style().color_by == "data" {
        for s in series {
            s["colorBy"] = json!("data");
        }
    }
}
