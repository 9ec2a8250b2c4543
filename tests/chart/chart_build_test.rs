use reportflow::chart::{build_from_config, ChartDefaults, ChartError, ChartSpec};
use reportflow::data::Record;
use serde_json::{json, Value};

fn records(value: Value) -> Vec<Record> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect()
}

fn spec(config: Value, rows: Value) -> ChartSpec {
    build_from_config(&config, &records(rows), &ChartDefaults::default())
        .unwrap()
        .unwrap()
}

fn build(config: Value, rows: Value) -> Value {
    spec(config, rows).into_value()
}

fn monthly() -> Value {
    json!([
        {"month": "Jan", "revenue": 100, "cost": 60},
        {"month": "Feb", "revenue": 150, "cost": 50},
        {"month": "Mar", "revenue": 0, "cost": 0}
    ])
}

#[test]
fn test_bar_series_per_value_column() {
    let out = build(
        json!({
            "type": "bar",
            "title": "Revenue vs cost",
            "x_axis": "month",
            "y_axis": ["revenue", "cost"],
            "series_names": {"revenue": "Revenue"},
            "colors": ["#5470c6", "#91cc75"]
        }),
        monthly(),
    );

    assert_eq!(out["title"]["text"], json!("Revenue vs cost"));
    assert_eq!(out["color"], json!(["#5470c6", "#91cc75"]));
    assert_eq!(out["xAxis"][0]["data"], json!(["Jan", "Feb", "Mar"]));
    assert_eq!(out["tooltip"]["trigger"], json!("axis"));

    let series = out["series"].as_array().unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series[0]["type"], json!("bar"));
    assert_eq!(series[0]["name"], json!("Revenue"));
    assert_eq!(series[0]["data"], json!([100, 150, 0]));
    assert_eq!(series[1]["name"], json!("cost"));
}

#[test]
fn test_line_pivot_fills_gaps() {
    let out = build(
        json!({
            "type": "line",
            "x_axis": "month",
            "y_axis": "units",
            "series_col": "store",
            "smooth": true,
            "area_style": true
        }),
        json!([
            {"month": "Jan", "store": "A", "units": 3},
            {"month": "Jan", "store": "B", "units": 4},
            {"month": "Feb", "store": "B", "units": "1,250"}
        ]),
    );

    assert_eq!(out["xAxis"][0]["data"], json!(["Jan", "Feb"]));
    let series = out["series"].as_array().unwrap();
    assert_eq!(series[0]["name"], json!("A"));
    assert_eq!(series[0]["data"], json!([3, 0]));
    assert_eq!(series[1]["name"], json!("B"));
    assert_eq!(series[1]["data"], json!([4, 1250]));
    assert_eq!(series[0]["smooth"], json!(true));
    assert_eq!(series[0]["areaStyle"]["opacity"], json!(0.5));
}

#[test]
fn test_percent_stack_sums_to_hundred() {
    let out = build(
        json!({
            "type": "bar",
            "x_axis": "q",
            "y_axis": ["a", "b"],
            "stack": true,
            "stack_strategy": "percent"
        }),
        json!([
            {"q": "Q1", "a": 1, "b": 3},
            {"q": "Q2", "a": 2, "b": 2},
            {"q": "Q3", "a": 0, "b": 0}
        ]),
    );

    let series = out["series"].as_array().unwrap();
    assert_eq!(series[0]["stack"], json!("stack1"));
    assert_eq!(series[0]["data"], json!([25, 50, 0]));
    assert_eq!(series[1]["data"], json!([75, 50, 0]));
    for i in 0..2 {
        let total = series[0]["data"][i].as_f64().unwrap() + series[1]["data"][i].as_f64().unwrap();
        assert_eq!(total, 100.0);
    }

    assert_eq!(out["yAxis"][0]["max"], json!(100));
    assert_eq!(out["yAxis"][0]["axisLabel"]["formatter"], json!("{value}%"));
    let tooltip = out["tooltip"]["formatter"].as_str().unwrap();
    assert!(tooltip.starts_with("__JSCODE__function(params)"));
    assert!(tooltip.contains("toFixed(2)"));
}

#[test]
fn test_plain_stack_keeps_values() {
    let out = build(
        json!({"type": "bar", "x_axis": "q", "y_axis": ["a", "b"], "stack": "total"}),
        json!([{"q": "Q1", "a": 1, "b": 3}]),
    );
    assert_eq!(out["series"][1]["stack"], json!("total"));
    assert_eq!(out["series"][1]["data"], json!([3]));
    assert!(out["tooltip"].get("formatter").is_none());
}

#[test]
fn test_reversal_moves_axes() {
    let out = build(
        json!({
            "type": "bar",
            "x_axis": "month",
            "y_axis": "revenue",
            "reversal_axis": true,
            "y_axis_inverse": true
        }),
        monthly(),
    );

    assert_eq!(out["xAxis"][0]["type"], json!("value"));
    assert_eq!(out["xAxis"][0]["inverse"], json!(true));
    assert_eq!(out["yAxis"][0]["type"], json!("category"));
    assert_eq!(out["yAxis"][0]["data"], json!(["Jan", "Feb", "Mar"]));
}

#[test]
fn test_user_axis_formatter_kept_without_format_type() {
    let out = build(
        json!({"x_axis": "month", "y_axis": "revenue", "y_axis_formatter": "{value} kg"}),
        monthly(),
    );
    assert_eq!(out["yAxis"][0]["axisLabel"]["formatter"], json!("{value} kg"));
}

#[test]
fn test_data_calculation_scales_values() {
    let out = build(
        json!({"x_axis": "month", "y_axis": "revenue", "data_calculation": "value / 100"}),
        monthly(),
    );
    assert_eq!(out["series"][0]["data"], json!([1, 1.5, 0]));
}

#[test]
fn test_hostile_calculations_keep_raw_values() {
    let nested = format!("{}value{}", "(".repeat(100_000), ")".repeat(100_000));
    let signs = format!("{}value", "-".repeat(120));
    let out = build(
        json!({
            "x_axis": "month",
            "y_axis": ["revenue", "cost"],
            "data_calculation": nested,
            "series_calculations": {"cost": signs},
            "x_data_calculation": "value // 0"
        }),
        monthly(),
    );
    assert_eq!(out["xAxis"][0]["data"], json!(["Jan", "Feb", "Mar"]));
    assert_eq!(out["series"][0]["data"], json!([100, 150, 0]));
    assert_eq!(out["series"][1]["data"], json!([60, 50, 0]));
}

#[test]
fn test_dump_unwraps_both_markers() {
    let spec = spec(
        json!({
            "x_axis": "month",
            "y_axis": "revenue",
            "format_type": "percent",
            "tooltip_formatter": "--x_x--0_0--function(p){ return p.name + \"!\"; }--x_x--0_0--"
        }),
        monthly(),
    );

    let raw = spec.as_value();
    assert!(raw["yAxis"][0]["axisLabel"]["formatter"]
        .as_str()
        .unwrap()
        .starts_with("__JSCODE__"));

    let text = spec.dump_options().unwrap();
    assert!(!text.contains("__JSCODE__"));
    assert!(!text.contains("--x_x--0_0--"));
    assert!(text.contains(
        r#""formatter":function(value){ try { return window.biFormatter.formatAxis(value, 'percent', ''); } catch(e) { return value; } }"#
    ));
    assert!(text.contains(r#""formatter":function(p){ return p.name + "!"; }"#));
}

#[test]
fn test_pie_uses_first_value_column() {
    let out = build(
        json!({"type": "pie", "title": "Mix", "x_axis": "month", "y_axis": ["revenue", "cost"]}),
        monthly(),
    );
    let series = out["series"].as_array().unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0]["name"], json!("revenue"));
    assert_eq!(series[0]["data"][1], json!({"name": "Feb", "value": 150}));
    assert_eq!(out["tooltip"]["trigger"], json!("item"));
}

#[test]
fn test_table_passes_rows_through() {
    let spec = spec(json!({"type": "table", "title": "Raw"}), monthly());
    assert!(spec.is_table());
    let out = spec.into_value();
    assert_eq!(out["headers"], json!(["month", "revenue", "cost"]));
    assert_eq!(out["rows"][1], json!(["Feb", "150", "50"]));
}

#[test]
fn test_unknown_chart_type() {
    let err = build_from_config(
        &json!({"type": "donut"}),
        &records(monthly()),
        &ChartDefaults::default(),
    )
    .unwrap_err();
    assert_eq!(err, ChartError::UnknownChartType("donut".to_string()));
}

#[test]
fn test_gauge_rejects_inverted_range() {
    let err = build_from_config(
        &json!({"type": "gauge", "min": 100, "max": 10}),
        &records(monthly()),
        &ChartDefaults::default(),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "gauge chart: min (100) must be below max (10)");
}

#[test]
fn test_non_object_config_is_invalid() {
    let err = build_from_config(&json!(["bar"]), &records(monthly()), &ChartDefaults::default())
        .unwrap_err();
    assert!(matches!(err, ChartError::InvalidDescriptor(_)));
}

#[test]
fn test_defaults_come_from_settings() {
    let defaults = ChartDefaults {
        palette: vec!["#000000".to_string()],
        ..ChartDefaults::default()
    };
    let out = build_from_config(
        &json!({"x_axis": "month", "y_axis": "revenue"}),
        &records(monthly()),
        &defaults,
    )
    .unwrap()
    .unwrap()
    .into_value();
    assert_eq!(out["color"], json!(["#000000"]));
}
