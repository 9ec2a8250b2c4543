//! Grid layouts, grid promotion and timeline mode.

use reportflow::chart::{self, build_from_config, ChartDefaults, ChartDescriptor, TimelineGuard};
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

fn build(config: Value, rows: Value) -> Value {
    build_from_config(&config, &records(rows), &ChartDefaults::default())
        .unwrap()
        .unwrap()
        .into_value()
}

fn quarterly() -> Value {
    json!([
        {"q": "Q1", "revenue": 120, "margin": 12.5, "orders": 30, "returns": 2},
        {"q": "Q2", "revenue": 180, "margin": 15, "orders": 41, "returns": 5}
    ])
}

fn types(series: &Value) -> Vec<&str> {
    series
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["type"].as_str().unwrap())
        .collect()
}

#[test]
fn test_dual_axis_grid() {
    let out = build(
        json!({
            "type": "grid",
            "x_axis": "q",
            "y_axis": ["revenue", "margin"],
            "series_types": {"margin": "line"},
            "series_axis": {"margin": "right"},
            "y2_axis_suffix": "%"
        }),
        quarterly(),
    );

    let series = &out["series"];
    assert_eq!(types(series), vec!["bar", "line"]);
    assert_eq!(series[0]["yAxisIndex"], json!(0));
    assert_eq!(series[0]["z"], json!(0));
    assert_eq!(series[1]["yAxisIndex"], json!(1));
    assert_eq!(series[1]["z"], json!(10));
    assert_eq!(series[1]["data"], json!([12.5, 15]));

    let y_axes = out["yAxis"].as_array().unwrap();
    assert_eq!(y_axes.len(), 2);
    assert_eq!(y_axes[0]["position"], json!("left"));
    assert_eq!(y_axes[0]["name"], json!("revenue"));
    assert_eq!(y_axes[0]["axisLine"]["lineStyle"]["color"], json!("#5793f3"));
    assert_eq!(y_axes[1]["position"], json!("right"));
    assert_eq!(y_axes[1]["name"], json!("margin"));
    assert_eq!(y_axes[1]["axisLabel"]["formatter"], json!("{value}%"));
    assert_eq!(y_axes[1]["axisLine"]["lineStyle"]["color"], json!("#d14a61"));

    assert_eq!(out["grid"]["right"], json!("20%"));
    assert_eq!(out["tooltip"]["trigger"], json!("axis"));
    assert_eq!(out["tooltip"]["axisPointer"]["type"], json!("cross"));
    assert_eq!(out["xAxis"][0]["data"], json!(["Q1", "Q2"]));
}

#[test]
fn test_multi_yaxis_puts_rest_on_right_as_lines() {
    let out = build(
        json!({
            "type": "grid",
            "grid_type": "multi_yaxis",
            "x_axis": "q",
            "y_axis": ["revenue", "orders", "returns"]
        }),
        quarterly(),
    );
    let series = &out["series"];
    assert_eq!(types(series), vec!["bar", "line", "line"]);
    assert_eq!(series[2]["yAxisIndex"], json!(1));
    assert_eq!(out["yAxis"][1]["name"], json!("orders"));
}

#[test]
fn test_dual_axis_without_right_series() {
    let out = build(
        json!({"type": "grid", "x_axis": "q", "y_axis": ["revenue"], "grid_right": "8%"}),
        quarterly(),
    );
    assert_eq!(out["yAxis"].as_array().unwrap().len(), 1);
    assert_eq!(out["grid"]["right"], json!("8%"));
}

#[test]
fn test_vertical_split() {
    let out = build(
        json!({
            "type": "grid",
            "grid_type": "vertical",
            "title": "Split",
            "x_axis": "q",
            "y_axis": ["revenue", "margin", "orders", "returns"],
            "stack": true
        }),
        quarterly(),
    );

    assert_eq!(out["title"]["text"], json!("Split"));
    assert_eq!(out["grid"], json!([{"bottom": "60%"}, {"top": "60%"}]));
    let series = &out["series"];
    assert_eq!(types(series), vec!["bar", "bar", "line", "line"]);
    assert_eq!(series[1]["xAxisIndex"], json!(0));
    assert_eq!(series[2]["xAxisIndex"], json!(1));
    assert_eq!(series[3]["yAxisIndex"], json!(1));
    assert!(series[0].get("stack").is_none());

    assert_eq!(out["xAxis"][1]["gridIndex"], json!(1));
    assert_eq!(out["xAxis"][1]["data"], json!(["Q1", "Q2"]));
    assert_eq!(out["yAxis"][0]["gridIndex"], json!(0));
}

#[test]
fn test_horizontal_split_with_one_column() {
    let out = build(
        json!({"type": "grid", "grid_type": "horizontal", "x_axis": "q", "y_axis": ["revenue"]}),
        quarterly(),
    );
    assert_eq!(out["grid"], json!([{"right": "55%"}, {"left": "55%"}]));
    assert_eq!(types(&out["series"]), vec!["bar"]);
}

#[test]
fn test_basic_grid() {
    let out = build(
        json!({"type": "grid", "overlap_type": "none", "x_axis": "q", "y_axis": ["revenue", "orders"]}),
        quarterly(),
    );
    assert_eq!(types(&out["series"]), vec!["bar", "bar"]);
    assert_eq!(out["xAxis"].as_array().unwrap().len(), 1);
    assert!(out["series"][0].get("yAxisIndex").is_none());
}

#[test]
fn test_bar_with_right_axis_is_promoted() {
    let out = build(
        json!({
            "type": "bar",
            "x_axis": "q",
            "y_axis": ["revenue", "orders"],
            "series_axis": {"orders": "right"}
        }),
        quarterly(),
    );
    assert_eq!(types(&out["series"]), vec!["bar", "bar"]);
    assert_eq!(out["series"][1]["yAxisIndex"], json!(1));
    assert_eq!(out["yAxis"].as_array().unwrap().len(), 2);
}

#[test]
fn test_scatter_promotion_keeps_scatter_series() {
    let out = build(
        json!({
            "type": "scatter",
            "x_axis": "q",
            "y_axis": ["revenue", "margin"],
            "series_axis": {"margin": "right"}
        }),
        quarterly(),
    );
    assert_eq!(types(&out["series"]), vec!["scatter", "scatter"]);
    assert_eq!(out["series"][1]["yAxisIndex"], json!(1));
}

#[test]
fn test_pie_is_never_promoted() {
    let out = build(
        json!({"type": "pie", "x_axis": "q", "y_axis": "revenue", "series_axis": {"revenue": "right"}}),
        quarterly(),
    );
    assert_eq!(types(&out["series"]), vec!["pie"]);
    assert!(out.get("yAxis").is_none());
}

#[test]
fn test_timeline_frames_per_time_point() {
    let rows = json!([
        {"year": 2023, "region": "East", "sales": 10},
        {"year": 2022, "region": "East", "sales": 7},
        {"year": 2023, "region": "West", "sales": 4},
        {"year": 2022, "region": "West", "sales": 9},
        {"year": 2023, "region": "North", "sales": 1}
    ]);
    let out = build(
        json!({
            "type": "bar",
            "title": "Sales",
            "x_axis": "region",
            "y_axis": "sales",
            "timeline_field": "year",
            "timeline_play_interval": 2500,
            "timeline_auto_play": false
        }),
        rows,
    );

    let timeline = &out["baseOption"]["timeline"];
    assert_eq!(timeline["axisType"], json!("category"));
    assert_eq!(timeline["autoPlay"], json!(false));
    assert_eq!(timeline["loop"], json!(true));
    assert_eq!(timeline["playInterval"], json!(2500));
    assert_eq!(timeline["data"], json!(["2022", "2023"]));

    let frames = out["options"].as_array().unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0]["title"]["text"], json!("Sales - 2022"));
    assert_eq!(frames[0]["xAxis"][0]["data"], json!(["East", "West"]));
    assert_eq!(frames[0]["series"][0]["data"], json!([7, 9]));
    assert_eq!(frames[1]["title"]["text"], json!("Sales - 2023"));
    assert_eq!(frames[1]["series"][0]["data"], json!([10, 4, 1]));
}

#[test]
fn test_timeline_frames_can_be_composite() {
    let out = build(
        json!({
            "type": "line",
            "title": "KPIs",
            "x_axis": "q",
            "y_axis": ["revenue", "margin"],
            "series_axis": {"margin": "right"},
            "timeline_field": "year"
        }),
        json!([
            {"year": "2024", "q": "Q1", "revenue": 1, "margin": 2},
            {"year": "2024", "q": "Q2", "revenue": 3, "margin": 4}
        ]),
    );
    let frame = &out["options"][0];
    assert_eq!(types(&frame["series"]), vec!["line", "line"]);
    assert_eq!(frame["series"][1]["yAxisIndex"], json!(1));
    assert_eq!(frame["title"]["text"], json!("KPIs - 2024"));
}

#[test]
fn test_null_time_point_sorts_first() {
    let out = build(
        json!({"x_axis": "c", "y_axis": "v", "timeline_field": "t"}),
        json!([{"t": "b", "c": "x", "v": 1}, {"t": null, "c": "y", "v": 2}]),
    );
    assert_eq!(out["baseOption"]["timeline"]["data"], json!(["", "b"]));
    assert_eq!(out["options"][0]["series"][0]["data"], json!([2]));
}

#[test]
fn test_frames_do_not_nest_timelines() {
    let descriptor = ChartDescriptor::from_value(&json!({
        "x_axis": "c",
        "y_axis": "v",
        "timeline_field": "t"
    }))
    .unwrap();
    let rows = records(json!([{"t": 1, "c": "x", "v": 1}]));

    let outer = chart::build(&descriptor, &rows, &ChartDefaults::default(), TimelineGuard::new(2))
        .unwrap()
        .unwrap();
    assert!(outer.is_timeline());
    assert!(outer.as_value()["options"][0].get("baseOption").is_none());

    let flat = chart::build(&descriptor, &rows, &ChartDefaults::default(), TimelineGuard::exhausted())
        .unwrap()
        .unwrap();
    assert!(!flat.is_timeline());
}
