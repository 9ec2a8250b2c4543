use reportflow::aggregate::{aggregate, aggregate_by, AggregateOp, AggregateSpec};
use reportflow::chart::{self, ChartDefaults, ChartDescriptor, TimelineGuard};
use reportflow::data::{Record, ResultSet};
use serde_json::{json, Value};

fn records(value: Value) -> Vec<Record> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect()
}

fn as_json(rows: Vec<Record>) -> Value {
    Value::Array(rows.into_iter().map(Value::Object).collect())
}

#[test]
fn test_sum_of_formatted_strings() {
    let rows = records(json!([
        {"region": "North", "sales": "1,000"},
        {"region": "North", "sales": "500"},
        {"region": "South", "sales": 250.5}
    ]));
    let out = aggregate(rows, Some("region"), &["sales".to_string()], Some(AggregateOp::Sum), None);
    assert_eq!(
        as_json(out),
        json!([
            {"region": "North", "sales": 1500},
            {"region": "South", "sales": 250.5}
        ])
    );
}

#[test]
fn test_non_numeric_cells_count_as_zero() {
    let rows = records(json!([
        {"k": "a", "v": "n/a"},
        {"k": "a", "v": null},
        {"k": "a", "v": 4},
        {"k": "a"}
    ]));
    let mean = aggregate(rows, Some("k"), &["v".to_string()], Some(AggregateOp::Mean), None);
    assert_eq!(as_json(mean), json!([{"k": "a", "v": 1}]));
}

#[test]
fn test_null_group_keys_form_their_own_group() {
    let rows = records(json!([
        {"k": null, "v": 1},
        {"k": "x", "v": 2},
        {"k": null, "v": 3}
    ]));
    let out = aggregate(rows, Some("k"), &["v".to_string()], Some(AggregateOp::Sum), None);
    assert_eq!(as_json(out), json!([{"k": null, "v": 4}, {"k": "x", "v": 2}]));
}

#[test]
fn test_series_column_equal_to_group_is_ignored() {
    let rows = records(json!([{"k": "a", "v": 1}, {"k": "a", "v": 2}]));
    let out = aggregate(rows, Some("k"), &["v".to_string()], Some(AggregateOp::Sum), Some("k"));
    assert_eq!(as_json(out), json!([{"k": "a", "v": 3}]));
}

#[test]
fn test_spec_from_chart_binding() {
    let descriptor = ChartDescriptor::from_value(&json!({
        "type": "bar",
        "x_axis": "month",
        "y_axis": ["revenue", "cost"],
        "aggregation": "avg"
    }))
    .unwrap();
    let binding = &descriptor.binding;
    let spec = AggregateSpec {
        group_cols: binding.category.clone(),
        value_cols: binding.value_columns(),
        op: binding.aggregation,
        series_col: binding.series.clone(),
    };

    let rows = records(json!([
        {"month": "Jan", "revenue": 10, "cost": 4},
        {"month": "Jan", "revenue": 20, "cost": 6},
        {"month": "Feb", "revenue": 5, "cost": 1}
    ]));
    assert_eq!(
        as_json(spec.apply(rows)),
        json!([
            {"month": "Jan", "revenue": 15, "cost": 5},
            {"month": "Feb", "revenue": 5, "cost": 1}
        ])
    );
}

#[test]
fn test_composite_category_groups_on_every_column() {
    let rows = records(json!([
        {"year": 2023, "month": "Jan", "sales": 1},
        {"year": 2024, "month": "Jan", "sales": 2},
        {"year": 2024, "month": "Jan", "sales": 3},
        {"year": 2023, "month": "Feb", "sales": 4}
    ]));
    let keys = vec!["year".to_string(), "month".to_string()];
    let out = aggregate_by(rows.clone(), &keys, &["sales".to_string()], Some(AggregateOp::Sum), None);
    assert_eq!(
        as_json(out),
        json!([
            {"year": 2023, "month": "Jan", "sales": 1},
            {"year": 2024, "month": "Jan", "sales": 5},
            {"year": 2023, "month": "Feb", "sales": 4}
        ])
    );

    let missing = vec!["year".to_string(), "quarter".to_string()];
    assert_eq!(
        aggregate_by(rows.clone(), &missing, &["sales".to_string()], Some(AggregateOp::Sum), None),
        rows
    );
}

#[test]
fn test_aggregated_rows_feed_the_chart() {
    let result = ResultSet::new(
        vec!["month".into(), "region".into(), "sales".into()],
        vec![
            vec![json!("Jan"), json!("East"), json!("1,200")],
            vec![json!("Jan"), json!("East"), json!(300)],
            vec![json!("Jan"), json!("West"), json!(100)],
            vec![json!("Feb"), json!("West"), json!(50)],
        ],
    );
    let descriptor = ChartDescriptor::from_value(&json!({
        "type": "bar",
        "x_axis": "month",
        "y_axis": "sales",
        "series_col": "region",
        "aggregation": "sum"
    }))
    .unwrap();
    let binding = &descriptor.binding;
    let rows = aggregate(
        result.to_records(),
        binding.category_col(),
        &binding.value_columns(),
        binding.aggregation,
        binding.series.as_deref(),
    );
    assert_eq!(rows.len(), 3);

    let spec = chart::build(&descriptor, &rows, &ChartDefaults::default(), TimelineGuard::default())
        .unwrap()
        .unwrap();
    let options = spec.as_value();
    assert_eq!(options["xAxis"][0]["data"], json!(["Jan", "Feb"]));
    assert_eq!(options["series"][0]["name"], json!("East"));
    assert_eq!(options["series"][0]["data"], json!([1500, 0]));
    assert_eq!(options["series"][1]["name"], json!("West"));
    assert_eq!(options["series"][1]["data"], json!([100, 50]));
}
