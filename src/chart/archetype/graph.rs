use serde_json::{json, Value};

use super::category_column;
use crate::chart::calc::parse_number;
use crate::chart::context::BuildContext;
use crate::chart::error::ChartResult;
use crate::chart::options;
use crate::data::{display_value, number_value, Record};

/// Source, target and weight of one edge row. Missing weights count as 1.
pub(super) struct Edge {
    pub source: String,
    pub target: String,
    pub value: f64,
}

/// Edges read from the category column (source), the first value column
/// (target) and the second value column (weight).
pub(super) fn edges(ctx: &BuildContext<'_>) -> Option<Vec<Edge>> {
    let source_col = category_column(ctx)?;
    let target_col = ctx.data.columns.first()?;
    let weight_col = ctx.data.columns.get(1);
    let cell = |row: &Record, col: &str| row.get(col).map(display_value).unwrap_or_default();
    Some(
        ctx.rows
            .iter()
            .map(|row| Edge {
                source: cell(row, &source_col),
                target: cell(row, target_col),
                value: weight_col
                    .and_then(|c| row.get(c))
                    .and_then(parse_number)
                    .unwrap_or(1.0),
            })
            .collect(),
    )
}

/// Node names in first-seen order.
pub(super) fn node_names(edges: &[Edge]) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for e in edges {
        for name in [e.source.as_str(), e.target.as_str()] {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

pub(super) fn links(edges: &[Edge]) -> Value {
    Value::Array(
        edges
            .iter()
            .map(|e| json!({"source": e.source, "target": e.target, "value": number_value(e.value)}))
            .collect(),
    )
}

pub fn build(ctx: &BuildContext<'_>) -> ChartResult<Option<Value>> {
    let Some(edges) = edges(ctx) else {
        return Ok(None);
    };
    let g = &ctx.style().graph;
    let symbol_size = options::symbol_size(ctx);
    let nodes: Vec<Value> = node_names(&edges)
        .into_iter()
        .map(|name| {
            json!({
                "name": name,
                "symbolSize": symbol_size,
                "symbol": ctx.style().line.symbol,
            })
        })
        .collect();

    let mut root = options::base(ctx);
    root.insert(
        "series".into(),
        json!([{
            "type": "graph",
            "layout": g.layout,
            "data": nodes,
            "links": links(&edges),
            "roam": true,
            "label": options::label(ctx),
            "force": {
                "repulsion": number_value(g.repulsion),
                "gravity": number_value(g.gravity),
                "edgeLength": number_value(g.edge_length),
            },
        }]),
    );
    Ok(Some(Value::Object(root)))
}
