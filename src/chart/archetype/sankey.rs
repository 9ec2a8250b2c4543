use serde_json::{json, Value};

use super::graph::{edges, links, node_names};
use crate::chart::context::BuildContext;
use crate::chart::error::ChartResult;
use crate::chart::options;

pub fn build(ctx: &BuildContext<'_>) -> ChartResult<Option<Value>> {
    let Some(edges) = edges(ctx) else {
        return Ok(None);
    };
    let s = &ctx.style().sankey;
    let nodes: Vec<Value> = node_names(&edges)
        .into_iter()
        .map(|name| json!({"name": name}))
        .collect();

    let mut root = options::base(ctx);
    root.insert(
        "series".into(),
        json!([{
            "type": "sankey",
            "data": nodes,
            "links": links(&edges),
            "nodeAlign": s.node_align,
            "orient": s.orient,
            "label": options::label(ctx),
            "lineStyle": {"opacity": 0.2, "curveness": 0.5, "color": "source"},
        }]),
    );
    Ok(Some(Value::Object(root)))
}
