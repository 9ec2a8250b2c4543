use serde_json::{json, Value};

use super::name_value_pairs;
use crate::chart::context::BuildContext;
use crate::chart::error::ChartResult;
use crate::chart::options::{self, set_opt};

pub fn build(ctx: &BuildContext<'_>) -> ChartResult<Option<Value>> {
    let Some((col, values)) = ctx.data.series().next() else {
        return Ok(None);
    };
    let name = ctx
        .style()
        .series
        .names
        .get(col)
        .cloned()
        .unwrap_or_else(|| "Funnel".to_string());

    let mut root = options::base(ctx);
    root.insert(
        "series".into(),
        json!([{
            "type": "funnel",
            "name": name,
            "data": name_value_pairs(ctx, values),
            "gap": 2,
            "sort": ctx.style().funnel_sort,
            "label": options::series_label(ctx, col, None),
        }]),
    );
    set_opt(&mut root, "visualMap", options::visual_map(ctx));
    Ok(Some(Value::Object(root)))
}
