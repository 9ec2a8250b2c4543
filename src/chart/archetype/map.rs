use serde_json::{json, Value};

use super::name_value_pairs;
use crate::chart::context::BuildContext;
use crate::chart::error::ChartResult;
use crate::chart::options::{self, set_opt};

pub fn build(ctx: &BuildContext<'_>) -> ChartResult<Option<Value>> {
    let Some((col, values)) = ctx.data.series().next() else {
        return Ok(None);
    };
    let mut root = options::base(ctx);
    set_opt(&mut root, "visualMap", options::visual_map(ctx));
    root.insert(
        "series".into(),
        json!([{
            "type": "map",
            "map": ctx.style().map_type,
            "name": ctx.series_name(col),
            "data": name_value_pairs(ctx, values),
            "label": options::series_label(ctx, col, None),
        }]),
    );
    Ok(Some(Value::Object(root)))
}
