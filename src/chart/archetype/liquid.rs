use serde_json::{json, Value};

use crate::chart::context::BuildContext;
use crate::chart::error::ChartResult;
use crate::chart::options;
use crate::data::number_value;

/// Fill level in `0..=1`; sums between 1 and 100 are read as percentages.
fn fill_level(total: f64) -> f64 {
    if total > 1.0 && total <= 100.0 {
        total / 100.0
    } else {
        total
    }
}

pub fn build(ctx: &BuildContext<'_>) -> ChartResult<Option<Value>> {
    let Some((col, values)) = ctx.data.series().next() else {
        return Ok(None);
    };
    let l = &ctx.style().liquid;
    let name = ctx
        .style()
        .series
        .names
        .get(col)
        .cloned()
        .unwrap_or_else(|| "Liquid".to_string());

    let mut root = options::base(ctx);
    root.insert(
        "series".into(),
        json!([{
            "type": "liquidFill",
            "name": name,
            "data": [number_value(fill_level(values.iter().sum()))],
            "shape": l.shape,
            "outline": {"show": l.outline_show},
            "waveAnimation": l.animation,
            "label": options::series_label(ctx, col, None),
        }]),
    );
    Ok(Some(Value::Object(root)))
}
