use serde_json::{json, Value};

use crate::chart::context::BuildContext;
use crate::chart::error::ChartResult;
use crate::chart::options;
use crate::data::display_value;

/// Bound category and value columns, or every column of the first row.
fn headers(ctx: &BuildContext<'_>) -> Vec<String> {
    let binding = &ctx.descriptor.binding;
    let mut headers: Vec<String> = binding.category.clone();
    headers.extend(binding.value_columns());
    if headers.is_empty() {
        headers = ctx
            .rows
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default();
    }
    headers
}

/// Plain tabular output: headers plus display strings, no chart options.
pub fn build(ctx: &BuildContext<'_>) -> ChartResult<Option<Value>> {
    let headers = headers(ctx);
    let rows: Vec<Vec<String>> = ctx
        .rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .map(|h| row.get(h).map(display_value).unwrap_or_default())
                .collect()
        })
        .collect();
    Ok(Some(json!({
        "type": "table",
        "title": options::title(ctx),
        "headers": headers,
        "rows": rows,
    })))
}
