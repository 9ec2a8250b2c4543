//! Row filters applied around caller SQL.
//!
//! A filter is `{col, op, val}`. Values that parse as numbers are emitted
//! bare; everything else becomes a single-quoted literal with embedded quotes
//! doubled. Column names are emitted as given.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::dialect::SqlDialect;
use crate::data::display_value;

/// Comparison applied by a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
    Contains,
    #[serde(rename = "startswith")]
    StartsWith,
    #[serde(rename = "endswith")]
    EndsWith,
    IsNull,
    IsNotNull,
}

impl FilterOp {
    /// Operator token for the plain comparisons.
    fn comparison(&self) -> Option<&'static str> {
        match self {
            FilterOp::Eq => Some("="),
            FilterOp::Ne => Some("!="),
            FilterOp::Gt => Some(">"),
            FilterOp::Lt => Some("<"),
            FilterOp::Gte => Some(">="),
            FilterOp::Lte => Some("<="),
            _ => None,
        }
    }
}

/// One column filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(alias = "column")]
    pub col: String,
    pub op: FilterOp,
    #[serde(default, alias = "value")]
    pub val: Value,
}

impl Filter {
    pub fn new(col: impl Into<String>, op: FilterOp, val: impl Into<Value>) -> Self {
        Self {
            col: col.into(),
            op,
            val: val.into(),
        }
    }

    /// Render this filter as a boolean SQL condition.
    ///
    /// Returns `None` when the filter names no column.
    pub fn to_condition(&self, dialect: &dyn SqlDialect) -> Option<String> {
        let col = self.col.trim();
        if col.is_empty() {
            return None;
        }

        let text = display_value(&self.val);
        let escaped = text.replace('\'', "''");

        let condition = match self.op {
            FilterOp::IsNull => format!("{} IS NULL", col),
            FilterOp::IsNotNull => format!("{} IS NOT NULL", col),
            FilterOp::Contains => format!("{} LIKE '%{}%'", col, escaped),
            FilterOp::StartsWith => format!("{} LIKE '{}%'", col, escaped),
            FilterOp::EndsWith => format!("{} LIKE '%{}'", col, escaped),
            op => {
                let symbol = op.comparison().unwrap_or("=");
                format!("{} {} {}", col, symbol, literal(&text, dialect))
            }
        };
        Some(condition)
    }
}

/// Numeric-looking text is emitted bare, anything else quoted.
fn literal(text: &str, dialect: &dyn SqlDialect) -> String {
    let trimmed = text.trim();
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => trimmed.to_string(),
        _ => dialect.quote_string(text),
    }
}

/// Render every usable filter, in order.
pub fn build_conditions(filters: &[Filter], dialect: &dyn SqlDialect) -> Vec<String> {
    filters
        .iter()
        .filter_map(|f| f.to_condition(dialect))
        .collect()
}

/// Parse a filter list leniently: malformed entries are skipped with a warning.
pub fn parse_filters(value: &Value) -> Vec<Filter> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<Filter>(item.clone()) {
            Ok(filter) => Some(filter),
            Err(e) => {
                warn!(filter = %item, error = %e, "skipping malformed filter");
                None
            }
        })
        .collect()
}
