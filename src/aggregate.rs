//! Group-and-reduce over record lists.
//!
//! Rows are grouped by one or more category columns (and optionally a series column)
//! in first-seen order, and each value column is reduced with one operator.
//! Cells that are not numbers count as 0; strings may carry thousands
//! separators (`"1,000"`). Whenever the request cannot be honored the input
//! is returned unchanged.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::data::{number_value, Record};

/// Reduction applied to each value column within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateOp {
    None,
    Sum,
    #[serde(alias = "avg", alias = "average")]
    Mean,
    Max,
    Min,
    Count,
}

impl FromStr for AggregateOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(AggregateOp::None),
            "sum" => Ok(AggregateOp::Sum),
            "mean" | "avg" | "average" => Ok(AggregateOp::Mean),
            "max" => Ok(AggregateOp::Max),
            "min" => Ok(AggregateOp::Min),
            "count" => Ok(AggregateOp::Count),
            other => Err(format!("unknown aggregation: {}", other)),
        }
    }
}

/// What to group by and how to reduce.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateSpec {
    pub group_cols: Vec<String>,
    pub value_cols: Vec<String>,
    pub op: Option<AggregateOp>,
    pub series_col: Option<String>,
}

impl AggregateSpec {
    pub fn apply(&self, rows: Vec<Record>) -> Vec<Record> {
        aggregate_by(
            rows,
            &self.group_cols,
            &self.value_cols,
            self.op,
            self.series_col.as_deref(),
        )
    }
}

/// Coerce a cell to a number; anything unparseable is 0.
pub fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s
            .replace(',', "")
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .unwrap_or(0.0),
        Value::Bool(b) => f64::from(u8::from(*b)),
        _ => 0.0,
    }
}

#[derive(Debug, Clone, Copy)]
struct Accumulator {
    sum: f64,
    min: f64,
    max: f64,
    count: usize,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            count: 0,
        }
    }

    fn push(&mut self, v: f64) {
        self.sum += v;
        self.min = self.min.min(v);
        self.max = self.max.max(v);
        self.count += 1;
    }

    fn finish(&self, op: AggregateOp) -> f64 {
        match op {
            AggregateOp::Sum | AggregateOp::None => self.sum,
            AggregateOp::Mean if self.count > 0 => self.sum / self.count as f64,
            AggregateOp::Mean => 0.0,
            AggregateOp::Max => self.max,
            AggregateOp::Min => self.min,
            AggregateOp::Count => self.count as f64,
        }
    }
}

struct Group {
    keys: Vec<Value>,
    accumulators: Vec<Accumulator>,
}

fn has_column(rows: &[Record], col: &str) -> bool {
    rows.iter().any(|r| r.contains_key(col))
}

/// Group `rows` by `group_col` (plus `series_col` when present) and reduce
/// every surviving value column with `op`.
///
/// Returns `rows` unchanged when it is empty, when no group column or
/// operator is given, when the operator is `none`, when the group column
/// does not occur, or when none of the value columns occur.
pub fn aggregate(
    rows: Vec<Record>,
    group_col: Option<&str>,
    value_cols: &[String],
    op: Option<AggregateOp>,
    series_col: Option<&str>,
) -> Vec<Record> {
    let group_cols: Vec<String> = group_col.map(str::to_string).into_iter().collect();
    aggregate_by(rows, &group_cols, value_cols, op, series_col)
}

/// [`aggregate`] over a composite key: one group per distinct combination
/// of `group_cols` (plus `series_col`). Every group column must occur in
/// the rows, otherwise they are returned unchanged.
pub fn aggregate_by(
    rows: Vec<Record>,
    group_cols: &[String],
    value_cols: &[String],
    op: Option<AggregateOp>,
    series_col: Option<&str>,
) -> Vec<Record> {
    let mut keys: Vec<&str> = Vec::new();
    for col in group_cols.iter().filter(|c| !c.is_empty()) {
        if !keys.contains(&col.as_str()) {
            keys.push(col);
        }
    }
    let Some(op) = op else {
        return rows;
    };
    if keys.is_empty() || rows.is_empty() || op == AggregateOp::None {
        return rows;
    }
    if let Some(missing) = keys.iter().find(|c| !has_column(&rows, c)) {
        debug!(group_col = *missing, "group column absent, skipping aggregation");
        return rows;
    }

    let mut values: Vec<&str> = Vec::new();
    for col in value_cols {
        if !values.contains(&col.as_str()) && !keys.contains(&col.as_str()) && has_column(&rows, col) {
            values.push(col);
        }
    }
    if values.is_empty() {
        warn!(?group_cols, ?value_cols, "no value column present, skipping aggregation");
        return rows;
    }

    let mut group_cols = keys;
    if let Some(series) = series_col.filter(|s| !s.is_empty() && !group_cols.contains(s)) {
        if has_column(&rows, series) {
            group_cols.push(series);
        }
    }

    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in &rows {
        let keys: Vec<Value> = group_cols
            .iter()
            .map(|c| row.get(*c).cloned().unwrap_or(Value::Null))
            .collect();
        let fingerprint = Value::Array(keys.clone()).to_string();

        let slot = *index.entry(fingerprint).or_insert_with(|| {
            groups.push(Group {
                keys,
                accumulators: vec![Accumulator::new(); values.len()],
            });
            groups.len() - 1
        });

        for (acc, col) in groups[slot].accumulators.iter_mut().zip(&values) {
            acc.push(row.get(*col).map(coerce_number).unwrap_or(0.0));
        }
    }

    debug!(groups = groups.len(), input_rows = rows.len(), ?op, "aggregated rows");

    groups
        .into_iter()
        .map(|group| {
            let mut record = Record::new();
            for (col, key) in group_cols.iter().zip(group.keys) {
                record.insert((*col).to_string(), key);
            }
            for (col, acc) in values.iter().zip(&group.accumulators) {
                record.insert((*col).to_string(), number_value(acc.finish(op)));
            }
            record
        })
        .collect()
}
