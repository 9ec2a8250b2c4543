//! Turning records into category labels plus aligned numeric series.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use super::calc::{apply_calculation, calculate_label, parse_number};
use super::descriptor::{Binding, StyleOptions, ValueBinding};
use crate::data::{display_value, Record};

/// Categories and the series plotted against them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapedData {
    /// Category axis labels.
    pub categories: Vec<String>,
    /// Series keys: value column names, or distinct series values in pivot mode.
    pub columns: Vec<String>,
    /// One vector per entry of `columns`, aligned with `categories`.
    pub values: Vec<Vec<f64>>,
    /// Whether the series came from a pivot on the series column.
    pub pivot: bool,
}

impl ShapedData {
    pub fn shape(rows: &[Record], binding: &Binding, style: &StyleOptions) -> Self {
        let shaper = Shaper { rows, binding, style };
        let shaped = if binding.is_pivot() {
            shaper.pivot()
        } else {
            shaper.plain()
        };
        debug!(
            categories = shaped.categories.len(),
            series = shaped.columns.len(),
            pivot = shaped.pivot,
            "shaped chart data"
        );
        shaped
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn series(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(Vec::as_slice))
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| self.values[i].as_slice())
    }

    /// Largest value across all series.
    pub fn max_value(&self) -> Option<f64> {
        self.values
            .iter()
            .flatten()
            .copied()
            .filter(|v| v.is_finite())
            .reduce(f64::max)
    }

    /// Rescale so the series at each category sum to 100. Categories whose
    /// total is zero stay at zero.
    pub fn normalize_percent(&mut self) {
        for i in 0..self.categories.len() {
            let total: f64 = self.values.iter().filter_map(|s| s.get(i)).sum();
            for series in &mut self.values {
                if let Some(v) = series.get_mut(i) {
                    *v = if total == 0.0 { 0.0 } else { *v / total * 100.0 };
                }
            }
        }
    }
}

struct Shaper<'a> {
    rows: &'a [Record],
    binding: &'a Binding,
    style: &'a StyleOptions,
}

impl Shaper<'_> {
    fn first_column(&self, index: usize) -> Option<String> {
        let keys: Vec<&String> = self.rows.first()?.keys().collect();
        keys.get(index).or(keys.first()).map(|k| (*k).clone())
    }

    fn category_columns(&self) -> Vec<String> {
        if self.binding.category.is_empty() {
            self.first_column(0).into_iter().collect()
        } else {
            self.binding.category.clone()
        }
    }

    fn category_label(&self, row: &Record, cols: &[String]) -> String {
        match cols {
            [] => String::new(),
            [col] => calculate_label(
                row.get(col).unwrap_or(&Value::Null),
                self.style.format.x_data_calculation.as_deref(),
            ),
            many => many
                .iter()
                .map(|c| row.get(c).map(display_value).unwrap_or_default())
                .collect::<Vec<_>>()
                .join("-"),
        }
    }

    /// A cell as a plotted number: unparseable cells are 0, then the
    /// column's calculation (or the global one) is applied.
    fn number(&self, cell: Option<&Value>, col: &str) -> f64 {
        let Some(n) = cell.and_then(parse_number) else {
            return 0.0;
        };
        let formula = self
            .style
            .series
            .calculations
            .get(col)
            .filter(|f| !f.trim().is_empty())
            .or(self.style.format.data_calculation.as_ref());
        formula
            .and_then(|f| apply_calculation(n, f))
            .unwrap_or(n)
    }

    fn plain(&self) -> ShapedData {
        let category_cols = self.category_columns();
        let columns = match &self.binding.values {
            ValueBinding::Multi(cols) => cols.clone(),
            ValueBinding::Single(col) => vec![col.clone()],
            ValueBinding::Unset => self.first_column(1).into_iter().collect(),
        };

        let categories = self
            .rows
            .iter()
            .map(|row| self.category_label(row, &category_cols))
            .collect();
        let values = columns
            .iter()
            .map(|col| {
                self.rows
                    .iter()
                    .map(|row| self.number(row.get(col), col))
                    .collect()
            })
            .collect();

        ShapedData {
            categories,
            columns,
            values,
            pivot: false,
        }
    }

    fn pivot(&self) -> ShapedData {
        let category_cols = self.category_columns();
        let series_col = self.binding.series.as_deref().unwrap_or_default();
        let value_col = self.binding.single_value().unwrap_or_default();

        let mut categories: Vec<String> = Vec::new();
        let mut columns: Vec<String> = Vec::new();
        let mut cells: HashMap<(String, String), f64> = HashMap::new();

        for row in self.rows {
            let category = self.category_label(row, &category_cols);
            let series = row.get(series_col).map(display_value).unwrap_or_default();
            if !categories.contains(&category) {
                categories.push(category.clone());
            }
            if !columns.contains(&series) {
                columns.push(series.clone());
            }
            let value = self.number(row.get(value_col), value_col);
            cells.insert((category, series), value);
        }

        let values = columns
            .iter()
            .map(|series| {
                categories
                    .iter()
                    .map(|category| {
                        cells
                            .get(&(category.clone(), series.clone()))
                            .copied()
                            .unwrap_or(0.0)
                    })
                    .collect()
            })
            .collect();

        ShapedData {
            categories,
            columns,
            values,
            pivot: true,
        }
    }
}
