//! Everything an archetype needs to lay out one chart.

use serde_json::Value;

use super::defaults::ChartDefaults;
use super::descriptor::{ChartDescriptor, StyleOptions};
use super::kind::ChartType;
use super::script::{apply_suffix, formatter_value, js_formatter, FormatType, FormatterMode};
use super::shape::ShapedData;
use crate::data::Record;

/// Inputs to one archetype build. Built once per chart, never mutated.
pub struct BuildContext<'a> {
    pub descriptor: &'a ChartDescriptor,
    pub rows: &'a [Record],
    pub data: ShapedData,
    pub defaults: &'a ChartDefaults,
}

impl<'a> BuildContext<'a> {
    pub fn new(descriptor: &'a ChartDescriptor, rows: &'a [Record], defaults: &'a ChartDefaults) -> Self {
        let data = ShapedData::shape(rows, &descriptor.binding, &descriptor.style);
        Self {
            descriptor,
            rows,
            data,
            defaults,
        }
    }

    pub fn kind(&self) -> ChartType {
        self.descriptor.chart_type
    }

    pub fn style(&self) -> &'a StyleOptions {
        &self.descriptor.style
    }

    pub fn title(&self) -> &str {
        &self.descriptor.title
    }

    /// Explicit colors, or the default palette.
    pub fn colors(&self) -> &[String] {
        if self.style().colors.is_empty() {
            &self.defaults.palette
        } else {
            &self.style().colors
        }
    }

    pub fn series_name<'s>(&'s self, col: &'s str) -> &'s str {
        self.style().series.name(col)
    }

    /// Key used to look up per-series overrides. In pivot mode a series
    /// without its own entry falls back to the bound value column.
    pub fn override_key<'s>(&'s self, col: &'s str) -> &'s str {
        let series = &self.style().series;
        let own = series.formats.contains_key(col)
            || series.label_styles.contains_key(col)
            || series.calculations.contains_key(col);
        if self.data.pivot && !own {
            if let Some(value_col) = self.descriptor.binding.single_value() {
                return value_col;
            }
        }
        col
    }

    /// Scatter with a categorical value axis: a punch-card matrix.
    pub fn is_scatter_matrix(&self) -> bool {
        self.kind() == ChartType::Scatter && self.style().y_axis.kind == "category"
    }

    pub fn text_color(&self, explicit: &Option<String>) -> String {
        explicit
            .clone()
            .unwrap_or_else(|| self.defaults.text_color.clone())
    }

    /// Formatter for value-axis labels.
    pub fn y_axis_formatter(&self) -> Value {
        let style = self.style();
        match (&style.y_axis.formatter, style.format.format_type) {
            (Some(user), FormatType::None) => formatter_value(&apply_suffix(user, &style.y_axis.suffix)),
            _ => js_formatter(
                style.format.format_type,
                &style.format.format_js,
                &style.y_axis.suffix,
                FormatterMode::Axis,
            ),
        }
    }

    /// Formatter for category-axis labels.
    pub fn x_axis_formatter(&self) -> Value {
        let axis = &self.style().x_axis;
        let base = axis.formatter.as_deref().unwrap_or("{value}");
        formatter_value(&apply_suffix(base, &axis.suffix))
    }

    /// Chart-wide series label formatter.
    pub fn label_formatter(&self) -> Value {
        let style = self.style();
        match (&style.label.formatter, style.format.format_type) {
            (Some(user), FormatType::None) => formatter_value(user),
            _ => js_formatter(
                style.format.format_type,
                &style.format.format_js,
                &style.y_axis.suffix,
                FormatterMode::Series,
            ),
        }
    }

    /// Whether the chart-wide label formatter is the bare `{c}` template.
    pub fn label_formatter_is_plain(&self) -> bool {
        self.label_formatter() == Value::String("{c}".to_string())
    }
}
