//! Chart descriptors: chart type, column binding and style options.
//!
//! A descriptor is read from the flat JSON map a chart is stored as. Binding
//! keys (`type`, `title`, `x_axis`, `y_axis`, `series_col`, `aggregation`)
//! sit next to roughly a hundred style keys; every style key is optional
//! and falls back to a documented default.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::warn;

use super::error::{ChartError, ChartResult};
use super::kind::ChartType;
use super::script::FormatType;
use super::style::{is_blank, value_to_bool, value_to_string, StyleReader};
use crate::aggregate::AggregateOp;

pub const CATEGORY_KEYS: &[&str] = &["x_axis", "category_col", "x_col"];
pub const VALUE_KEYS: &[&str] = &["y_axis", "value_col", "y_col"];
pub const SERIES_KEYS: &[&str] = &["series_col"];
pub const AGGREGATION_KEYS: &[&str] = &["aggregation", "aggregate"];
pub const TIMELINE_KEY: &str = "timeline_field";

/// A parsed chart config.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartDescriptor {
    pub chart_type: ChartType,
    pub title: String,
    pub binding: Binding,
    pub style: StyleOptions,
    raw: Map<String, Value>,
}

impl ChartDescriptor {
    pub fn from_value(value: &Value) -> ChartResult<Self> {
        match value {
            Value::Object(map) => Self::from_map(map.clone()),
            other => Err(ChartError::InvalidDescriptor(format!(
                "expected a JSON object, got {}",
                json_kind(other)
            ))),
        }
    }

    pub fn from_map(raw: Map<String, Value>) -> ChartResult<Self> {
        let reader = StyleReader::new(&raw);
        let chart_type = reader.string(&["type", "chart_type"], "bar").parse()?;
        let title = reader.raw_string(&["title"], "");
        let binding = Binding::read(&reader);
        let style = StyleOptions::read(&reader);
        Ok(Self {
            chart_type,
            title,
            binding,
            style,
            raw,
        })
    }

    /// The map this descriptor was read from.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    /// Descriptor for one frame of a timeline: the time field removed and
    /// the title suffixed with the time point.
    pub fn timeline_frame(&self, point: &str) -> ChartResult<Self> {
        let mut raw = self.raw.clone();
        raw.remove(TIMELINE_KEY);
        raw.insert(
            "title".to_string(),
            Value::String(format!("{} - {}", self.title, point)),
        );
        Self::from_map(raw)
    }

    /// The same descriptor without a timeline field.
    pub fn without_timeline(&self) -> ChartResult<Self> {
        let mut raw = self.raw.clone();
        raw.remove(TIMELINE_KEY);
        Self::from_map(raw)
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ============================================================================
// Binding
// ============================================================================

/// Value columns as bound by the chart config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ValueBinding {
    #[default]
    Unset,
    Single(String),
    Multi(Vec<String>),
}

/// Which columns feed the chart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Binding {
    /// Category columns; several are joined with `-`. Empty means the first column.
    pub category: Vec<String>,
    pub values: ValueBinding,
    pub series: Option<String>,
    pub aggregation: Option<AggregateOp>,
}

impl Binding {
    fn read(reader: &StyleReader<'_>) -> Self {
        let category = match reader.present(CATEGORY_KEYS) {
            Some(Value::Array(items)) => items
                .iter()
                .filter(|v| !is_blank(v))
                .map(value_to_string)
                .collect(),
            Some(v) => vec![value_to_string(v)],
            None => Vec::new(),
        };

        let values = match reader.present(VALUE_KEYS) {
            Some(Value::Array(items)) => ValueBinding::Multi(
                items
                    .iter()
                    .filter(|v| !is_blank(v))
                    .map(value_to_string)
                    .collect(),
            ),
            Some(v) => ValueBinding::Single(value_to_string(v)),
            None => ValueBinding::Unset,
        };

        let aggregation = reader
            .opt_string(AGGREGATION_KEYS)
            .and_then(|s| match s.parse::<AggregateOp>() {
                Ok(op) => Some(op),
                Err(e) => {
                    warn!(error = %e, "ignoring aggregation");
                    None
                }
            });

        Self {
            category,
            values,
            series: reader.opt_string(SERIES_KEYS),
            aggregation,
        }
    }

    pub fn category_col(&self) -> Option<&str> {
        self.category.first().map(String::as_str)
    }

    pub fn value_columns(&self) -> Vec<String> {
        match &self.values {
            ValueBinding::Unset => Vec::new(),
            ValueBinding::Single(c) => vec![c.clone()],
            ValueBinding::Multi(cols) => cols.clone(),
        }
    }

    /// The one value column, when exactly one is bound.
    pub fn single_value(&self) -> Option<&str> {
        match &self.values {
            ValueBinding::Single(c) => Some(c),
            ValueBinding::Multi(cols) if cols.len() == 1 => Some(&cols[0]),
            _ => None,
        }
    }

    /// Category × series cross-tab: a series column with a non-list value binding.
    pub fn is_pivot(&self) -> bool {
        self.series.is_some() && !matches!(self.values, ValueBinding::Multi(_))
    }
}

// ============================================================================
// Style options
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TitleStyle {
    pub show: bool,
    pub position: String,
    pub color: String,
    pub size: f64,
    pub subtitle: String,
    pub subtitle_color: String,
    pub subtitle_size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendStyle {
    pub show: bool,
    pub orient: String,
    pub position: String,
    pub kind: String,
    pub text_size: f64,
    pub text_color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelStyle {
    pub show: bool,
    pub position: String,
    /// Explicit global label formatter.
    pub formatter: Option<String>,
    pub value_animation: bool,
}

/// Per-series label override from `series_label_styles`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesLabelStyle {
    pub show: Option<bool>,
    pub size: Option<f64>,
    pub color: Option<String>,
    pub position: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisStyle {
    pub name: String,
    pub kind: String,
    pub rotate: f64,
    pub label_size: f64,
    /// `None` lets the layout pick its own default color.
    pub label_color: Option<String>,
    /// Explicit label formatter.
    pub formatter: Option<String>,
    pub suffix: String,
    pub line_on_zero: bool,
    pub tick_show: bool,
    pub line_show: bool,
    pub inverse: bool,
    pub boundary_gap: bool,
    /// `None` lets the layout pick its own default.
    pub splitline_show: Option<bool>,
    pub min: Option<Value>,
    pub max: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipStyle {
    pub show: bool,
    pub trigger: Option<String>,
    pub text_size: f64,
    pub text_color: String,
    pub background_color: String,
    pub border_color: String,
    pub border_width: f64,
    pub formatter: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationStyle {
    pub enabled: bool,
    pub duration: f64,
    pub easing: String,
    pub duration_update: f64,
    pub easing_update: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkStyle {
    pub point_show: bool,
    pub point_type: String,
    pub line_show: bool,
    pub line_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataZoomStyle {
    pub show: bool,
    pub kind: String,
    pub orient: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisualMapStyle {
    pub show: bool,
    pub min: f64,
    pub max: f64,
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrushStyle {
    pub show: bool,
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    pub left: Option<String>,
    pub right: Option<String>,
    pub top: Option<String>,
    pub bottom: Option<String>,
    pub grid_type: String,
    pub overlap_type: String,
    /// Series type for columns without a `series_types` entry.
    pub default_series_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarStyle {
    pub category_gap: String,
    pub bar_gap: String,
    pub width: Option<Value>,
    pub max_width: Option<Value>,
    pub min_width: Option<Value>,
    pub reversal_axis: bool,
    pub border_radius: Option<Value>,
    pub realtime_sort: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    pub smooth: bool,
    pub area_style: bool,
    pub area_opacity: f64,
    pub step: bool,
    pub connect_nones: bool,
    pub symbol: String,
    /// Raw `symbol_size`; may be a number or function source.
    pub symbol_size: Option<Value>,
    pub width: f64,
    pub line_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieStyle {
    pub radius_type: String,
    pub rosetype: String,
    pub center: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadarStyle {
    pub shape: String,
    pub splitline_show: bool,
    pub splitarea_show: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GaugeStyle {
    pub min: f64,
    pub max: f64,
    pub split_number: f64,
    pub radius: String,
    pub start_angle: f64,
    pub end_angle: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PictorialStyle {
    pub symbol_repeat: Value,
    pub symbol_margin: Value,
    pub symbol_clip: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphStyle {
    pub layout: String,
    pub gravity: f64,
    pub repulsion: f64,
    pub edge_length: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiquidStyle {
    pub outline_show: bool,
    pub animation: bool,
    pub shape: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarStyle {
    pub range: String,
    pub cell_size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SankeyStyle {
    pub node_align: String,
    pub orient: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemStyle {
    pub color: Option<String>,
    pub border_color: Option<String>,
    pub border_width: Option<f64>,
    pub opacity: Option<f64>,
}

impl ItemStyle {
    pub fn is_empty(&self) -> bool {
        self.color.is_none()
            && self.border_color.is_none()
            && self.border_width.is_none()
            && self.opacity.is_none()
    }
}

/// Per-series overrides keyed by column (or series) name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesOverrides {
    pub names: BTreeMap<String, String>,
    pub formats: BTreeMap<String, FormatType>,
    pub calculations: BTreeMap<String, String>,
    pub suffixes: BTreeMap<String, String>,
    pub label_styles: BTreeMap<String, SeriesLabelStyle>,
    pub axis: BTreeMap<String, String>,
    pub types: BTreeMap<String, String>,
}

impl SeriesOverrides {
    /// Display name for a column.
    pub fn name<'a>(&'a self, col: &'a str) -> &'a str {
        self.names.get(col).map(String::as_str).unwrap_or(col)
    }

    pub fn has_right_axis(&self) -> bool {
        self.axis.values().any(|v| v == "right")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormatStyle {
    pub format_type: FormatType,
    pub format_js: String,
    pub data_calculation: Option<String>,
    pub x_data_calculation: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineStyle {
    pub field: Option<String>,
    pub play_interval: f64,
    pub auto_play: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StackStrategy {
    #[default]
    Normal,
    Percent,
}

/// Secondary value axis of dual-axis layouts.
#[derive(Debug, Clone, PartialEq)]
pub struct SecondaryAxisStyle {
    pub name: Option<String>,
    pub min: Option<Value>,
    pub max: Option<Value>,
    pub label_size: f64,
    pub label_color: Option<String>,
    pub formatter: String,
    pub suffix: String,
    pub splitline_show: bool,
}

/// Every style option a chart config can carry.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleOptions {
    pub title: TitleStyle,
    pub legend: LegendStyle,
    pub label: LabelStyle,
    pub x_axis: AxisStyle,
    pub y_axis: AxisStyle,
    pub y2_axis: SecondaryAxisStyle,
    pub tooltip: TooltipStyle,
    pub toolbox_show: bool,
    pub brush: BrushStyle,
    pub animation: AnimationStyle,
    pub mark: MarkStyle,
    pub data_zoom: DataZoomStyle,
    pub visual_map: VisualMapStyle,
    pub grid: GridLayout,
    pub bar: BarStyle,
    pub line: LineStyle,
    pub pie: PieStyle,
    pub radar: RadarStyle,
    pub gauge: GaugeStyle,
    pub pictorial: PictorialStyle,
    pub graph: GraphStyle,
    pub liquid: LiquidStyle,
    pub calendar: CalendarStyle,
    pub sankey: SankeyStyle,
    pub item: ItemStyle,
    pub series: SeriesOverrides,
    pub format: FormatStyle,
    pub timeline: TimelineStyle,
    /// Explicit color list; empty means the default palette.
    pub colors: Vec<String>,
    pub color_by: String,
    pub background_color: String,
    /// Stack group name; `None` when stacking is off.
    pub stack: Option<String>,
    pub stack_strategy: StackStrategy,
    pub funnel_sort: String,
    pub map_type: String,
    pub min_symbol_size: f64,
    pub max_symbol_size: f64,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self::read(&StyleReader::new(&Map::new()))
    }
}

impl StyleOptions {
    /// Whether values are rescaled so each category sums to 100.
    pub fn is_percent_stack(&self) -> bool {
        self.stack.is_some() && self.stack_strategy == StackStrategy::Percent
    }

    fn read(r: &StyleReader<'_>) -> Self {
        let visual_map_opts = r.object(&["visualmap_opts"]);
        let visual_reader = visual_map_opts.map(StyleReader::new);

        let y_formatter = r
            .opt_string(&["y_axis_formatter"])
            .filter(|f| f != "{value}")
            .or_else(|| r.opt_string(&["y_formatter"]));

        Self {
            title: TitleStyle {
                show: r.bool(&["title_show"], true),
                position: r.string(&["title_pos", "title_position"], "left"),
                color: r.string(&["title_color"], "#333333"),
                size: r.number(&["title_size"], 18.0),
                subtitle: r.raw_string(&["subtitle"], ""),
                subtitle_color: r.string(&["subtitle_color"], "#aaaaaa"),
                subtitle_size: r.number(&["subtitle_size"], 12.0),
            },
            legend: LegendStyle {
                show: r.bool(&["legend_show"], true),
                orient: r.string(&["legend_orient"], "horizontal"),
                position: r.string(&["legend_pos", "legend_position"], "top"),
                kind: r.string(&["legend_type"], "plain"),
                text_size: r.number(&["legend_text_size"], 12.0),
                text_color: r.string(&["legend_text_color"], "#333333"),
            },
            label: LabelStyle {
                show: r.bool(&["label_show"], false),
                position: r.string(&["label_position"], "top"),
                formatter: r.opt_string(&["label_formatter"]),
                value_animation: r.bool(&["label_value_animation"], false),
            },
            x_axis: AxisStyle {
                name: r.raw_string(&["x_axis_name"], ""),
                kind: r.string(&["x_axis_type"], "category"),
                rotate: r.number(&["x_rotate", "x_axis_rotate"], 0.0),
                label_size: r.number(&["x_axis_label_size"], 12.0),
                label_color: r.opt_string(&["x_axis_label_color"]),
                formatter: r
                    .opt_string(&["x_axis_formatter"])
                    .filter(|f| f != "{value}"),
                suffix: r.raw_string(&["x_axis_suffix"], ""),
                line_on_zero: r.bool(&["x_axis_line_on_zero"], true),
                tick_show: r.bool(&["x_axis_tick_show"], true),
                line_show: r.bool(&["x_axis_line_show"], true),
                inverse: r.bool(&["x_axis_inverse"], false),
                boundary_gap: r.bool(&["x_axis_boundary_gap"], true),
                splitline_show: r.opt_bool(&["x_splitline_show"]),
                min: None,
                max: None,
            },
            y_axis: AxisStyle {
                name: r.raw_string(&["y_axis_name"], ""),
                kind: r.string(&["y_axis_type"], "value"),
                rotate: r.number(&["y_rotate", "y_axis_rotate"], 0.0),
                label_size: r.number(&["y_axis_label_size"], 12.0),
                label_color: r.opt_string(&["y_axis_label_color"]),
                formatter: y_formatter,
                suffix: r.raw_string(&["y_axis_suffix"], ""),
                line_on_zero: r.bool(&["y_axis_line_on_zero"], false),
                tick_show: r.bool(&["y_axis_tick_show"], true),
                line_show: r.bool(&["y_axis_line_show"], true),
                inverse: r.bool(&["y_axis_inverse"], false),
                boundary_gap: r.bool(&["y_axis_boundary_gap"], false),
                splitline_show: r.opt_bool(&["y_splitline_show"]),
                min: r.dimension(&["y_axis_min"]),
                max: r.dimension(&["y_axis_max"]),
            },
            y2_axis: SecondaryAxisStyle {
                name: r.opt_string(&["y2_axis_name"]),
                min: r.dimension(&["y2_axis_min"]),
                max: r.dimension(&["y2_axis_max"]),
                label_size: r.number(&["y2_axis_label_size"], 12.0),
                label_color: r.opt_string(&["y2_axis_label_color"]),
                formatter: r.string(&["y2_axis_formatter"], "{value}"),
                suffix: r.raw_string(&["y2_axis_suffix"], ""),
                splitline_show: r.bool(&["y2_splitline_show"], false),
            },
            tooltip: TooltipStyle {
                show: r.bool(&["tooltip_show"], true),
                trigger: r.opt_string(&["tooltip_trigger"]),
                text_size: r.number(&["tooltip_text_size"], 14.0),
                text_color: r.string(&["tooltip_text_color"], "#ffffff"),
                background_color: r.string(&["tooltip_background_color"], "rgba(50,50,50,0.7)"),
                border_color: r.string(&["tooltip_border_color"], "#333"),
                border_width: r.number(&["tooltip_border_width"], 0.0),
                formatter: r.opt_string(&["tooltip_formatter"]),
            },
            toolbox_show: r.bool(&["toolbox_show"], true),
            brush: BrushStyle {
                show: r.bool(&["brush_show"], false),
                kind: r.string(&["brush_type"], "rect"),
            },
            animation: AnimationStyle {
                enabled: r.bool(&["animation_show", "animation"], true),
                duration: r.number(&["animation_duration"], 1000.0),
                easing: r.string(&["animation_easing"], "cubicOut"),
                duration_update: r.number(&["animation_duration_update"], 300.0),
                easing_update: r.string(&["animation_easing_update"], "cubicOut"),
            },
            mark: MarkStyle {
                point_show: r.bool(&["markpoint_show"], false),
                point_type: r.string(&["markpoint_type"], "max"),
                line_show: r.bool(&["markline_show"], false),
                line_type: r.string(&["markline_type"], "average"),
            },
            data_zoom: DataZoomStyle {
                show: r.bool(&["datazoom_show"], false),
                kind: r.string(&["datazoom_type"], "slider"),
                orient: r.string(&["datazoom_orient"], "horizontal"),
            },
            visual_map: VisualMapStyle {
                show: visual_map_opts.is_some() || r.bool(&["visualmap_show"], false),
                min: visual_reader
                    .and_then(|v| v.opt_number(&["min"]))
                    .unwrap_or_else(|| r.number(&["visualmap_min"], 0.0)),
                max: visual_reader
                    .and_then(|v| v.opt_number(&["max"]))
                    .unwrap_or_else(|| r.number(&["visualmap_max"], 100.0)),
                kind: visual_reader
                    .and_then(|v| v.opt_string(&["type"]))
                    .unwrap_or_else(|| r.string(&["visualmap_type"], "color")),
            },
            grid: GridLayout {
                left: r.opt_string(&["grid_left", "grid_pos_left"]),
                right: r.opt_string(&["grid_right", "grid_pos_right"]),
                top: r.opt_string(&["grid_top", "grid_pos_top"]),
                bottom: r.opt_string(&["grid_bottom", "grid_pos_bottom"]),
                grid_type: r.string(&["grid_type"], "basic"),
                overlap_type: r.string(&["overlap_type"], "bar_line"),
                default_series_type: r.opt_string(&["default_series_type"]),
            },
            bar: BarStyle {
                category_gap: r.string(&["category_gap"], "20%"),
                bar_gap: r.string(&["bar_gap"], "30%"),
                width: r.dimension(&["bar_width"]),
                max_width: r.dimension(&["bar_max_width"]),
                min_width: r.dimension(&["bar_min_width"]),
                reversal_axis: r.bool(&["reversal_axis"], false),
                border_radius: read_border_radius(r),
                realtime_sort: r.bool(&["realtime_sort"], false),
            },
            line: LineStyle {
                smooth: r.bool(&["smooth", "is_smooth"], false),
                area_style: r.bool(&["area_style"], false),
                area_opacity: r.number(&["area_opacity"], 0.5),
                step: r.bool(&["is_step"], false),
                connect_nones: r.bool(&["is_connect_nones"], false),
                symbol: r.string(&["symbol"], "emptyCircle"),
                symbol_size: r.present(&["symbol_size"]).cloned(),
                width: r.number(&["line_width"], 2.0),
                line_type: r.string(&["line_type"], "solid"),
            },
            pie: PieStyle {
                radius_type: r.string(&["radius_type"], "ring"),
                rosetype: r.string(&["rosetype"], "none"),
                center: read_center(r),
            },
            radar: RadarStyle {
                shape: r.string(&["radar_shape", "shape"], "polygon"),
                splitline_show: r.bool(&["splitline_show"], true),
                splitarea_show: r.bool(&["splitarea_show"], true),
            },
            gauge: GaugeStyle {
                min: r.number(&["min_", "min"], 0.0),
                max: r.number(&["max_", "max"], 100.0),
                split_number: r.number(&["split_number"], 10.0),
                radius: r.string(&["radius"], "75%"),
                start_angle: r.number(&["start_angle"], 225.0),
                end_angle: r.number(&["end_angle"], -45.0),
            },
            pictorial: PictorialStyle {
                symbol_repeat: match r.present(&["symbol_repeat"]) {
                    Some(v) => value_to_bool(v).map(Value::Bool).unwrap_or_else(|| v.clone()),
                    None => Value::String("fixed".to_string()),
                },
                symbol_margin: r.dimension(&["symbol_margin"]).unwrap_or(Value::from(5)),
                symbol_clip: r.bool(&["symbol_clip", "is_symbol_clip"], true),
            },
            graph: GraphStyle {
                layout: r.string(&["layout"], "force"),
                gravity: r.number(&["gravity"], 0.2),
                repulsion: r.number(&["repulsion"], 50.0),
                edge_length: r.number(&["edge_length"], 30.0),
            },
            liquid: LiquidStyle {
                outline_show: r.bool(&["is_outline_show"], true),
                animation: r.bool(&["is_liquid_animation"], true),
                shape: r.string(&["liquid_shape", "shape"], "circle"),
            },
            calendar: CalendarStyle {
                range: r.string(&["calendar_range"], "2024"),
                cell_size: r.number(&["cell_size"], 20.0),
            },
            sankey: SankeyStyle {
                node_align: r.string(&["node_align"], "justify"),
                orient: r.string(&["orient"], "horizontal"),
            },
            item: ItemStyle {
                color: r.opt_string(&["item_color"]),
                border_color: r.opt_string(&["item_border_color"]),
                border_width: r.opt_number(&["item_border_width"]),
                opacity: r.opt_number(&["item_opacity"]),
            },
            series: SeriesOverrides {
                names: r.string_map(&["series_names"]),
                formats: r
                    .string_map(&["series_formats"])
                    .into_iter()
                    .map(|(k, v)| (k, FormatType::lenient(&v)))
                    .collect(),
                calculations: r.string_map(&["series_calculations"]),
                suffixes: r.string_map(&["series_suffixes"]),
                label_styles: read_label_styles(r),
                axis: r.string_map(&["series_axis"]),
                types: r.string_map(&["series_types"]),
            },
            format: FormatStyle {
                format_type: FormatType::lenient(&r.string(&["format_type"], "none")),
                format_js: r.raw_string(&["format_js"], ""),
                data_calculation: r.opt_string(&["data_calculation"]),
                x_data_calculation: r.opt_string(&["x_data_calculation"]),
            },
            timeline: TimelineStyle {
                field: r.opt_string(&[TIMELINE_KEY]),
                play_interval: r.number(&["timeline_play_interval"], 1000.0),
                auto_play: r.bool(&["timeline_auto_play"], true),
            },
            colors: r.string_list(&["colors"]),
            color_by: r.string(&["color_by"], "series"),
            background_color: r.string(&["bg_color", "background_color"], "#ffffff"),
            stack: read_stack(r),
            stack_strategy: match r.string(&["stack_strategy"], "normal").as_str() {
                "percent" => StackStrategy::Percent,
                _ => StackStrategy::Normal,
            },
            funnel_sort: r.string(&["sort"], "descending"),
            map_type: r.string(&["map_type"], "china"),
            min_symbol_size: r.number(&["min_symbol_size"], 5.0),
            max_symbol_size: r.number(&["max_symbol_size"], 20.0),
        }
    }
}

fn read_stack(r: &StyleReader<'_>) -> Option<String> {
    const DEFAULT_STACK: &str = "stack1";
    let value = r.present(&["stack"])?;
    match (value_to_bool(value), value) {
        (Some(true), _) => Some(DEFAULT_STACK.to_string()),
        (Some(false), _) => None,
        (None, Value::String(name)) => Some(name.trim().to_string()),
        (None, _) => None,
    }
}

/// `"4,4,0,0"` becomes `[4, 4, 0, 0]`; a single value stays scalar.
fn read_border_radius(r: &StyleReader<'_>) -> Option<Value> {
    match r.present(&["bar_border_radius"])? {
        Value::String(s) if s.contains(',') => {
            let corners: Option<Vec<Value>> = s
                .split(',')
                .map(|p| p.trim().parse::<f64>().ok().map(Value::from))
                .collect();
            corners.map(Value::Array)
        }
        _ => r.dimension(&["bar_border_radius"]),
    }
}

fn read_center(r: &StyleReader<'_>) -> Vec<String> {
    let raw = r.string(&["pie_center"], "50%,50%");
    let parts: Vec<String> = raw.split(',').map(|p| p.trim().to_string()).collect();
    if parts.len() == 2 {
        parts
    } else {
        vec!["50%".to_string(), "50%".to_string()]
    }
}

fn read_label_styles(r: &StyleReader<'_>) -> BTreeMap<String, SeriesLabelStyle> {
    let Some(styles) = r.object(&["series_label_styles"]) else {
        return BTreeMap::new();
    };
    styles
        .iter()
        .filter_map(|(col, v)| {
            let style = StyleReader::new(v.as_object()?);
            Some((
                col.clone(),
                SeriesLabelStyle {
                    show: style.opt_bool(&["show"]),
                    size: style.opt_number(&["size"]),
                    color: style.opt_string(&["color"]),
                    position: style.opt_string(&["position"]),
                },
            ))
        })
        .collect()
}
