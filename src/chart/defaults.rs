//! Builder-wide defaults, loadable from the `[chart]` config section.

use serde::{Deserialize, Serialize};

/// Values the builder falls back to when a descriptor leaves them unset.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChartDefaults {
    /// Series colors, cycled by the client.
    pub palette: Vec<String>,

    pub grid_left: String,
    pub grid_right: String,
    pub grid_top: String,
    pub grid_bottom: String,

    /// Outer margin of a dual-axis grid without a right axis.
    pub dual_axis_left: String,
    /// Right margin of a dual-axis grid that has a right axis.
    pub dual_axis_right: String,

    /// Axis color of the primary value axis on dual-axis charts.
    pub primary_axis_color: String,
    /// Axis color of the secondary value axis on dual-axis charts.
    pub secondary_axis_color: String,

    /// Name used for the single series of matrix layouts when nothing better is bound.
    pub placeholder_series_name: String,

    /// Default color of titles, legends and axis labels.
    pub text_color: String,
}

impl Default for ChartDefaults {
    fn default() -> Self {
        Self {
            palette: [
                "#5470c6", "#91cc75", "#fac858", "#ee6666", "#73c0de", "#3ba272", "#fc8452",
                "#9a60b4", "#ea7ccc",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            grid_left: "10%".to_string(),
            grid_right: "10%".to_string(),
            grid_top: "60".to_string(),
            grid_bottom: "60".to_string(),
            dual_axis_left: "5%".to_string(),
            dual_axis_right: "20%".to_string(),
            primary_axis_color: "#5793f3".to_string(),
            secondary_axis_color: "#d14a61".to_string(),
            placeholder_series_name: "Value".to_string(),
            text_color: "#333333".to_string(),
        }
    }
}
