//! Chart archetype tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ChartError;

/// Every chart archetype the builder can lay out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ChartType {
    Bar,
    Line,
    Pie,
    Scatter,
    Radar,
    Funnel,
    Gauge,
    Heatmap,
    Calendar,
    Graph,
    Liquid,
    Parallel,
    PictorialBar,
    Sankey,
    Map,
    Table,
    Grid,
}

impl ChartType {
    pub const ALL: &'static [ChartType] = &[
        ChartType::Bar,
        ChartType::Line,
        ChartType::Pie,
        ChartType::Scatter,
        ChartType::Radar,
        ChartType::Funnel,
        ChartType::Gauge,
        ChartType::Heatmap,
        ChartType::Calendar,
        ChartType::Graph,
        ChartType::Liquid,
        ChartType::Parallel,
        ChartType::PictorialBar,
        ChartType::Sankey,
        ChartType::Map,
        ChartType::Table,
        ChartType::Grid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Pie => "pie",
            ChartType::Scatter => "scatter",
            ChartType::Radar => "radar",
            ChartType::Funnel => "funnel",
            ChartType::Gauge => "gauge",
            ChartType::Heatmap => "heatmap",
            ChartType::Calendar => "calendar",
            ChartType::Graph => "graph",
            ChartType::Liquid => "liquid",
            ChartType::Parallel => "parallel",
            ChartType::PictorialBar => "pictorial_bar",
            ChartType::Sankey => "sankey",
            ChartType::Map => "map",
            ChartType::Table => "table",
            ChartType::Grid => "grid",
        }
    }

    /// Whether the archetype is drawn on x/y axes.
    pub fn is_cartesian(&self) -> bool {
        matches!(
            self,
            ChartType::Bar
                | ChartType::Line
                | ChartType::Scatter
                | ChartType::Heatmap
                | ChartType::PictorialBar
                | ChartType::Grid
        )
    }

    /// Archetypes that move to the composite grid layout when a right axis is requested.
    pub fn promotes_to_grid(&self) -> bool {
        matches!(self, ChartType::Bar | ChartType::Line | ChartType::Scatter)
    }
}

impl FromStr for ChartType {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim().to_lowercase().as_str() {
            "bar" => ChartType::Bar,
            "line" => ChartType::Line,
            "pie" => ChartType::Pie,
            "scatter" => ChartType::Scatter,
            "radar" => ChartType::Radar,
            "funnel" => ChartType::Funnel,
            "gauge" => ChartType::Gauge,
            "heatmap" => ChartType::Heatmap,
            "calendar" => ChartType::Calendar,
            "graph" => ChartType::Graph,
            "liquid" => ChartType::Liquid,
            "parallel" => ChartType::Parallel,
            "pictorial_bar" | "pictorialbar" => ChartType::PictorialBar,
            "sankey" => ChartType::Sankey,
            "map" => ChartType::Map,
            "table" => ChartType::Table,
            "grid" => ChartType::Grid,
            other => return Err(ChartError::UnknownChartType(other.to_string())),
        };
        Ok(kind)
    }
}

impl TryFrom<String> for ChartType {
    type Error = ChartError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ChartType> for String {
    fn from(kind: ChartType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
