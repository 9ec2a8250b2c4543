//! Chart builder error types.

use thiserror::Error;

/// Result type for chart building.
pub type ChartResult<T> = Result<T, ChartError>;

/// Errors raised while turning rows and a descriptor into a chart spec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChartError {
    /// The chart type tag is not one the builder knows.
    #[error("unknown chart type: {0}")]
    UnknownChartType(String),

    /// The descriptor could not be read.
    #[error("invalid chart descriptor: {0}")]
    InvalidDescriptor(String),

    /// An archetype could not lay out the data it was given.
    #[error("{chart} chart: {message}")]
    Archetype {
        chart: &'static str,
        message: String,
    },

    /// The finished option tree could not be serialized.
    #[error("failed to serialize chart options: {0}")]
    Serialize(String),
}

impl ChartError {
    pub fn archetype(chart: &'static str, message: impl Into<String>) -> Self {
        Self::Archetype {
            chart,
            message: message.into(),
        }
    }
}
