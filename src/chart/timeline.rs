//! Timeline ("race") mode: one frame per distinct value of a time column.

use std::collections::BTreeSet;

use serde_json::{json, Value};
use tracing::{debug, warn};

use super::descriptor::ChartDescriptor;
use super::error::{ChartError, ChartResult};
use crate::data::{display_value, Record};

/// Bound on timeline nesting. A frame is built with the guard returned by
/// [`TimelineGuard::descend`]; once exhausted, timeline fields are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineGuard {
    remaining: u8,
}

impl TimelineGuard {
    pub const DEFAULT_LEVELS: u8 = 1;

    pub fn new(levels: u8) -> Self {
        Self { remaining: levels }
    }

    /// A guard that never enters timeline mode.
    pub fn exhausted() -> Self {
        Self::new(0)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Guard for the next level down, or `None` once exhausted.
    pub fn descend(&self) -> Option<Self> {
        self.remaining.checked_sub(1).map(Self::new)
    }
}

impl Default for TimelineGuard {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LEVELS)
    }
}

/// Sorted distinct time points, stringified the way they appear on the timeline axis.
pub fn time_points(rows: &[Record], field: &str) -> Vec<String> {
    rows.iter()
        .map(|row| row.get(field).map(display_value).unwrap_or_default())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Build one frame per time point through `build_frame` and wrap them into
/// a `baseOption` timeline. Points whose frame is empty are skipped.
pub(crate) fn build<F>(
    descriptor: &ChartDescriptor,
    rows: &[Record],
    field: &str,
    build_frame: F,
) -> ChartResult<Value>
where
    F: Fn(&ChartDescriptor, &[Record]) -> ChartResult<Option<Value>>,
{
    let points = time_points(rows, field);
    let mut axis = Vec::with_capacity(points.len());
    let mut frames = Vec::with_capacity(points.len());

    for point in points {
        let frame_rows: Vec<Record> = rows
            .iter()
            .filter(|row| row.get(field).map(display_value).unwrap_or_default() == point)
            .cloned()
            .collect();
        if frame_rows.is_empty() {
            continue;
        }
        let frame = descriptor.timeline_frame(&point)?;
        match build_frame(&frame, &frame_rows)? {
            Some(options) => {
                axis.push(point);
                frames.push(options);
            }
            None => debug!(point = %point, "timeline frame has no data"),
        }
    }

    let t = &descriptor.style.timeline;
    Ok(json!({
        "baseOption": {
            "timeline": {
                "axisType": "category",
                "autoPlay": t.auto_play,
                "loop": true,
                "playInterval": crate::data::number_value(t.play_interval),
                "show": true,
                "data": axis,
            },
        },
        "options": frames,
    }))
}

/// Log a failed timeline and hand back the descriptor for a plain chart.
pub(crate) fn fallback(
    descriptor: &ChartDescriptor,
    error: &ChartError,
) -> ChartResult<ChartDescriptor> {
    warn!(%error, chart = %descriptor.chart_type, "timeline failed, building a plain chart");
    descriptor.without_timeline()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_descends_once() {
        let guard = TimelineGuard::default();
        let inner = guard.descend().unwrap();
        assert!(inner.is_exhausted());
        assert_eq!(inner.descend(), None);
        assert!(TimelineGuard::exhausted().is_exhausted());
    }

    #[test]
    fn test_time_points_sorted_unique() {
        let rows: Vec<Record> = [json!({"y": 2024}), json!({"y": 2023}), json!({"y": 2024})]
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect();
        assert_eq!(time_points(&rows, "y"), vec!["2023", "2024"]);
    }
}
