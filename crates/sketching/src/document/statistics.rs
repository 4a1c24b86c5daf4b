use std::collections::BTreeMap;

use serde::Serialize;

use crate::stroke::Stroke;
use crate::types::ToolKind;

/// Aggregate figures over the live strokes of a document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentStatistics {
    pub stroke_count: usize,
    pub point_count: usize,
    /// Strokes per tool; tools never used are absent
    pub tool_usage: BTreeMap<ToolKind, usize>,
    /// Mean polyline length, 0 when empty
    pub average_stroke_length: f32,
    /// Sum of per-stroke durations (first to last sample)
    pub total_duration_ms: f64,
}

impl DocumentStatistics {
    pub fn collect<'a>(strokes: impl IntoIterator<Item = &'a Stroke>) -> Self {
        let mut stats = Self::default();
        let mut total_length = 0.0_f64;
        for stroke in strokes {
            stats.stroke_count += 1;
            stats.point_count += stroke.len();
            *stats.tool_usage.entry(stroke.settings().tool).or_insert(0) += 1;
            total_length += stroke.path_length() as f64;
            stats.total_duration_ms += stroke.duration_ms();
        }
        if stats.stroke_count > 0 {
            stats.average_stroke_length = (total_length / stats.stroke_count as f64) as f32;
        }
        stats
    }

    /// Most used tool, ties broken by tool order
    pub fn dominant_tool(&self) -> Option<ToolKind> {
        self.tool_usage
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map(|(tool, _)| *tool)
    }
}
