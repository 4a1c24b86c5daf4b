//! Stroke: an ordered point sequence plus the settings it was drawn with

use serde::{Deserialize, Serialize};

use crate::settings::ToolSettings;
use crate::types::{Rect, StrokeId, StrokePoint};

/// A recorded stroke.
///
/// Points are only appended while the stroke is being captured. Once it is
/// handed to a document it is shared behind an `Arc` and never mutated;
/// finalization passes build a replacement with [`Stroke::with_points`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StrokeRecord", into = "StrokeRecord")]
pub struct Stroke {
    id: StrokeId,
    settings: ToolSettings,
    points: Vec<StrokePoint>,
    /// Timestamp of the first sample in milliseconds
    created_at_ms: f64,
    /// Tight bounds of point positions
    position_bounds: Option<Rect>,
    /// Largest effective point size
    max_size: f32,
}

impl Stroke {
    /// Create an empty stroke
    pub fn new(id: StrokeId, settings: ToolSettings, created_at_ms: f64) -> Self {
        Self {
            id,
            settings,
            points: Vec::new(),
            created_at_ms,
            position_bounds: None,
            max_size: 0.0,
        }
    }

    /// Create a stroke from an existing point list
    pub fn from_points(
        id: StrokeId,
        settings: ToolSettings,
        created_at_ms: f64,
        points: Vec<StrokePoint>,
    ) -> Self {
        let position_bounds = Rect::from_points(points.iter().map(|p| p.position));
        let max_size = points.iter().map(|p| p.size).fold(0.0, f32::max);
        Self {
            id,
            settings,
            points,
            created_at_ms,
            position_bounds,
            max_size,
        }
    }

    /// Copy of this stroke with a new point list, same identity
    #[must_use = "returns a new stroke without modifying `self`"]
    pub fn with_points(&self, points: Vec<StrokePoint>) -> Self {
        Self::from_points(self.id, self.settings.clone(), self.created_at_ms, points)
    }

    pub(crate) fn push_point(&mut self, point: StrokePoint) {
        let point_rect = Rect::new(point.position, point.position);
        self.position_bounds = Some(match self.position_bounds {
            Some(b) => b.union(point_rect),
            None => point_rect,
        });
        self.max_size = self.max_size.max(point.size);
        self.points.push(point);
    }

    #[inline]
    pub fn id(&self) -> StrokeId {
        self.id
    }

    #[inline]
    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    #[inline]
    pub fn points(&self) -> &[StrokePoint] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn created_at_ms(&self) -> f64 {
        self.created_at_ms
    }

    /// Position bounds expanded by half the largest point size, `None` when empty
    #[inline]
    pub fn bounds(&self) -> Option<Rect> {
        self.position_bounds.map(|r| r.expand(self.max_size * 0.5))
    }

    pub fn last_point(&self) -> Option<&StrokePoint> {
        self.points.last()
    }

    /// Largest effective point size
    #[inline]
    pub fn max_point_size(&self) -> f32 {
        self.max_size
    }

    /// Polyline length through all points
    pub fn path_length(&self) -> f32 {
        self.points
            .windows(2)
            .map(|w| w[0].position.distance(w[1].position))
            .sum()
    }

    /// Time between the first and last point
    pub fn duration_ms(&self) -> f64 {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => (last.timestamp_ms - first.timestamp_ms).max(0.0),
            _ => 0.0,
        }
    }
}

/// Serialized form; derived bounds are rebuilt on load
#[derive(Serialize, Deserialize)]
struct StrokeRecord {
    id: StrokeId,
    settings: ToolSettings,
    created_at_ms: f64,
    points: Vec<StrokePoint>,
}

impl From<StrokeRecord> for Stroke {
    fn from(r: StrokeRecord) -> Self {
        Stroke::from_points(r.id, r.settings, r.created_at_ms, r.points)
    }
}

impl From<Stroke> for StrokeRecord {
    fn from(s: Stroke) -> Self {
        Self {
            id: s.id,
            settings: s.settings,
            created_at_ms: s.created_at_ms,
            points: s.points,
        }
    }
}

/// Position bounds expanded by half the maximum point size
pub fn compute_bounds(points: &[StrokePoint]) -> Option<Rect> {
    let rect = Rect::from_points(points.iter().map(|p| p.position))?;
    let max_size = points.iter().map(|p| p.size).fold(0.0, f32::max);
    Some(rect.expand(max_size * 0.5))
}
