//! In-memory document snapshot for import and export collaborators.
//!
//! Round-tripping preserves stroke order, every per-point field and the
//! tool settings exactly. Imports are validated before they touch a document.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::SNAPSHOT_VERSION;
use crate::stroke::Stroke;
use crate::types::StrokeId;
use crate::validation::{ValidationError, validate_stroke};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported snapshot version {0}")]
    UnsupportedVersion(u8),
    #[error("Invalid stroke at index {index}: {source}")]
    InvalidStroke {
        index: usize,
        #[source]
        source: ValidationError,
    },
    #[error("Duplicate stroke id {0}")]
    DuplicateId(StrokeId),
}

/// Ordered strokes with their settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub version: u8,
    pub strokes: Vec<Stroke>,
}

impl DocumentSnapshot {
    pub fn new(strokes: Vec<Stroke>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            strokes,
        }
    }

    /// Check version, id uniqueness and every stroke
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(self.version));
        }
        let mut seen = HashSet::with_capacity(self.strokes.len());
        for (index, stroke) in self.strokes.iter().enumerate() {
            if !seen.insert(stroke.id()) {
                return Err(SnapshotError::DuplicateId(stroke.id()));
            }
            validate_stroke(stroke).map_err(|source| SnapshotError::InvalidStroke { index, source })?;
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and validate
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Largest stroke id present
    pub fn max_id(&self) -> Option<StrokeId> {
        self.strokes.iter().map(Stroke::id).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{SettingUpdate, ToolSettings};
    use crate::types::{StrokePoint, ToolKind};
    use glam::Vec2;

    fn stroke(id: u64) -> Stroke {
        let settings = ToolSettings::preset(ToolKind::Calligraphy)
            .with(SettingUpdate::NibAngle(33.3))
            .with(SettingUpdate::Color([0.1, 0.2, 0.3, 0.9]));
        let points = (0..5)
            .map(|i| StrokePoint {
                tilt: 0.125,
                tilt_x: 0.3,
                tilt_y: -0.2,
                velocity: 123.456 + i as f32,
                size: 7.1 + i as f32 * 0.01,
                opacity: 0.77,
                ..StrokePoint::new(Vec2::new(i as f32 * 1.1, 0.3), 0.61, 1000.5 + i as f64 * 8.25)
            })
            .collect();
        Stroke::from_points(StrokeId(id), settings, 1000.5, points)
    }

    #[test]
    fn test_round_trip_is_exact() {
        let snapshot = DocumentSnapshot::new(vec![stroke(3), stroke(1), stroke(2)]);
        let json = snapshot.to_json().unwrap();
        let back = DocumentSnapshot::from_json(&json).unwrap();
        assert_eq!(back, snapshot);
        let order: Vec<_> = back.strokes.iter().map(Stroke::id).collect();
        assert_eq!(order, vec![StrokeId(3), StrokeId(1), StrokeId(2)]);
        assert_eq!(back.max_id(), Some(StrokeId(3)));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let snapshot = DocumentSnapshot::new(vec![stroke(1), stroke(1)]);
        let json = snapshot.to_json().unwrap();
        assert!(matches!(
            DocumentSnapshot::from_json(&json),
            Err(SnapshotError::DuplicateId(StrokeId(1)))
        ));
    }

    #[test]
    fn test_rejects_invalid_points() {
        let bad = stroke(1);
        let mut points = bad.points().to_vec();
        points[2].pressure = 4.0;
        let snapshot = DocumentSnapshot::new(vec![stroke(0), bad.with_points(points)]);
        let json = snapshot.to_json().unwrap();
        match DocumentSnapshot::from_json(&json) {
            Err(SnapshotError::InvalidStroke { index, source }) => {
                assert_eq!(index, 1);
                assert!(matches!(source, ValidationError::OutOfRange { field: "pressure", .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_rejects_version_and_garbage() {
        let mut snapshot = DocumentSnapshot::new(vec![]);
        snapshot.version = 99;
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(matches!(
            DocumentSnapshot::from_json(&json),
            Err(SnapshotError::UnsupportedVersion(99))
        ));
        assert!(matches!(
            DocumentSnapshot::from_json("{not json"),
            Err(SnapshotError::Json(_))
        ));
    }
}
