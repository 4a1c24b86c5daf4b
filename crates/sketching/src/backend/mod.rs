//! Geometry backends
//!
//! The filter and calligraphy routines that dominate stroke-processing time
//! sit behind [`GeometryBackend`]. Two implementations exist:
//! - [`PureBackend`] - the in-crate Rust routines
//! - [`AcceleratedBackend`] - an [`EntryPoints`] table loaded by the host,
//!   with each missing entry point served by the pure routine
//!
//! Both produce the same values for the same input, so call sites never need
//! to know which one ran.

mod abi;
mod accelerated;
mod pure;

pub use abi::{
    CalligraphyMeshFn, CalligraphySegmentsFn, EntryPoints, NibParamsData, OneEuroFn, PointData,
    PointFilterFn, SegmentData, VelocityFn, VertexData,
};
pub use accelerated::AcceleratedBackend;
pub use pure::PureBackend;

use std::fmt;
use std::sync::Arc;

use sketch_config::BackendPreference;
use thiserror::Error;
use tracing::info;

use crate::filters::OneEuroParams;
use crate::geometry::{CalligraphyParams, CalligraphySegment, TriangleMesh};
use crate::types::StrokePoint;

/// Defect reported by an accelerated entry point
///
/// Output is still returned (clamped), so these are recorded and logged
/// rather than propagated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("{entry} reported {reported} outputs into a buffer of {capacity}")]
    OutputOverflow {
        entry: &'static str,
        reported: usize,
        capacity: usize,
    },
    #[error("{entry} returned negative count {count}")]
    NegativeCount { entry: &'static str, count: i32 },
}

/// Strategy interface over the performance-critical routines
pub trait GeometryBackend: Send + Sync + fmt::Debug {
    /// Short name for diagnostics
    fn name(&self) -> &'static str;

    fn calligraphy_segments(
        &self,
        points: &[StrokePoint],
        params: &CalligraphyParams,
        max_segments: usize,
    ) -> Vec<CalligraphySegment>;

    fn calligraphy_mesh(
        &self,
        points: &[StrokePoint],
        params: &CalligraphyParams,
        max_segments: usize,
    ) -> TriangleMesh;

    fn smooth_points(&self, points: &[StrokePoint], factor: f32, capacity: usize)
    -> Vec<StrokePoint>;

    fn resample_points(
        &self,
        points: &[StrokePoint],
        spacing: f32,
        capacity: usize,
    ) -> Vec<StrokePoint>;

    fn one_euro_filter(&self, points: &[StrokePoint], params: OneEuroParams) -> Vec<StrokePoint>;

    fn velocities(&self, points: &[StrokePoint]) -> Vec<f32>;

    fn simplify(&self, points: &[StrokePoint], epsilon: f32) -> Vec<StrokePoint>;
}

/// Pick the backend for this session
///
/// Falls back to [`PureBackend`] when the preference is pure, when no entry
/// point table was loaded, or when the table is empty.
pub fn select_backend(
    preference: BackendPreference,
    entry_points: Option<EntryPoints>,
) -> Arc<dyn GeometryBackend> {
    match (preference, entry_points) {
        (BackendPreference::Accelerated, Some(table)) if !table.is_empty() => {
            info!(
                "Using accelerated geometry backend ({} of {} entry points)",
                table.available(),
                EntryPoints::TOTAL
            );
            Arc::new(AcceleratedBackend::new(table))
        }
        (BackendPreference::Accelerated, _) => {
            info!("Accelerated geometry backend unavailable, using pure backend");
            Arc::new(PureBackend)
        }
        (BackendPreference::Pure, _) => {
            info!("Using pure geometry backend");
            Arc::new(PureBackend)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_falls_back_to_pure() {
        assert_eq!(
            select_backend(BackendPreference::Accelerated, None).name(),
            PureBackend.name()
        );
        assert_eq!(
            select_backend(BackendPreference::Accelerated, Some(EntryPoints::default())).name(),
            PureBackend.name()
        );
    }

    #[test]
    fn test_select_respects_pure_preference() {
        let table = EntryPoints {
            velocities: Some(accelerated::tests::reference_velocities),
            ..Default::default()
        };
        assert_eq!(select_backend(BackendPreference::Pure, Some(table)).name(), "pure");
        assert_eq!(
            select_backend(BackendPreference::Accelerated, Some(table)).name(),
            "accelerated"
        );
    }
}
