use crate::filters::{self, OneEuroParams};
use crate::geometry::calligraphy;
use crate::geometry::{CalligraphyParams, CalligraphySegment, TriangleMesh};
use crate::types::StrokePoint;

use super::GeometryBackend;

/// Backend running the in-crate routines
#[derive(Debug, Clone, Copy, Default)]
pub struct PureBackend;

impl GeometryBackend for PureBackend {
    fn name(&self) -> &'static str {
        "pure"
    }

    fn calligraphy_segments(
        &self,
        points: &[StrokePoint],
        params: &CalligraphyParams,
        max_segments: usize,
    ) -> Vec<CalligraphySegment> {
        calligraphy::calligraphy_segments(points, params, max_segments)
    }

    fn calligraphy_mesh(
        &self,
        points: &[StrokePoint],
        params: &CalligraphyParams,
        max_segments: usize,
    ) -> TriangleMesh {
        calligraphy::calligraphy_mesh(points, params, max_segments)
    }

    fn smooth_points(
        &self,
        points: &[StrokePoint],
        factor: f32,
        capacity: usize,
    ) -> Vec<StrokePoint> {
        filters::smooth(points, factor, capacity)
    }

    fn resample_points(
        &self,
        points: &[StrokePoint],
        spacing: f32,
        capacity: usize,
    ) -> Vec<StrokePoint> {
        filters::resample(points, spacing, capacity)
    }

    fn one_euro_filter(&self, points: &[StrokePoint], params: OneEuroParams) -> Vec<StrokePoint> {
        filters::one_euro_filter(points, params).collect()
    }

    fn velocities(&self, points: &[StrokePoint]) -> Vec<f32> {
        filters::compute_velocities(points)
    }

    fn simplify(&self, points: &[StrokePoint], epsilon: f32) -> Vec<StrokePoint> {
        filters::simplify_rdp(points, epsilon)
    }
}
