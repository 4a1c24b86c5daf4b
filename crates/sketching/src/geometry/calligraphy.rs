//! Calligraphy nib geometry
//!
//! Thickness depends on how the segment direction crosses the nib axis:
//! strokes across the nib are thick, strokes along it are thin.
//!
//! ```text
//! thickness = max(0.6, width * clamp(factor, 0.3, 2.5) * (0.35 + 0.9 * |t x nib|) * avg_pressure)
//! ```
//!
//! The mesh path emits one quad (4 vertices, 6 indices) per non-degenerate
//! segment into a single buffer for the whole stroke.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::{
    CALLIGRAPHY_MIN_THICKNESS, CALLIGRAPHY_THICKNESS_OFFSET, CALLIGRAPHY_THICKNESS_RANGE,
    DEGENERATE_SEGMENT_EPSILON, NIB_WIDTH_FACTOR_MAX, NIB_WIDTH_FACTOR_MIN,
};
use crate::settings::ToolSettings;
use crate::types::StrokePoint;

use super::{GeometryContext, MeshVertex, Primitive, Shape, TriangleMesh, blend_for};

/// Nib parameters for one stroke
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalligraphyParams {
    pub stroke_width: f32,
    pub opacity: f32,
    pub nib_angle_deg: f32,
    pub nib_width_factor: f32,
}

impl CalligraphyParams {
    pub fn from_settings(settings: &ToolSettings) -> Self {
        Self {
            stroke_width: settings.size,
            opacity: settings.opacity,
            nib_angle_deg: settings.nib.angle_deg,
            nib_width_factor: settings.nib.width_factor,
        }
    }

    /// Unit vector along the nib axis
    pub fn nib_direction(&self) -> Vec2 {
        Vec2::from_angle(self.nib_angle_deg.to_radians())
    }

    fn thickness(&self, tangent: Vec2, nib: Vec2, avg_pressure: f32) -> f32 {
        let factor = self
            .nib_width_factor
            .clamp(NIB_WIDTH_FACTOR_MIN, NIB_WIDTH_FACTOR_MAX);
        let cross = tangent.perp_dot(nib).abs();
        let t = self.stroke_width
            * factor
            * (CALLIGRAPHY_THICKNESS_OFFSET + CALLIGRAPHY_THICKNESS_RANGE * cross)
            * avg_pressure;
        t.max(CALLIGRAPHY_MIN_THICKNESS)
    }
}

/// One nib segment between consecutive points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalligraphySegment {
    pub from: Vec2,
    pub to: Vec2,
    pub thickness: f32,
    pub alpha: f32,
}

/// Non-degenerate segments with their tangent and average pressure
fn nib_spans(points: &[StrokePoint]) -> impl Iterator<Item = (Vec2, Vec2, Vec2, f32)> + '_ {
    points.windows(2).filter_map(|pair| {
        let (a, b) = (&pair[0], &pair[1]);
        let seg = b.position - a.position;
        let len_sq = seg.length_squared();
        if len_sq < DEGENERATE_SEGMENT_EPSILON {
            return None;
        }
        let tangent = seg / len_sq.sqrt();
        Some((a.position, b.position, tangent, (a.pressure + b.pressure) * 0.5))
    })
}

/// Compute nib segments, at most `max_segments`
pub fn calligraphy_segments(
    points: &[StrokePoint],
    params: &CalligraphyParams,
    max_segments: usize,
) -> Vec<CalligraphySegment> {
    if points.len() < 2 || max_segments == 0 {
        return Vec::new();
    }
    let nib = params.nib_direction();
    nib_spans(points)
        .take(max_segments)
        .map(|(from, to, tangent, pressure)| CalligraphySegment {
            from,
            to,
            thickness: params.thickness(tangent, nib, pressure),
            alpha: params.opacity,
        })
        .collect()
}

/// Build the stroke mesh, stopping before `max_segments` quads are exceeded
pub fn calligraphy_mesh(
    points: &[StrokePoint],
    params: &CalligraphyParams,
    max_segments: usize,
) -> TriangleMesh {
    let mut mesh = TriangleMesh::default();
    if points.len() < 2 || max_segments == 0 {
        return mesh;
    }
    let nib = params.nib_direction();
    for (a, b, tangent, pressure) in nib_spans(points).take(max_segments) {
        let half = params.thickness(tangent, nib, pressure) * 0.5;
        let normal = tangent.perp() * half;
        let alpha = (params.opacity * pressure).clamp(0.0, 1.0);

        let base = mesh.vertices.len() as u32;
        for corner in [a - normal, a + normal, b - normal, b + normal] {
            mesh.vertices.push(MeshVertex {
                position: corner.to_array(),
                alpha,
            });
        }
        mesh.indices
            .extend_from_slice(&[base, base + 2, base + 1, base + 1, base + 2, base + 3]);
    }
    mesh
}

/// Pressure as seen by the nib: ignored when the tool is not pressure sensitive
pub(crate) fn nib_points(points: &[StrokePoint], settings: &ToolSettings) -> Vec<StrokePoint> {
    if settings.uses_pressure() {
        return points.to_vec();
    }
    points
        .iter()
        .map(|p| StrokePoint { pressure: 1.0, ..*p })
        .collect()
}

pub(crate) fn build(
    points: &[StrokePoint],
    settings: &ToolSettings,
    ctx: &GeometryContext<'_>,
) -> Vec<Shape> {
    let params = CalligraphyParams::from_settings(settings);
    let mesh = ctx.backend.calligraphy_mesh(
        &nib_points(points, settings),
        &params,
        ctx.config.max_calligraphy_segments,
    );
    if mesh.is_empty() {
        return Vec::new();
    }
    // Vertex alpha already carries opacity
    let color = [settings.color[0], settings.color[1], settings.color[2], 1.0];
    vec![Shape::new(Primitive::Mesh { mesh, color }, blend_for(settings))]
}
