//! Buffer layouts and entry points of the accelerated backend
//!
//! Every entry point takes an input buffer plus parameters and a pre-sized
//! output buffer, and returns how many outputs it wrote. A loader resolves the
//! ones its library provides; any left as `None` fall back to the pure
//! routine.
//!
//! The entry point types are Rust-ABI functions over slices, not the C
//! symbols themselves. A C library exports `(pointer, count)` pairs, e.g.
//! `int compute_stroke_velocity(const PointData*, int, double*, int)`, and the
//! loader registers a thin shim per symbol that passes each slice's pointer
//! and length through. The `#[repr(C)]` layouts below are shared as-is.

use glam::Vec2;

use crate::geometry::CalligraphyParams;
use crate::types::StrokePoint;

/// Point as exchanged with the accelerated backend
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct PointData {
    pub x: f64,
    pub y: f64,
    pub pressure: f64,
    pub timestamp: f64,
    pub tilt_x: f64,
    pub tilt_y: f64,
}

impl From<&StrokePoint> for PointData {
    fn from(p: &StrokePoint) -> Self {
        Self {
            x: p.position.x as f64,
            y: p.position.y as f64,
            pressure: p.pressure as f64,
            timestamp: p.timestamp_ms,
            tilt_x: p.tilt_x as f64,
            tilt_y: p.tilt_y as f64,
        }
    }
}

impl PointData {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }
}

/// Calligraphy segment output
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct SegmentData {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub thickness: f64,
    pub alpha: f64,
}

/// Mesh vertex output
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct VertexData {
    pub x: f64,
    pub y: f64,
    pub alpha: f64,
}

/// Nib parameters passed to the calligraphy entry points
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct NibParamsData {
    pub stroke_width: f64,
    pub opacity: f64,
    pub nib_angle_deg: f64,
    pub nib_width_factor: f64,
}

impl From<&CalligraphyParams> for NibParamsData {
    fn from(p: &CalligraphyParams) -> Self {
        Self {
            stroke_width: p.stroke_width as f64,
            opacity: p.opacity as f64,
            nib_angle_deg: p.nib_angle_deg as f64,
            nib_width_factor: p.nib_width_factor as f64,
        }
    }
}

/// `calculate_calligraphy_segments`
pub type CalligraphySegmentsFn = fn(&[PointData], &NibParamsData, &mut [SegmentData]) -> i32;

/// `build_calligraphy_mesh`: returns the vertex count and writes the index
/// count through the last argument
pub type CalligraphyMeshFn =
    fn(&[PointData], &NibParamsData, &mut [VertexData], &mut [u32], &mut i32) -> i32;

/// Point-to-point filters taking one scalar parameter: smoothing factor,
/// resample spacing or RDP epsilon
pub type PointFilterFn = fn(&[PointData], f64, &mut [PointData]) -> i32;

/// One-euro filter: `(min_cutoff, beta, d_cutoff)`
pub type OneEuroFn = fn(&[PointData], f64, f64, f64, &mut [PointData]) -> i32;

/// `compute_stroke_velocity`
pub type VelocityFn = fn(&[PointData], &mut [f64]) -> i32;

/// Entry points resolved from an accelerated library
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryPoints {
    pub calligraphy_segments: Option<CalligraphySegmentsFn>,
    pub calligraphy_mesh: Option<CalligraphyMeshFn>,
    pub smooth: Option<PointFilterFn>,
    pub resample: Option<PointFilterFn>,
    pub one_euro: Option<OneEuroFn>,
    pub velocities: Option<VelocityFn>,
    pub simplify: Option<PointFilterFn>,
}

impl EntryPoints {
    pub const TOTAL: usize = 7;

    /// Number of resolved entry points
    pub fn available(&self) -> usize {
        [
            self.calligraphy_segments.is_some(),
            self.calligraphy_mesh.is_some(),
            self.smooth.is_some(),
            self.resample.is_some(),
            self.one_euro.is_some(),
            self.velocities.is_some(),
            self.simplify.is_some(),
        ]
        .into_iter()
        .filter(|&present| present)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.available() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_layout() {
        assert_eq!(std::mem::size_of::<PointData>(), 48);
        assert_eq!(std::mem::size_of::<SegmentData>(), 48);
        assert_eq!(std::mem::size_of::<VertexData>(), 24);

        let point = StrokePoint {
            tilt_x: 0.25,
            ..StrokePoint::new(Vec2::new(1.5, -2.0), 0.5, 42.0)
        };
        let data = PointData::from(&point);
        let bytes: &[u8] = bytemuck::bytes_of(&data);
        assert_eq!(bytes.len(), 48);
        assert_eq!(data.position(), point.position);
        assert_eq!(data.tilt_x, 0.25);
    }

    #[test]
    fn test_available_counts() {
        assert!(EntryPoints::default().is_empty());
        fn velocities(_: &[PointData], _: &mut [f64]) -> i32 {
            0
        }
        let table = EntryPoints {
            velocities: Some(velocities),
            ..Default::default()
        };
        assert_eq!(table.available(), 1);
    }

    // Stands in for a symbol exported by a C library
    unsafe extern "C" fn compute_stroke_velocity(
        points: *const PointData,
        point_count: i32,
        out_velocities: *mut f64,
        max_output: i32,
    ) -> i32 {
        let input = unsafe { std::slice::from_raw_parts(points, point_count as usize) };
        let out = unsafe { std::slice::from_raw_parts_mut(out_velocities, max_output as usize) };
        let points: Vec<StrokePoint> = input
            .iter()
            .map(|d| StrokePoint::new(d.position(), d.pressure as f32, d.timestamp))
            .collect();
        let v = crate::filters::compute_velocities(&points);
        for (slot, value) in out.iter_mut().zip(&v) {
            *slot = *value as f64;
        }
        v.len().min(out.len()) as i32
    }

    fn velocities_shim(input: &[PointData], out: &mut [f64]) -> i32 {
        unsafe {
            compute_stroke_velocity(
                input.as_ptr(),
                input.len() as i32,
                out.as_mut_ptr(),
                out.len() as i32,
            )
        }
    }

    #[test]
    fn test_c_symbol_behind_slice_shim() {
        use crate::backend::{AcceleratedBackend, GeometryBackend, PureBackend};

        let points: Vec<StrokePoint> = (0..6)
            .map(|i| StrokePoint::new(Vec2::new(i as f32 * 7.0, (i * i) as f32), 1.0, i as f64 * 16.0))
            .collect();
        let backend = AcceleratedBackend::new(EntryPoints {
            velocities: Some(velocities_shim),
            ..Default::default()
        });
        let expected = PureBackend.velocities(&points);
        assert_eq!(expected.len(), 5);
        assert_eq!(backend.velocities(&points), expected);
    }
}
