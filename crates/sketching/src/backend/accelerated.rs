use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use glam::Vec2;
use tracing::{debug, warn};

use crate::filters::OneEuroParams;
use crate::geometry::{CalligraphyParams, CalligraphySegment, MeshVertex, TriangleMesh};
use crate::types::StrokePoint;

use super::abi::{EntryPoints, NibParamsData, PointData, SegmentData, VertexData};
use super::{BackendError, GeometryBackend, PureBackend};

/// Backend dispatching to host-provided entry points
///
/// Entry points only see position, pressure, time and tilt. Derived fields
/// (velocity, size, opacity, normalized tilt) are restored on the way back by
/// interpolating the source points at each output timestamp. Reported output
/// counts are never trusted: an over-reported or negative count is clamped,
/// counted as a defect and logged.
#[derive(Debug, Default)]
pub struct AcceleratedBackend {
    entry_points: EntryPoints,
    fallback: PureBackend,
    defects: AtomicUsize,
    last_defect: Mutex<Option<BackendError>>,
}

impl AcceleratedBackend {
    pub fn new(entry_points: EntryPoints) -> Self {
        Self {
            entry_points,
            ..Default::default()
        }
    }

    pub fn entry_points(&self) -> &EntryPoints {
        &self.entry_points
    }

    /// Number of malformed outputs seen so far
    pub fn defect_count(&self) -> usize {
        self.defects.load(Ordering::Relaxed)
    }

    /// Most recent defect, if any
    pub fn last_defect(&self) -> Option<BackendError> {
        self.last_defect.lock().ok().and_then(|guard| guard.clone())
    }

    fn record(&self, defect: BackendError) {
        warn!("Accelerated backend defect: {}", defect);
        self.defects.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut guard) = self.last_defect.lock() {
            *guard = Some(defect);
        }
    }

    /// Clamp a reported count to the buffer it was written into
    fn checked_count(&self, entry: &'static str, reported: i32, capacity: usize) -> usize {
        if reported < 0 {
            self.record(BackendError::NegativeCount {
                entry,
                count: reported,
            });
            return 0;
        }
        let reported = reported as usize;
        if reported > capacity {
            self.record(BackendError::OutputOverflow {
                entry,
                reported,
                capacity,
            });
            return capacity;
        }
        reported
    }

    fn run_point_filter(
        &self,
        entry: &'static str,
        filter: impl FnOnce(&[PointData], &mut [PointData]) -> i32,
        points: &[StrokePoint],
        capacity: usize,
    ) -> Vec<StrokePoint> {
        let input: Vec<PointData> = points.iter().map(PointData::from).collect();
        let mut output = vec![PointData::default(); capacity];
        let reported = filter(&input, &mut output);
        let count = self.checked_count(entry, reported, capacity);
        debug!("{}: {} -> {} points", entry, points.len(), count);
        restore_points(points, &output[..count])
    }
}

/// Rebuild full stroke points from backend output, taking derived fields from
/// the source points interpolated at the output timestamp
fn restore_points(source: &[StrokePoint], output: &[PointData]) -> Vec<StrokePoint> {
    let Some(first) = source.first() else {
        return output
            .iter()
            .map(|d| apply_point_data(StrokePoint::default(), d))
            .collect();
    };

    let mut cursor = 0;
    output
        .iter()
        .map(|d| {
            while cursor + 1 < source.len() && source[cursor + 1].timestamp_ms <= d.timestamp {
                cursor += 1;
            }
            let a = &source[cursor];
            let base = match source.get(cursor + 1) {
                _ if d.timestamp <= first.timestamp_ms => *first,
                Some(b) if b.timestamp_ms > a.timestamp_ms => {
                    let t = (d.timestamp - a.timestamp_ms) / (b.timestamp_ms - a.timestamp_ms);
                    a.lerp(b, t.clamp(0.0, 1.0) as f32)
                }
                _ => *a,
            };
            apply_point_data(base, d)
        })
        .collect()
}

fn apply_point_data(base: StrokePoint, d: &PointData) -> StrokePoint {
    StrokePoint {
        position: d.position(),
        pressure: d.pressure as f32,
        timestamp_ms: d.timestamp,
        tilt_x: d.tilt_x as f32,
        tilt_y: d.tilt_y as f32,
        ..base
    }
}

impl GeometryBackend for AcceleratedBackend {
    fn name(&self) -> &'static str {
        "accelerated"
    }

    fn calligraphy_segments(
        &self,
        points: &[StrokePoint],
        params: &CalligraphyParams,
        max_segments: usize,
    ) -> Vec<CalligraphySegment> {
        let Some(entry) = self.entry_points.calligraphy_segments else {
            return self.fallback.calligraphy_segments(points, params, max_segments);
        };
        if max_segments == 0 {
            return Vec::new();
        }
        let input: Vec<PointData> = points.iter().map(PointData::from).collect();
        let mut output = vec![SegmentData::default(); max_segments];
        let reported = entry(&input, &NibParamsData::from(params), &mut output);
        let count = self.checked_count("calculate_calligraphy_segments", reported, max_segments);

        output[..count]
            .iter()
            .map(|s| CalligraphySegment {
                from: Vec2::new(s.x1 as f32, s.y1 as f32),
                to: Vec2::new(s.x2 as f32, s.y2 as f32),
                thickness: s.thickness as f32,
                alpha: s.alpha as f32,
            })
            .collect()
    }

    fn calligraphy_mesh(
        &self,
        points: &[StrokePoint],
        params: &CalligraphyParams,
        max_segments: usize,
    ) -> TriangleMesh {
        let Some(entry) = self.entry_points.calligraphy_mesh else {
            return self.fallback.calligraphy_mesh(points, params, max_segments);
        };
        if max_segments == 0 {
            return TriangleMesh::default();
        }
        let input: Vec<PointData> = points.iter().map(PointData::from).collect();
        let vertex_capacity = max_segments * 4;
        let index_capacity = max_segments * 6;
        let mut vertices = vec![VertexData::default(); vertex_capacity];
        let mut indices = vec![0u32; index_capacity];
        let mut index_count = 0i32;

        let reported = entry(
            &input,
            &NibParamsData::from(params),
            &mut vertices,
            &mut indices,
            &mut index_count,
        );
        let vertex_count = self.checked_count("build_calligraphy_mesh", reported, vertex_capacity);
        let index_count =
            self.checked_count("build_calligraphy_mesh/indices", index_count, index_capacity);

        // Whole triangles only, and only those referencing written vertices
        let mut index_count = index_count - index_count % 3;
        if let Some(bad) = indices[..index_count]
            .iter()
            .position(|&i| i as usize >= vertex_count)
        {
            self.record(BackendError::OutputOverflow {
                entry: "build_calligraphy_mesh/index_range",
                reported: indices[bad] as usize + 1,
                capacity: vertex_count,
            });
            index_count = bad - bad % 3;
        }

        TriangleMesh {
            vertices: vertices[..vertex_count]
                .iter()
                .map(|v| MeshVertex {
                    position: [v.x as f32, v.y as f32],
                    alpha: v.alpha as f32,
                })
                .collect(),
            indices: indices[..index_count].to_vec(),
        }
    }

    fn smooth_points(
        &self,
        points: &[StrokePoint],
        factor: f32,
        capacity: usize,
    ) -> Vec<StrokePoint> {
        match self.entry_points.smooth {
            Some(entry) => self.run_point_filter(
                "smooth_stroke_points",
                |input, output| entry(input, factor as f64, output),
                points,
                capacity,
            ),
            None => self.fallback.smooth_points(points, factor, capacity),
        }
    }

    fn resample_points(
        &self,
        points: &[StrokePoint],
        spacing: f32,
        capacity: usize,
    ) -> Vec<StrokePoint> {
        match self.entry_points.resample {
            Some(entry) => self.run_point_filter(
                "resample_stroke_points",
                |input, output| entry(input, spacing as f64, output),
                points,
                capacity,
            ),
            None => self.fallback.resample_points(points, spacing, capacity),
        }
    }

    fn one_euro_filter(&self, points: &[StrokePoint], params: OneEuroParams) -> Vec<StrokePoint> {
        match self.entry_points.one_euro {
            Some(entry) => self.run_point_filter(
                "one_euro_filter_points",
                |input, output| {
                    entry(
                        input,
                        params.min_cutoff as f64,
                        params.beta as f64,
                        params.d_cutoff as f64,
                        output,
                    )
                },
                points,
                points.len(),
            ),
            None => self.fallback.one_euro_filter(points, params),
        }
    }

    fn velocities(&self, points: &[StrokePoint]) -> Vec<f32> {
        let Some(entry) = self.entry_points.velocities else {
            return self.fallback.velocities(points);
        };
        let capacity = points.len().saturating_sub(1);
        let input: Vec<PointData> = points.iter().map(PointData::from).collect();
        let mut output = vec![0.0f64; capacity];
        let reported = entry(&input, &mut output);
        let count = self.checked_count("compute_stroke_velocity", reported, capacity);
        output[..count].iter().map(|&v| v as f32).collect()
    }

    fn simplify(&self, points: &[StrokePoint], epsilon: f32) -> Vec<StrokePoint> {
        match self.entry_points.simplify {
            Some(entry) => self.run_point_filter(
                "simplify_stroke_rdp",
                |input, output| entry(input, epsilon as f64, output),
                points,
                points.len(),
            ),
            None => self.fallback.simplify(points, epsilon),
        }
    }
}

#[cfg(test)]
pub(super) mod tests {
    use super::*;
    use crate::filters;
    use crate::geometry::calligraphy;

    fn to_points(data: &[PointData]) -> Vec<StrokePoint> {
        data.iter()
            .map(|d| apply_point_data(StrokePoint::default(), d))
            .collect()
    }

    fn write_points(points: &[StrokePoint], out: &mut [PointData]) -> i32 {
        let n = points.len().min(out.len());
        for (slot, p) in out.iter_mut().zip(points) {
            *slot = PointData::from(p);
        }
        n as i32
    }

    fn params_of(p: &NibParamsData) -> CalligraphyParams {
        CalligraphyParams {
            stroke_width: p.stroke_width as f32,
            opacity: p.opacity as f32,
            nib_angle_deg: p.nib_angle_deg as f32,
            nib_width_factor: p.nib_width_factor as f32,
        }
    }

    // Host-side entry points mirroring the in-crate routines over raw buffers

    pub(crate) fn reference_velocities(input: &[PointData], out: &mut [f64]) -> i32 {
        let v = filters::compute_velocities(&to_points(input));
        for (slot, value) in out.iter_mut().zip(&v) {
            *slot = *value as f64;
        }
        v.len().min(out.len()) as i32
    }

    fn reference_smooth(input: &[PointData], factor: f64, out: &mut [PointData]) -> i32 {
        write_points(&filters::smooth(&to_points(input), factor as f32, out.len()), out)
    }

    fn reference_resample(input: &[PointData], spacing: f64, out: &mut [PointData]) -> i32 {
        write_points(&filters::resample(&to_points(input), spacing as f32, out.len()), out)
    }

    fn reference_simplify(input: &[PointData], epsilon: f64, out: &mut [PointData]) -> i32 {
        write_points(&filters::simplify_rdp(&to_points(input), epsilon as f32), out)
    }

    fn reference_one_euro(
        input: &[PointData],
        min_cutoff: f64,
        beta: f64,
        d_cutoff: f64,
        out: &mut [PointData],
    ) -> i32 {
        let params = OneEuroParams {
            min_cutoff: min_cutoff as f32,
            beta: beta as f32,
            d_cutoff: d_cutoff as f32,
        };
        let filtered: Vec<_> = filters::one_euro_filter(&to_points(input), params).collect();
        write_points(&filtered, out)
    }

    fn reference_segments(
        input: &[PointData],
        params: &NibParamsData,
        out: &mut [SegmentData],
    ) -> i32 {
        let segs = calligraphy::calligraphy_segments(&to_points(input), &params_of(params), out.len());
        for (slot, s) in out.iter_mut().zip(&segs) {
            *slot = SegmentData {
                x1: s.from.x as f64,
                y1: s.from.y as f64,
                x2: s.to.x as f64,
                y2: s.to.y as f64,
                thickness: s.thickness as f64,
                alpha: s.alpha as f64,
            };
        }
        segs.len() as i32
    }

    fn reference_mesh(
        input: &[PointData],
        params: &NibParamsData,
        vertices: &mut [VertexData],
        indices: &mut [u32],
        index_count: &mut i32,
    ) -> i32 {
        let mesh = calligraphy::calligraphy_mesh(&to_points(input), &params_of(params), vertices.len() / 4);
        for (slot, v) in vertices.iter_mut().zip(&mesh.vertices) {
            *slot = VertexData {
                x: v.position[0] as f64,
                y: v.position[1] as f64,
                alpha: v.alpha as f64,
            };
        }
        indices[..mesh.indices.len()].copy_from_slice(&mesh.indices);
        *index_count = mesh.indices.len() as i32;
        mesh.vertices.len() as i32
    }

    fn full_table() -> EntryPoints {
        EntryPoints {
            calligraphy_segments: Some(reference_segments),
            calligraphy_mesh: Some(reference_mesh),
            smooth: Some(reference_smooth),
            resample: Some(reference_resample),
            one_euro: Some(reference_one_euro),
            velocities: Some(reference_velocities),
            simplify: Some(reference_simplify),
        }
    }

    fn stroke() -> Vec<StrokePoint> {
        (0..40)
            .map(|i| {
                let f = i as f32;
                StrokePoint {
                    tilt: 0.2 + f * 0.01,
                    tilt_x: 0.1,
                    velocity: 100.0 + f * 5.0,
                    size: 4.0 + (f * 0.3).sin(),
                    opacity: 0.5 + f * 0.01,
                    ..StrokePoint::new(
                        Vec2::new(f * 3.0, (f * 0.4).sin() * 12.0),
                        0.4 + f * 0.015,
                        f as f64 * 8.0,
                    )
                }
            })
            .collect()
    }

    fn assert_points_close(a: &[StrokePoint], b: &[StrokePoint]) {
        assert_eq!(a.len(), b.len());
        for (p, q) in a.iter().zip(b) {
            assert!(p.position.distance(q.position) < 1e-3);
            assert!((p.pressure - q.pressure).abs() < 1e-4);
            assert!((p.timestamp_ms - q.timestamp_ms).abs() < 1e-3);
            assert!((p.size - q.size).abs() < 1e-3);
            assert!((p.opacity - q.opacity).abs() < 1e-4);
            assert!((p.velocity - q.velocity).abs() < 1e-2);
            assert!((p.tilt - q.tilt).abs() < 1e-4);
        }
    }

    #[test]
    fn test_matches_pure_backend() {
        let accelerated = AcceleratedBackend::new(full_table());
        let pure = PureBackend;
        let points = stroke();

        assert_points_close(
            &accelerated.smooth_points(&points, 0.5, 64),
            &pure.smooth_points(&points, 0.5, 64),
        );
        assert_points_close(
            &accelerated.resample_points(&points, 2.5, 256),
            &pure.resample_points(&points, 2.5, 256),
        );
        assert_points_close(
            &accelerated.simplify(&points, 0.75),
            &pure.simplify(&points, 0.75),
        );
        assert_points_close(
            &accelerated.one_euro_filter(&points, OneEuroParams::default()),
            &pure.one_euro_filter(&points, OneEuroParams::default()),
        );

        let va = accelerated.velocities(&points);
        let vp = pure.velocities(&points);
        assert_eq!(va.len(), vp.len());
        assert!(va.iter().zip(&vp).all(|(a, b)| (a - b).abs() < 1e-2));

        let params = CalligraphyParams {
            stroke_width: 8.0,
            opacity: 0.9,
            nib_angle_deg: 30.0,
            nib_width_factor: 1.2,
        };
        assert_eq!(
            accelerated.calligraphy_mesh(&points, &params, 100),
            pure.calligraphy_mesh(&points, &params, 100)
        );
        let sa = accelerated.calligraphy_segments(&points, &params, 100);
        let sp = pure.calligraphy_segments(&points, &params, 100);
        assert_eq!(sa.len(), sp.len());
        assert!(sa.iter().zip(&sp).all(|(a, b)| (a.thickness - b.thickness).abs() < 1e-4));
        assert_eq!(accelerated.defect_count(), 0);
    }

    #[test]
    fn test_missing_entry_points_fall_back() {
        let table = EntryPoints {
            velocities: Some(reference_velocities),
            ..Default::default()
        };
        let accelerated = AcceleratedBackend::new(table);
        let points = stroke();
        assert_eq!(
            accelerated.simplify(&points, 0.5),
            PureBackend.simplify(&points, 0.5)
        );
    }

    fn overreporting_smooth(_: &[PointData], _: f64, out: &mut [PointData]) -> i32 {
        out.len() as i32 + 5
    }

    fn negative_velocities(_: &[PointData], _: &mut [f64]) -> i32 {
        -3
    }

    fn out_of_range_mesh(
        _: &[PointData],
        _: &NibParamsData,
        vertices: &mut [VertexData],
        indices: &mut [u32],
        index_count: &mut i32,
    ) -> i32 {
        indices[..6].copy_from_slice(&[0, 2, 1, 1, 2, 9]);
        *index_count = 6;
        vertices.len().min(4) as i32
    }

    #[test]
    fn test_overflow_is_clamped_and_recorded() {
        let accelerated = AcceleratedBackend::new(EntryPoints {
            smooth: Some(overreporting_smooth),
            velocities: Some(negative_velocities),
            ..Default::default()
        });
        let points = stroke();

        let out = accelerated.smooth_points(&points, 0.5, 10);
        assert_eq!(out.len(), 10);
        assert_eq!(accelerated.defect_count(), 1);
        assert_eq!(
            accelerated.last_defect(),
            Some(BackendError::OutputOverflow {
                entry: "smooth_stroke_points",
                reported: 15,
                capacity: 10,
            })
        );

        assert!(accelerated.velocities(&points).is_empty());
        assert_eq!(accelerated.defect_count(), 2);
        assert!(matches!(
            accelerated.last_defect(),
            Some(BackendError::NegativeCount { count: -3, .. })
        ));
    }

    #[test]
    fn test_mesh_indices_past_vertices_dropped() {
        let accelerated = AcceleratedBackend::new(EntryPoints {
            calligraphy_mesh: Some(out_of_range_mesh),
            ..Default::default()
        });
        let params = CalligraphyParams::from_settings(&crate::settings::ToolSettings::default());
        let mesh = accelerated.calligraphy_mesh(&stroke(), &params, 4);
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices, vec![0, 2, 1]);
        assert_eq!(accelerated.defect_count(), 1);
    }
}
