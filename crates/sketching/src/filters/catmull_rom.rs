//! Catmull-Rom interpolation in cubic Hermite form.
//!
//! Knot spacing is `|p[i+1] - p[i]|^alpha`: 0.0 is uniform, 0.5 centripetal
//! (no cusps or self-loops on unevenly spaced points), 1.0 chordal.

use glam::Vec2;

/// Knot intervals shorter than this are clamped to avoid division by zero.
const MIN_KNOT_INTERVAL: f32 = 1e-4;

#[inline]
fn knot_interval(a: Vec2, b: Vec2, alpha: f32) -> f32 {
    a.distance(b).powf(alpha).max(MIN_KNOT_INTERVAL)
}

/// Interpolate between `p1` and `p2` at `t` in 0..1.
///
/// `p0` and `p3` shape the tangents. `tension` scales them down: 0 is a
/// standard Catmull-Rom curve, 1 collapses to the straight segment.
pub fn catmull_rom(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32, alpha: f32, tension: f32) -> Vec2 {
    let t = t.clamp(0.0, 1.0);
    let d01 = knot_interval(p0, p1, alpha);
    let d12 = knot_interval(p1, p2, alpha);
    let d23 = knot_interval(p2, p3, alpha);

    let scale = (1.0 - tension) * d12;
    let m1 = scale * ((p1 - p0) / d01 - (p2 - p0) / (d01 + d12) + (p2 - p1) / d12);
    let m2 = scale * ((p2 - p1) / d12 - (p3 - p1) / (d12 + d23) + (p3 - p2) / d23);

    let t2 = t * t;
    let t3 = t2 * t;
    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;

    p1 * h00 + m1 * h10 + p2 * h01 + m2 * h11
}

/// Densify a polyline with Catmull-Rom spans.
///
/// Each span between consecutive points is sampled `samples_per_span` times;
/// the end points are extended by reflection so the curve passes through
/// every input point, including the first and last.
pub fn catmull_rom_spline(
    points: &[Vec2],
    samples_per_span: usize,
    alpha: f32,
    tension: f32,
) -> Vec<Vec2> {
    if points.len() < 3 || samples_per_span < 2 {
        return points.to_vec();
    }

    let n = points.len();
    let at = |i: isize| -> Vec2 {
        if i < 0 {
            points[0] * 2.0 - points[1]
        } else if i as usize >= n {
            points[n - 1] * 2.0 - points[n - 2]
        } else {
            points[i as usize]
        }
    };

    let mut out = Vec::with_capacity((n - 1) * samples_per_span + 1);
    for i in 0..n - 1 {
        let i = i as isize;
        let (p0, p1, p2, p3) = (at(i - 1), at(i), at(i + 1), at(i + 2));
        for s in 0..samples_per_span {
            let t = s as f32 / samples_per_span as f32;
            out.push(catmull_rom(p0, p1, p2, p3, t, alpha, tension));
        }
    }
    out.push(points[n - 1]);
    out
}
