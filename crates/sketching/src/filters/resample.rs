//! Uniform-spacing resampling.

use glam::Vec2;

use crate::types::StrokePoint;

/// Slack on the segment parameter when a walk resumes at a vertex
const EXIT_TOLERANCE: f32 = 1e-4;

/// Resample `points` so consecutive outputs are `spacing` apart.
///
/// Each new sample is placed where a circle of radius `spacing` around the
/// previous output first leaves the polyline, so the straight-line gap holds
/// across corners too. Every field is interpolated linearly between the
/// bracketing input samples. The first and last input points are always kept
/// when `capacity >= 2`, so two or more input points always yield two or more
/// outputs. Output never exceeds `capacity`; when the budget runs out the walk
/// stops early and the last input point closes the sequence.
pub fn resample(points: &[StrokePoint], spacing: f32, capacity: usize) -> Vec<StrokePoint> {
    if points.len() < 2 || capacity < 2 || !(spacing.is_finite() && spacing > 0.0) {
        return points.iter().take(capacity).copied().collect();
    }

    let mut out = Vec::with_capacity(capacity.min(points.len() * 2));
    out.push(points[0]);
    let mut center = points[0].position;

    'walk: for pair in points.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let d = b.position - a.position;
        let dd = d.length_squared();
        if dd <= 0.0 {
            continue;
        }

        // Parameter of the last sample emitted on this segment
        let mut t0: Option<f32> = None;
        while let Some(t) = circle_exit(a.position, d, dd, center, spacing) {
            // Rounding can leave the segment start a hair outside the circle
            if t > 1.0 || t < -EXIT_TOLERANCE || t0.is_some_and(|t0| t <= t0) {
                break;
            }
            let t = t.max(0.0);
            // Keep the final slot for the closing point
            if out.len() + 1 >= capacity {
                break 'walk;
            }
            let sample = a.lerp(b, t);
            center = sample.position;
            out.push(sample);
            t0 = Some(t);
        }
    }

    let last = points[points.len() - 1];
    let duplicate = out.len() >= 2
        && out
            .last()
            .is_some_and(|p| p.position.distance(last.position) < spacing * 1e-3);
    if duplicate {
        if let Some(tail) = out.last_mut() {
            *tail = last;
        }
    } else if out.len() < capacity {
        out.push(last);
    }

    out
}

/// Larger parameter `t` where `a + t * d` is `radius` from `center`
///
/// The walk keeps the current position inside the circle, so this is where
/// the segment leaves it.
fn circle_exit(a: Vec2, d: Vec2, dd: f32, center: Vec2, radius: f32) -> Option<f32> {
    let f = a - center;
    let half_b = f.dot(d);
    let c = f.length_squared() - radius * radius;
    let disc = half_b * half_b - dd * c;
    if disc < 0.0 {
        return None;
    }
    Some((-half_b + disc.sqrt()) / dd)
}
