use crate::types::StrokePoint;

/// Neighbour-weighted smoothing of position and pressure.
///
/// Each interior point moves toward the midpoint of its neighbours by
/// `factor` (clamped to 0..1); first and last points are kept. Inputs shorter
/// than three points are copied unchanged. At most `capacity` points are
/// returned.
pub fn smooth(points: &[StrokePoint], factor: f32, capacity: usize) -> Vec<StrokePoint> {
    let n = points.len().min(capacity);
    if points.len() < 3 {
        return points[..n].to_vec();
    }

    let f = if factor.is_nan() {
        0.0
    } else {
        factor.clamp(0.0, 1.0)
    };
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let current = points[i];
        if i == 0 || i == points.len() - 1 {
            out.push(current);
            continue;
        }
        let (prev, next) = (&points[i - 1], &points[i + 1]);
        let mid = (prev.position + next.position) * 0.5;
        let mid_pressure = (prev.pressure + next.pressure) * 0.5;
        out.push(StrokePoint {
            position: mid * f + current.position * (1.0 - f),
            pressure: mid_pressure * f + current.pressure * (1.0 - f),
            ..current
        });
    }
    out
}
