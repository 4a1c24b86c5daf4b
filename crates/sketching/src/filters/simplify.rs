//! Ramer-Douglas-Peucker polyline simplification.

use glam::Vec2;

use crate::constants::DEGENERATE_SEGMENT_EPSILON;
use crate::types::StrokePoint;

/// Squared distance from `p` to the segment `a..b`
fn segment_distance_sq(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    let t = if len_sq > DEGENERATE_SEGMENT_EPSILON {
        ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    p.distance_squared(a + ab * t)
}

/// Reduce `points` to a subset that stays within `epsilon` of the original shape.
///
/// First and last points are always kept; fewer than three points are returned
/// unchanged. Output order matches input order.
pub fn simplify_rdp(points: &[StrokePoint], epsilon: f32) -> Vec<StrokePoint> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let eps_sq = epsilon.max(0.0).powi(2);
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    // Explicit stack instead of recursion so long strokes cannot overflow
    let mut spans = vec![(0usize, points.len() - 1)];
    while let Some((start, end)) = spans.pop() {
        if end <= start + 1 {
            continue;
        }
        let a = points[start].position;
        let b = points[end].position;

        let mut max_dist = 0.0_f32;
        let mut split = None;
        for (i, p) in points.iter().enumerate().take(end).skip(start + 1) {
            let d = segment_distance_sq(p.position, a, b);
            if d > max_dist {
                max_dist = d;
                split = Some(i);
            }
        }

        if let Some(idx) = split.filter(|_| max_dist > eps_sq) {
            keep[idx] = true;
            spans.push((idx, end));
            spans.push((start, idx));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(coords: &[(f32, f32)]) -> Vec<StrokePoint> {
        coords
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| StrokePoint::new(Vec2::new(x, y), 1.0, i as f64))
            .collect()
    }

    #[test]
    fn test_collinear_collapses_to_endpoints() {
        let points = path(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0), (4.0, 0.0)]);
        let out = simplify_rdp(&points, 0.1);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], points[0]);
        assert_eq!(out[1], points[4]);
    }

    #[test]
    fn test_keeps_corner() {
        let points = path(&[(0.0, 0.0), (5.0, 0.1), (10.0, 0.0), (10.0, 5.0), (10.0, 10.0)]);
        let out = simplify_rdp(&points, 0.5);
        let xs: Vec<_> = out.iter().map(|p| (p.position.x, p.position.y)).collect();
        assert_eq!(xs, vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
    }

    #[test]
    fn test_never_grows_and_keeps_ends() {
        let points: Vec<_> = (0..200)
            .map(|i| {
                let t = i as f32 * 0.1;
                StrokePoint::new(Vec2::new(t * 10.0, t.sin() * 20.0), 1.0, i as f64)
            })
            .collect();
        for eps in [0.0, 0.05, 1.0, 10.0] {
            let out = simplify_rdp(&points, eps);
            assert!(out.len() <= points.len());
            assert_eq!(out.first(), points.first());
            assert_eq!(out.last(), points.last());
            assert!(out.windows(2).all(|w| w[0].timestamp_ms < w[1].timestamp_ms));
        }
    }

    #[test]
    fn test_degenerate_input_unchanged() {
        let two = path(&[(0.0, 0.0), (1.0, 1.0)]);
        assert_eq!(simplify_rdp(&two, 1.0), two);
        assert!(simplify_rdp(&[], 1.0).is_empty());
    }
}
