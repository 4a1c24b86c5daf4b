use crate::types::StrokePoint;

/// Speed of each segment in units per second.
///
/// Returns `points.len() - 1` values. A segment whose elapsed time is zero or
/// negative reports 0 instead of an infinite speed.
pub fn compute_velocities(points: &[StrokePoint]) -> Vec<f32> {
    points
        .windows(2)
        .map(|pair| {
            let elapsed_ms = pair[1].timestamp_ms - pair[0].timestamp_ms;
            if elapsed_ms <= 0.0 || elapsed_ms.is_nan() {
                return 0.0;
            }
            let distance = pair[0].position.distance(pair[1].position);
            (distance as f64 / (elapsed_ms / 1000.0)) as f32
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_velocity_units_per_second() {
        let points = vec![
            StrokePoint::new(Vec2::ZERO, 1.0, 0.0),
            StrokePoint::new(Vec2::new(10.0, 10.0), 1.0, 16.0),
            StrokePoint::new(Vec2::new(20.0, 10.0), 1.0, 26.0),
        ];
        let v = compute_velocities(&points);
        assert_eq!(v.len(), 2);
        assert!((v[0] - 883.883).abs() < 0.01);
        assert!((v[1] - 1000.0).abs() < 1e-3);
    }

    #[test]
    fn test_zero_elapsed_is_zero() {
        let points = vec![
            StrokePoint::new(Vec2::ZERO, 1.0, 5.0),
            StrokePoint::new(Vec2::new(3.0, 4.0), 1.0, 5.0),
            StrokePoint::new(Vec2::new(6.0, 8.0), 1.0, 4.0),
        ];
        assert_eq!(compute_velocities(&points), vec![0.0, 0.0]);
    }

    #[test]
    fn test_short_input() {
        assert!(compute_velocities(&[]).is_empty());
        assert!(compute_velocities(&[StrokePoint::default()]).is_empty());
    }
}
