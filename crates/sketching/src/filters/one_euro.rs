//! One-euro filter over stroke positions.
//!
//! The cutoff frequency adapts to the estimated speed: slow movement gets a
//! low cutoff (jitter removed), fast movement a high one (little lag).

use std::f32::consts::TAU;
use std::iter::FusedIterator;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_FILTER_DT;
use crate::types::StrokePoint;

/// One-euro filter parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OneEuroParams {
    /// Cutoff frequency (Hz) at zero speed
    pub min_cutoff: f32,
    /// How fast the cutoff rises with speed
    pub beta: f32,
    /// Cutoff (Hz) for the derivative estimate
    pub d_cutoff: f32,
}

impl Default for OneEuroParams {
    fn default() -> Self {
        Self {
            min_cutoff: 1.0,
            beta: 0.007,
            d_cutoff: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct FilterState {
    position: Vec2,
    derivative: Vec2,
    timestamp_ms: f64,
}

/// Lazily filtered point sequence. Consumes its input once; it cannot be restarted.
#[derive(Debug, Clone)]
pub struct OneEuroFilter<'a> {
    points: std::slice::Iter<'a, StrokePoint>,
    params: OneEuroParams,
    passthrough: bool,
    state: Option<FilterState>,
}

/// Filter `points` with the one-euro filter.
///
/// Fewer than two points are yielded unchanged.
pub fn one_euro_filter(points: &[StrokePoint], params: OneEuroParams) -> OneEuroFilter<'_> {
    OneEuroFilter {
        points: points.iter(),
        params,
        passthrough: points.len() < 2,
        state: None,
    }
}

#[inline]
fn smoothing_factor(dt: f32, cutoff: f32) -> f32 {
    let r = TAU * cutoff.max(0.0) * dt;
    r / (r + 1.0)
}

impl Iterator for OneEuroFilter<'_> {
    type Item = StrokePoint;

    fn next(&mut self) -> Option<StrokePoint> {
        let point = *self.points.next()?;
        if self.passthrough {
            return Some(point);
        }

        let Some(prev) = self.state else {
            self.state = Some(FilterState {
                position: point.position,
                derivative: Vec2::ZERO,
                timestamp_ms: point.timestamp_ms,
            });
            return Some(point);
        };

        let mut dt = ((point.timestamp_ms - prev.timestamp_ms) / 1000.0) as f32;
        if dt.is_nan() || dt <= 0.0 {
            dt = DEFAULT_FILTER_DT;
        }

        let raw_derivative = (point.position - prev.position) / dt;
        let derivative = prev
            .derivative
            .lerp(raw_derivative, smoothing_factor(dt, self.params.d_cutoff));
        let cutoff = self.params.min_cutoff + self.params.beta * derivative.length();
        let position = prev
            .position
            .lerp(point.position, smoothing_factor(dt, cutoff));

        self.state = Some(FilterState {
            position,
            derivative,
            timestamp_ms: point.timestamp_ms,
        });

        Some(StrokePoint { position, ..point })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.points.size_hint()
    }
}

impl ExactSizeIterator for OneEuroFilter<'_> {}
impl FusedIterator for OneEuroFilter<'_> {}
