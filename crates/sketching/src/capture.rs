//! Stroke capture state machine
//!
//! Accumulates raw pointer samples into the single in-flight [`Stroke`]:
//!
//! ```text
//! Idle --begin--> Capturing --extend*--> Capturing --finish/cancel--> Idle
//! ```
//!
//! Velocity and pressure are smoothed exponentially as samples arrive, and a
//! spacing gate decides whether a sample becomes a new point. Malformed calls
//! (extend while idle, begin while capturing, out-of-order timestamps) are
//! dropped with a debug log, never reported as errors.

use glam::Vec2;
use sketch_config::CaptureConfig;
use tracing::debug;

use crate::settings::ToolSettings;
use crate::stroke::Stroke;
use crate::types::{PointerSample, StrokeId, StrokePoint};

/// Capture state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Capturing,
}

/// Per-gesture tracking, present only while capturing
#[derive(Debug, Clone)]
struct ActiveCapture {
    stroke: Stroke,
    /// Smoothed velocity in units per second
    velocity: f32,
    /// Smoothed pressure
    pressure: f32,
    last_sample_position: Vec2,
    last_sample_time_ms: f64,
    last_emitted_position: Vec2,
}

/// Incremental controller for one pointer gesture at a time
#[derive(Debug, Clone, Default)]
pub struct StrokeCapture {
    config: CaptureConfig,
    active: Option<ActiveCapture>,
}

/// Raw pressure sanitized to 0..1, 1.0 when the device reports garbage
fn sanitize_pressure(pressure: f32) -> f32 {
    if pressure.is_finite() {
        pressure.clamp(0.0, 1.0)
    } else {
        1.0
    }
}

impl StrokeCapture {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            active: None,
        }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn state(&self) -> CaptureState {
        if self.active.is_some() {
            CaptureState::Capturing
        } else {
            CaptureState::Idle
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.active.is_some()
    }

    /// The in-flight stroke, if capturing
    pub fn current(&self) -> Option<&Stroke> {
        self.active.as_ref().map(|a| &a.stroke)
    }

    /// Copy of the in-flight stroke for readers on other threads
    pub fn snapshot(&self) -> Option<Stroke> {
        self.current().cloned()
    }

    /// Start a stroke at `sample`. Ignored (returns false) while already capturing.
    pub fn begin(&mut self, id: StrokeId, settings: ToolSettings, sample: PointerSample) -> bool {
        if self.active.is_some() {
            debug!("begin: stroke already in progress, ignoring");
            return false;
        }
        if !sample.is_finite() {
            debug!("begin: non-finite position or timestamp, ignoring");
            return false;
        }
        let sample = sample.with_finite_tilt();

        let pressure = sanitize_pressure(sample.pressure);
        let tilt = sample.tilt();
        let point = StrokePoint {
            position: sample.position,
            pressure,
            tilt,
            tilt_x: sample.tilt_x,
            tilt_y: sample.tilt_y,
            timestamp_ms: sample.timestamp_ms,
            velocity: 0.0,
            size: settings.point_size(pressure, 0.0, tilt),
            opacity: settings.point_opacity(pressure),
        };

        let mut stroke = Stroke::new(id, settings, sample.timestamp_ms);
        stroke.push_point(point);
        debug!(
            "begin: stroke {} ({:?}) at ({:.1}, {:.1})",
            id,
            stroke.settings().tool,
            sample.position.x,
            sample.position.y
        );

        self.active = Some(ActiveCapture {
            stroke,
            velocity: 0.0,
            pressure,
            last_sample_position: sample.position,
            last_sample_time_ms: sample.timestamp_ms,
            last_emitted_position: sample.position,
        });
        true
    }

    /// Feed one move sample. Returns true when it produced a new point.
    pub fn extend(&mut self, sample: PointerSample) -> bool {
        let Some(active) = self.active.as_mut() else {
            debug!("extend: no active stroke, ignoring");
            return false;
        };

        let elapsed_ms = sample.timestamp_ms - active.last_sample_time_ms;
        if elapsed_ms.is_nan() || elapsed_ms <= 0.0 {
            debug!("extend: non-positive elapsed time {:.3}ms, dropping sample", elapsed_ms);
            return false;
        }
        if !sample.position.is_finite() {
            debug!("extend: non-finite position, dropping sample");
            return false;
        }
        let sample = sample.with_finite_tilt();

        let distance = active.last_sample_position.distance(sample.position);
        let instant = (distance as f64 / (elapsed_ms / 1000.0)) as f32;
        let a_v = self.config.velocity_smoothing;
        let a_p = self.config.pressure_smoothing;
        active.velocity = active.velocity * a_v + instant * (1.0 - a_v);
        active.pressure = active.pressure * a_p + sanitize_pressure(sample.pressure) * (1.0 - a_p);
        active.last_sample_position = sample.position;
        active.last_sample_time_ms = sample.timestamp_ms;

        let settings = active.stroke.settings();
        let gate = (settings.spacing * settings.size).max(self.config.min_spacing);
        let moved = active.last_emitted_position.distance(sample.position);
        if moved <= gate {
            return false;
        }

        let tilt = sample.tilt();
        let point = StrokePoint {
            position: sample.position,
            pressure: active.pressure,
            tilt,
            tilt_x: sample.tilt_x,
            tilt_y: sample.tilt_y,
            timestamp_ms: sample.timestamp_ms,
            velocity: instant,
            size: settings.point_size(active.pressure, active.velocity, tilt),
            opacity: settings.point_opacity(active.pressure),
        };
        active.last_emitted_position = sample.position;
        active.stroke.push_point(point);
        true
    }

    /// Finalize the stroke. Returns `None` when idle or when fewer than two
    /// points were captured; the caller commits whatever is returned.
    pub fn finish(&mut self) -> Option<Stroke> {
        let active = self.active.take()?;
        let stroke = active.stroke;
        if stroke.len() < 2 {
            debug!("finish: stroke {} has {} point(s), discarding", stroke.id(), stroke.len());
            return None;
        }

        let optimized = optimize_points(
            stroke.points(),
            self.config.optimize_angle_threshold,
            self.config.optimize_pressure_threshold,
        );
        debug!(
            "finish: stroke {} optimized {} -> {} points",
            stroke.id(),
            stroke.len(),
            optimized.len()
        );
        Some(stroke.with_points(optimized))
    }

    /// Abandon the gesture without committing anything. Returns true if a
    /// stroke was discarded.
    pub fn cancel(&mut self) -> bool {
        match self.active.take() {
            Some(active) => {
                debug!("cancel: discarding stroke {}", active.stroke.id());
                true
            }
            None => false,
        }
    }
}

/// Local shape-preserving decimation
///
/// Keeps the first and last point. An interior point survives when the
/// direction change from the last kept point through it to the next point
/// exceeds `angle_threshold` radians, or when its pressure differs from the
/// last kept point by more than `pressure_threshold`.
pub fn optimize_points(
    points: &[StrokePoint],
    angle_threshold: f32,
    pressure_threshold: f32,
) -> Vec<StrokePoint> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let mut kept = Vec::with_capacity(points.len());
    kept.push(points[0]);
    for i in 1..points.len() - 1 {
        let last = kept[kept.len() - 1];
        let current = &points[i];
        let incoming = current.position - last.position;
        let outgoing = points[i + 1].position - current.position;

        let angle = if incoming.length_squared() > 0.0 && outgoing.length_squared() > 0.0 {
            incoming.perp_dot(outgoing).atan2(incoming.dot(outgoing)).abs()
        } else {
            0.0
        };
        let pressure_delta = (current.pressure - last.pressure).abs();

        if angle > angle_threshold || pressure_delta > pressure_threshold {
            kept.push(*current);
        }
    }
    kept.push(points[points.len() - 1]);
    kept
}
