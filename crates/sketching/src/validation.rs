use thiserror::Error;

use crate::constants::{MAX_TOOL_SIZE, MIN_SPACING_FRACTION};
use crate::settings::ToolSettings;
use crate::stroke::Stroke;
use crate::types::StrokePoint;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Non-finite value in {field}")]
    NonFinite { field: &'static str },
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f32 },
    #[error("Timestamp did not increase at point {index}: {previous} -> {current}")]
    NonIncreasingTimestamp {
        index: usize,
        previous: f64,
        current: f64,
    },
}

fn finite(field: &'static str, value: f32) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NonFinite { field })
    }
}

fn unit_range(field: &'static str, value: f32) -> Result<(), ValidationError> {
    finite(field, value)?;
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange { field, value })
    }
}

/// Validate a single point's fields
pub fn validate_point(point: &StrokePoint) -> Result<(), ValidationError> {
    finite("position.x", point.position.x)?;
    finite("position.y", point.position.y)?;
    unit_range("pressure", point.pressure)?;
    unit_range("opacity", point.opacity)?;
    finite("tilt", point.tilt)?;
    finite("tilt_x", point.tilt_x)?;
    finite("tilt_y", point.tilt_y)?;
    finite("velocity", point.velocity)?;
    finite("size", point.size)?;
    if point.size < 0.0 {
        return Err(ValidationError::OutOfRange {
            field: "size",
            value: point.size,
        });
    }
    if !point.timestamp_ms.is_finite() {
        return Err(ValidationError::NonFinite {
            field: "timestamp_ms",
        });
    }
    Ok(())
}

/// Validate a tool settings snapshot
pub fn validate_settings(settings: &ToolSettings) -> Result<(), ValidationError> {
    finite("size", settings.size)?;
    if settings.size <= 0.0 || settings.size > MAX_TOOL_SIZE {
        return Err(ValidationError::OutOfRange {
            field: "size",
            value: settings.size,
        });
    }
    unit_range("opacity", settings.opacity)?;
    unit_range("flow", settings.flow)?;
    unit_range("hardness", settings.hardness)?;
    finite("spacing", settings.spacing)?;
    if settings.spacing < MIN_SPACING_FRACTION {
        return Err(ValidationError::OutOfRange {
            field: "spacing",
            value: settings.spacing,
        });
    }
    for channel in settings.color {
        unit_range("color", channel)?;
    }
    finite("nib.angle_deg", settings.nib.angle_deg)?;
    finite("nib.width_factor", settings.nib.width_factor)?;
    Ok(())
}

/// Validate a whole stroke: settings, every point, and strictly increasing time
pub fn validate_stroke(stroke: &Stroke) -> Result<(), ValidationError> {
    validate_settings(stroke.settings())?;
    for point in stroke.points() {
        validate_point(point)?;
    }
    for (index, pair) in stroke.points().windows(2).enumerate() {
        if pair[1].timestamp_ms <= pair[0].timestamp_ms {
            return Err(ValidationError::NonIncreasingTimestamp {
                index: index + 1,
                previous: pair[0].timestamp_ms,
                current: pair[1].timestamp_ms,
            });
        }
    }
    Ok(())
}
