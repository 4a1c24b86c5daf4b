//! Tool settings, presets and typed setting updates
//!
//! [`ToolSettings`] is a snapshot: a stroke copies the settings active when it
//! began. Changing a setting produces a new value through
//! [`ToolSettings::with`] rather than mutating one in place.

use serde::{Deserialize, Serialize};

use crate::constants::{
    MAX_SPACING_FRACTION, MAX_TOOL_SIZE, MIN_SPACING_FRACTION, MIN_TOOL_SIZE,
    MIN_VELOCITY_FACTOR, NIB_WIDTH_FACTOR_MAX, NIB_WIDTH_FACTOR_MIN, PENCIL_MAX_OPACITY,
    PENCIL_MIN_OPACITY, TILT_WIDTH_GAIN, VELOCITY_HALF_WIDTH_SPEED,
};
use crate::filters::OneEuroParams;
use crate::types::{BlendMode, ToolKind};

/// Smoothing coefficients used when post-processing strokes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothingSettings {
    /// One-euro filter parameters
    pub one_euro: OneEuroParams,
    /// Catmull-Rom knot exponent (0.5 = centripetal)
    pub spline_alpha: f32,
    /// Catmull-Rom tension (0 = standard, 1 = linear)
    pub spline_tension: f32,
}

impl Default for SmoothingSettings {
    fn default() -> Self {
        Self {
            one_euro: OneEuroParams::default(),
            spline_alpha: 0.5,
            spline_tension: 0.0,
        }
    }
}

/// Calligraphy nib description
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NibSettings {
    /// Nib axis angle in degrees
    pub angle_deg: f32,
    /// Width multiplier, clamped to 0.3..2.5 when used
    pub width_factor: f32,
}

impl Default for NibSettings {
    fn default() -> Self {
        Self {
            angle_deg: 45.0,
            width_factor: 1.0,
        }
    }
}

/// How the brush tool lays down paint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrushStyle {
    /// Radial-gradient dabs at segment midpoints
    #[default]
    Radial,
    /// Oriented nib quads between consecutive footprints
    Nib,
}

/// Immutable configuration snapshot for one tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSettings {
    pub tool: ToolKind,
    /// Base diameter in canvas units
    pub size: f32,
    /// Base opacity 0.0-1.0
    pub opacity: f32,
    /// Paint flow 0.0-1.0, multiplies opacity for brushes
    pub flow: f32,
    /// Hardness: 0.0 = soft, 1.0 = hard
    pub hardness: f32,
    /// Spacing as fraction of size
    pub spacing: f32,
    /// RGBA 0.0-1.0
    pub color: [f32; 4],
    pub blend_mode: BlendMode,
    pub pressure_sensitive: bool,
    pub velocity_sensitive: bool,
    pub tilt_sensitive: bool,
    pub anti_alias: bool,
    pub smoothing: SmoothingSettings,
    pub nib: NibSettings,
    pub brush_style: BrushStyle,
    /// Soft feather pass beneath eraser strokes
    pub feather: bool,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self::preset(ToolKind::default())
    }
}

impl ToolSettings {
    /// Factory preset for a tool kind
    pub fn preset(tool: ToolKind) -> Self {
        let base = Self {
            tool,
            size: 3.0,
            opacity: 1.0,
            flow: 1.0,
            hardness: 1.0,
            spacing: 0.1,
            color: [0.0, 0.0, 0.0, 1.0],
            blend_mode: BlendMode::Normal,
            pressure_sensitive: false,
            velocity_sensitive: false,
            tilt_sensitive: false,
            anti_alias: true,
            smoothing: SmoothingSettings::default(),
            nib: NibSettings::default(),
            brush_style: BrushStyle::Radial,
            feather: false,
        };

        match tool {
            ToolKind::Pencil => Self {
                size: 2.0,
                opacity: 0.9,
                hardness: 0.9,
                color: [0.2, 0.2, 0.22, 1.0],
                pressure_sensitive: true,
                velocity_sensitive: true,
                tilt_sensitive: true,
                ..base
            },
            ToolKind::Pen => base,
            ToolKind::Marker => Self {
                size: 20.0,
                opacity: 0.5,
                hardness: 0.4,
                spacing: 0.15,
                color: [1.0, 0.85, 0.1, 1.0],
                blend_mode: BlendMode::Multiply,
                pressure_sensitive: true,
                ..base
            },
            ToolKind::Eraser => Self {
                size: 24.0,
                blend_mode: BlendMode::Erase,
                pressure_sensitive: true,
                feather: true,
                ..base
            },
            ToolKind::Brush => Self {
                size: 12.0,
                opacity: 0.8,
                flow: 0.7,
                hardness: 0.5,
                spacing: 0.15,
                pressure_sensitive: true,
                velocity_sensitive: true,
                ..base
            },
            ToolKind::Calligraphy => Self {
                size: 10.0,
                spacing: 0.05,
                pressure_sensitive: true,
                tilt_sensitive: true,
                brush_style: BrushStyle::Nib,
                ..base
            },
            ToolKind::Pastel => Self {
                size: 14.0,
                opacity: 0.7,
                hardness: 0.2,
                spacing: 0.15,
                color: [0.85, 0.35, 0.4, 1.0],
                pressure_sensitive: true,
                tilt_sensitive: true,
                ..base
            },
        }
    }

    /// Apply one typed update, returning a new settings value
    #[must_use = "returns a new settings value without modifying `self`"]
    pub fn with(&self, update: SettingUpdate) -> Self {
        let mut next = self.clone();
        match update {
            SettingUpdate::Size(v) => next.size = v.clamp(MIN_TOOL_SIZE, MAX_TOOL_SIZE),
            SettingUpdate::Opacity(v) => next.opacity = v.clamp(0.0, 1.0),
            SettingUpdate::Flow(v) => next.flow = v.clamp(0.0, 1.0),
            SettingUpdate::Hardness(v) => next.hardness = v.clamp(0.0, 1.0),
            SettingUpdate::Spacing(v) => {
                next.spacing = v.clamp(MIN_SPACING_FRACTION, MAX_SPACING_FRACTION)
            }
            SettingUpdate::Color(c) => next.color = c.map(|ch| ch.clamp(0.0, 1.0)),
            SettingUpdate::BlendMode(mode) => next.blend_mode = mode,
            SettingUpdate::PressureSensitive(on) => next.pressure_sensitive = on,
            SettingUpdate::VelocitySensitive(on) => next.velocity_sensitive = on,
            SettingUpdate::TiltSensitive(on) => next.tilt_sensitive = on,
            SettingUpdate::AntiAlias(on) => next.anti_alias = on,
            SettingUpdate::Smoothing(s) => next.smoothing = s,
            SettingUpdate::NibAngle(deg) => next.nib.angle_deg = deg.rem_euclid(360.0),
            SettingUpdate::NibWidthFactor(f) => {
                next.nib.width_factor = f.clamp(NIB_WIDTH_FACTOR_MIN, NIB_WIDTH_FACTOR_MAX)
            }
            SettingUpdate::BrushStyle(style) => next.brush_style = style,
            SettingUpdate::Feather(on) => next.feather = on,
        }
        next
    }

    /// Pressure modulation is on and the tool supports it
    pub fn uses_pressure(&self) -> bool {
        self.pressure_sensitive && self.tool.capabilities().pressure
    }

    pub fn uses_velocity(&self) -> bool {
        self.velocity_sensitive && self.tool.capabilities().velocity
    }

    pub fn uses_tilt(&self) -> bool {
        self.tilt_sensitive && self.tool.capabilities().tilt
    }

    /// Effective width at a point given its dynamics
    pub fn point_size(&self, pressure: f32, velocity: f32, tilt: f32) -> f32 {
        let mut size = self.size;
        if self.uses_pressure() {
            size *= pressure.clamp(0.0, 1.0);
        }
        if self.uses_velocity() {
            size *= velocity_factor(velocity);
        }
        if self.uses_tilt() {
            size *= 1.0 + tilt.clamp(0.0, 1.0) * TILT_WIDTH_GAIN;
        }
        size
    }

    /// Effective alpha at a point
    pub fn point_opacity(&self, pressure: f32) -> f32 {
        let pressure = if self.uses_pressure() {
            pressure.clamp(0.0, 1.0)
        } else {
            1.0
        };
        let opacity = match self.tool {
            ToolKind::Pencil => {
                self.opacity * pressure.clamp(PENCIL_MIN_OPACITY, PENCIL_MAX_OPACITY)
            }
            ToolKind::Brush => self.opacity * self.flow * pressure,
            ToolKind::Pastel => self.opacity * pressure.max(0.2),
            _ => self.opacity,
        };
        opacity.clamp(0.0, 1.0)
    }
}

/// Width multiplier that thins fast strokes
pub fn velocity_factor(velocity: f32) -> f32 {
    if !velocity.is_finite() || velocity <= 0.0 {
        return 1.0;
    }
    (1.0 / (1.0 + velocity / VELOCITY_HALF_WIDTH_SPEED)).max(MIN_VELOCITY_FACTOR)
}

/// A single settable tool property with its typed value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingUpdate {
    Size(f32),
    Opacity(f32),
    Flow(f32),
    Hardness(f32),
    Spacing(f32),
    Color([f32; 4]),
    BlendMode(BlendMode),
    PressureSensitive(bool),
    VelocitySensitive(bool),
    TiltSensitive(bool),
    AntiAlias(bool),
    Smoothing(SmoothingSettings),
    NibAngle(f32),
    NibWidthFactor(f32),
    BrushStyle(BrushStyle),
    Feather(bool),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_match_tool() {
        for tool in ToolKind::ALL {
            let preset = ToolSettings::preset(tool);
            assert_eq!(preset.tool, tool);
            assert!(preset.size > 0.0);
            assert!(preset.spacing > 0.0);
        }
        assert_eq!(ToolSettings::preset(ToolKind::Eraser).blend_mode, BlendMode::Erase);
        assert_eq!(ToolSettings::preset(ToolKind::Marker).blend_mode, BlendMode::Multiply);
    }

    #[test]
    fn test_with_returns_new_value() {
        let pen = ToolSettings::preset(ToolKind::Pen);
        let bigger = pen.with(SettingUpdate::Size(12.0));
        assert_eq!(pen.size, 3.0);
        assert_eq!(bigger.size, 12.0);
        assert_eq!(bigger.tool, ToolKind::Pen);
    }

    #[test]
    fn test_with_clamps_values() {
        let pen = ToolSettings::preset(ToolKind::Pen);
        assert_eq!(pen.with(SettingUpdate::Opacity(3.0)).opacity, 1.0);
        assert_eq!(pen.with(SettingUpdate::Size(0.0)).size, MIN_TOOL_SIZE);
        assert_eq!(pen.with(SettingUpdate::Spacing(0.0)).spacing, MIN_SPACING_FRACTION);
        assert_eq!(pen.with(SettingUpdate::NibWidthFactor(10.0)).nib.width_factor, 2.5);
        assert_eq!(pen.with(SettingUpdate::NibAngle(-90.0)).nib.angle_deg, 270.0);
    }

    #[test]
    fn test_pen_ignores_pressure() {
        let pen = ToolSettings::preset(ToolKind::Pen).with(SettingUpdate::PressureSensitive(true));
        // Capability gate wins over the flag
        assert!(!pen.uses_pressure());
        assert_eq!(pen.point_size(0.2, 5000.0, 1.0), pen.size);
    }

    #[test]
    fn test_pencil_dynamics() {
        let pencil = ToolSettings::preset(ToolKind::Pencil);
        let slow = pencil.point_size(1.0, 0.0, 0.0);
        let fast = pencil.point_size(1.0, 4000.0, 0.0);
        assert!(fast < slow);
        assert!(pencil.point_size(0.5, 0.0, 0.0) < slow);

        assert!((pencil.point_opacity(0.0) - pencil.opacity * PENCIL_MIN_OPACITY).abs() < 1e-6);
        assert!((pencil.point_opacity(1.0) - pencil.opacity).abs() < 1e-6);
    }

    #[test]
    fn test_velocity_factor_bounds() {
        assert_eq!(velocity_factor(0.0), 1.0);
        assert_eq!(velocity_factor(f32::NAN), 1.0);
        assert!((velocity_factor(VELOCITY_HALF_WIDTH_SPEED) - 0.5).abs() < 1e-6);
        assert_eq!(velocity_factor(1e9), MIN_VELOCITY_FACTOR);
    }

    #[test]
    fn test_brush_flow_multiplies_opacity() {
        let brush = ToolSettings::preset(ToolKind::Brush);
        let expected = brush.opacity * brush.flow;
        assert!((brush.point_opacity(1.0) - expected).abs() < 1e-6);
    }
}
