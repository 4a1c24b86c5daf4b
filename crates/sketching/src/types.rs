use std::f32::consts::FRAC_PI_2;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Unique stroke identifier within a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrokeId(pub u64);

impl fmt::Display for StrokeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Drawing tool kinds. Geometry dispatch is by this tag.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ToolKind {
    Pencil = 0,
    #[default]
    Pen = 1,
    Marker = 2,
    Eraser = 3,
    Brush = 4,
    Calligraphy = 5,
    Pastel = 6,
}

impl ToolKind {
    pub const ALL: [ToolKind; 7] = [
        ToolKind::Pencil,
        ToolKind::Pen,
        ToolKind::Marker,
        ToolKind::Eraser,
        ToolKind::Brush,
        ToolKind::Calligraphy,
        ToolKind::Pastel,
    ];

    /// Which input dynamics this tool reacts to
    pub fn capabilities(self) -> Capabilities {
        match self {
            ToolKind::Pencil => Capabilities {
                pressure: true,
                velocity: true,
                tilt: true,
            },
            ToolKind::Pen => Capabilities::default(),
            ToolKind::Marker | ToolKind::Eraser => Capabilities {
                pressure: true,
                ..Default::default()
            },
            ToolKind::Brush => Capabilities {
                pressure: true,
                velocity: true,
                tilt: false,
            },
            ToolKind::Calligraphy | ToolKind::Pastel => Capabilities {
                pressure: true,
                velocity: false,
                tilt: true,
            },
        }
    }
}

/// Input dynamics a tool can respond to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub pressure: bool,
    pub velocity: bool,
    pub tilt: bool,
}

/// Compositing mode for generated geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum BlendMode {
    #[default]
    Normal = 0,
    Multiply = 1,
    /// Clears destination alpha instead of painting color
    Erase = 2,
}

/// Multiply the alpha channel of an RGBA color
#[inline]
pub fn scale_alpha(color: [f32; 4], factor: f32) -> [f32; 4] {
    [color[0], color[1], color[2], (color[3] * factor).clamp(0.0, 1.0)]
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self::new(center - half, center + half)
    }

    /// Tight bounds of a point set, `None` when empty
    pub fn from_points<I: IntoIterator<Item = Vec2>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut rect = Self::new(first, first);
        for p in iter {
            rect.min = rect.min.min(p);
            rect.max = rect.max.max(p);
        }
        Some(rect)
    }

    /// Grow the rectangle by `amount` on every side
    pub fn expand(self, amount: f32) -> Self {
        Self::new(self.min - Vec2::splat(amount), self.max + Vec2::splat(amount))
    }

    pub fn union(self, other: Rect) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// One raw event from the pointer/stylus layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub position: Vec2,
    /// 0..1, 1.0 when the device reports no pressure
    pub pressure: f32,
    /// Tilt around the x/y axes in radians
    pub tilt_x: f32,
    pub tilt_y: f32,
    /// Milliseconds since an arbitrary epoch
    pub timestamp_ms: f64,
}

impl PointerSample {
    pub fn new(x: f32, y: f32, pressure: f32, timestamp_ms: f64) -> Self {
        Self {
            position: Vec2::new(x, y),
            pressure,
            tilt_x: 0.0,
            tilt_y: 0.0,
            timestamp_ms,
        }
    }

    pub fn with_tilt(mut self, tilt_x: f32, tilt_y: f32) -> Self {
        self.tilt_x = tilt_x;
        self.tilt_y = tilt_y;
        self
    }

    /// Copy with non-finite tilt components replaced by 0 (upright)
    pub fn with_finite_tilt(self) -> Self {
        let finite_or_zero = |v: f32| if v.is_finite() { v } else { 0.0 };
        self.with_tilt(finite_or_zero(self.tilt_x), finite_or_zero(self.tilt_y))
    }

    /// Whether position and timestamp are usable
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.timestamp_ms.is_finite()
    }

    /// Tilt magnitude normalized to 0 (upright) ..1 (flat); non-finite
    /// components count as upright
    pub fn tilt(&self) -> f32 {
        let s = self.with_finite_tilt();
        (Vec2::new(s.tilt_x, s.tilt_y).length() / FRAC_PI_2).clamp(0.0, 1.0)
    }
}

/// One sample along a stroke
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub position: Vec2,
    pub pressure: f32,
    pub tilt: f32,
    pub tilt_x: f32,
    pub tilt_y: f32,
    pub timestamp_ms: f64,
    /// Units per second, derived during capture
    pub velocity: f32,
    /// Effective rendered width
    pub size: f32,
    /// Effective alpha
    pub opacity: f32,
}

impl Default for StrokePoint {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            pressure: 1.0,
            tilt: 0.0,
            tilt_x: 0.0,
            tilt_y: 0.0,
            timestamp_ms: 0.0,
            velocity: 0.0,
            size: 1.0,
            opacity: 1.0,
        }
    }
}

impl StrokePoint {
    pub fn new(position: Vec2, pressure: f32, timestamp_ms: f64) -> Self {
        Self {
            position,
            pressure,
            timestamp_ms,
            ..Default::default()
        }
    }

    /// Linear interpolation of every field
    pub fn lerp(&self, other: &StrokePoint, t: f32) -> StrokePoint {
        let mix = |a: f32, b: f32| a + (b - a) * t;
        StrokePoint {
            position: self.position.lerp(other.position, t),
            pressure: mix(self.pressure, other.pressure),
            tilt: mix(self.tilt, other.tilt),
            tilt_x: mix(self.tilt_x, other.tilt_x),
            tilt_y: mix(self.tilt_y, other.tilt_y),
            timestamp_ms: self.timestamp_ms + (other.timestamp_ms - self.timestamp_ms) * t as f64,
            velocity: mix(self.velocity, other.velocity),
            size: mix(self.size, other.size),
            opacity: mix(self.opacity, other.opacity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_from_points() {
        let rect = Rect::from_points([Vec2::new(1.0, 5.0), Vec2::new(-2.0, 3.0), Vec2::new(4.0, 0.0)])
            .unwrap();
        assert_eq!(rect.min, Vec2::new(-2.0, 0.0));
        assert_eq!(rect.max, Vec2::new(4.0, 5.0));
        assert!(Rect::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn test_rect_expand_and_union() {
        let a = Rect::new(Vec2::ZERO, Vec2::ONE).expand(1.0);
        assert_eq!(a.min, Vec2::splat(-1.0));
        assert_eq!(a.width(), 3.0);

        let b = Rect::new(Vec2::splat(5.0), Vec2::splat(6.0));
        let u = a.union(b);
        assert_eq!(u.max, Vec2::splat(6.0));
        assert!(u.contains(Vec2::splat(3.0)));
    }

    #[test]
    fn test_point_lerp() {
        let a = StrokePoint::new(Vec2::ZERO, 0.0, 0.0);
        let b = StrokePoint::new(Vec2::new(10.0, 0.0), 1.0, 100.0);
        let mid = a.lerp(&b, 0.5);
        assert_eq!(mid.position, Vec2::new(5.0, 0.0));
        assert!((mid.pressure - 0.5).abs() < 1e-6);
        assert!((mid.timestamp_ms - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_sample_tilt_normalized() {
        let upright = PointerSample::new(0.0, 0.0, 1.0, 0.0);
        assert_eq!(upright.tilt(), 0.0);

        let flat = upright.with_tilt(FRAC_PI_2, 0.0);
        assert!((flat.tilt() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_capabilities() {
        assert_eq!(ToolKind::Pen.capabilities(), Capabilities::default());
        assert!(ToolKind::Pencil.capabilities().velocity);
        assert!(ToolKind::Marker.capabilities().pressure);
        assert!(!ToolKind::Marker.capabilities().tilt);
    }
}
