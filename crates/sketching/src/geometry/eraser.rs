//! Eraser: segment lines composited with [`BlendMode::Erase`], over an
//! optional wider feather pass for soft edges.

use crate::constants::{ERASER_FEATHER_ALPHA, ERASER_FEATHER_SCALE};
use crate::settings::ToolSettings;
use crate::types::{BlendMode, StrokePoint};

use super::{Primitive, Shape};

pub(crate) fn build(points: &[StrokePoint], settings: &ToolSettings) -> Vec<Shape> {
    let segments = points.len() - 1;
    let mut shapes = Vec::with_capacity(if settings.feather { segments * 2 } else { segments });

    // Color only carries erase strength; the rgb channels are ignored
    let line = |a: &StrokePoint, b: &StrokePoint, width_scale: f32, alpha: f32| {
        Shape::new(
            Primitive::Line {
                from: a.position,
                to: b.position,
                width: (a.size + b.size) * 0.5 * width_scale,
                color: [0.0, 0.0, 0.0, alpha.clamp(0.0, 1.0)],
            },
            BlendMode::Erase,
        )
    };

    if settings.feather {
        for pair in points.windows(2) {
            shapes.push(line(
                &pair[0],
                &pair[1],
                ERASER_FEATHER_SCALE,
                settings.opacity * ERASER_FEATHER_ALPHA,
            ));
        }
    }
    for pair in points.windows(2) {
        let alpha = (pair[0].opacity + pair[1].opacity) * 0.5;
        shapes.push(line(&pair[0], &pair[1], 1.0, alpha));
    }
    shapes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::test_support::curve;
    use crate::settings::SettingUpdate;
    use crate::types::ToolKind;

    fn width(shape: &Shape) -> f32 {
        match shape.primitive {
            Primitive::Line { width, .. } => width,
            _ => 0.0,
        }
    }

    #[test]
    fn test_feather_pass_beneath_main_pass() {
        let settings = ToolSettings::preset(ToolKind::Eraser);
        let points = curve(&settings, 4);
        let shapes = build(&points, &settings);
        assert_eq!(shapes.len(), 6);
        assert!(shapes.iter().all(|s| s.blend == BlendMode::Erase));
        assert!((width(&shapes[0]) - width(&shapes[3]) * ERASER_FEATHER_SCALE).abs() < 1e-4);
    }

    #[test]
    fn test_without_feather() {
        let settings =
            ToolSettings::preset(ToolKind::Eraser).with(SettingUpdate::Feather(false));
        let shapes = build(&curve(&settings, 4), &settings);
        assert_eq!(shapes.len(), 3);
    }
}
