//! Pencil: short per-segment lines with jittered texture lines on top.
//!
//! Each segment seeds its own generator from its index, so redrawing the same
//! stroke always yields the same grain.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constants::PENCIL_JITTER;
use crate::settings::ToolSettings;
use crate::types::{StrokePoint, scale_alpha};

use super::{GeometryContext, Primitive, Shape, blend_for};

pub(crate) fn build(
    points: &[StrokePoint],
    settings: &ToolSettings,
    ctx: &GeometryContext<'_>,
) -> Vec<Shape> {
    let blend = blend_for(settings);
    let texture_lines = ctx.config.pencil_texture_lines;
    let mut shapes = Vec::with_capacity((points.len() - 1) * (1 + texture_lines));

    for (index, pair) in points.windows(2).enumerate() {
        let (a, b) = (&pair[0], &pair[1]);
        let width = (a.size + b.size) * 0.5;
        let alpha = (a.opacity + b.opacity) * 0.5;
        shapes.push(Shape::new(
            Primitive::Line {
                from: a.position,
                to: b.position,
                width,
                color: scale_alpha(settings.color, alpha),
            },
            blend,
        ));

        let dir = (b.position - a.position).normalize_or_zero();
        let normal = dir.perp();
        let mut rng = StdRng::seed_from_u64(index as u64);
        for _ in 0..texture_lines {
            let offset = normal * rng.random_range(-1.0..=1.0_f32) * PENCIL_JITTER * width;
            let slide = dir * rng.random_range(-0.5..=0.5_f32) * width;
            let line_width = width * rng.random_range(0.2..=0.5_f32);
            let line_alpha = alpha * rng.random_range(0.3..=0.7_f32);
            shapes.push(Shape::new(
                Primitive::Line {
                    from: a.position + offset + slide,
                    to: b.position + offset + slide,
                    width: line_width,
                    color: scale_alpha(settings.color, line_alpha),
                },
                blend,
            ));
        }
    }
    shapes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::PureBackend;
    use crate::geometry::test_support::curve;
    use crate::types::ToolKind;
    use sketch_config::GeometryConfig;

    #[test]
    fn test_texture_is_deterministic() {
        let backend = PureBackend;
        let config = GeometryConfig::default();
        let ctx = GeometryContext::new(&backend, &config);
        let settings = ToolSettings::preset(ToolKind::Pencil);
        let points = curve(&settings, 8);

        let first = build(&points, &settings, &ctx);
        let second = build(&points, &settings, &ctx);
        assert_eq!(first, second);
        assert_eq!(first.len(), 7 * (1 + config.pencil_texture_lines));
    }

    #[test]
    fn test_texture_stays_near_segment() {
        let backend = PureBackend;
        let config = GeometryConfig::default();
        let ctx = GeometryContext::new(&backend, &config);
        let settings = ToolSettings::preset(ToolKind::Pencil);
        let points = curve(&settings, 6);

        let max_width = points.iter().map(|p| p.size).fold(0.0, f32::max);
        for shape in build(&points, &settings, &ctx) {
            let Primitive::Line { from, width, color, .. } = shape.primitive else {
                panic!("pencil emits lines only");
            };
            assert!(width <= max_width + 1e-4);
            assert!(color[3] <= 1.0);
            let nearest = points
                .iter()
                .map(|p| p.position.distance(from))
                .fold(f32::MAX, f32::min);
            assert!(nearest <= max_width * 1.5);
        }
    }
}
