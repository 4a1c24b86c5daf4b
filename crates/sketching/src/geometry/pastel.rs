//! Pastel: soft grain dabs scattered along each segment.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::settings::ToolSettings;
use crate::types::{StrokePoint, scale_alpha};

use super::{GeometryContext, Primitive, Shape, blend_for};

pub(crate) fn build(
    points: &[StrokePoint],
    settings: &ToolSettings,
    ctx: &GeometryContext<'_>,
) -> Vec<Shape> {
    let grains = ctx.config.pastel_grains.max(1);
    let blend = blend_for(settings);
    let mut shapes = Vec::with_capacity((points.len() - 1) * grains);

    for (index, pair) in points.windows(2).enumerate() {
        let (a, b) = (&pair[0], &pair[1]);
        let width = (a.size + b.size) * 0.5;
        let alpha = (a.opacity + b.opacity) * 0.5;
        let normal = (b.position - a.position).normalize_or_zero().perp();

        // Offset keeps pastel grain independent of pencil grain on the same segment
        let mut rng = StdRng::seed_from_u64(0x9e37_79b9_0000_0000 ^ index as u64);
        for _ in 0..grains {
            let along = rng.random::<f32>();
            let across = rng.random_range(-0.5..=0.5_f32) * width;
            shapes.push(Shape::new(
                Primitive::RadialDab {
                    center: a.position.lerp(b.position, along) + normal * across,
                    radius: width * rng.random_range(0.25..=0.5_f32),
                    hardness: settings.hardness,
                    color: scale_alpha(settings.color, alpha * rng.random_range(0.4..=1.0_f32)),
                },
                blend,
            ));
        }
    }
    shapes
}
