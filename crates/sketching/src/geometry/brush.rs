//! Brush: radial-gradient dabs, or nib quads in [`BrushStyle::Nib`] mode.

use crate::settings::{BrushStyle, ToolSettings};
use crate::types::{StrokePoint, scale_alpha};

use super::calligraphy::nib_points;
use super::{CalligraphyParams, GeometryContext, Primitive, Shape, blend_for};

pub(crate) fn build(
    points: &[StrokePoint],
    settings: &ToolSettings,
    ctx: &GeometryContext<'_>,
) -> Vec<Shape> {
    match settings.brush_style {
        BrushStyle::Radial => radial_dabs(points, settings),
        BrushStyle::Nib => nib_quads(points, settings, ctx),
    }
}

/// One dab centred on each segment midpoint
fn radial_dabs(points: &[StrokePoint], settings: &ToolSettings) -> Vec<Shape> {
    let blend = blend_for(settings);
    points
        .windows(2)
        .map(|pair| {
            let (a, b) = (&pair[0], &pair[1]);
            Shape::new(
                Primitive::RadialDab {
                    center: (a.position + b.position) * 0.5,
                    radius: (a.size + b.size) * 0.25,
                    hardness: settings.hardness,
                    color: scale_alpha(settings.color, (a.opacity + b.opacity) * 0.5),
                },
                blend,
            )
        })
        .collect()
}

/// Quads joining consecutive nib footprints; the footprint spans the nib axis
fn nib_quads(
    points: &[StrokePoint],
    settings: &ToolSettings,
    ctx: &GeometryContext<'_>,
) -> Vec<Shape> {
    let params = CalligraphyParams {
        opacity: settings.opacity * settings.flow,
        ..CalligraphyParams::from_settings(settings)
    };
    let nib = params.nib_direction();
    let blend = blend_for(settings);

    ctx.backend
        .calligraphy_segments(
            &nib_points(points, settings),
            &params,
            ctx.config.max_calligraphy_segments,
        )
        .into_iter()
        .map(|seg| {
            let half = nib * seg.thickness * 0.5;
            Shape::new(
                Primitive::Polygon {
                    points: vec![seg.from - half, seg.from + half, seg.to + half, seg.to - half],
                    color: scale_alpha(settings.color, seg.alpha),
                },
                blend,
            )
        })
        .collect()
}
