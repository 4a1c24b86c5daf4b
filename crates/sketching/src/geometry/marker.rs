//! Marker: overlapping translucent layers composited with multiply.
//!
//! Layers narrow as they get more opaque, which leaves a soft fringe around a
//! denser core.

use glam::Vec2;

use crate::constants::SPLINE_SAMPLES_PER_SPAN;
use crate::filters::catmull_rom_spline;
use crate::settings::ToolSettings;
use crate::types::{StrokePoint, scale_alpha};

use super::{PathCommand, Primitive, Shape, blend_for};

/// `(width scale, opacity scale)` per layer, drawn in order
pub const MARKER_LAYERS: [(f32, f32); 3] = [(1.0, 0.35), (0.75, 0.55), (0.5, 0.8)];

pub(crate) fn build(points: &[StrokePoint], settings: &ToolSettings) -> Vec<Shape> {
    let count = points.len() as f32;
    let width = points.iter().map(|p| p.size).sum::<f32>() / count;
    let opacity = points.iter().map(|p| p.opacity).sum::<f32>() / count;

    let positions: Vec<Vec2> = points.iter().map(|p| p.position).collect();
    let dense = catmull_rom_spline(
        &positions,
        SPLINE_SAMPLES_PER_SPAN,
        settings.smoothing.spline_alpha,
        settings.smoothing.spline_tension,
    );
    let commands: Vec<PathCommand> = dense
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            if i == 0 {
                PathCommand::MoveTo(p)
            } else {
                PathCommand::LineTo(p)
            }
        })
        .collect();

    let blend = blend_for(settings);
    MARKER_LAYERS
        .iter()
        .map(|&(width_scale, opacity_scale)| {
            Shape::new(
                Primitive::Path {
                    commands: commands.clone(),
                    width: width * width_scale,
                    color: scale_alpha(settings.color, opacity * opacity_scale),
                },
                blend,
            )
        })
        .collect()
}
