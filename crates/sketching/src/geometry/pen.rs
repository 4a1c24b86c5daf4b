//! Pen: one smooth path at constant width. Pressure is deliberately ignored.

use crate::settings::ToolSettings;
use crate::types::{StrokePoint, scale_alpha};

use super::{PathCommand, Primitive, Shape, blend_for};

/// Quadratic path through the points: each interior point is a control point
/// and the curve passes through the midpoints between neighbours
pub fn quadratic_path(points: &[StrokePoint]) -> Vec<PathCommand> {
    let Some((first, rest)) = points.split_first() else {
        return Vec::new();
    };
    let mut commands = Vec::with_capacity(points.len() + 1);
    commands.push(PathCommand::MoveTo(first.position));

    if let Some((last, interior)) = rest.split_last() {
        for (i, p) in interior.iter().enumerate() {
            let next = rest[i + 1].position;
            commands.push(PathCommand::QuadTo {
                ctrl: p.position,
                to: (p.position + next) * 0.5,
            });
        }
        commands.push(PathCommand::LineTo(last.position));
    }
    commands
}

pub(crate) fn build(points: &[StrokePoint], settings: &ToolSettings) -> Vec<Shape> {
    vec![Shape::new(
        Primitive::Path {
            commands: quadratic_path(points),
            width: settings.size,
            color: scale_alpha(settings.color, settings.opacity),
        },
        blend_for(settings),
    )]
}
