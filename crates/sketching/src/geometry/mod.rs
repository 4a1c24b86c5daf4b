//! Stroke geometry generators
//!
//! Turns a point sequence plus [`ToolSettings`] into drawable primitives.
//! Every generator is a pure function; dispatch is by [`ToolKind`]:
//! - [`pencil`] - per-segment lines with seeded texture sub-lines
//! - [`pen`] - one quadratic path at constant width
//! - [`marker`] - stacked translucent multiply layers
//! - [`brush`] - radial dabs or nib quads
//! - [`eraser`] - erase-blended lines with an optional feather pass
//! - [`calligraphy`] - one contiguous triangle mesh
//! - [`pastel`] - seeded grain dabs
//!
//! The renderer rasterizes the result; nothing here touches pixels.

pub mod brush;
pub mod calligraphy;
pub mod eraser;
pub mod marker;
pub mod pastel;
pub mod pen;
pub mod pencil;

pub use calligraphy::{CalligraphyParams, CalligraphySegment};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use sketch_config::GeometryConfig;

use crate::backend::GeometryBackend;
use crate::settings::ToolSettings;
use crate::stroke::Stroke;
use crate::types::{BlendMode, Rect, StrokePoint, ToolKind, scale_alpha};

/// Path construction command
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCommand {
    MoveTo(Vec2),
    LineTo(Vec2),
    QuadTo { ctrl: Vec2, to: Vec2 },
}

impl PathCommand {
    /// Every point the command references, control points included
    fn points(&self) -> impl Iterator<Item = Vec2> {
        let (a, b) = match *self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => (p, None),
            PathCommand::QuadTo { ctrl, to } => (ctrl, Some(to)),
        };
        std::iter::once(a).chain(b)
    }
}

/// Vertex of a contiguous triangle mesh
///
/// Layout matches what a GPU vertex buffer expects, so the vertex slice can be
/// uploaded as raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct MeshVertex {
    pub position: [f32; 2],
    pub alpha: f32,
}

/// Indexed triangle list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex buffer as raw bytes
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index buffer as raw bytes
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// One drawable primitive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Primitive {
    /// Round-capped line segment
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: [f32; 4],
    },
    /// Stroked path with round joins
    Path {
        commands: Vec<PathCommand>,
        width: f32,
        color: [f32; 4],
    },
    /// Filled convex polygon
    Polygon { points: Vec<Vec2>, color: [f32; 4] },
    /// Triangle mesh; vertex alpha multiplies the color alpha
    Mesh { mesh: TriangleMesh, color: [f32; 4] },
    /// Filled circle, opaque up to `hardness * radius` then fading to transparent
    RadialDab {
        center: Vec2,
        radius: f32,
        hardness: f32,
        color: [f32; 4],
    },
}

impl Primitive {
    /// Area the primitive can touch, `None` when it has no extent
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Primitive::Line {
                from, to, width, ..
            } => Rect::from_points([*from, *to]).map(|r| r.expand(width * 0.5)),
            Primitive::Path {
                commands, width, ..
            } => Rect::from_points(commands.iter().flat_map(PathCommand::points))
                .map(|r| r.expand(width * 0.5)),
            Primitive::Polygon { points, .. } => Rect::from_points(points.iter().copied()),
            Primitive::Mesh { mesh, .. } => {
                Rect::from_points(mesh.vertices.iter().map(|v| Vec2::from(v.position)))
            }
            Primitive::RadialDab { center, radius, .. } => {
                Some(Rect::from_center_size(*center, Vec2::splat(radius * 2.0)))
            }
        }
    }
}

/// A primitive with its compositing mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub primitive: Primitive,
    pub blend: BlendMode,
}

impl Shape {
    pub fn new(primitive: Primitive, blend: BlendMode) -> Self {
        Self { primitive, blend }
    }
}

/// All primitives for one stroke, in draw order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeGeometry {
    pub tool: ToolKind,
    pub anti_alias: bool,
    pub shapes: Vec<Shape>,
}

impl StrokeGeometry {
    pub fn empty(tool: ToolKind, anti_alias: bool) -> Self {
        Self {
            tool,
            anti_alias,
            shapes: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Union of every shape's bounds
    pub fn bounds(&self) -> Option<Rect> {
        self.shapes
            .iter()
            .filter_map(|s| s.primitive.bounds())
            .reduce(Rect::union)
    }
}

/// What generators may consult besides the points and settings
#[derive(Debug, Clone, Copy)]
pub struct GeometryContext<'a> {
    pub backend: &'a dyn GeometryBackend,
    pub config: &'a GeometryConfig,
}

impl<'a> GeometryContext<'a> {
    pub fn new(backend: &'a dyn GeometryBackend, config: &'a GeometryConfig) -> Self {
        Self { backend, config }
    }
}

/// Generate geometry for a point sequence drawn with `settings`
pub fn generate(
    points: &[StrokePoint],
    settings: &ToolSettings,
    ctx: &GeometryContext<'_>,
) -> StrokeGeometry {
    let mut geometry = StrokeGeometry::empty(settings.tool, settings.anti_alias);
    match points {
        [] => {}
        [single] => geometry.shapes.push(dot(single, settings)),
        _ => {
            geometry.shapes = match settings.tool {
                ToolKind::Pencil => pencil::build(points, settings, ctx),
                ToolKind::Pen => pen::build(points, settings),
                ToolKind::Marker => marker::build(points, settings),
                ToolKind::Eraser => eraser::build(points, settings),
                ToolKind::Brush => brush::build(points, settings, ctx),
                ToolKind::Calligraphy => calligraphy::build(points, settings, ctx),
                ToolKind::Pastel => pastel::build(points, settings, ctx),
            }
        }
    }
    geometry
}

/// Generate geometry for a recorded stroke
pub fn generate_stroke(stroke: &Stroke, ctx: &GeometryContext<'_>) -> StrokeGeometry {
    generate(stroke.points(), stroke.settings(), ctx)
}

/// Blend mode a tool composites with
pub(crate) fn blend_for(settings: &ToolSettings) -> BlendMode {
    if settings.tool == ToolKind::Eraser {
        BlendMode::Erase
    } else {
        settings.blend_mode
    }
}

/// A tap with no movement: one dab at the point size
fn dot(point: &StrokePoint, settings: &ToolSettings) -> Shape {
    Shape::new(
        Primitive::RadialDab {
            center: point.position,
            radius: (point.size * 0.5).max(0.5),
            hardness: settings.hardness,
            color: scale_alpha(settings.color, point.opacity),
        },
        blend_for(settings),
    )
}
