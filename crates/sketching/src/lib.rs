//! Freehand sketching engine - stroke capture, geometry and document model
//!
//! This crate turns raw pointer samples into renderable strokes:
//! - [`types`] - Points, samples, tool kinds and rectangles
//! - [`settings`] - Immutable tool settings with typed updates
//! - [`stroke`] - A recorded stroke with derived bounds
//! - [`filters`] - One-euro, resampling, RDP, velocity, Catmull-Rom, smoothing
//! - [`backend`] - Pure and accelerated geometry backends behind one trait
//! - [`geometry`] - Per-tool geometry generators
//! - [`capture`] - Stroke capture state machine
//! - [`document`] - Stroke collection with bounded undo/redo
//! - [`render`] - Render composer and geometry cache
//! - [`pipeline`] - Complete sketching pipeline
//!
//! The platform layer (pointer input, image decoding, rasterization, export)
//! stays outside the crate.

pub mod backend;
pub mod capture;
pub mod constants;
pub mod document;
pub mod filters;
pub mod geometry;
pub mod pipeline;
pub mod render;
pub mod settings;
pub mod stroke;
pub mod types;
pub mod validation;

pub use backend::*;
pub use capture::*;
pub use constants::*;
pub use document::*;
pub use geometry::{
    GeometryContext, MeshVertex, PathCommand, Primitive, Shape, StrokeGeometry, TriangleMesh,
    generate, generate_stroke,
};
pub use pipeline::*;
pub use render::*;
pub use settings::*;
pub use stroke::*;
pub use types::*;
pub use validation::*;

pub use sketch_config::{
    BackendPreference, CaptureConfig, DocumentLimits, EngineConfig, GeometryConfig,
};
