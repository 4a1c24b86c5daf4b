//! Render composer
//!
//! Builds the per-frame draw list from the document's live strokes, the
//! in-progress stroke and the background image state. Rasterization stays
//! with the platform layer.
//!
//! Draw order: background (when visible), finalized strokes in insertion
//! order, then the in-progress stroke on top.

mod background;
mod cache;

pub use background::{BackgroundFit, BackgroundState};
pub use cache::GeometryCache;

use std::sync::Arc;

use glam::Vec2;
use sketch_config::GeometryConfig;
use tracing::debug;

use crate::backend::GeometryBackend;
use crate::geometry::{GeometryContext, StrokeGeometry, generate_stroke};
use crate::stroke::Stroke;
use crate::types::{Rect, StrokeId};

/// Everything a frame depends on
///
/// Cloning is cheap; the stroke list and strokes are shared.
#[derive(Debug, Clone)]
pub struct ComposerInput {
    pub strokes: Arc<Vec<Arc<Stroke>>>,
    /// Snapshot of the stroke being captured
    pub live: Option<Arc<Stroke>>,
    pub background: Option<BackgroundState>,
    pub canvas_size: Vec2,
}

impl ComposerInput {
    pub fn new(strokes: Arc<Vec<Arc<Stroke>>>, canvas_size: Vec2) -> Self {
        Self {
            strokes,
            live: None,
            background: None,
            canvas_size,
        }
    }

    pub fn with_live(mut self, live: Option<Arc<Stroke>>) -> Self {
        self.live = live;
        self
    }

    pub fn with_background(mut self, background: Option<BackgroundState>) -> Self {
        self.background = background;
        self
    }
}

/// Whether the frame for `next` can differ from the one for `prev`
///
/// Compares structure and identity only: list length and identity, each
/// stroke's identity, the in-progress stroke and the background state.
pub fn should_redraw(prev: &ComposerInput, next: &ComposerInput) -> bool {
    if prev.canvas_size != next.canvas_size || prev.background != next.background {
        return true;
    }
    if live_changed(prev.live.as_deref(), next.live.as_deref()) {
        return true;
    }
    if prev.strokes.len() != next.strokes.len() {
        return true;
    }
    if Arc::ptr_eq(&prev.strokes, &next.strokes) {
        return false;
    }
    // Same length, different list: only unchanged if every stroke is shared
    !prev
        .strokes
        .iter()
        .zip(next.strokes.iter())
        .all(|(a, b)| Arc::ptr_eq(a, b))
}

fn live_changed(prev: Option<&Stroke>, next: Option<&Stroke>) -> bool {
    match (prev, next) {
        (None, None) => false,
        (Some(a), Some(b)) => {
            a.id() != b.id() || a.len() != b.len() || a.last_point() != b.last_point()
        }
        _ => true,
    }
}

/// One entry of a draw list
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Opaque image drawn into `dest`
    Background {
        handle: u64,
        dest: Rect,
        opacity: f32,
    },
    Stroke {
        id: StrokeId,
        /// The in-progress stroke
        live: bool,
        geometry: Arc<StrokeGeometry>,
    },
}

/// Ordered draw commands for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    pub canvas_size: Vec2,
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Union of all stroke geometry bounds
    pub fn stroke_bounds(&self) -> Option<Rect> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Stroke { geometry, .. } => geometry.bounds(),
                DrawCommand::Background { .. } => None,
            })
            .reduce(Rect::union)
    }
}

/// Produces draw lists, caching geometry of finalized strokes
pub struct RenderComposer {
    backend: Arc<dyn GeometryBackend>,
    config: GeometryConfig,
    cache: GeometryCache,
    last_input: Option<ComposerInput>,
}

impl std::fmt::Debug for RenderComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderComposer")
            .field("backend", &self.backend.name())
            .field("cache", &self.cache)
            .field("has_last_input", &self.last_input.is_some())
            .finish()
    }
}

impl RenderComposer {
    pub fn new(backend: Arc<dyn GeometryBackend>, config: GeometryConfig) -> Self {
        let cache = GeometryCache::new(config.geometry_cache_capacity);
        Self {
            backend,
            config,
            cache,
            last_input: None,
        }
    }

    pub fn backend(&self) -> &Arc<dyn GeometryBackend> {
        &self.backend
    }

    pub fn cache(&self) -> &GeometryCache {
        &self.cache
    }

    /// Memory-pressure hook: drop all cached geometry
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.last_input = None;
    }

    /// Drop cached geometry for strokes no longer live
    pub fn retain_live(&mut self, live: &[Arc<Stroke>]) -> usize {
        self.cache.retain_live(live)
    }

    /// Build the draw list for `input`
    pub fn compose(&mut self, input: &ComposerInput) -> DrawList {
        let mut commands = Vec::with_capacity(input.strokes.len() + 2);

        let background = input
            .background
            .filter(BackgroundState::is_drawable)
            .and_then(|bg| bg.dest_rect(input.canvas_size).map(|dest| (bg, dest)));
        if let Some((bg, dest)) = background {
            commands.push(DrawCommand::Background {
                handle: bg.handle,
                dest,
                opacity: bg.opacity,
            });
        }

        let ctx = GeometryContext::new(self.backend.as_ref(), &self.config);
        for stroke in input.strokes.iter() {
            let geometry = self
                .cache
                .get_or_insert_with(stroke, |s| generate_stroke(s, &ctx));
            commands.push(DrawCommand::Stroke {
                id: stroke.id(),
                live: false,
                geometry,
            });
        }

        if let Some(live) = &input.live {
            commands.push(DrawCommand::Stroke {
                id: live.id(),
                live: true,
                geometry: Arc::new(generate_stroke(live, &ctx)),
            });
        }

        DrawList {
            canvas_size: input.canvas_size,
            commands,
        }
    }

    /// Compose only when the frame would change since the last call
    pub fn frame(&mut self, input: &ComposerInput) -> Option<DrawList> {
        let unchanged = self
            .last_input
            .as_ref()
            .is_some_and(|prev| !should_redraw(prev, input));
        if unchanged {
            debug!("frame: input unchanged, skipping redraw");
            return None;
        }
        let list = self.compose(input);
        self.last_input = Some(input.clone());
        Some(list)
    }
}
