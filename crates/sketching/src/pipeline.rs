//! Complete sketching pipeline
//!
//! This module connects:
//! - Input handling (pointer down/move/up/cancel from the platform layer)
//! - Stroke capture (the single in-flight stroke)
//! - The document (finalized strokes with undo/redo)
//! - The render composer (per-frame draw lists)
//!
//! Nothing here blocks; every call is a bounded synchronous operation suited
//! to the input thread.

use std::sync::Arc;

use glam::Vec2;
use sketch_config::EngineConfig;
use tracing::{debug, info};

use crate::backend::{EntryPoints, GeometryBackend, select_backend};
use crate::capture::StrokeCapture;
use crate::document::{
    Document, DocumentEvent, DocumentSnapshot, DocumentStatistics, MaintenanceReport,
    SnapshotError,
};
use crate::render::{BackgroundState, ComposerInput, DrawList, RenderComposer};
use crate::settings::{SettingUpdate, ToolSettings};
use crate::stroke::Stroke;
use crate::types::{PointerSample, StrokeId, ToolKind};

/// One event from the pointer/stylus layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(PointerSample),
    Move(PointerSample),
    Up,
    /// Gesture abandoned, e.g. a second touch arrived
    Cancel,
}

/// Sketching workflow for one canvas
///
/// 1. Input comes in via `pointer_down`, `pointer_move`, `pointer_up`
/// 2. The capture state machine builds the in-flight stroke
/// 3. On release the optimized stroke is appended to the document
/// 4. Every `maintenance_interval` commits, limits are re-checked and stale
///    cached geometry is dropped
/// 5. `frame` produces a draw list when anything visible changed
pub struct SketchPipeline {
    config: EngineConfig,
    /// Settings used for the next stroke
    settings: ToolSettings,
    capture: StrokeCapture,
    document: Document,
    composer: RenderComposer,
    background: Option<BackgroundState>,
    canvas_size: Vec2,
    next_id: u64,
    commits_since_maintenance: usize,
}

impl std::fmt::Debug for SketchPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SketchPipeline")
            .field("tool", &self.settings.tool)
            .field("capturing", &self.capture.is_capturing())
            .field("document", &self.document)
            .field("composer", &self.composer)
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl SketchPipeline {
    /// Create a pipeline, selecting the backend from `config.backend` and the
    /// entry points the platform layer managed to load
    pub fn new(config: EngineConfig, canvas_size: Vec2, entry_points: Option<EntryPoints>) -> Self {
        let backend = select_backend(config.backend, entry_points);
        Self::with_backend(config, canvas_size, backend)
    }

    pub fn with_backend(
        config: EngineConfig,
        canvas_size: Vec2,
        backend: Arc<dyn GeometryBackend>,
    ) -> Self {
        info!(
            "Sketch pipeline {}x{} on {} backend",
            canvas_size.x,
            canvas_size.y,
            backend.name()
        );
        Self {
            settings: ToolSettings::default(),
            capture: StrokeCapture::new(config.capture.clone()),
            document: Document::new(config.document.clone()),
            composer: RenderComposer::new(backend, config.geometry.clone()),
            background: None,
            canvas_size,
            next_id: 1,
            commits_since_maintenance: 0,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn composer(&self) -> &RenderComposer {
        &self.composer
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn is_capturing(&self) -> bool {
        self.capture.is_capturing()
    }

    /// The in-flight stroke, if any
    pub fn current_stroke(&self) -> Option<&Stroke> {
        self.capture.current()
    }

    /// Apply a typed setting update to the next stroke. A stroke in progress
    /// keeps the settings it began with.
    pub fn apply_setting(&mut self, update: SettingUpdate) {
        debug!("apply_setting: {:?}", update);
        self.settings = self.settings.with(update);
    }

    /// Switch to the preset of `tool`
    pub fn select_tool(&mut self, tool: ToolKind) {
        debug!("select_tool: {:?}", tool);
        self.settings = ToolSettings::preset(tool);
    }

    pub fn set_settings(&mut self, settings: ToolSettings) {
        self.settings = settings;
    }

    pub fn set_background(&mut self, background: Option<BackgroundState>) {
        self.background = background;
    }

    pub fn set_canvas_size(&mut self, size: Vec2) {
        self.canvas_size = size;
    }

    pub fn add_listener<F>(&mut self, listener: F)
    where
        F: Fn(DocumentEvent) + Send + Sync + 'static,
    {
        self.document.add_listener(listener);
    }

    /// Dispatch one pointer event. Returns true if it changed capture or
    /// document state.
    pub fn handle_event(&mut self, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Down(sample) => self.pointer_down(sample),
            PointerEvent::Move(sample) => self.pointer_move(sample),
            PointerEvent::Up => self.pointer_up().is_some(),
            PointerEvent::Cancel => self.pointer_cancel(),
        }
    }

    /// Begin a stroke with the current settings
    ///
    /// Redo history is left alone until the stroke commits, so a cancelled
    /// gesture or a tap changes nothing.
    pub fn pointer_down(&mut self, sample: PointerSample) -> bool {
        if self.capture.is_capturing() {
            debug!("pointer_down: already capturing, ignoring");
            return false;
        }
        let id = StrokeId(self.next_id);
        let started = self.capture.begin(id, self.settings.clone(), sample);
        if started {
            self.next_id += 1;
        }
        started
    }

    pub fn pointer_move(&mut self, sample: PointerSample) -> bool {
        self.capture.extend(sample)
    }

    /// Finalize the gesture and commit it. Returns the committed id.
    pub fn pointer_up(&mut self) -> Option<StrokeId> {
        let stroke = self.capture.finish()?;
        let id = stroke.id();
        if !self.document.append(stroke) {
            return None;
        }
        self.commits_since_maintenance += 1;
        let interval = self.config.document.maintenance_interval;
        if interval > 0 && self.commits_since_maintenance >= interval {
            self.maintain();
        }
        Some(id)
    }

    /// Discard the gesture without touching the document
    pub fn pointer_cancel(&mut self) -> bool {
        self.capture.cancel()
    }

    pub fn undo(&mut self) -> Option<StrokeId> {
        self.document.undo()
    }

    pub fn redo(&mut self) -> Option<StrokeId> {
        self.document.redo()
    }

    pub fn clear(&mut self) -> usize {
        self.document.clear()
    }

    pub fn remove(&mut self, id: StrokeId) -> bool {
        self.document.remove(id)
    }

    pub fn statistics(&self) -> DocumentStatistics {
        self.document.statistics()
    }

    /// Re-check document limits and drop cached geometry of dead strokes
    pub fn maintain(&mut self) -> MaintenanceReport {
        self.commits_since_maintenance = 0;
        let report = self.document.maintain();
        let dropped = self.composer.retain_live(self.document.strokes());
        debug!("Maintenance: {:?}, {} cache entries dropped", report, dropped);
        report
    }

    /// Memory-pressure hook
    pub fn release_caches(&mut self) {
        self.composer.clear_cache();
    }

    pub fn export_snapshot(&self) -> Result<String, SnapshotError> {
        self.document.snapshot().to_json()
    }

    /// Replace the document with a validated snapshot. On error the document
    /// is untouched.
    pub fn import_snapshot(&mut self, json: &str) -> Result<(), SnapshotError> {
        let snapshot = DocumentSnapshot::from_json(json)?;
        if let Some(max) = snapshot.max_id() {
            self.next_id = self.next_id.max(max.0.saturating_add(1));
        }
        self.document.import_snapshot(snapshot);
        self.composer.clear_cache();
        Ok(())
    }

    /// Inputs for the next frame
    pub fn composer_input(&self) -> ComposerInput {
        ComposerInput::new(Arc::clone(self.document.strokes()), self.canvas_size)
            .with_live(self.capture.snapshot().map(Arc::new))
            .with_background(self.background)
    }

    /// Draw list for the current state
    pub fn compose(&mut self) -> DrawList {
        let input = self.composer_input();
        self.composer.compose(&input)
    }

    /// Draw list only if something visible changed since the last frame
    pub fn frame(&mut self) -> Option<DrawList> {
        let input = self.composer_input();
        self.composer.frame(&input)
    }
}
