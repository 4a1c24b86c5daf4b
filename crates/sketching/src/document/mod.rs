//! Document model
//!
//! An ordered sequence of finalized strokes (insertion order is draw order)
//! plus a bounded stack of undone strokes. Undo is linear: any mutation other
//! than undo/redo makes previously undone strokes unreachable.
//!
//! - [`Document`] - the stroke collection and its history
//! - [`DocumentEvent`] - change notifications for subscribers
//! - [`DocumentStatistics`] - aggregate queries
//! - [`DocumentSnapshot`] - validated import/export form

mod events;
mod snapshot;
mod statistics;

pub use events::DocumentEvent;
pub use snapshot::{DocumentSnapshot, SnapshotError};
pub use statistics::DocumentStatistics;

use std::collections::HashSet;
use std::sync::Arc;

use sketch_config::DocumentLimits;
use tracing::{debug, info, warn};

use crate::stroke::Stroke;
use crate::types::{Rect, StrokeId};

/// A stroke moved off the live sequence, with the index it came from
#[derive(Debug, Clone)]
struct RetainedStroke {
    stroke: Arc<Stroke>,
    index: usize,
}

/// What a maintenance sweep removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaintenanceReport {
    pub evicted: usize,
    pub dropped_undo: usize,
}

/// Ordered stroke collection with bounded undo/redo
pub struct Document {
    limits: DocumentLimits,
    /// Live strokes. Shared so renderers can hold a cheap snapshot; mutations
    /// go through `Arc::make_mut`, which gives the list a new identity.
    strokes: Arc<Vec<Arc<Stroke>>>,
    /// Undone strokes, most recent last
    undone: Vec<RetainedStroke>,
    #[allow(clippy::type_complexity)]
    listeners: Vec<Box<dyn Fn(DocumentEvent) + Send + Sync>>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("stroke_count", &self.strokes.len())
            .field("undo_depth", &self.undone.len())
            .field("listener_count", &self.listeners.len())
            .field("limits", &self.limits)
            .finish()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DocumentLimits::default())
    }
}

impl Document {
    pub fn new(limits: DocumentLimits) -> Self {
        Self {
            limits,
            strokes: Arc::new(Vec::new()),
            undone: Vec::new(),
            listeners: Vec::new(),
        }
    }

    pub fn limits(&self) -> &DocumentLimits {
        &self.limits
    }

    /// Live strokes in draw order
    pub fn strokes(&self) -> &Arc<Vec<Arc<Stroke>>> {
        &self.strokes
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn get(&self, id: StrokeId) -> Option<&Arc<Stroke>> {
        self.strokes.iter().find(|s| s.id() == id)
    }

    /// Whether `id` is live or retained for redo
    pub fn contains(&self, id: StrokeId) -> bool {
        self.get(id).is_some() || self.undone.iter().any(|r| r.stroke.id() == id)
    }

    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    /// Number of strokes retained for redo
    pub fn undo_depth(&self) -> usize {
        self.undone.len()
    }

    /// Largest id live or retained
    pub fn max_id(&self) -> Option<StrokeId> {
        self.strokes
            .iter()
            .chain(self.undone.iter().map(|r| &r.stroke))
            .map(|s| s.id())
            .max()
    }

    /// Register a change listener. Listeners run synchronously after each
    /// mutation, in registration order.
    pub fn add_listener<F>(&mut self, listener: F)
    where
        F: Fn(DocumentEvent) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&self, event: DocumentEvent) {
        for listener in &self.listeners {
            listener(event.clone());
        }
    }

    /// Forget every undone stroke
    pub fn discard_redo(&mut self) {
        if !self.undone.is_empty() {
            debug!("Discarding {} redo entries", self.undone.len());
            self.undone.clear();
        }
    }

    /// Append a finalized stroke
    ///
    /// Clears redo history and evicts the oldest strokes beyond the limit.
    /// Appending an id the document already holds is a caller bug: it panics
    /// in debug builds and is ignored (returns false) in release builds.
    pub fn append(&mut self, stroke: Stroke) -> bool {
        let id = stroke.id();
        let duplicate = self.get(id).is_some();
        debug_assert!(!duplicate, "stroke {} appended twice", id);
        if duplicate {
            warn!("append: stroke {} already in document, ignoring", id);
            return false;
        }

        self.discard_redo();
        Arc::make_mut(&mut self.strokes).push(Arc::new(stroke));
        debug!("Appended stroke {} ({} live)", id, self.strokes.len());
        self.emit(DocumentEvent::StrokeAdded { id });
        self.enforce_stroke_limit();
        true
    }

    /// Move the last live stroke to the undo-retained stack
    pub fn undo(&mut self) -> Option<StrokeId> {
        let Some(stroke) = Arc::make_mut(&mut self.strokes).pop() else {
            debug!("Undo: no strokes");
            return None;
        };
        let id = stroke.id();
        let index = self.strokes.len();
        self.retain(stroke, index);
        self.enforce_undo_limit();
        debug!("Undid stroke {}", id);
        self.emit(DocumentEvent::Undone { id });
        Some(id)
    }

    /// Restore the most recently undone stroke to where it was
    pub fn redo(&mut self) -> Option<StrokeId> {
        let Some(RetainedStroke { stroke, index }) = self.undone.pop() else {
            debug!("Redo: nothing to redo");
            return None;
        };
        let id = stroke.id();
        let strokes = Arc::make_mut(&mut self.strokes);
        let index = index.min(strokes.len());
        strokes.insert(index, stroke);
        debug!("Redid stroke {} at {}", id, index);
        self.emit(DocumentEvent::Redone { id });
        self.enforce_stroke_limit();
        Some(id)
    }

    /// Move every live stroke to the undo-retained stack, so successive
    /// redos restore them in their original order
    ///
    /// Past `max_undo_depth` only the newest strokes are retained; the rest
    /// are dropped for good.
    pub fn clear(&mut self) -> usize {
        if self.strokes.is_empty() {
            return 0;
        }
        self.discard_redo();
        let cleared = std::mem::take(Arc::make_mut(&mut self.strokes));
        let count = cleared.len();
        let dropped = count.saturating_sub(self.limits.max_undo_depth);
        if dropped > 0 {
            debug!("Undo stack full, dropping {} oldest cleared strokes", dropped);
        }
        // Indices are relative to the retained strokes
        for (index, stroke) in cleared.into_iter().skip(dropped).enumerate().rev() {
            self.retain(stroke, index);
        }
        info!("Cleared {} strokes ({} retained for redo)", count, self.undone.len());
        self.emit(DocumentEvent::Cleared { count });
        count
    }

    /// Remove one stroke by id, retaining it for redo
    pub fn remove(&mut self, id: StrokeId) -> bool {
        let Some(index) = self.strokes.iter().position(|s| s.id() == id) else {
            debug!("remove: stroke {} not found", id);
            return false;
        };
        self.discard_redo();
        let stroke = Arc::make_mut(&mut self.strokes).remove(index);
        self.retain(stroke, index);
        self.enforce_undo_limit();
        self.emit(DocumentEvent::StrokeRemoved { id });
        true
    }

    /// Bulk import. Discards all undo/redo history. Duplicate ids keep their
    /// first occurrence; beyond the stroke limit the newest strokes are kept.
    pub fn replace_all(&mut self, strokes: Vec<Stroke>) {
        let mut seen = HashSet::with_capacity(strokes.len());
        let mut imported: Vec<Arc<Stroke>> = strokes
            .into_iter()
            .filter(|s| seen.insert(s.id()))
            .map(Arc::new)
            .collect();
        if imported.len() > self.limits.max_strokes {
            let excess = imported.len() - self.limits.max_strokes;
            warn!("replace_all: dropping {} oldest strokes over the limit", excess);
            imported.drain(..excess);
        }

        let count = imported.len();
        self.strokes = Arc::new(imported);
        self.undone.clear();
        info!("Replaced document with {} strokes", count);
        self.emit(DocumentEvent::Replaced { count });
    }

    /// Import a validated snapshot
    pub fn import_snapshot(&mut self, snapshot: DocumentSnapshot) {
        self.replace_all(snapshot.strokes);
    }

    /// Snapshot of the live strokes
    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot::new(self.strokes.iter().map(|s| Stroke::clone(s)).collect())
    }

    /// Rectangle enclosing every live stroke, `None` when empty
    pub fn bounds(&self) -> Option<Rect> {
        self.strokes
            .iter()
            .filter_map(|s| s.bounds())
            .reduce(Rect::union)
    }

    pub fn statistics(&self) -> DocumentStatistics {
        DocumentStatistics::collect(self.strokes.iter().map(|s| s.as_ref()))
    }

    /// Re-check both limits and release spare capacity
    pub fn maintain(&mut self) -> MaintenanceReport {
        let report = MaintenanceReport {
            evicted: self.enforce_stroke_limit(),
            dropped_undo: self.enforce_undo_limit(),
        };
        self.undone.shrink_to_fit();
        if report != MaintenanceReport::default() {
            info!("Maintenance: {:?}", report);
        }
        report
    }

    fn retain(&mut self, stroke: Arc<Stroke>, index: usize) {
        self.undone.push(RetainedStroke { stroke, index });
    }

    fn enforce_undo_limit(&mut self) -> usize {
        let mut dropped = 0;
        while self.undone.len() > self.limits.max_undo_depth {
            let oldest = self.undone.remove(0);
            debug!("Undo stack full, dropping stroke {}", oldest.stroke.id());
            dropped += 1;
        }
        dropped
    }

    fn enforce_stroke_limit(&mut self) -> usize {
        let len = self.strokes.len();
        if len <= self.limits.max_strokes {
            return 0;
        }
        let excess = len - self.limits.max_strokes;
        let ids: Vec<StrokeId> = Arc::make_mut(&mut self.strokes)
            .drain(..excess)
            .map(|s| s.id())
            .collect();
        warn!("Stroke limit {} reached, evicted {} oldest", self.limits.max_strokes, excess);
        self.emit(DocumentEvent::Evicted { ids });
        excess
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ToolSettings;
    use crate::types::{StrokePoint, ToolKind};
    use glam::Vec2;
    use std::sync::Mutex;

    fn stroke(id: u64) -> Stroke {
        let x = id as f32;
        Stroke::from_points(
            StrokeId(id),
            ToolSettings::preset(ToolKind::Pen),
            id as f64,
            vec![
                StrokePoint::new(Vec2::new(x, 0.0), 1.0, 0.0),
                StrokePoint::new(Vec2::new(x + 1.0, 1.0), 1.0, 16.0),
            ],
        )
    }

    fn ids(doc: &Document) -> Vec<u64> {
        doc.strokes().iter().map(|s| s.id().0).collect()
    }

    fn small_limits(max_strokes: usize, max_undo_depth: usize) -> DocumentLimits {
        DocumentLimits {
            max_strokes,
            max_undo_depth,
            ..Default::default()
        }
    }

    #[test]
    fn test_undo_on_empty_document() {
        let mut doc = Document::default();
        assert_eq!(doc.undo(), None);
        assert_eq!(doc.redo(), None);
        assert!(doc.is_empty());
        assert!(doc.bounds().is_none());
    }

    #[test]
    fn test_undo_redo_restores_identity() {
        let mut doc = Document::default();
        for id in 1..=3 {
            doc.append(stroke(id));
        }
        let before: Vec<Arc<Stroke>> = doc.strokes().iter().cloned().collect();

        assert_eq!(doc.undo(), Some(StrokeId(3)));
        assert_eq!(ids(&doc), vec![1, 2]);
        assert_eq!(doc.redo(), Some(StrokeId(3)));

        let after = doc.strokes();
        assert_eq!(after.len(), before.len());
        assert!(before.iter().zip(after.iter()).all(|(a, b)| Arc::ptr_eq(a, b)));
    }

    #[test]
    fn test_append_clears_redo() {
        let mut doc = Document::default();
        doc.append(stroke(1));
        doc.append(stroke(2));
        doc.undo();
        assert!(doc.can_redo());
        doc.append(stroke(3));
        assert!(!doc.can_redo());
        assert_eq!(doc.redo(), None);
        assert_eq!(ids(&doc), vec![1, 3]);
    }

    #[test]
    fn test_live_and_undone_disjoint() {
        let mut doc = Document::default();
        for id in 1..=4 {
            doc.append(stroke(id));
        }
        doc.undo();
        doc.undo();
        let live: HashSet<_> = doc.strokes().iter().map(|s| s.id()).collect();
        let undone: HashSet<_> = doc.undone.iter().map(|r| r.stroke.id()).collect();
        assert!(live.is_disjoint(&undone));
        assert_eq!(live.len() + undone.len(), 4);
    }

    #[test]
    fn test_stroke_limit_evicts_oldest() {
        let mut doc = Document::new(small_limits(3, 50));
        for id in 1..=10 {
            doc.append(stroke(id));
            assert!(doc.len() <= 3);
        }
        assert_eq!(ids(&doc), vec![8, 9, 10]);
    }

    #[test]
    fn test_default_limits_hold() {
        let mut doc = Document::default();
        for id in 0..1100 {
            doc.append(stroke(id));
        }
        assert_eq!(doc.len(), 1000);
        for _ in 0..80 {
            doc.undo();
        }
        assert_eq!(doc.undo_depth(), 50);
        assert_eq!(doc.len(), 920);
    }

    #[test]
    fn test_clear_is_redoable_in_order() {
        let mut doc = Document::default();
        for id in 1..=3 {
            doc.append(stroke(id));
        }
        assert_eq!(doc.clear(), 3);
        assert!(doc.is_empty());
        assert_eq!(doc.undo_depth(), 3);

        doc.redo();
        doc.redo();
        doc.redo();
        assert_eq!(ids(&doc), vec![1, 2, 3]);
    }

    #[test]
    fn test_clear_keeps_newest_within_undo_cap() {
        let mut doc = Document::new(small_limits(100, 5));
        for id in 1..=8 {
            doc.append(stroke(id));
        }
        assert_eq!(doc.clear(), 8);
        assert_eq!(doc.undo_depth(), 5);
        doc.redo();
        assert_eq!(ids(&doc), vec![4]);
        while doc.redo().is_some() {}
        assert_eq!(ids(&doc), vec![4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_remove_then_redo_restores_position() {
        let mut doc = Document::default();
        for id in 1..=3 {
            doc.append(stroke(id));
        }
        assert!(doc.remove(StrokeId(2)));
        assert!(!doc.remove(StrokeId(2)));
        assert_eq!(ids(&doc), vec![1, 3]);
        assert_eq!(doc.redo(), Some(StrokeId(2)));
        assert_eq!(ids(&doc), vec![1, 2, 3]);
    }

    #[test]
    fn test_replace_all_discards_history() {
        let mut doc = Document::new(small_limits(2, 50));
        doc.append(stroke(1));
        doc.undo();
        doc.replace_all(vec![stroke(5), stroke(6), stroke(5), stroke(7)]);
        assert_eq!(ids(&doc), vec![6, 7]);
        assert!(!doc.can_redo());
        assert_eq!(doc.max_id(), Some(StrokeId(7)));
    }

    #[test]
    fn test_bounds_and_statistics() {
        let mut doc = Document::default();
        doc.append(stroke(0));
        doc.append(stroke(10));
        let bounds = doc.bounds().unwrap();
        assert_eq!(bounds.min, Vec2::new(-0.5, -0.5));
        assert_eq!(bounds.max, Vec2::new(11.5, 1.5));

        let stats = doc.statistics();
        assert_eq!(stats.stroke_count, 2);
        assert_eq!(stats.point_count, 4);
        assert_eq!(stats.tool_usage[&ToolKind::Pen], 2);
    }

    #[test]
    fn test_listeners_receive_events() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let mut doc = Document::new(small_limits(1, 50));
        doc.add_listener(move |e| sink.lock().unwrap().push(e));

        doc.append(stroke(1));
        doc.append(stroke(2));
        doc.undo();
        doc.redo();
        doc.clear();

        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                DocumentEvent::StrokeAdded { id: StrokeId(1) },
                DocumentEvent::StrokeAdded { id: StrokeId(2) },
                DocumentEvent::Evicted {
                    ids: vec![StrokeId(1)]
                },
                DocumentEvent::Undone { id: StrokeId(2) },
                DocumentEvent::Redone { id: StrokeId(2) },
                DocumentEvent::Cleared { count: 1 },
            ]
        );
    }

    #[test]
    fn test_mutation_changes_list_identity() {
        let mut doc = Document::default();
        doc.append(stroke(1));
        let held = Arc::clone(doc.strokes());
        doc.append(stroke(2));
        assert!(!Arc::ptr_eq(&held, doc.strokes()));
        assert_eq!(held.len(), 1);
    }

    #[test]
    fn test_snapshot_round_trip_through_document() {
        let mut doc = Document::default();
        doc.append(stroke(1));
        doc.append(stroke(2));
        let json = doc.snapshot().to_json().unwrap();

        let mut other = Document::default();
        other.import_snapshot(DocumentSnapshot::from_json(&json).unwrap());
        assert_eq!(ids(&other), vec![1, 2]);
        assert_eq!(**other.get(StrokeId(2)).unwrap(), **doc.get(StrokeId(2)).unwrap());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "appended twice")]
    fn test_duplicate_append_panics_in_debug() {
        let mut doc = Document::default();
        doc.append(stroke(1));
        doc.append(stroke(1));
    }
}
