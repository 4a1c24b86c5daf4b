//! Generated-geometry cache owned by the render composer

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tracing::debug;

use crate::geometry::StrokeGeometry;
use crate::stroke::Stroke;
use crate::types::StrokeId;

struct CacheEntry {
    /// The stroke the geometry was generated from; a replaced stroke under the
    /// same id misses
    source: Arc<Stroke>,
    geometry: Arc<StrokeGeometry>,
}

/// Bounded map from stroke id to generated geometry, evicting in insertion
/// order once full
pub struct GeometryCache {
    capacity: usize,
    entries: HashMap<StrokeId, CacheEntry>,
    order: VecDeque<StrokeId>,
    hits: u64,
    misses: u64,
}

impl std::fmt::Debug for GeometryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeometryCache")
            .field("len", &self.entries.len())
            .field("capacity", &self.capacity)
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish()
    }
}

impl GeometryCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            order: VecDeque::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// (hits, misses) since creation
    pub fn hit_counts(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    /// Cached geometry for exactly this stroke instance
    pub fn get(&mut self, stroke: &Arc<Stroke>) -> Option<Arc<StrokeGeometry>> {
        match self.entries.get(&stroke.id()) {
            Some(entry) if Arc::ptr_eq(&entry.source, stroke) => {
                self.hits += 1;
                Some(Arc::clone(&entry.geometry))
            }
            _ => {
                self.misses += 1;
                None
            }
        }
    }

    /// Return cached geometry or generate and store it
    pub fn get_or_insert_with<F>(&mut self, stroke: &Arc<Stroke>, generate: F) -> Arc<StrokeGeometry>
    where
        F: FnOnce(&Stroke) -> StrokeGeometry,
    {
        if let Some(geometry) = self.get(stroke) {
            return geometry;
        }
        let geometry = Arc::new(generate(stroke));
        self.insert(Arc::clone(stroke), Arc::clone(&geometry));
        geometry
    }

    pub fn insert(&mut self, stroke: Arc<Stroke>, geometry: Arc<StrokeGeometry>) {
        if self.capacity == 0 {
            return;
        }
        let id = stroke.id();
        let entry = CacheEntry {
            source: stroke,
            geometry,
        };
        if self.entries.insert(id, entry).is_none() {
            self.order.push_back(id);
        }
        while self.entries.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }
    }

    /// Drop everything (memory pressure)
    pub fn clear(&mut self) {
        debug!("Geometry cache cleared ({} entries)", self.entries.len());
        self.entries.clear();
        self.order.clear();
    }

    /// Drop entries for strokes not in `live`
    pub fn retain_live(&mut self, live: &[Arc<Stroke>]) -> usize {
        let before = self.entries.len();
        let live: HashMap<StrokeId, &Arc<Stroke>> = live.iter().map(|s| (s.id(), s)).collect();
        self.entries
            .retain(|id, entry| live.get(id).is_some_and(|s| Arc::ptr_eq(s, &entry.source)));
        let entries = &self.entries;
        self.order.retain(|id| entries.contains_key(id));
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!("Geometry cache dropped {} stale entries", removed);
        }
        removed
    }
}
