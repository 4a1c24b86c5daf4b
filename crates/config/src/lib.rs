//! Shared configuration for the sketching engine
//!
//! This crate provides the single source of truth for document limits,
//! real-time capture tuning and geometry budgets. Every section falls back
//! to its defaults when omitted from a serialized config.

use serde::{Deserialize, Serialize};

/// Maximum number of live strokes kept in a document
pub const DEFAULT_MAX_STROKES: usize = 1000;

/// Maximum number of undone strokes retained for redo
pub const DEFAULT_MAX_UNDO_DEPTH: usize = 50;

/// Number of committed strokes between maintenance sweeps
pub const DEFAULT_MAINTENANCE_INTERVAL: usize = 32;

/// Weight given to the previous velocity estimate during capture
pub const DEFAULT_VELOCITY_SMOOTHING: f32 = 0.8;

/// Weight given to the previous pressure estimate during capture
pub const DEFAULT_PRESSURE_SMOOTHING: f32 = 0.7;

/// Minimum travel (canvas units) before a new point is emitted
pub const DEFAULT_MIN_SPACING: f32 = 0.5;

/// Turning angle (radians) that keeps an interior point during optimization
pub const DEFAULT_OPTIMIZE_ANGLE_THRESHOLD: f32 = 0.1;

/// Pressure change that keeps an interior point during optimization
pub const DEFAULT_OPTIMIZE_PRESSURE_THRESHOLD: f32 = 0.05;

/// Segment cap for a single calligraphy stroke
pub const DEFAULT_MAX_CALLIGRAPHY_SEGMENTS: usize = 8192;

/// Bounds on how many strokes a document may hold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentLimits {
    /// Oldest strokes are evicted beyond this count
    pub max_strokes: usize,
    /// Oldest undone strokes are dropped beyond this depth
    pub max_undo_depth: usize,
    /// Commits between maintenance sweeps (0 disables the sweep)
    pub maintenance_interval: usize,
}

impl Default for DocumentLimits {
    fn default() -> Self {
        Self {
            max_strokes: DEFAULT_MAX_STROKES,
            max_undo_depth: DEFAULT_MAX_UNDO_DEPTH,
            maintenance_interval: DEFAULT_MAINTENANCE_INTERVAL,
        }
    }
}

/// Tuning for the stroke capture state machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub velocity_smoothing: f32,
    pub pressure_smoothing: f32,
    pub min_spacing: f32,
    pub optimize_angle_threshold: f32,
    pub optimize_pressure_threshold: f32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            velocity_smoothing: DEFAULT_VELOCITY_SMOOTHING,
            pressure_smoothing: DEFAULT_PRESSURE_SMOOTHING,
            min_spacing: DEFAULT_MIN_SPACING,
            optimize_angle_threshold: DEFAULT_OPTIMIZE_ANGLE_THRESHOLD,
            optimize_pressure_threshold: DEFAULT_OPTIMIZE_PRESSURE_THRESHOLD,
        }
    }
}

/// Budgets for geometry generation and caching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Calligraphy output is truncated beyond this many segments
    pub max_calligraphy_segments: usize,
    /// Jittered texture lines drawn per pencil segment
    pub pencil_texture_lines: usize,
    /// Grain dabs scattered per pastel segment
    pub pastel_grains: usize,
    /// Finalized strokes whose geometry is kept by the render composer
    pub geometry_cache_capacity: usize,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            max_calligraphy_segments: DEFAULT_MAX_CALLIGRAPHY_SEGMENTS,
            pencil_texture_lines: 3,
            pastel_grains: 4,
            geometry_cache_capacity: 2048,
        }
    }
}

/// Which geometry backend the engine should prefer at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendPreference {
    /// Always use the pure Rust implementation
    Pure,
    /// Use accelerated entry points where available
    #[default]
    Accelerated,
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub document: DocumentLimits,
    pub capture: CaptureConfig,
    pub geometry: GeometryConfig,
    pub backend: BackendPreference,
}

impl EngineConfig {
    /// Parse a config from JSON. Missing sections keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the config as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
