/// Smallest base size a tool may be configured with.
pub const MIN_TOOL_SIZE: f32 = 0.1;

/// Largest base size a tool may be configured with.
pub const MAX_TOOL_SIZE: f32 = 512.0;

/// Smallest spacing fraction accepted by tool settings.
pub const MIN_SPACING_FRACTION: f32 = 0.01;

/// Largest spacing fraction accepted by tool settings.
pub const MAX_SPACING_FRACTION: f32 = 4.0;

/// Segments shorter than this (squared length) are treated as degenerate.
pub const DEGENERATE_SEGMENT_EPSILON: f32 = 1e-12;

/// Velocity (units/s) at which the velocity width factor halves.
pub const VELOCITY_HALF_WIDTH_SPEED: f32 = 2000.0;

/// Floor for the velocity width factor.
pub const MIN_VELOCITY_FACTOR: f32 = 0.4;

/// Extra width at full tilt for tilt-sensitive tools (side shading).
pub const TILT_WIDTH_GAIN: f32 = 1.5;

/// Pencil opacity clamp.
pub const PENCIL_MIN_OPACITY: f32 = 0.1;
pub const PENCIL_MAX_OPACITY: f32 = 1.0;

/// Jitter of pencil texture lines as a fraction of the segment width.
pub const PENCIL_JITTER: f32 = 0.35;

/// Calligraphy thickness model.
pub const CALLIGRAPHY_MIN_THICKNESS: f32 = 0.6;
pub const CALLIGRAPHY_THICKNESS_OFFSET: f32 = 0.35;
pub const CALLIGRAPHY_THICKNESS_RANGE: f32 = 0.9;
pub const NIB_WIDTH_FACTOR_MIN: f32 = 0.3;
pub const NIB_WIDTH_FACTOR_MAX: f32 = 2.5;

/// Eraser feather pass: width multiplier and intensity.
pub const ERASER_FEATHER_SCALE: f32 = 1.5;
pub const ERASER_FEATHER_ALPHA: f32 = 0.35;

/// Fallback time step (seconds) when consecutive samples share a timestamp.
pub const DEFAULT_FILTER_DT: f32 = 1.0 / 120.0;

/// Samples generated per span when densifying with Catmull-Rom.
pub const SPLINE_SAMPLES_PER_SPAN: usize = 4;

/// Current document snapshot schema version.
pub const SNAPSHOT_VERSION: u8 = 1;
