//! Point filter library
//!
//! Stateless numerical routines over point sequences. Nothing here holds
//! shared state, so every function is safe to call from worker threads on
//! independent inputs.
//!
//! - [`one_euro_filter`] - adaptive low-pass jitter suppression
//! - [`resample`] - uniform arc-length resampling
//! - [`simplify_rdp`] - Ramer-Douglas-Peucker simplification
//! - [`compute_velocities`] - per-segment speeds
//! - [`catmull_rom`] - centripetal/uniform Catmull-Rom interpolation
//! - [`smooth`] - neighbour-weighted smoothing

mod catmull_rom;
mod one_euro;
mod resample;
mod simplify;
mod smooth;
mod velocity;

pub use catmull_rom::{catmull_rom, catmull_rom_spline};
pub use one_euro::{one_euro_filter, OneEuroFilter, OneEuroParams};
pub use resample::resample;
pub use simplify::simplify_rdp;
pub use smooth::smooth;
pub use velocity::compute_velocities;
