//! Configuration errors
//!
//! The only failure the simulation can report: a field or circle tuning that
//! cannot produce a round. Everything else (pointer misses, storage hiccups,
//! slow frames) degrades to a no-op.

use thiserror::Error;

/// Axis of a spawn bound check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

/// Field setup that cannot produce a valid round
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidConfigError {
    #[error("spawn extent {extent} on the {axis} axis is smaller than the required margin {required}")]
    SpawnBoundsTooSmall { axis: Axis, extent: f32, required: f32 },
    #[error("field bounds {width}x{height} must be finite and positive")]
    InvalidBounds { width: f32, height: f32 },
    #[error("circle radii must satisfy min {min} <= start {start} <= max {max}")]
    InvalidRadii { min: f32, start: f32, max: f32 },
}
