//! Chain Pop - A chain-reaction circle popping arcade game
//!
//! Core modules:
//! - `sim`: Circle simulation, chain reactions and the round state machine
//! - `game_loop`: Per-frame orchestration, pause/resume, dt clamping
//! - `ports`: Narrow interfaces to rendering, audio, storage and scheduling
//! - `renderer`: WebGPU rendering pipeline
//! - `platform`: Browser/headless implementations of the ports
//! - `persistence`: Best-score storage
//! - `tuning`: Data-driven game balance

pub mod error;
pub mod game_loop;
pub mod hud;
pub mod palette;
pub mod persistence;
pub mod platform;
pub mod ports;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod audio;

pub use error::InvalidConfigError;
pub use game_loop::{FrameClock, GameContext, GameLoop};
pub use settings::Settings;

use glam::Vec2;
use rand::Rng;

/// Game configuration constants
pub mod consts {
    /// Circles in the first round
    pub const NUM_CIRCLES_START: u32 = 6;
    /// Winning a round with more circles than this ends the game
    pub const NUM_CIRCLES_END: u32 = 33;
    /// Circles added after every successful round
    pub const LEVEL_INCREASE: u32 = 6;
    /// Fraction of the field that must be popped to advance
    pub const ADVANCE_FRACTION: f64 = 0.45;

    /// Circle defaults (overridden from the viewport size on resize)
    pub const START_RADIUS: f32 = 20.0;
    pub const MAX_RADIUS: f32 = 45.0;
    pub const MIN_RADIUS: f32 = 2.0;
    /// Seconds spent at full size before imploding
    pub const MAX_LIFETIME: f32 = 2.0;
    /// Pixels/s for a drifting circle
    pub const MAX_SPEED: f32 = 120.0;
    /// Radius growth in pixels/s
    pub const EXPLOSION_SPEED: f32 = 60.0;
    /// Radius shrink in pixels/s
    pub const IMPLOSION_SPEED: f32 = 84.0;

    /// Viewport scale factors, applied to (width + height)
    pub const START_RADIUS_SCALE: f32 = 0.02;
    pub const BURST_SPEED_SCALE: f32 = 0.05;

    /// Frame rate clamp for dt
    pub const MIN_FPS: f64 = 12.0;
    pub const MAX_FPS: f64 = 60.0;

    /// Viewport used before the first resize
    pub const DEFAULT_WIDTH: f32 = 640.0;
    pub const DEFAULT_HEIGHT: f32 = 480.0;
}

/// Uniformly distributed direction of length 1
#[inline]
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    let angle = rng.random_range(0.0..std::f32::consts::TAU);
    Vec2::from_angle(angle)
}

/// Uniform scalar in `[min, max]`
#[inline]
pub fn random_in_range<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if min >= max {
        return min;
    }
    rng.random_range(min..=max)
}
