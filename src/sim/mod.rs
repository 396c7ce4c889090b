//! Circle simulation module
//!
//! All gameplay logic lives here. This module is pure:
//! - Time only enters through `dt`
//! - Randomness only through a caller-supplied seeded RNG
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod circle;
pub mod field;
pub mod round;

pub use circle::{Circle, CircleState};
pub use field::CircleField;
pub use round::{GamePhase, RoundController, RoundEvent};
