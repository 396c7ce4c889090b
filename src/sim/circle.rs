//! A single bouncing circle
//!
//! Plain data plus movement. All state transitions are driven by
//! [`CircleField`](super::field::CircleField), which keeps the physics here
//! testable on its own.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Life-cycle of a circle within one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CircleState {
    /// Drifting, can be clicked or caught by a blast
    #[default]
    Normal,
    /// Growing toward max radius
    Exploding,
    /// Holding at max radius until its lifetime runs out
    MaxSize,
    /// Shrinking toward min radius
    Imploding,
    /// Spent; skipped by every pass
    Done,
}

impl CircleState {
    /// Exploding, MaxSize or Imploding - the states that can pop neighbors
    #[inline]
    pub fn is_active(self) -> bool {
        matches!(
            self,
            CircleState::Exploding | CircleState::MaxSize | CircleState::Imploding
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub pos: Vec2,
    /// Unit direction of travel
    pub dir: Vec2,
    pub speed: f32,
    pub radius: f32,
    /// Seconds spent at max size
    pub lifetime: f32,
    pub state: CircleState,
    pub color_index: usize,
}

impl Circle {
    pub fn new(pos: Vec2, dir: Vec2, speed: f32, radius: f32, color_index: usize) -> Self {
        Self {
            pos,
            dir,
            speed,
            radius,
            lifetime: 0.0,
            state: CircleState::Normal,
            color_index,
        }
    }

    /// Integrate position; no bounds checking
    #[inline]
    pub fn move_by(&mut self, dt: f32) {
        self.pos += self.dir * self.speed * dt;
    }

    /// Velocity in pixels/s
    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.dir * self.speed
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.state == CircleState::Done
    }

    #[inline]
    pub fn contains_point(&self, point: Vec2) -> bool {
        self.pos.distance_squared(point) <= self.radius * self.radius
    }

    /// Strict radius overlap
    #[inline]
    pub fn overlaps(&self, other: &Circle) -> bool {
        let reach = self.radius + other.radius;
        self.pos.distance_squared(other.pos) < reach * reach
    }

    /// Start exploding in place
    pub fn ignite(&mut self) {
        self.state = CircleState::Exploding;
        self.speed = 0.0;
    }
}
