//! Data-driven game balance
//!
//! Circle sizes and burst speeds scale with the viewport so a round plays the
//! same on a phone and a wide monitor. Level progression is fixed.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::InvalidConfigError;

/// Per-circle sizes, speeds and timings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircleTuning {
    pub start_radius: f32,
    pub max_radius: f32,
    pub min_radius: f32,
    pub max_lifetime: f32,
    pub max_speed: f32,
    pub explosion_speed: f32,
    pub implosion_speed: f32,
}

impl Default for CircleTuning {
    fn default() -> Self {
        Self {
            start_radius: START_RADIUS,
            max_radius: MAX_RADIUS,
            min_radius: MIN_RADIUS,
            max_lifetime: MAX_LIFETIME,
            max_speed: MAX_SPEED,
            explosion_speed: EXPLOSION_SPEED,
            implosion_speed: IMPLOSION_SPEED,
        }
    }
}

impl CircleTuning {
    /// Derive radii and burst speeds from the viewport size
    pub fn for_viewport(width: f32, height: f32) -> Self {
        let extent = width + height;
        let start_radius = extent * START_RADIUS_SCALE;
        let burst_speed = extent * BURST_SPEED_SCALE;
        Self {
            start_radius,
            max_radius: start_radius * 2.0,
            explosion_speed: burst_speed,
            implosion_speed: burst_speed,
            ..Self::default()
        }
    }

    /// Reject radii that cannot drive a full grow and shrink cycle
    ///
    /// Tiny viewports derive a start radius below the fixed minimum.
    pub fn validate(&self) -> Result<(), InvalidConfigError> {
        let ordered = self.min_radius <= self.start_radius && self.start_radius <= self.max_radius;
        let finite = [self.min_radius, self.start_radius, self.max_radius]
            .iter()
            .all(|r| r.is_finite());
        if !ordered || !finite {
            return Err(InvalidConfigError::InvalidRadii {
                min: self.min_radius,
                start: self.start_radius,
                max: self.max_radius,
            });
        }
        Ok(())
    }

    /// Clamp a radius into the legal range
    ///
    /// Never panics; an inverted range resolves to `max_radius`.
    #[inline]
    pub fn clamp_radius(&self, radius: f32) -> f32 {
        radius.max(self.min_radius).min(self.max_radius)
    }
}

/// Round-to-round progression
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelTuning {
    pub circles_start: u32,
    pub circles_end: u32,
    pub level_increase: u32,
    pub advance_fraction: f64,
}

impl Default for LevelTuning {
    fn default() -> Self {
        Self {
            circles_start: NUM_CIRCLES_START,
            circles_end: NUM_CIRCLES_END,
            level_increase: LEVEL_INCREASE,
            advance_fraction: ADVANCE_FRACTION,
        }
    }
}

impl LevelTuning {
    /// floor(num_circles * advance_fraction)
    #[inline]
    pub fn score_goal(&self, num_circles: u32) -> u32 {
        (num_circles as f64 * self.advance_fraction).floor() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_scaling() {
        let t = CircleTuning::for_viewport(640.0, 480.0);
        assert!((t.start_radius - 22.4).abs() < 1e-4);
        assert!((t.max_radius - 44.8).abs() < 1e-4);
        assert!((t.explosion_speed - 56.0).abs() < 1e-4);
        assert_eq!(t.explosion_speed, t.implosion_speed);
        // Untouched by the viewport
        assert_eq!(t.min_radius, MIN_RADIUS);
        assert_eq!(t.max_lifetime, MAX_LIFETIME);
        assert_eq!(t.max_speed, MAX_SPEED);
    }

    #[test]
    fn test_clamp_radius() {
        let t = CircleTuning::default();
        assert_eq!(t.clamp_radius(100.0), MAX_RADIUS);
        assert_eq!(t.clamp_radius(-3.0), MIN_RADIUS);
        assert_eq!(t.clamp_radius(10.0), 10.0);
    }

    #[test]
    fn test_tiny_viewport_radii_are_rejected() {
        let t = CircleTuning::for_viewport(20.0, 20.0);
        assert!(t.max_radius < t.min_radius);
        assert!(matches!(t.validate(), Err(InvalidConfigError::InvalidRadii { .. })));
        // No panic even with the inverted range
        assert_eq!(t.clamp_radius(1.0), t.max_radius);

        assert!(CircleTuning::default().validate().is_ok());
        assert!(CircleTuning::for_viewport(640.0, 480.0).validate().is_ok());
        assert!(CircleTuning::for_viewport(120.0, 80.0).validate().is_ok());

        let nan = CircleTuning {
            max_radius: f32::NAN,
            ..CircleTuning::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_score_goal_progression() {
        let level = LevelTuning::default();
        assert_eq!(level.score_goal(6), 2);
        assert_eq!(level.score_goal(12), 5);
        assert_eq!(level.score_goal(20), 9);
        assert_eq!(level.score_goal(36), 16);
    }

    #[test]
    fn test_level_score_goal_uses_fraction() {
        let strict = LevelTuning {
            advance_fraction: 0.5,
            ..LevelTuning::default()
        };
        assert_eq!(strict.score_goal(7), 3);
    }
}
