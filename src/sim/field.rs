//! The circles of the current round
//!
//! Spawning, per-frame life-cycle updates, wall bounces and the chain
//! reaction pass.

use glam::Vec2;
use rand::Rng;

use super::circle::{Circle, CircleState};
use crate::error::{Axis, InvalidConfigError};
use crate::palette::CIRCLE_COLORS;
use crate::tuning::CircleTuning;
use crate::{random_in_range, random_unit_vector};

#[derive(Debug, Clone)]
pub struct CircleField {
    /// Field size in pixels (width, height)
    bounds: Vec2,
    tuning: CircleTuning,
    /// Spawn order; later circles draw on top
    circles: Vec<Circle>,
}

impl CircleField {
    /// Spawn `count` circles at random positions inside `bounds`
    ///
    /// Each axis keeps a margin of twice the start radius from the edges, so
    /// the extent must be at least four start radii.
    pub fn create<R: Rng + ?Sized>(
        count: u32,
        bounds: Vec2,
        tuning: CircleTuning,
        rng: &mut R,
    ) -> Result<Self, InvalidConfigError> {
        validate_bounds(bounds)?;
        tuning.validate()?;

        let margin = tuning.start_radius * 2.0;
        for (axis, extent) in [(Axis::X, bounds.x), (Axis::Y, bounds.y)] {
            if extent < margin * 2.0 {
                return Err(InvalidConfigError::SpawnBoundsTooSmall {
                    axis,
                    extent,
                    required: margin * 2.0,
                });
            }
        }

        let circles = (0..count as usize)
            .map(|i| {
                let pos = Vec2::new(
                    random_in_range(rng, margin, bounds.x - margin),
                    random_in_range(rng, margin, bounds.y - margin),
                );
                let dir = random_unit_vector(rng);
                Circle::new(
                    pos,
                    dir,
                    tuning.max_speed,
                    tuning.clamp_radius(tuning.start_radius),
                    i % CIRCLE_COLORS.len(),
                )
            })
            .collect();

        Ok(Self {
            bounds,
            tuning,
            circles,
        })
    }

    /// Wrap an explicit set of circles (scripted scenarios, replays)
    pub fn from_circles(
        bounds: Vec2,
        tuning: CircleTuning,
        circles: Vec<Circle>,
    ) -> Result<Self, InvalidConfigError> {
        validate_bounds(bounds)?;
        tuning.validate()?;
        Ok(Self {
            bounds,
            tuning,
            circles,
        })
    }

    pub fn circles(&self) -> &[Circle] {
        &self.circles
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    pub fn tuning(&self) -> &CircleTuning {
        &self.tuning
    }

    pub fn len(&self) -> usize {
        self.circles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.circles.is_empty()
    }

    /// Circles that should still be drawn
    pub fn visible(&self) -> impl Iterator<Item = &Circle> {
        self.circles.iter().filter(|c| !c.is_done())
    }

    pub fn count_in(&self, state: CircleState) -> usize {
        self.circles.iter().filter(|c| c.state == state).count()
    }

    /// Advance every live circle by one frame
    ///
    /// A circle that ends the frame past a wall has that velocity component
    /// negated and is moved a second time with the full new velocity. Bounce
    /// frames therefore integrate twice, which also carries the other axis
    /// one extra step. This matches how the game has always played.
    pub fn tick(&mut self, dt: f32) {
        let tuning = self.tuning;
        let bounds = self.bounds;

        for circle in self.circles.iter_mut() {
            if circle.is_done() {
                continue;
            }

            match circle.state {
                CircleState::Normal => circle.move_by(dt),
                CircleState::Exploding => {
                    circle.radius =
                        tuning.clamp_radius(circle.radius + tuning.explosion_speed * dt);
                    if circle.radius >= tuning.max_radius {
                        circle.state = CircleState::MaxSize;
                    }
                }
                CircleState::MaxSize => {
                    circle.lifetime += dt;
                    if circle.lifetime >= tuning.max_lifetime {
                        circle.state = CircleState::Imploding;
                    }
                }
                CircleState::Imploding => {
                    circle.radius =
                        tuning.clamp_radius(circle.radius - tuning.implosion_speed * dt);
                    if circle.radius <= tuning.min_radius {
                        circle.state = CircleState::Done;
                    }
                }
                CircleState::Done => {}
            }

            if hits_left_right(circle, bounds) {
                circle.dir.x = -circle.dir.x;
                circle.move_by(dt);
            }
            if hits_top_bottom(circle, bounds) {
                circle.dir.y = -circle.dir.y;
                circle.move_by(dt);
            }
        }
    }

    /// Let every active circle pop the normal circles it overlaps
    ///
    /// Runs in spawn order. A circle popped earlier in the pass becomes an
    /// exploder once the outer loop reaches it, and a normal circle pops at
    /// most once. Returns the number of circles popped.
    pub fn collide_exploding_into_normal(&mut self) -> u32 {
        let mut pops = 0;
        for i in 0..self.circles.len() {
            let blast = self.circles[i];
            if !blast.is_active() {
                continue;
            }
            for (j, target) in self.circles.iter_mut().enumerate() {
                if i == j || target.state != CircleState::Normal {
                    continue;
                }
                if blast.overlaps(target) {
                    target.ignite();
                    pops += 1;
                }
            }
        }
        pops
    }

    /// True once nothing is exploding, at max size or imploding
    pub fn round_finished(&self) -> bool {
        !self.circles.iter().any(Circle::is_active)
    }

    /// Topmost normal circle under `point`
    pub fn hit_test(&self, point: Vec2) -> Option<usize> {
        self.circles
            .iter()
            .rposition(|c| c.state == CircleState::Normal && c.contains_point(point))
    }

    /// Ignite the circle at `index` if it is still drifting
    pub fn ignite(&mut self, index: usize) -> bool {
        match self.circles.get_mut(index) {
            Some(circle) if circle.state == CircleState::Normal => {
                circle.ignite();
                true
            }
            _ => false,
        }
    }

    /// Adopt a new viewport: reset radii and pull stray circles back inside
    ///
    /// A rejected viewport leaves the field as it was.
    pub fn relayout(&mut self, bounds: Vec2, tuning: CircleTuning) -> Result<(), InvalidConfigError> {
        validate_bounds(bounds)?;
        tuning.validate()?;
        self.bounds = bounds;
        self.tuning = tuning;

        let radius = tuning.clamp_radius(tuning.start_radius);
        let inset = tuning.start_radius * 1.5;
        for circle in self.circles.iter_mut().filter(|c| !c.is_done()) {
            circle.radius = radius;
            if circle.pos.x > bounds.x {
                circle.pos.x = bounds.x - inset;
            }
            if circle.pos.y > bounds.y {
                circle.pos.y = bounds.y - inset;
            }
        }
        Ok(())
    }
}

fn validate_bounds(bounds: Vec2) -> Result<(), InvalidConfigError> {
    if !bounds.is_finite() || bounds.x <= 0.0 || bounds.y <= 0.0 {
        return Err(InvalidConfigError::InvalidBounds {
            width: bounds.x,
            height: bounds.y,
        });
    }
    Ok(())
}

#[inline]
fn hits_left_right(c: &Circle, bounds: Vec2) -> bool {
    c.pos.x < c.radius || c.pos.x > bounds.x - c.radius
}

#[inline]
fn hits_top_bottom(c: &Circle, bounds: Vec2) -> bool {
    c.pos.y < c.radius || c.pos.y > bounds.y - c.radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const BOUNDS: Vec2 = Vec2::new(640.0, 480.0);

    fn still(x: f32, y: f32, radius: f32, state: CircleState) -> Circle {
        let mut c = Circle::new(Vec2::new(x, y), Vec2::X, 0.0, radius, 0);
        c.state = state;
        c
    }

    fn field_of(circles: Vec<Circle>) -> CircleField {
        CircleField::from_circles(BOUNDS, CircleTuning::default(), circles).unwrap()
    }

    #[test]
    fn test_create_spawns_inside_margin() {
        let mut rng = Pcg32::seed_from_u64(42);
        let tuning = CircleTuning::default();
        let field = CircleField::create(30, BOUNDS, tuning, &mut rng).unwrap();
        assert_eq!(field.len(), 30);

        let margin = tuning.start_radius * 2.0;
        for (i, c) in field.circles().iter().enumerate() {
            assert!(c.pos.x >= margin && c.pos.x <= BOUNDS.x - margin);
            assert!(c.pos.y >= margin && c.pos.y <= BOUNDS.y - margin);
            assert!((c.dir.length() - 1.0).abs() < 1e-5);
            assert_eq!(c.speed, tuning.max_speed);
            assert_eq!(c.radius, tuning.start_radius);
            assert_eq!(c.state, CircleState::Normal);
            assert_eq!(c.color_index, i % CIRCLE_COLORS.len());
        }
    }

    #[test]
    fn test_create_is_deterministic_per_seed() {
        let a = CircleField::create(10, BOUNDS, CircleTuning::default(), &mut Pcg32::seed_from_u64(5))
            .unwrap();
        let b = CircleField::create(10, BOUNDS, CircleTuning::default(), &mut Pcg32::seed_from_u64(5))
            .unwrap();
        assert_eq!(a.circles(), b.circles());
    }

    #[test]
    fn test_create_rejects_small_bounds() {
        let mut rng = Pcg32::seed_from_u64(1);
        let err = CircleField::create(6, Vec2::new(640.0, 70.0), CircleTuning::default(), &mut rng)
            .unwrap_err();
        assert_eq!(
            err,
            InvalidConfigError::SpawnBoundsTooSmall {
                axis: Axis::Y,
                extent: 70.0,
                required: 80.0,
            }
        );

        let err = CircleField::create(6, Vec2::new(f32::NAN, 480.0), CircleTuning::default(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, InvalidConfigError::InvalidBounds { .. }));
    }

    #[test]
    fn test_create_accepts_exact_margin() {
        let mut rng = Pcg32::seed_from_u64(1);
        let field = CircleField::create(3, Vec2::new(80.0, 80.0), CircleTuning::default(), &mut rng)
            .unwrap();
        for c in field.circles() {
            assert_eq!(c.pos, Vec2::new(40.0, 40.0));
        }
    }

    #[test]
    fn test_tick_moves_normal_circle_exactly() {
        let start = Vec2::new(320.0, 240.0);
        let dir = Vec2::new(0.6, 0.8);
        let mut field = field_of(vec![Circle::new(start, dir, 120.0, 20.0, 0)]);
        let dt = 1.0 / 60.0;
        field.tick(dt);
        assert_eq!(field.circles()[0].pos, start + dir * 120.0 * dt);
    }

    #[test]
    fn test_bounce_moves_twice_in_one_tick() {
        let dir = Vec2::new(0.6, 0.8);
        let mut field = field_of(vec![Circle::new(Vec2::new(630.0, 240.0), dir, 120.0, 20.0, 0)]);
        field.tick(0.2);

        let c = field.circles()[0];
        // x: 630 + 14.4 crosses the wall, flips, then comes back 14.4
        assert!((c.pos.x - 630.0).abs() < 1e-3);
        assert_eq!(c.dir.x, -0.6);
        // y: stepped twice with the unchanged sign
        assert!((c.pos.y - (240.0 + 2.0 * 19.2)).abs() < 1e-3);
        assert_eq!(c.dir.y, 0.8);
    }

    #[test]
    fn test_bounce_off_top() {
        let mut field = field_of(vec![Circle::new(Vec2::new(320.0, 25.0), Vec2::NEG_Y, 120.0, 20.0, 0)]);
        field.tick(0.1);
        let c = field.circles()[0];
        assert_eq!(c.dir.y, 1.0);
        assert!((c.pos.y - 25.0).abs() < 1e-3);
    }

    #[test]
    fn test_full_lifecycle_reaches_done() {
        let tuning = CircleTuning::default();
        let mut field = field_of(vec![still(320.0, 240.0, tuning.start_radius, CircleState::Exploding)]);
        let mut seen = vec![CircleState::Exploding];

        for _ in 0..600 {
            field.tick(1.0 / 30.0);
            let c = field.circles()[0];
            assert!(c.radius >= tuning.min_radius && c.radius <= tuning.max_radius);
            if seen.last() != Some(&c.state) {
                seen.push(c.state);
            }
            if c.is_done() {
                break;
            }
        }

        assert_eq!(
            seen,
            vec![
                CircleState::Exploding,
                CircleState::MaxSize,
                CircleState::Imploding,
                CircleState::Done
            ]
        );
        assert_eq!(field.circles()[0].radius, tuning.min_radius);
    }

    proptest! {
        #[test]
        fn prop_radius_stays_in_bounds_through_lifecycle(
            width in 100.0f32..2000.0,
            height in 100.0f32..2000.0,
            dts in prop::collection::vec(1.0f32 / 60.0..=1.0 / 12.0, 1..64),
        ) {
            let bounds = Vec2::new(width, height);
            let tuning = CircleTuning::for_viewport(width, height);
            let mut c = Circle::new(bounds / 2.0, Vec2::X, 0.0, tuning.start_radius, 0);
            c.state = CircleState::Exploding;
            let mut field = CircleField::from_circles(bounds, tuning, vec![c]).unwrap();
            let mut seen = vec![CircleState::Exploding];

            for &dt in dts.iter().cycle().take(5000) {
                field.tick(dt);
                let c = field.circles()[0];
                prop_assert!(c.radius >= tuning.min_radius && c.radius <= tuning.max_radius);
                if seen.last() != Some(&c.state) {
                    seen.push(c.state);
                }
                if c.is_done() {
                    break;
                }
            }

            prop_assert_eq!(
                seen,
                vec![
                    CircleState::Exploding,
                    CircleState::MaxSize,
                    CircleState::Imploding,
                    CircleState::Done
                ]
            );
            prop_assert_eq!(field.circles()[0].radius, tuning.min_radius);
        }
    }

    #[test]
    fn test_done_circles_are_frozen() {
        let mut c = Circle::new(Vec2::new(-50.0, -50.0), Vec2::ONE.normalize(), 120.0, 2.0, 0);
        c.state = CircleState::Done;
        let mut field = field_of(vec![c]);
        field.tick(0.05);
        assert_eq!(field.circles()[0], c);
        assert_eq!(field.visible().count(), 0);
    }

    #[test]
    fn test_chain_follows_spawn_order() {
        // A blasts B, and B (later in order) blasts C within the same pass
        let mut field = field_of(vec![
            still(100.0, 100.0, 30.0, CircleState::Exploding),
            still(140.0, 100.0, 20.0, CircleState::Normal),
            still(175.0, 100.0, 20.0, CircleState::Normal),
        ]);
        assert_eq!(field.collide_exploding_into_normal(), 2);
        assert_eq!(field.count_in(CircleState::Exploding), 3);

        // Reversed order: the chain needs a second pass
        let mut field = field_of(vec![
            still(175.0, 100.0, 20.0, CircleState::Normal),
            still(140.0, 100.0, 20.0, CircleState::Normal),
            still(100.0, 100.0, 30.0, CircleState::Exploding),
        ]);
        assert_eq!(field.collide_exploding_into_normal(), 1);
        assert_eq!(field.circles()[0].state, CircleState::Normal);
        assert_eq!(field.collide_exploding_into_normal(), 1);
        assert_eq!(field.circles()[0].state, CircleState::Exploding);
    }

    #[test]
    fn test_normal_circle_pops_once_per_pass() {
        let mut field = field_of(vec![
            still(100.0, 100.0, 30.0, CircleState::MaxSize),
            still(160.0, 100.0, 30.0, CircleState::Imploding),
            still(130.0, 100.0, 10.0, CircleState::Normal),
        ]);
        assert_eq!(field.collide_exploding_into_normal(), 1);
        assert_eq!(field.collide_exploding_into_normal(), 0);
    }

    #[test]
    fn test_done_circles_never_collide() {
        let mut field = field_of(vec![
            still(100.0, 100.0, 30.0, CircleState::Done),
            still(110.0, 100.0, 20.0, CircleState::Normal),
        ]);
        assert_eq!(field.collide_exploding_into_normal(), 0);

        let mut field = field_of(vec![
            still(100.0, 100.0, 30.0, CircleState::Exploding),
            still(110.0, 100.0, 20.0, CircleState::Done),
        ]);
        assert_eq!(field.collide_exploding_into_normal(), 0);
        assert_eq!(field.circles()[1].state, CircleState::Done);
    }

    #[test]
    fn test_round_finished() {
        let mut field = field_of(vec![
            still(100.0, 100.0, 10.0, CircleState::Normal),
            still(300.0, 300.0, 10.0, CircleState::Done),
        ]);
        assert!(field.round_finished());
        field.ignite(0);
        assert!(!field.round_finished());
    }

    #[test]
    fn test_hit_test_prefers_topmost_normal() {
        let mut field = field_of(vec![
            still(100.0, 100.0, 20.0, CircleState::Normal),
            still(110.0, 100.0, 20.0, CircleState::Normal),
            still(105.0, 100.0, 20.0, CircleState::Done),
        ]);
        assert_eq!(field.hit_test(Vec2::new(105.0, 100.0)), Some(1));
        assert_eq!(field.hit_test(Vec2::new(500.0, 400.0)), None);

        assert!(field.ignite(1));
        assert!(!field.ignite(1));
        assert!(!field.ignite(99));
        assert_eq!(field.hit_test(Vec2::new(105.0, 100.0)), Some(0));
    }

    #[test]
    fn test_relayout_shrinks_into_new_viewport() {
        let mut field = field_of(vec![
            still(600.0, 450.0, 20.0, CircleState::Normal),
            still(100.0, 100.0, 40.0, CircleState::MaxSize),
            still(620.0, 100.0, 2.0, CircleState::Done),
        ]);
        let bounds = Vec2::new(400.0, 300.0);
        let tuning = CircleTuning::for_viewport(bounds.x, bounds.y);
        field.relayout(bounds, tuning).unwrap();

        let c = field.circles();
        assert_eq!(c[0].pos, Vec2::new(400.0 - tuning.start_radius * 1.5, 300.0 - tuning.start_radius * 1.5));
        assert_eq!(c[0].radius, tuning.start_radius);
        assert_eq!(c[1].radius, tuning.start_radius);
        assert_eq!(c[1].pos, Vec2::new(100.0, 100.0));
        // Done circles are left alone
        assert_eq!(c[2].pos, Vec2::new(620.0, 100.0));
        assert_eq!(field.bounds(), bounds);
    }

    #[test]
    fn test_tiny_viewport_is_rejected_without_changes() {
        let tiny = Vec2::new(20.0, 20.0);
        let tuning = CircleTuning::for_viewport(tiny.x, tiny.y);
        let mut rng = Pcg32::seed_from_u64(1);
        let err = CircleField::create(6, tiny, tuning, &mut rng).unwrap_err();
        assert!(matches!(err, InvalidConfigError::InvalidRadii { .. }));

        let mut field = field_of(vec![still(600.0, 450.0, 20.0, CircleState::Normal)]);
        let before = field.circles().to_vec();
        let err = field.relayout(tiny, tuning).unwrap_err();
        assert!(matches!(err, InvalidConfigError::InvalidRadii { .. }));
        assert_eq!(field.bounds(), BOUNDS);
        assert_eq!(field.circles(), before.as_slice());
    }
}
