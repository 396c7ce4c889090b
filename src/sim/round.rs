//! Round state machine
//!
//! Owns scores and the game phase. The field is passed in by the caller; the
//! controller only decides what happens to it.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::field::CircleField;
use crate::error::InvalidConfigError;
use crate::palette::{LEVEL_THEMES, LevelTheme};
use crate::tuning::LevelTuning;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, circles drift in the background
    MainScreen,
    /// First round, waiting for the opening click
    Begin,
    /// Fresh round, waiting for the opening click
    Default,
    /// Chain reaction in progress, clicks ignored
    Exploding,
    /// Goal reached, next round gets more circles
    RoundOver,
    /// Goal missed, same round again
    RepeatLevel,
    /// Game won
    End,
}

impl GamePhase {
    /// Phases showing a "click to continue" overlay
    pub fn is_round_result(self) -> bool {
        matches!(
            self,
            GamePhase::RoundOver | GamePhase::RepeatLevel | GamePhase::End
        )
    }
}

/// Side effects of a transition, mapped onto audio and storage by the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEvent {
    /// A round is ready to play
    RoundStarted,
    /// The player's click set off a circle
    CircleIgnited,
    /// Blasts caught this many circles in one pass
    ChainPops(u32),
    /// Chain reaction settled with this outcome
    RoundEnded(GamePhase),
    /// Total score beat the stored best
    NewBestScore(u32),
}

#[derive(Debug, Clone)]
pub struct RoundController {
    level: LevelTuning,
    num_circles: u32,
    score_goal: u32,
    round_score: u32,
    total_score: u32,
    best_score: u32,
    phase: GamePhase,
    theme: LevelTheme,
}

impl RoundController {
    pub fn new(level: LevelTuning, best_score: u32) -> Self {
        Self {
            level,
            num_circles: level.circles_start,
            score_goal: level.score_goal(level.circles_start),
            round_score: 0,
            total_score: 0,
            best_score,
            phase: GamePhase::MainScreen,
            theme: LevelTheme::default(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn num_circles(&self) -> u32 {
        self.num_circles
    }

    pub fn score_goal(&self) -> u32 {
        self.score_goal
    }

    pub fn round_score(&self) -> u32 {
        self.round_score
    }

    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn theme(&self) -> LevelTheme {
        self.theme
    }

    /// Circle count the next successful round will use
    pub fn next_round_circles(&self) -> u32 {
        self.num_circles + self.level.level_increase
    }

    /// Handle a click at `point`
    ///
    /// Fails only when a round reset cannot build its field; the controller
    /// is left untouched in that case.
    pub fn pointer_down<R: Rng + ?Sized>(
        &mut self,
        point: Vec2,
        field: &mut CircleField,
        rng: &mut R,
    ) -> Result<Vec<RoundEvent>, InvalidConfigError> {
        match self.phase {
            GamePhase::MainScreen => {
                self.phase = GamePhase::Begin;
                log::info!("Game started with {} circles", self.num_circles);
                Ok(vec![RoundEvent::RoundStarted])
            }
            GamePhase::Begin | GamePhase::Default => {
                let Some(index) = field.hit_test(point) else {
                    return Ok(Vec::new());
                };
                field.ignite(index);
                self.round_score += 1;
                self.phase = GamePhase::Exploding;
                log::debug!("Circle {} ignited at ({:.0}, {:.0})", index, point.x, point.y);
                Ok(vec![RoundEvent::CircleIgnited])
            }
            GamePhase::Exploding => Ok(Vec::new()),
            GamePhase::RoundOver | GamePhase::RepeatLevel | GamePhase::End => {
                self.reset(field, rng)?;
                Ok(vec![RoundEvent::RoundStarted])
            }
        }
    }

    /// Run the chain reaction pass and settle the round once it is over
    pub fn evaluate(&mut self, field: &mut CircleField) -> Vec<RoundEvent> {
        let mut events = Vec::new();
        if self.phase != GamePhase::Exploding {
            return events;
        }

        let pops = field.collide_exploding_into_normal();
        if pops > 0 {
            self.round_score += pops;
            events.push(RoundEvent::ChainPops(pops));
        }

        if field.round_finished() {
            events.extend(self.conclude());
        }
        events
    }

    /// Pick the outcome for a settled round and bank its score
    fn conclude(&mut self) -> Vec<RoundEvent> {
        let mut events = Vec::new();

        self.phase = if self.round_score < self.score_goal {
            GamePhase::RepeatLevel
        } else if self.num_circles > self.level.circles_end {
            GamePhase::End
        } else {
            GamePhase::RoundOver
        };

        if self.phase != GamePhase::RepeatLevel {
            self.total_score += self.round_score;
            if self.total_score > self.best_score {
                self.best_score = self.total_score;
                events.push(RoundEvent::NewBestScore(self.best_score));
            }
        }

        log::info!(
            "Round ended: {:?} ({} of {}, total {})",
            self.phase,
            self.round_score,
            self.score_goal,
            self.total_score
        );
        events.push(RoundEvent::RoundEnded(self.phase));
        events
    }

    /// Set up the next round based on how the last one ended
    pub fn reset<R: Rng + ?Sized>(
        &mut self,
        field: &mut CircleField,
        rng: &mut R,
    ) -> Result<(), InvalidConfigError> {
        let mut theme = self.theme;
        let mut total_score = self.total_score;
        let num_circles = match self.phase {
            GamePhase::End => {
                total_score = 0;
                self.level.circles_start
            }
            GamePhase::RepeatLevel => self.num_circles,
            _ => {
                theme = LEVEL_THEMES[rng.random_range(0..LEVEL_THEMES.len())];
                self.num_circles + self.level.level_increase
            }
        };

        *field = CircleField::create(num_circles, field.bounds(), *field.tuning(), rng)?;

        self.num_circles = num_circles;
        self.total_score = total_score;
        self.theme = theme;
        self.round_score = 0;
        self.score_goal = self.level.score_goal(num_circles);
        self.phase = GamePhase::Default;
        log::info!(
            "New round: {} circles, goal {}",
            self.num_circles,
            self.score_goal
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Circle, CircleState};
    use crate::tuning::CircleTuning;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const BOUNDS: Vec2 = Vec2::new(640.0, 480.0);

    fn parked(x: f32, y: f32) -> Circle {
        Circle::new(Vec2::new(x, y), Vec2::X, 0.0, 20.0, 0)
    }

    /// Three touching circles on the left, three loners elsewhere
    fn scripted_field() -> CircleField {
        CircleField::from_circles(
            BOUNDS,
            CircleTuning::default(),
            vec![
                parked(100.0, 100.0),
                parked(130.0, 100.0),
                parked(160.0, 100.0),
                parked(500.0, 400.0),
                parked(550.0, 250.0),
                parked(350.0, 60.0),
            ],
        )
        .unwrap()
    }

    fn started() -> RoundController {
        let mut ctrl = RoundController::new(LevelTuning::default(), 0);
        ctrl.phase = GamePhase::Begin;
        ctrl
    }

    /// Tick and evaluate until the chain reaction settles
    fn play_out(ctrl: &mut RoundController, field: &mut CircleField) -> Vec<RoundEvent> {
        let mut events = Vec::new();
        for _ in 0..1000 {
            field.tick(1.0 / 30.0);
            events.extend(ctrl.evaluate(field));
            if ctrl.phase() != GamePhase::Exploding {
                break;
            }
        }
        events
    }

    #[test]
    fn test_new_controller_starts_on_title() {
        let ctrl = RoundController::new(LevelTuning::default(), 17);
        assert_eq!(ctrl.phase(), GamePhase::MainScreen);
        assert_eq!(ctrl.num_circles(), 6);
        assert_eq!(ctrl.score_goal(), 2);
        assert_eq!(ctrl.best_score(), 17);
        assert_eq!(ctrl.theme(), LevelTheme::default());
    }

    #[test]
    fn test_title_click_begins() {
        let mut ctrl = RoundController::new(LevelTuning::default(), 0);
        let mut field = scripted_field();
        let mut rng = Pcg32::seed_from_u64(1);
        let events = ctrl
            .pointer_down(Vec2::new(5.0, 5.0), &mut field, &mut rng)
            .unwrap();
        assert_eq!(events, vec![RoundEvent::RoundStarted]);
        assert_eq!(ctrl.phase(), GamePhase::Begin);
    }

    #[test]
    fn test_chain_of_three_clears_round() {
        let mut ctrl = started();
        let mut field = scripted_field();
        let mut rng = Pcg32::seed_from_u64(1);

        let events = ctrl
            .pointer_down(Vec2::new(95.0, 100.0), &mut field, &mut rng)
            .unwrap();
        assert_eq!(events, vec![RoundEvent::CircleIgnited]);
        assert_eq!(ctrl.phase(), GamePhase::Exploding);
        assert_eq!(ctrl.round_score(), 1);

        let events = play_out(&mut ctrl, &mut field);
        assert!(events.contains(&RoundEvent::ChainPops(2)));
        assert!(events.contains(&RoundEvent::NewBestScore(3)));
        assert_eq!(events.last(), Some(&RoundEvent::RoundEnded(GamePhase::RoundOver)));
        assert_eq!(ctrl.round_score(), 3);
        assert_eq!(ctrl.total_score(), 3);
        assert_eq!(field.count_in(CircleState::Done), 3);
        assert_eq!(field.count_in(CircleState::Normal), 3);
    }

    #[test]
    fn test_missed_goal_repeats_without_scoring() {
        let mut ctrl = started();
        ctrl.total_score = 10;
        let mut field = scripted_field();
        let mut rng = Pcg32::seed_from_u64(1);

        ctrl.pointer_down(Vec2::new(500.0, 400.0), &mut field, &mut rng)
            .unwrap();
        let events = play_out(&mut ctrl, &mut field);
        assert_eq!(events, vec![RoundEvent::RoundEnded(GamePhase::RepeatLevel)]);
        assert_eq!(ctrl.total_score(), 10);

        let events = ctrl
            .pointer_down(Vec2::ZERO, &mut field, &mut rng)
            .unwrap();
        assert_eq!(events, vec![RoundEvent::RoundStarted]);
        assert_eq!(ctrl.phase(), GamePhase::Default);
        assert_eq!(ctrl.num_circles(), 6);
        assert_eq!(ctrl.round_score(), 0);
        assert_eq!(ctrl.theme(), LevelTheme::default());
        assert_eq!(field.len(), 6);
        assert_eq!(field.count_in(CircleState::Normal), 6);
    }

    #[test]
    fn test_round_over_advances_level() {
        let mut ctrl = started();
        ctrl.phase = GamePhase::RoundOver;
        let mut field = scripted_field();
        let mut rng = Pcg32::seed_from_u64(3);

        ctrl.pointer_down(Vec2::ZERO, &mut field, &mut rng).unwrap();
        assert_eq!(ctrl.num_circles(), 12);
        assert_eq!(ctrl.score_goal(), 5);
        assert_eq!(field.len(), 12);
        assert!(LEVEL_THEMES.contains(&ctrl.theme()));
    }

    #[test]
    fn test_win_and_restart() {
        let mut ctrl = started();
        ctrl.num_circles = 36;
        ctrl.score_goal = 1;
        ctrl.total_score = 40;
        let mut field = scripted_field();
        let mut rng = Pcg32::seed_from_u64(1);

        ctrl.pointer_down(Vec2::new(350.0, 60.0), &mut field, &mut rng)
            .unwrap();
        let events = play_out(&mut ctrl, &mut field);
        assert_eq!(events.last(), Some(&RoundEvent::RoundEnded(GamePhase::End)));
        assert_eq!(ctrl.total_score(), 41);

        ctrl.pointer_down(Vec2::ZERO, &mut field, &mut rng).unwrap();
        assert_eq!(ctrl.phase(), GamePhase::Default);
        assert_eq!(ctrl.num_circles(), crate::consts::NUM_CIRCLES_START);
        assert_eq!(ctrl.total_score(), 0);
        assert_eq!(ctrl.best_score(), 41);
    }

    #[test]
    fn test_clicks_ignored_while_exploding() {
        let mut ctrl = started();
        let mut field = scripted_field();
        let mut rng = Pcg32::seed_from_u64(1);
        ctrl.pointer_down(Vec2::new(500.0, 400.0), &mut field, &mut rng)
            .unwrap();

        let events = ctrl
            .pointer_down(Vec2::new(550.0, 250.0), &mut field, &mut rng)
            .unwrap();
        assert!(events.is_empty());
        assert_eq!(ctrl.round_score(), 1);
        assert_eq!(field.circles()[4].state, CircleState::Normal);
    }

    #[test]
    fn test_miss_is_a_no_op() {
        let mut ctrl = started();
        let mut field = scripted_field();
        let mut rng = Pcg32::seed_from_u64(1);
        let events = ctrl
            .pointer_down(Vec2::new(320.0, 300.0), &mut field, &mut rng)
            .unwrap();
        assert!(events.is_empty());
        assert_eq!(ctrl.phase(), GamePhase::Begin);
        assert_eq!(ctrl.round_score(), 0);
    }

    #[test]
    fn test_failed_reset_leaves_round_untouched() {
        let mut ctrl = started();
        ctrl.phase = GamePhase::RoundOver;
        ctrl.round_score = 4;
        let mut field =
            CircleField::from_circles(Vec2::new(30.0, 30.0), CircleTuning::default(), Vec::new())
                .unwrap();
        let mut rng = Pcg32::seed_from_u64(1);

        let err = ctrl.pointer_down(Vec2::ZERO, &mut field, &mut rng);
        assert!(matches!(err, Err(InvalidConfigError::SpawnBoundsTooSmall { .. })));
        assert_eq!(ctrl.phase(), GamePhase::RoundOver);
        assert_eq!(ctrl.num_circles(), 6);
        assert_eq!(ctrl.round_score(), 4);
    }

    #[test]
    fn test_evaluate_outside_exploding_does_nothing() {
        let mut ctrl = started();
        let mut field = scripted_field();
        assert!(ctrl.evaluate(&mut field).is_empty());
        assert_eq!(ctrl.phase(), GamePhase::Begin);
    }

    proptest! {
        #[test]
        fn prop_progression_keeps_invariants(outcomes in prop::collection::vec(any::<bool>(), 1..40)) {
            let mut ctrl = started();
            let mut field = scripted_field();
            let mut rng = Pcg32::seed_from_u64(99);

            for succeed in outcomes {
                let total_before = ctrl.total_score();
                ctrl.phase = GamePhase::Exploding;
                ctrl.round_score = if succeed { ctrl.score_goal() } else { ctrl.score_goal().saturating_sub(1) };
                ctrl.conclude();

                let failed = ctrl.round_score() < ctrl.score_goal();
                prop_assert_eq!(ctrl.phase() == GamePhase::RepeatLevel, failed);
                if failed {
                    prop_assert_eq!(ctrl.total_score(), total_before);
                }
                if ctrl.phase() == GamePhase::End {
                    prop_assert!(ctrl.num_circles() > crate::consts::NUM_CIRCLES_END);
                }

                let ended = ctrl.phase() == GamePhase::End;
                ctrl.reset(&mut field, &mut rng).unwrap();
                prop_assert_eq!(ctrl.score_goal(), ctrl.level.score_goal(ctrl.num_circles()));
                prop_assert_eq!(field.len() as u32, ctrl.num_circles());
                if ended {
                    prop_assert_eq!(ctrl.num_circles(), crate::consts::NUM_CIRCLES_START);
                    prop_assert_eq!(ctrl.total_score(), 0);
                }
            }
        }
    }
}
