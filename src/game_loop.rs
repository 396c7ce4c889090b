//! Frame-driven game loop
//!
//! One call to [`GameLoop::frame`] per animation frame: clamp dt, draw the
//! scene, advance circles, run the chain reaction and phase checks, draw the
//! HUD, then ask the scheduler for the next frame.

use std::collections::VecDeque;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::{MAX_FPS, MIN_FPS};
use crate::error::InvalidConfigError;
use crate::hud;
use crate::ports::{AudioPort, FrameScheduler, InputEvent, Renderer, ScoreStore, TickHandle};
use crate::sim::{CircleField, RoundController, RoundEvent};
use crate::tuning::{CircleTuning, LevelTuning};

/// Converts wall-clock timestamps into a clamped dt
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self { last_ms: None }
    }

    /// Seconds since the previous call, kept within 12-60 fps
    pub fn delta(&mut self, now_ms: f64) -> f32 {
        let elapsed = match self.last_ms {
            Some(last) => now_ms - last,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);

        let fps = if elapsed > 0.0 {
            (1000.0 / elapsed).clamp(MIN_FPS, MAX_FPS)
        } else {
            MAX_FPS
        };
        (1.0 / fps) as f32
    }
}

/// Everything the game knows, owned in one place
#[derive(Debug, Clone)]
pub struct GameContext {
    pub field: CircleField,
    pub round: RoundController,
    rng: Pcg32,
    debug: bool,
}

impl GameContext {
    /// Fresh game on a `viewport`-sized field
    pub fn new(
        seed: u64,
        viewport: Vec2,
        level: LevelTuning,
        best_score: u32,
    ) -> Result<Self, InvalidConfigError> {
        let mut rng = Pcg32::seed_from_u64(seed);
        let round = RoundController::new(level, best_score);
        let tuning = CircleTuning::for_viewport(viewport.x, viewport.y);
        let field = CircleField::create(round.num_circles(), viewport, tuning, &mut rng)?;
        Ok(Self::from_parts(field, round, rng))
    }

    /// Assemble from an existing field and controller
    pub fn from_parts(field: CircleField, round: RoundController, rng: Pcg32) -> Self {
        Self {
            field,
            round,
            rng,
            debug: false,
        }
    }

    pub fn viewport(&self) -> Vec2 {
        self.field.bounds()
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Rescale circles for a new viewport
    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), InvalidConfigError> {
        let tuning = CircleTuning::for_viewport(width, height);
        self.field.relayout(Vec2::new(width, height), tuning)
    }

    fn pointer_down(&mut self, point: Vec2) -> Result<Vec<RoundEvent>, InvalidConfigError> {
        self.round.pointer_down(point, &mut self.field, &mut self.rng)
    }
}

/// Owns the context and the ports, and decides when frames run
pub struct GameLoop<S, A, P> {
    ctx: GameContext,
    clock: FrameClock,
    scheduler: S,
    audio: A,
    store: P,
    pending: Option<TickHandle>,
    paused: bool,
    input: VecDeque<InputEvent>,
}

impl<S: FrameScheduler, A: AudioPort, P: ScoreStore> GameLoop<S, A, P> {
    pub fn new(ctx: GameContext, scheduler: S, audio: A, store: P) -> Self {
        Self {
            ctx,
            clock: FrameClock::new(),
            scheduler,
            audio,
            store,
            pending: None,
            paused: false,
            input: VecDeque::new(),
        }
    }

    pub fn ctx(&self) -> &GameContext {
        &self.ctx
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pending frame request, if any
    pub fn pending_tick(&self) -> Option<TickHandle> {
        self.pending
    }

    /// Kick off the first frame
    pub fn start(&mut self) {
        self.schedule();
    }

    /// Accept an input event
    ///
    /// Pause toggles act immediately, and so does a click while paused
    /// (it resumes). Everything else waits for the start of the next frame.
    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::PauseToggle => {
                if self.paused {
                    self.resume();
                } else {
                    self.pause();
                }
            }
            InputEvent::PointerDown { .. } if self.paused => self.resume(),
            other => self.input.push_back(other),
        }
    }

    /// Freeze the simulation
    ///
    /// Cancels the pending frame and requests a single overlay frame that
    /// draws the pause screen without rescheduling.
    pub fn pause(&mut self) {
        if self.paused {
            return;
        }
        self.paused = true;
        self.audio.stop_background();
        self.cancel_pending();
        self.schedule();
        log::info!("Paused");
    }

    pub fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.paused = false;
        self.audio.play_background();
        self.cancel_pending();
        self.schedule();
        log::info!("Resumed");
    }

    /// Viewport changed
    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), InvalidConfigError> {
        self.ctx.resize(width, height)?;
        log::info!("Viewport resized to {}x{}", width, height);
        Ok(())
    }

    /// Run one animation frame at wall-clock time `now_ms`
    pub fn frame(&mut self, now_ms: f64, renderer: &mut dyn Renderer) {
        self.pending = None;
        let dt = self.clock.delta(now_ms);

        if self.paused {
            renderer.begin_frame();
            self.draw_scene(renderer);
            if self.ctx.debug {
                hud::draw_debug(renderer, &self.ctx, dt);
            }
            hud::draw_pause_overlay(renderer, &self.ctx);
            renderer.end_frame();
            return;
        }

        self.drain_input();

        renderer.begin_frame();
        self.draw_scene(renderer);
        if self.ctx.debug {
            hud::draw_debug(renderer, &self.ctx, dt);
        }

        self.ctx.field.tick(dt);
        let events = self.ctx.round.evaluate(&mut self.ctx.field);
        self.dispatch(&events);

        hud::draw_hud(renderer, &self.ctx);
        renderer.end_frame();

        self.schedule();
    }

    fn draw_scene(&self, renderer: &mut dyn Renderer) {
        renderer.fill_background(self.ctx.round.theme().background);
        for circle in self.ctx.field.visible() {
            renderer.draw_circle(circle);
        }
    }

    fn drain_input(&mut self) {
        while let Some(event) = self.input.pop_front() {
            match event {
                InputEvent::PointerDown { x, y } => match self.ctx.pointer_down(Vec2::new(x, y)) {
                    Ok(events) => self.dispatch(&events),
                    Err(e) => log::error!("Could not set up round: {}", e),
                },
                InputEvent::DebugToggle => {
                    self.ctx.debug = !self.ctx.debug;
                    log::info!("Debug overlay: {}", self.ctx.debug);
                }
                InputEvent::PauseToggle => {}
            }
        }
    }

    fn dispatch(&mut self, events: &[RoundEvent]) {
        for event in events {
            match *event {
                RoundEvent::RoundStarted => self.audio.play_background(),
                RoundEvent::CircleIgnited | RoundEvent::ChainPops(_) => self.audio.play_effect(),
                RoundEvent::RoundEnded(_) => self.audio.stop_background(),
                RoundEvent::NewBestScore(score) => {
                    self.store.save_best_score(score);
                    log::info!("New best score: {}", score);
                }
            }
        }
    }

    fn schedule(&mut self) {
        if self.pending.is_none() {
            self.pending = self.scheduler.request_tick();
            if self.pending.is_none() {
                log::warn!("Frame request refused");
            }
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_tick(handle);
        }
    }
}
