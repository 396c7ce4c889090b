//! Audio system using Web Audio API
//!
//! Both sounds are synthesized, no asset files: a short pop for clicks and
//! chain pops, and a soft looping drone while a round is in play.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::ports::AudioPort;
use crate::settings::Settings;

/// Pops closer together than this (seconds) are merged
const MIN_POP_SPACING: f64 = 0.03;

/// Drone notes (Hz), a low fifth
const DRONE_NOTES: [f32; 2] = [110.0, 164.81];

struct Drone {
    oscs: Vec<OscillatorNode>,
    gain: GainNode,
}

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    effect_volume: f32,
    music_volume: f32,
    drone: Option<Drone>,
    last_pop: f64,
}

impl AudioManager {
    pub fn new(settings: &Settings) -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            effect_volume: settings.effect_gain(),
            music_volume: settings.music_gain(),
            drone: None,
            last_pop: f64::NEG_INFINITY,
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
        }
    }

    /// Create an oscillator with gain envelope
    fn create_osc(
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Pop - quick downward chirp
    fn play_pop(ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = Self::create_osc(ctx, 880.0, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.4, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.12)
            .ok();
        osc.frequency().set_value_at_time(880.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(220.0, t + 0.1)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.15).ok();
    }

    fn start_drone(ctx: &AudioContext, vol: f32) -> Option<Drone> {
        let gain = ctx.create_gain().ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;
        let t = ctx.current_time();
        gain.gain().set_value_at_time(0.001, t).ok();
        gain.gain()
            .linear_ramp_to_value_at_time(vol * 0.15, t + 0.5)
            .ok();

        let mut oscs = Vec::with_capacity(DRONE_NOTES.len());
        for freq in DRONE_NOTES {
            let osc = ctx.create_oscillator().ok()?;
            osc.set_type(OscillatorType::Triangle);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            osc.start().ok();
            oscs.push(osc);
        }
        Some(Drone { oscs, gain })
    }
}

impl AudioPort for AudioManager {
    fn play_effect(&mut self) {
        if self.effect_volume <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };
        self.resume();

        let now = ctx.current_time();
        if now - self.last_pop < MIN_POP_SPACING {
            return;
        }
        self.last_pop = now;
        Self::play_pop(ctx, self.effect_volume);
    }

    fn play_background(&mut self) {
        if self.drone.is_some() || self.music_volume <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };
        self.resume();
        self.drone = Self::start_drone(ctx, self.music_volume);
        if self.drone.is_none() {
            log::warn!("Could not start background loop");
        }
    }

    fn stop_background(&mut self) {
        let (Some(ctx), Some(drone)) = (&self.ctx, self.drone.take()) else {
            return;
        };
        let t = ctx.current_time();
        drone.gain.gain().cancel_scheduled_values(t).ok();
        drone
            .gain
            .gain()
            .linear_ramp_to_value_at_time(0.0, t + 0.2)
            .ok();
        for osc in drone.oscs {
            osc.stop_with_when(t + 0.25).ok();
        }
    }
}
