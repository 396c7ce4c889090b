//! Headless ports
//!
//! Frames are fired by hand and output is recorded instead of shown.

use crate::palette::Color;
use crate::ports::{AudioPort, FrameScheduler, Renderer, TextStyle, TickHandle};
use crate::sim::Circle;

/// Scheduler that only runs a frame when told to
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: i32,
    pending: Option<TickHandle>,
    fired: usize,
    cancelled: usize,
}

impl ManualScheduler {
    /// Consume the pending request, if there is one
    pub fn fire(&mut self) -> Option<TickHandle> {
        let handle = self.pending.take()?;
        self.fired += 1;
        Some(handle)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Frames fired so far
    pub fn fired(&self) -> usize {
        self.fired
    }

    pub fn cancelled(&self) -> usize {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_tick(&mut self) -> Option<TickHandle> {
        if let Some(handle) = self.pending {
            return Some(handle);
        }
        self.next_id += 1;
        let handle = TickHandle(self.next_id);
        self.pending = Some(handle);
        Some(handle)
    }

    fn cancel_tick(&mut self, handle: TickHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
            self.cancelled += 1;
        }
    }
}

/// Audio that just counts
#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub effects: u32,
    pub background_playing: bool,
    pub background_starts: u32,
}

impl AudioPort for RecordingAudio {
    fn play_effect(&mut self) {
        self.effects += 1;
    }

    fn play_background(&mut self) {
        if !self.background_playing {
            self.background_starts += 1;
        }
        self.background_playing = true;
    }

    fn stop_background(&mut self) {
        self.background_playing = false;
    }
}

/// No sound at all
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAudio;

impl AudioPort for SilentAudio {
    fn play_effect(&mut self) {}
    fn play_background(&mut self) {}
    fn stop_background(&mut self) {}
}

/// One recorded draw command
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Fill(Color),
    Circle(Circle),
    Text { text: String, x: f32, y: f32, color: Color },
}

/// Keeps the draw calls of the most recent frame
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    calls: Vec<DrawCall>,
    frames: usize,
}

impl RecordingRenderer {
    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Frames begun so far
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn circles(&self) -> Vec<Circle> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Circle(circle) => Some(*circle),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of full-viewport fills in the last frame
    pub fn fills(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Fill(_)))
            .count()
    }
}

impl Renderer for RecordingRenderer {
    fn begin_frame(&mut self) {
        self.calls.clear();
        self.frames += 1;
    }

    fn fill_background(&mut self, color: Color) {
        self.calls.push(DrawCall::Fill(color));
    }

    fn draw_circle(&mut self, circle: &Circle) {
        self.calls.push(DrawCall::Circle(*circle));
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, _style: TextStyle, color: Color) {
        self.calls.push(DrawCall::Text {
            text: text.to_string(),
            x,
            y,
            color,
        });
    }
}
