//! Interfaces between the game core and the platform
//!
//! The core decides what to draw, play and store; implementations in
//! `platform`, `renderer`, `audio` and `persistence` decide how.

use crate::palette::Color;
use crate::sim::Circle;

/// Horizontal anchoring of a text run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    /// `x` is the left edge, `y` the baseline
    Left,
    /// `(x, y)` is the center of the text box
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Font size in points
    pub size_pt: f32,
    pub align: TextAlign,
}

impl TextStyle {
    pub fn left(size_pt: f32) -> Self {
        Self {
            size_pt,
            align: TextAlign::Left,
        }
    }

    pub fn centered(size_pt: f32) -> Self {
        Self {
            size_pt,
            align: TextAlign::Center,
        }
    }
}

/// Frame output, painted in call order
pub trait Renderer {
    fn begin_frame(&mut self) {}
    /// Cover the whole viewport; translucent colors dim what is already drawn
    fn fill_background(&mut self, color: Color);
    fn draw_circle(&mut self, circle: &Circle);
    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: TextStyle, color: Color);
    fn end_frame(&mut self) {}
}

/// Sound output
pub trait AudioPort {
    /// Short pop for clicks and chain pops
    fn play_effect(&mut self);
    /// Start (or keep) the background loop
    fn play_background(&mut self);
    fn stop_background(&mut self);
}

/// Discrete player input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Click/tap in canvas pixels
    PointerDown { x: f32, y: f32 },
    PauseToggle,
    DebugToggle,
}

/// Storage for the all-time best score
pub trait ScoreStore {
    /// `None` when nothing was stored or storage is unavailable
    fn load_best_score(&self) -> Option<u32>;
    fn save_best_score(&mut self, score: u32);
}

/// Identifies a pending frame request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickHandle(pub i32);

/// Source of animation frames
pub trait FrameScheduler {
    /// Ask for one more frame; `None` if the platform refused
    fn request_tick(&mut self) -> Option<TickHandle>;
    fn cancel_tick(&mut self, handle: TickHandle);
}
