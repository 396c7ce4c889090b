//! Per-frame draw batch
//!
//! Collects renderer calls into the uniform data the circle shader reads.
//! The first fill of a frame sets the background; fills after that are
//! blended into a single overlay drawn on top of everything.

use bytemuck::{Pod, Zeroable};

use crate::palette::{Color, circle_color};
use crate::sim::Circle;

/// Maximum circles the shader loops over
pub const MAX_CIRCLES: usize = 64;

/// Opacity of every circle fill
pub const CIRCLE_ALPHA: f32 = 0.8;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Globals {
    pub resolution: [f32; 2], // offset 0
    pub scale: f32,           // offset 8 - CSS px to device px
    pub circle_count: u32,    // offset 12
    pub shadows: u32,         // offset 16
    pub _pad: [u32; 3],       // offset 20 - align background to 16
    pub background: [f32; 4], // offset 32
    pub overlay: [f32; 4],    // offset 48
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct CircleData {
    pub center: [f32; 2],
    pub radius: f32,
    pub _pad: f32,
    pub color: [f32; 4],
}

#[derive(Debug, Clone)]
pub struct FrameScene {
    background: Color,
    has_background: bool,
    overlay: Color,
    circles: Vec<CircleData>,
    dropped: usize,
}

impl Default for FrameScene {
    fn default() -> Self {
        Self {
            background: Color::BLACK,
            has_background: false,
            overlay: Color::rgba(0.0, 0.0, 0.0, 0.0),
            circles: Vec::with_capacity(MAX_CIRCLES),
            dropped: 0,
        }
    }
}

impl FrameScene {
    pub fn clear(&mut self) {
        self.background = Color::BLACK;
        self.has_background = false;
        self.overlay = Color::rgba(0.0, 0.0, 0.0, 0.0);
        self.circles.clear();
        self.dropped = 0;
    }

    pub fn fill(&mut self, color: Color) {
        if !self.has_background {
            self.background = color;
            self.has_background = true;
        } else {
            self.overlay = blend_over(self.overlay, color);
        }
    }

    pub fn push_circle(&mut self, circle: &Circle) {
        if self.circles.len() >= MAX_CIRCLES {
            self.dropped += 1;
            return;
        }
        let color = circle_color(circle.color_index).with_alpha(CIRCLE_ALPHA);
        self.circles.push(CircleData {
            center: circle.pos.to_array(),
            radius: circle.radius,
            _pad: 0.0,
            color: color.to_array(),
        });
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn overlay(&self) -> Color {
        self.overlay
    }

    pub fn circles(&self) -> &[CircleData] {
        &self.circles
    }

    /// Circles past the shader limit this frame
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn globals(&self, resolution: [f32; 2], scale: f32, shadows: bool) -> Globals {
        Globals {
            resolution,
            scale,
            circle_count: self.circles.len() as u32,
            shadows: shadows as u32,
            _pad: [0; 3],
            background: self.background.to_array(),
            overlay: self.overlay.to_array(),
        }
    }

    /// Circle data padded to the fixed uniform array size
    pub fn circle_block(&self) -> [CircleData; MAX_CIRCLES] {
        let mut block = [CircleData::default(); MAX_CIRCLES];
        block[..self.circles.len()].copy_from_slice(&self.circles);
        block
    }
}

/// Source-over compositing of two translucent colors
fn blend_over(dst: Color, src: Color) -> Color {
    let a = src.a + dst.a * (1.0 - src.a);
    if a <= 0.0 {
        return Color::rgba(0.0, 0.0, 0.0, 0.0);
    }
    let mix = |s: f32, d: f32| (s * src.a + d * dst.a * (1.0 - src.a)) / a;
    Color::rgba(mix(src.r, dst.r), mix(src.g, dst.g), mix(src.b, dst.b), a)
}
