//! Colors for circles, level backgrounds and HUD text

use serde::{Deserialize, Serialize};

/// Linear RGBA color with components in 0-1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const GREEN: Color = Color::from_hex(0x008000);
    pub const YELLOW: Color = Color::from_hex(0xFFFF00);
    pub const PURPLE: Color = Color::from_hex(0x800080);
    pub const WIN_GREEN: Color = Color::from_hex(0x00AA33);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build from a 0xRRGGBB literal
    pub const fn from_hex(hex: u32) -> Self {
        Self::rgb(
            ((hex >> 16) & 0xFF) as f32 / 255.0,
            ((hex >> 8) & 0xFF) as f32 / 255.0,
            (hex & 0xFF) as f32 / 255.0,
        )
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// CSS `rgba()` string for DOM text
    pub fn to_css(self) -> String {
        format!(
            "rgba({},{},{},{})",
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            self.a
        )
    }
}

/// Circle fill colors, assigned round-robin by spawn order
pub const CIRCLE_COLORS: [Color; 8] = [
    Color::from_hex(0x00308F),
    Color::from_hex(0xE30074),
    Color::from_hex(0xB8D000),
    Color::from_hex(0xFFFF66),
    Color::from_hex(0x66FF66),
    Color::from_hex(0x50BFE6),
    Color::from_hex(0xFF6EFF),
    Color::from_hex(0xEE34D2),
];

#[inline]
pub fn circle_color(color_index: usize) -> Color {
    CIRCLE_COLORS[color_index % CIRCLE_COLORS.len()]
}

/// Background and font color for one round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelTheme {
    pub background: Color,
    pub font: Color,
}

impl Default for LevelTheme {
    fn default() -> Self {
        Self {
            background: Color::BLACK,
            font: Color::WHITE,
        }
    }
}

/// Themes picked at random when advancing a level
pub const LEVEL_THEMES: [LevelTheme; 4] = [
    LevelTheme {
        background: Color::from_hex(0x1B1F3B),
        font: Color::WHITE,
    },
    LevelTheme {
        background: Color::from_hex(0xF4E3C1),
        font: Color::BLACK,
    },
    LevelTheme {
        background: Color::from_hex(0xBFE3D0),
        font: Color::BLACK,
    },
    LevelTheme {
        background: Color::from_hex(0xD9D4F0),
        font: Color::BLACK,
    },
];
