//! RGBA colors and color-string parsing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ContourError;

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0, 255);
    pub const WHITE: Color = Color::new(255, 255, 255, 255);
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Replace alpha with an opacity in 0.0..=1.0.
    pub fn with_alpha(self, alpha: f64) -> Self {
        Self {
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Linear color interpolation
    pub fn lerp(self, other: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 * (1.0 - t) + b as f64 * t).round() as u8;
        Color::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl FromStr for Color {
    type Err = ContourError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(color) = named_color(&trimmed.to_ascii_lowercase()) {
            return Ok(color);
        }
        hex_to_rgba(trimmed).ok_or_else(|| ContourError::UnknownColor(s.to_string()))
    }
}

impl TryFrom<String> for Color {
    type Error = ContourError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Parse hex color string (`#rrggbb` or `#rrggbbaa`, `#` optional)
pub fn hex_to_rgba(hex: &str) -> Option<Color> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 && hex.len() != 8 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();

    let r = channel(0)?;
    let g = channel(2)?;
    let b = channel(4)?;
    let a = if hex.len() == 8 { channel(6)? } else { 255 };

    Some(Color::new(r, g, b, a))
}

fn named_color(name: &str) -> Option<Color> {
    let color = match name {
        "black" | "k" => Color::rgb(0, 0, 0),
        "white" | "w" => Color::rgb(255, 255, 255),
        "red" | "r" => Color::rgb(255, 0, 0),
        "green" | "g" => Color::rgb(0, 128, 0),
        "blue" | "b" => Color::rgb(0, 0, 255),
        "cyan" | "c" => Color::rgb(0, 191, 191),
        "magenta" | "m" => Color::rgb(191, 0, 191),
        "yellow" | "y" => Color::rgb(191, 191, 0),
        "gray" | "grey" => Color::rgb(128, 128, 128),
        "orange" => Color::rgb(255, 165, 0),
        "purple" => Color::rgb(128, 0, 128),
        "brown" => Color::rgb(165, 42, 42),
        "darkred" => Color::rgb(139, 0, 0),
        "navy" => Color::rgb(0, 0, 128),
        "none" | "transparent" => Color::TRANSPARENT,
        _ => return None,
    };
    Some(color)
}
