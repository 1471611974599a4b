//! Color values and parsing.
//!
//! [CSS Color Level 4](https://www.w3.org/TR/css-color-4/)
//!
//! Colors appear in styles, borders, and inline `<text color=…>` markup. They
//! are written as hex strings (or a handful of names) and parsed once into
//! RGBA components.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// sRGB color represented as RGBA components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red channel (0-255).
    pub r: u8,
    /// Green channel (0-255).
    pub g: u8,
    /// Blue channel (0-255).
    pub b: u8,
    /// Alpha channel (0-255, 255 = fully opaque).
    pub a: u8,
}

/// A color string that is neither valid hex nor a known name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color '{0}'")]
pub struct InvalidColor(pub String);

impl Color {
    /// Black (#000000)
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// White (#ffffff)
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Opaque color from RGB components.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color from RGBA components.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// [§ 4.2 The RGB hexadecimal notations](https://www.w3.org/TR/css-color-4/#hex-notation)
    ///
    /// "The syntax of a <hex-color> is a <hash-token> token whose value consists of
    /// 3, 4, 6, or 8 hexadecimal digits."
    ///
    /// The leading `#` is optional.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return None;
        }
        // Short forms replicate each digit: "f80" → "ff8800".
        let digit = |i: usize| u8::from_str_radix(&hex[i..=i].repeat(2), 16).ok();
        let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            3 => Some(Self::rgb(digit(0)?, digit(1)?, digit(2)?)),
            4 => Some(Self::rgba(digit(0)?, digit(1)?, digit(2)?, digit(3)?)),
            6 => Some(Self::rgb(pair(0)?, pair(2)?, pair(4)?)),
            8 => Some(Self::rgba(pair(0)?, pair(2)?, pair(4)?, pair(6)?)),
            _ => None,
        }
    }

    /// [§ 6.1 Named Colors](https://www.w3.org/TR/css-color-4/#named-colors)
    ///
    /// Only the basic named colors are recognized.
    #[must_use]
    pub fn from_named(name: &str) -> Option<Self> {
        let color = match name.to_ascii_lowercase().as_str() {
            "white" => Self::WHITE,
            "black" => Self::BLACK,
            "red" => Self::rgb(255, 0, 0),
            "green" => Self::rgb(0, 128, 0),
            "lime" => Self::rgb(0, 255, 0),
            "blue" => Self::rgb(0, 0, 255),
            "yellow" => Self::rgb(255, 255, 0),
            "orange" => Self::rgb(255, 165, 0),
            "purple" => Self::rgb(128, 0, 128),
            "navy" => Self::rgb(0, 0, 128),
            "teal" => Self::rgb(0, 128, 128),
            "maroon" => Self::rgb(128, 0, 0),
            "silver" => Self::rgb(192, 192, 192),
            "gray" | "grey" => Self::rgb(128, 128, 128),
            "transparent" => Self::TRANSPARENT,
            _ => return None,
        };
        Some(color)
    }

    /// True when the color is fully transparent.
    #[must_use]
    pub const fn is_transparent(self) -> bool {
        self.a == 0
    }
}

impl FromStr for Color {
    type Err = InvalidColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::from_hex(s)
            .filter(|_| s.starts_with('#'))
            .or_else(|| Self::from_named(s))
            .or_else(|| Self::from_hex(s))
            .ok_or_else(|| InvalidColor(s.to_string()))
    }
}

impl TryFrom<String> for Color {
    type Error = InvalidColor;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
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
