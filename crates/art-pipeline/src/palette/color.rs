//! A single opaque RGB palette entry.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use thiserror::Error;

/// Error type for parsing hex color strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseColorError {
    /// Hex string has invalid length (3, 4, 6 or 8 digits after stripping '#')
    #[error("invalid hex color length (expected 3, 4, 6 or 8 digits)")]
    InvalidLength,
    /// Invalid hexadecimal character encountered
    #[error("invalid hex character: {0}")]
    InvalidHex(#[from] ParseIntError),
}

/// An 8-bit sRGB triple. Palette entries never carry alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaletteColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl PaletteColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from RGBA channels, discarding alpha.
    pub const fn from_rgba(r: u8, g: u8, b: u8, _alpha: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Squared Euclidean distance to an RGB sample.
    #[inline]
    pub fn distance_sq(self, rgb: [i32; 3]) -> i32 {
        let dr = rgb[0] - self.r as i32;
        let dg = rgb[1] - self.g as i32;
        let db = rgb[2] - self.b as i32;
        dr * dr + dg * dg + db * db
    }
}

impl From<[u8; 3]> for PaletteColor {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl fmt::Display for PaletteColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for PaletteColor {
    type Err = ParseColorError;

    /// Parse `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA` (hash optional).
    ///
    /// An alpha component is accepted and dropped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        if !s.is_ascii() {
            return Err(ParseColorError::InvalidLength);
        }

        match s.len() {
            3 | 4 => {
                // Shorthand: expand each digit by multiplying by 17 (0xF -> 0xFF)
                let r = u8::from_str_radix(&s[0..1], 16)? * 17;
                let g = u8::from_str_radix(&s[1..2], 16)? * 17;
                let b = u8::from_str_radix(&s[2..3], 16)? * 17;
                if s.len() == 4 {
                    u8::from_str_radix(&s[3..4], 16)?;
                }
                Ok(Self::new(r, g, b))
            }
            6 | 8 => {
                let r = u8::from_str_radix(&s[0..2], 16)?;
                let g = u8::from_str_radix(&s[2..4], 16)?;
                let b = u8::from_str_radix(&s[4..6], 16)?;
                if s.len() == 8 {
                    u8::from_str_radix(&s[6..8], 16)?;
                }
                Ok(Self::new(r, g, b))
            }
            _ => Err(ParseColorError::InvalidLength),
        }
    }
}
