//! 8-bit RGB color type
//!
//! All clustering and palette math in this crate works directly on 8-bit
//! RGB triples. Equality is exact channel equality.

use std::fmt;
use std::str::FromStr;

use crate::palette::ParseColorError;

/// An 8-bit RGB color.
///
/// Alpha is not part of the color; images carry it as a separate channel
/// so that clustering never mixes opacity into color distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Color {
    /// Red channel (0..=255)
    pub r: u8,
    /// Green channel (0..=255)
    pub g: u8,
    /// Blue channel (0..=255)
    pub b: u8,
}

impl Color {
    /// Create a color from its three channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a color from a byte array [R, G, B].
    #[inline]
    pub const fn from_bytes(bytes: [u8; 3]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2])
    }

    /// Convert to a byte array [R, G, B].
    #[inline]
    pub const fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Squared Euclidean distance in RGB space.
    ///
    /// The maximum value is `3 * 255^2`, which always fits in a `u32`.
    #[inline]
    pub fn distance_squared(self, other: Color) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }

    /// Euclidean distance in RGB space.
    #[inline]
    pub fn distance(self, other: Color) -> f64 {
        (self.distance_squared(other) as f64).sqrt()
    }

    /// Channels as floating point values, for centroid arithmetic.
    #[inline]
    pub fn to_f64(self) -> [f64; 3] {
        [self.r as f64, self.g as f64, self.b as f64]
    }

    /// Format as a lowercase `#rrggbb` hex string.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<[u8; 3]> for Color {
    fn from(bytes: [u8; 3]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    /// Parse a color from a hex string.
    ///
    /// Supports `#RRGGBB`, `RRGGBB`, `#RGB` and `RGB`. Parsing is
    /// case-insensitive and surrounding whitespace is trimmed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);

        if !s.is_ascii() {
            return Err(ParseColorError::InvalidLength);
        }
        if !matches!(s.len(), 3 | 6) {
            return Err(ParseColorError::InvalidLength);
        }
        if let Some(c) = s.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(ParseColorError::InvalidCharacter(c));
        }

        match s.len() {
            3 => {
                // Shorthand: 0xF -> 0xFF
                let r = u8::from_str_radix(&s[0..1], 16)? * 17;
                let g = u8::from_str_radix(&s[1..2], 16)? * 17;
                let b = u8::from_str_radix(&s[2..3], 16)? * 17;
                Ok(Self::new(r, g, b))
            }
            6 => {
                let r = u8::from_str_radix(&s[0..2], 16)?;
                let g = u8::from_str_radix(&s[2..4], 16)?;
                let b = u8::from_str_radix(&s[4..6], 16)?;
                Ok(Self::new(r, g, b))
            }
            _ => Err(ParseColorError::InvalidLength),
        }
    }
}
