//! Error types for palette operations
//!
//! This module provides error types for color parsing and palette validation.

use std::num::ParseIntError;

use thiserror::Error;

/// Error type for parsing hex color strings.
///
/// Returned when parsing a hex color string fails, either due to
/// invalid length or invalid hexadecimal characters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseColorError {
    /// Hex string has invalid length (must be 3 or 6 characters after stripping '#')
    #[error("invalid hex color length (expected 3 or 6 characters)")]
    InvalidLength,
    /// Character that is not a hexadecimal digit
    #[error("invalid hex character: {0:?}")]
    InvalidCharacter(char),
    /// Hexadecimal component out of range
    #[error("invalid hex component: {0}")]
    InvalidHex(#[from] ParseIntError),
}

/// Error type for palette validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PaletteError {
    /// No colors provided in palette
    #[error("palette cannot be empty")]
    EmptyPalette,
    /// Duplicate color found at the specified index
    #[error("duplicate color found at index {index}")]
    DuplicateColor {
        /// Index where the duplicate was found
        index: usize,
    },
    /// Invalid hex color string
    #[error("invalid color: {0}")]
    ParseColor(#[from] ParseColorError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_error_messages() {
        assert_eq!(
            PaletteError::DuplicateColor { index: 3 }.to_string(),
            "duplicate color found at index 3"
        );
        let parse: PaletteError = ParseColorError::InvalidLength.into();
        assert_eq!(
            parse.to_string(),
            "invalid color: invalid hex color length (expected 3 or 6 characters)"
        );
    }
}
