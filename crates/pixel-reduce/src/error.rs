//! Unified error type for the pixel-reduce public API.
//!
//! [`ReduceError`] covers every failure a pipeline stage can report, so
//! callers can chain stages with `?`.

use thiserror::Error;

use crate::grid::Axis;
use crate::palette::PaletteError;

/// Error returned by every fallible operation in the crate.
///
/// # Example
///
/// ```
/// use pixel_reduce::{ColorClusterer, ReduceError};
///
/// let result = ColorClusterer::new().cluster(&[], 2);
/// assert!(matches!(result, Err(ReduceError::InvalidArgument(_))));
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReduceError {
    /// A parameter was outside its valid range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Grid detection found too few peaks on an axis to measure a spacing.
    #[error("insufficient signal: found {peaks} peak(s) on the {axis} axis, need at least 2")]
    InsufficientSignal {
        /// The axis that lacked peaks
        axis: Axis,
        /// Number of peaks that were found
        peaks: usize,
    },

    /// Palette validation error (empty, duplicate, or parse error).
    #[error("palette error: {0}")]
    Palette(#[from] PaletteError),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ReduceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let error = ReduceError::InvalidArgument("k must be at least 1".to_string());
        assert_eq!(error.to_string(), "invalid argument: k must be at least 1");

        let error = ReduceError::InsufficientSignal {
            axis: Axis::Vertical,
            peaks: 1,
        };
        assert_eq!(
            error.to_string(),
            "insufficient signal: found 1 peak(s) on the vertical axis, need at least 2"
        );
    }

    #[test]
    fn test_from_palette_error() {
        let error: ReduceError = PaletteError::EmptyPalette.into();
        assert_eq!(error.to_string(), "palette error: palette cannot be empty");
    }
}
