//! Ordered palette with nearest-color matching.
//!
//! A palette is produced by clustering, by extracting the distinct colors
//! of a reference image, or supplied by a caller. It is always non-empty
//! and never holds the same color twice.

use std::collections::HashSet;
use std::str::FromStr;

use super::error::PaletteError;
use crate::color::Color;
use crate::image::Image;

/// An ordered sequence of distinct colors.
///
/// # Example
///
/// ```
/// use pixel_reduce::{Color, Palette};
///
/// let palette = Palette::new(&[Color::new(0, 0, 0), Color::new(255, 255, 255)]).unwrap();
/// assert_eq!(palette.len(), 2);
/// assert_eq!(palette.nearest(Color::new(200, 200, 200)), Color::new(255, 255, 255));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// Create a palette from colors in the given order.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `colors` is empty ([`PaletteError::EmptyPalette`])
    /// - a color appears twice ([`PaletteError::DuplicateColor`])
    pub fn new(colors: &[Color]) -> Result<Self, PaletteError> {
        if colors.is_empty() {
            return Err(PaletteError::EmptyPalette);
        }

        let mut seen = HashSet::with_capacity(colors.len());
        for (i, color) in colors.iter().enumerate() {
            if !seen.insert(*color) {
                return Err(PaletteError::DuplicateColor { index: i });
            }
        }

        Ok(Self {
            colors: colors.to_vec(),
        })
    }

    /// Create a palette from hex strings like `"#FF0000"` or `"F00"`.
    ///
    /// # Errors
    ///
    /// Returns [`PaletteError::ParseColor`] if any hex string is invalid,
    /// or other [`PaletteError`] variants for validation failures.
    pub fn from_hex(colors: &[&str]) -> Result<Self, PaletteError> {
        let parsed = colors
            .iter()
            .map(|s| Color::from_str(s).map_err(PaletteError::ParseColor))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(&parsed)
    }

    /// Create a palette from the distinct colors of an image, in row-major
    /// order of first occurrence. Images are never empty, so this cannot fail.
    pub fn from_image(image: &Image) -> Self {
        let mut seen = HashSet::new();
        let colors = image
            .pixels()
            .iter()
            .copied()
            .filter(|c| seen.insert(*c))
            .collect();
        Self { colors }
    }

    /// Wrap colors already known to be distinct and non-empty.
    pub(crate) fn from_distinct(colors: Vec<Color>) -> Self {
        debug_assert!(!colors.is_empty(), "palette must not be empty");
        debug_assert_eq!(
            colors.iter().collect::<HashSet<_>>().len(),
            colors.len(),
            "palette colors must be distinct"
        );
        Self { colors }
    }

    /// Returns the number of colors in the palette.
    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always `false`; empty palettes are rejected at construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color at the given index.
    #[inline]
    pub fn get(&self, idx: usize) -> Color {
        self.colors[idx]
    }

    /// All colors in palette order.
    #[inline]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Returns true if the palette holds exactly this color.
    pub fn contains(&self, color: Color) -> bool {
        self.colors.contains(&color)
    }

    /// Find the palette entry closest to `color` in RGB space.
    ///
    /// Returns `(index, squared distance)`. Ties go to the lowest index.
    #[inline]
    pub fn find_nearest(&self, color: Color) -> (usize, u32) {
        let mut best_idx = 0;
        let mut best_dist = u32::MAX;
        for (i, &entry) in self.colors.iter().enumerate() {
            let dist = color.distance_squared(entry);
            if dist < best_dist {
                best_dist = dist;
                best_idx = i;
                if dist == 0 {
                    break;
                }
            }
        }
        (best_idx, best_dist)
    }

    /// Find the palette entry closest to an unclamped floating point color.
    ///
    /// Used by ordered dithering, where the perturbed value may leave the
    /// 0..=255 range. Ties go to the lowest index.
    #[inline]
    pub fn find_nearest_f64(&self, rgb: [f64; 3]) -> usize {
        let mut best_idx = 0;
        let mut best_dist = f64::MAX;
        for (i, entry) in self.colors.iter().enumerate() {
            let [r, g, b] = entry.to_f64();
            let dr = rgb[0] - r;
            let dg = rgb[1] - g;
            let db = rgb[2] - b;
            let dist = dr * dr + dg * dg + db * db;
            if dist < best_dist {
                best_dist = dist;
                best_idx = i;
            }
        }
        best_idx
    }

    /// The palette color closest to `color`.
    #[inline]
    pub fn nearest(&self, color: Color) -> Color {
        self.colors[self.find_nearest(color).0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_basic_construction() {
        let colors = [
            Color::new(0, 0, 0),
            Color::new(255, 255, 255),
            Color::new(255, 0, 0),
        ];
        let palette = Palette::new(&colors).unwrap();
        assert_eq!(palette.len(), 3);
        assert!(!palette.is_empty());
        assert_eq!(palette.get(2), Color::new(255, 0, 0));
    }

    #[test]
    fn test_palette_empty_error() {
        assert!(matches!(Palette::new(&[]), Err(PaletteError::EmptyPalette)));
    }

    #[test]
    fn test_palette_duplicate_error() {
        let colors = [
            Color::new(255, 0, 0),
            Color::new(0, 255, 0),
            Color::new(255, 0, 0),
        ];
        assert!(matches!(
            Palette::new(&colors),
            Err(PaletteError::DuplicateColor { index: 2 })
        ));
    }

    #[test]
    fn test_from_hex() {
        let palette = Palette::from_hex(&["#000", "#FFFFFF", "f00"]).unwrap();
        assert_eq!(
            palette.colors(),
            &[
                Color::new(0, 0, 0),
                Color::new(255, 255, 255),
                Color::new(255, 0, 0)
            ]
        );
        assert!(matches!(
            Palette::from_hex(&["#ZZZZZZ"]),
            Err(PaletteError::ParseColor(_))
        ));
    }

    #[test]
    fn test_from_image_first_occurrence_order() {
        let pixels = vec![
            Color::new(9, 9, 9),
            Color::new(1, 1, 1),
            Color::new(9, 9, 9),
            Color::new(5, 5, 5),
        ];
        let image = Image::new(2, 2, pixels).unwrap();
        let palette = Palette::from_image(&image);
        assert_eq!(
            palette.colors(),
            &[Color::new(9, 9, 9), Color::new(1, 1, 1), Color::new(5, 5, 5)]
        );
    }

    #[test]
    fn test_find_nearest_exact_and_ties() {
        let palette = Palette::new(&[Color::new(0, 0, 0), Color::new(20, 0, 0)]).unwrap();
        assert_eq!(palette.find_nearest(Color::new(20, 0, 0)), (1, 0));
        // Equidistant: lowest index wins
        assert_eq!(palette.find_nearest(Color::new(10, 0, 0)).0, 0);
        assert_eq!(palette.find_nearest_f64([10.0, 0.0, 0.0]), 0);
        assert_eq!(palette.find_nearest_f64([300.0, 0.0, 0.0]), 1);
    }

    #[test]
    fn test_nearest_greys() {
        let palette = Palette::new(&[Color::new(0, 0, 0), Color::new(255, 255, 255)]).unwrap();
        assert_eq!(palette.nearest(Color::new(64, 64, 64)), Color::new(0, 0, 0));
        assert_eq!(
            palette.nearest(Color::new(192, 192, 192)),
            Color::new(255, 255, 255)
        );
    }
}
