//! Majority-color downscaling.
//!
//! Each output pixel covers a proportional tile of the source. The tile is
//! clustered into a few representative colors and the most common one
//! wins, so hard edges stay hard instead of being averaged away.

use rayon::prelude::*;

use crate::cluster::{mode_color, ColorClusterer};
use crate::error::{ReduceError, Result};
use crate::image::Image;

/// Downscales an image by majority representative color per tile.
///
/// # Example
///
/// ```
/// use pixel_reduce::{CentroidDownscaler, Color, Image};
///
/// let image = Image::filled(8, 8, Color::new(40, 90, 200)).unwrap();
/// let small = CentroidDownscaler::new().downscale(&image, 2, 2, 2).unwrap();
/// assert_eq!((small.width(), small.height()), (2, 2));
/// assert!(small.pixels().iter().all(|&c| c == Color::new(40, 90, 200)));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CentroidDownscaler {
    clusterer: ColorClusterer,
}

impl CentroidDownscaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific clusterer for the per-tile quantization.
    pub fn with_clusterer(clusterer: ColorClusterer) -> Self {
        Self { clusterer }
    }

    /// Downscale `image` to `target_width x target_height`.
    ///
    /// Tile bounds follow image-crop semantics: output column `x` covers
    /// source columns `round(x * w / tw) .. round((x + 1) * w / tw)`,
    /// rounding half to even, and never less than one pixel. Alpha is not
    /// carried into the output.
    ///
    /// # Errors
    ///
    /// Returns [`ReduceError::InvalidArgument`] if a target dimension is
    /// zero or `centroids == 0`.
    pub fn downscale(
        &self,
        image: &Image,
        target_width: usize,
        target_height: usize,
        centroids: usize,
    ) -> Result<Image> {
        if target_width == 0 || target_height == 0 {
            return Err(ReduceError::InvalidArgument(format!(
                "target dimensions must be positive, got {target_width}x{target_height}"
            )));
        }
        if centroids == 0 {
            return Err(ReduceError::InvalidArgument(
                "centroid count must be at least 1".to_string(),
            ));
        }

        let columns = tile_bounds(image.width(), target_width);
        let rows = tile_bounds(image.height(), target_height);

        let pixels = (0..target_width * target_height)
            .into_par_iter()
            .map(|i| {
                let (x0, x1) = columns[i % target_width];
                let (y0, y1) = rows[i / target_width];
                let tile = image.region(x0, y0, x1, y1);
                let clustering = self.clusterer.cluster(&tile, centroids)?;
                mode_color(&clustering.assigned_colors())
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            from_width = image.width(),
            from_height = image.height(),
            target_width,
            target_height,
            "Downscaled image"
        );

        Image::new(target_width, target_height, pixels)
    }
}

/// Source ranges `[start, end)` for each of `target` output cells along an
/// axis of `source` pixels.
fn tile_bounds(source: usize, target: usize) -> Vec<(usize, usize)> {
    let factor = source as f64 / target as f64;
    (0..target)
        .map(|i| {
            let start = ((i as f64 * factor).round_ties_even() as usize).min(source - 1);
            let end = ((((i + 1) as f64) * factor).round_ties_even() as usize)
                .max(start + 1)
                .min(source);
            (start, end)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn test_invalid_arguments() {
        let image = Image::filled(4, 4, Color::default()).unwrap();
        let downscaler = CentroidDownscaler::new();
        assert!(downscaler.downscale(&image, 0, 2, 2).is_err());
        assert!(downscaler.downscale(&image, 2, 0, 2).is_err());
        assert!(downscaler.downscale(&image, 2, 2, 0).is_err());
    }

    #[test]
    fn test_tile_bounds_exact_and_fractional() {
        assert_eq!(tile_bounds(8, 4), vec![(0, 2), (2, 4), (4, 6), (6, 8)]);
        // factor 2.5: 0, 2.5 -> 2, 5, 7.5 -> 8, 10
        assert_eq!(tile_bounds(10, 4), vec![(0, 2), (2, 5), (5, 8), (8, 10)]);
        // upscaling repeats source pixels
        assert_eq!(tile_bounds(2, 4), vec![(0, 1), (0, 1), (1, 2), (1, 2)]);
    }

    #[test]
    fn test_majority_wins_in_tile() {
        let bg = Color::new(0, 0, 0);
        let dot = Color::new(255, 255, 255);
        // 3x3 tile with a single bright pixel in the middle
        let mut pixels = vec![bg; 9];
        pixels[4] = dot;
        let image = Image::new(3, 3, pixels).unwrap();
        let out = CentroidDownscaler::new().downscale(&image, 1, 1, 2).unwrap();
        assert_eq!(out.pixels(), &[bg]);
    }

    #[test]
    fn test_shape_for_many_targets() {
        let pixels = (0..35u8).map(|i| Color::new(i * 7, i, 255 - i)).collect();
        let image = Image::new(7, 5, pixels).unwrap();
        let downscaler = CentroidDownscaler::new();
        for (w, h) in [(1, 1), (3, 2), (7, 5), (10, 9)] {
            let out = downscaler.downscale(&image, w, h, 2).unwrap();
            assert_eq!((out.width(), out.height()), (w, h));
        }
    }

    #[test]
    fn test_same_size_is_identity() {
        let pixels = (0..12u8).map(|i| Color::new(i * 20, 3, i)).collect();
        let image = Image::new(4, 3, pixels).unwrap();
        let out = CentroidDownscaler::new().downscale(&image, 4, 3, 3).unwrap();
        assert_eq!(out, image);
    }

    #[test]
    fn test_alpha_is_dropped() {
        let image = Image::filled(2, 2, Color::new(1, 2, 3))
            .unwrap()
            .with_alpha(vec![0, 255, 255, 0])
            .unwrap();
        let out = CentroidDownscaler::new().downscale(&image, 1, 1, 1).unwrap();
        assert!(out.alpha().is_none());
    }
}
