//! Speckle removal by local clustering.
//!
//! Every pixel looks at its 3x3 neighborhood, quantizes it to a handful of
//! colors, and keeps its own quantized color only when enough neighbors
//! share it. Isolated pixels give way to the dominant local color while
//! edges and flat areas, which always have support, pass through.

use rayon::prelude::*;

use crate::cluster::{mode_color, ColorClusterer};
use crate::color::Color;
use crate::error::{ReduceError, Result};
use crate::image::Image;

/// Neighborhood denoiser.
///
/// # Example
///
/// ```
/// use pixel_reduce::{Color, Denoiser, Image};
///
/// let bg = Color::new(0, 0, 0);
/// let mut pixels = vec![bg; 25];
/// pixels[12] = Color::new(255, 255, 255);
/// let image = Image::new(5, 5, pixels).unwrap();
///
/// let clean = Denoiser::new(5.0, 4.0).unwrap().denoise(&image).unwrap();
/// assert!(clean.pixels().iter().all(|&c| c == bg));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Denoiser {
    smoothing: f64,
    strength: f64,
    clusterer: ColorClusterer,
}

impl Denoiser {
    /// Create a denoiser.
    ///
    /// `smoothing` (0 to 10) sets how much neighborhood support a pixel's
    /// color needs to survive. `strength` sets how coarsely each
    /// neighborhood is quantized: larger values mean fewer clusters.
    ///
    /// # Errors
    ///
    /// Returns [`ReduceError::InvalidArgument`] if `smoothing` is outside
    /// `[0, 10]` or `strength` is not a positive finite number.
    pub fn new(smoothing: f64, strength: f64) -> Result<Self> {
        if !(0.0..=10.0).contains(&smoothing) {
            return Err(ReduceError::InvalidArgument(format!(
                "smoothing must be within 0..=10, got {smoothing}"
            )));
        }
        if !(strength.is_finite() && strength > 0.0) {
            return Err(ReduceError::InvalidArgument(format!(
                "denoise strength must be positive, got {strength}"
            )));
        }
        Ok(Self {
            smoothing,
            strength,
            clusterer: ColorClusterer::new(),
        })
    }

    pub fn with_clusterer(mut self, clusterer: ColorClusterer) -> Self {
        self.clusterer = clusterer;
        self
    }

    pub fn smoothing(&self) -> f64 {
        self.smoothing
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }

    /// Denoise `image`. The output has the same size and alpha.
    pub fn denoise(&self, image: &Image) -> Result<Image> {
        let (width, height) = (image.width(), image.height());

        let pixels = (0..width * height)
            .into_par_iter()
            .map(|i| self.denoise_pixel(image, i % width, i / width))
            .collect::<Result<Vec<_>>>()?;

        Ok(image.with_pixels(pixels))
    }

    fn denoise_pixel(&self, image: &Image, x: usize, y: usize) -> Result<Color> {
        let x0 = x.saturating_sub(1);
        let y0 = y.saturating_sub(1);
        let x1 = (x + 2).min(image.width());
        let y1 = (y + 2).min(image.height());

        let neighborhood = image.region(x0, y0, x1, y1);
        let area = neighborhood.len();
        let center = (y - y0) * (x1 - x0) + (x - x0);

        let centroids = ((area as f64 / self.strength).round_ties_even() as usize)
            .max(2)
            .min(area);
        let clustering = self.clusterer.cluster(&neighborhood, centroids)?;

        let label = clustering.assignment()[center];
        let support = clustering
            .assignment()
            .iter()
            .filter(|&&other| other == label)
            .count();
        let threshold = 1 + (area as f64 * 0.8 * self.smoothing / 10.0).round_ties_even() as usize;

        if support < threshold {
            mode_color(&clustering.assigned_colors())
        } else {
            Ok(clustering.representative_of(center))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_validation() {
        assert!(Denoiser::new(-0.1, 1.0).is_err());
        assert!(Denoiser::new(10.5, 1.0).is_err());
        assert!(Denoiser::new(5.0, 0.0).is_err());
        assert!(Denoiser::new(5.0, f64::INFINITY).is_err());
        assert!(Denoiser::new(0.0, 0.5).is_ok());
    }

    #[test]
    fn test_flat_image_unchanged() {
        let image = Image::filled(6, 4, Color::new(12, 200, 99)).unwrap();
        for (smoothing, strength) in [(0.0, 0.1), (5.0, 4.0), (10.0, 100.0)] {
            let out = Denoiser::new(smoothing, strength)
                .unwrap()
                .denoise(&image)
                .unwrap();
            assert_eq!(out, image);
        }
    }

    #[test]
    fn test_edge_between_halves_preserved() {
        let left = Color::new(0, 0, 0);
        let right = Color::new(250, 250, 250);
        let pixels = (0..36).map(|i| if i % 6 < 3 { left } else { right }).collect();
        let image = Image::new(6, 6, pixels).unwrap();
        let out = Denoiser::new(5.0, 4.0).unwrap().denoise(&image).unwrap();
        assert_eq!(out, image);
    }

    #[test]
    fn test_zero_smoothing_keeps_speckle() {
        let bg = Color::new(0, 0, 0);
        let mut pixels = vec![bg; 9];
        pixels[4] = Color::new(255, 0, 0);
        let image = Image::new(3, 3, pixels).unwrap();
        // threshold is 1, so every pixel supports itself
        let out = Denoiser::new(0.0, 1.0).unwrap().denoise(&image).unwrap();
        assert_eq!(out, image);
    }

    #[test]
    fn test_alpha_preserved() {
        let image = Image::filled(2, 2, Color::new(5, 5, 5))
            .unwrap()
            .with_alpha(vec![0, 64, 128, 255])
            .unwrap();
        let out = Denoiser::new(5.0, 4.0).unwrap().denoise(&image).unwrap();
        assert_eq!(out.alpha(), Some(&[0u8, 64, 128, 255][..]));
    }
}
