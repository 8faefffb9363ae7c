//! Palette size selection by the elbow of the distortion curve.

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::cluster::{ColorClusterer, ColorHistogram};
use crate::error::{ReduceError, Result};
use crate::image::Image;

/// Quantization error per color count, `k = 1..=max_k`.
///
/// Values are non-increasing: a `k`-color palette is never scored worse
/// than the best palette with fewer colors.
#[derive(Debug, Clone, PartialEq)]
pub struct DistortionCurve {
    samples: Vec<(usize, f64)>,
}

impl DistortionCurve {
    /// `(k, distortion)` pairs in increasing `k`.
    pub fn samples(&self) -> &[(usize, f64)] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Relative change between consecutive samples. A zero distortion is
    /// followed by a rate of zero.
    pub fn rates_of_change(&self) -> Vec<f64> {
        self.samples
            .windows(2)
            .map(|w| {
                let (current, next) = (w[0].1, w[1].1);
                if current == 0.0 {
                    0.0
                } else {
                    (next - current) / current
                }
            })
            .collect()
    }

    /// Color count at the elbow, offset by two. Curves with fewer than two
    /// samples give 2.
    pub fn elbow(&self) -> usize {
        if self.samples.len() < 2 {
            return 2;
        }
        let mut best = 0;
        let mut best_rate = f64::NEG_INFINITY;
        for (i, rate) in self.rates_of_change().into_iter().enumerate() {
            if rate.abs() > best_rate {
                best_rate = rate.abs();
                best = i;
            }
        }
        best + 1 + 2
    }
}

/// Chooses a palette size for an image.
///
/// # Example
///
/// ```
/// use pixel_reduce::{Color, Image, PaletteSizer};
///
/// let pixels = (0..64u8).map(|i| Color::new(i * 4, 0, 0)).collect();
/// let image = Image::new(8, 8, pixels).unwrap();
/// let k = PaletteSizer::new().best_color_count(&image, 8).unwrap();
/// assert!(k >= 2);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PaletteSizer {
    clusterer: ColorClusterer,
}

impl PaletteSizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clusterer(clusterer: ColorClusterer) -> Self {
        Self { clusterer }
    }

    /// Best color count for `image`, searching `k = 1..=max_k`.
    ///
    /// # Errors
    ///
    /// Returns [`ReduceError::InvalidArgument`] if `max_k < 2`.
    pub fn best_color_count(&self, image: &Image, max_k: usize) -> Result<usize> {
        self.best_color_count_with_progress(image, max_k, |_, _| {})
    }

    /// Like [`best_color_count`](Self::best_color_count), calling
    /// `progress(done, total)` after each sample completes. Samples run in
    /// parallel, so `done` counts completions rather than `k`.
    pub fn best_color_count_with_progress<F>(
        &self,
        image: &Image,
        max_k: usize,
        progress: F,
    ) -> Result<usize>
    where
        F: Fn(usize, usize) + Sync,
    {
        let curve = self.distortion_curve_with_progress(image, max_k, progress)?;
        let best = curve.elbow();
        tracing::debug!(max_k, best, "Selected palette size");
        Ok(best)
    }

    /// Distortion for each `k = 1..=max_k`.
    pub fn distortion_curve(&self, image: &Image, max_k: usize) -> Result<DistortionCurve> {
        self.distortion_curve_with_progress(image, max_k, |_, _| {})
    }

    fn distortion_curve_with_progress<F>(
        &self,
        image: &Image,
        max_k: usize,
        progress: F,
    ) -> Result<DistortionCurve>
    where
        F: Fn(usize, usize) + Sync,
    {
        if max_k < 2 {
            return Err(ReduceError::InvalidArgument(format!(
                "max_k must be at least 2, got {max_k}"
            )));
        }

        // Scoring only depends on distinct colors and their counts.
        let histogram = ColorHistogram::from_colors(image.pixels());
        let weighted = histogram.entries();

        let done = AtomicUsize::new(0);
        let raw = (1..=max_k)
            .into_par_iter()
            .map(|k| {
                let clustering = self.clusterer.cluster(image.pixels(), k)?;
                let reps = clustering.representatives();
                let distortion: f64 = weighted
                    .iter()
                    .map(|&(color, count)| {
                        let nearest = reps
                            .iter()
                            .map(|&r| color.distance_squared(r))
                            .min()
                            .unwrap_or(0);
                        nearest as f64 * count as f64
                    })
                    .sum();
                progress(done.fetch_add(1, Ordering::Relaxed) + 1, max_k);
                Ok((k, distortion))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut floor = f64::INFINITY;
        let samples = raw
            .into_iter()
            .map(|(k, d)| {
                floor = floor.min(d);
                (k, floor)
            })
            .collect();

        Ok(DistortionCurve { samples })
    }
}
