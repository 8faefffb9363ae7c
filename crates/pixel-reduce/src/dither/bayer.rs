//! Bayer threshold matrices and the ordered dither pass.

use rayon::prelude::*;

use crate::error::{ReduceError, Result};
use crate::image::Image;
use crate::palette::Palette;

/// Normalized Bayer threshold matrix.
///
/// Entry `(x, y)` is `(1 + I(x, y)) / (1 + n²)` where `I` is the classic
/// recursive Bayer index matrix of side `n`, so every value lies strictly
/// between 0 and 1.
#[derive(Debug, Clone, PartialEq)]
pub struct BayerMatrix {
    order: usize,
    values: Vec<f64>,
}

impl BayerMatrix {
    /// Build the matrix of side `order`.
    ///
    /// # Errors
    ///
    /// Returns [`ReduceError::InvalidArgument`] unless `order` is a power of
    /// two and at least 2.
    pub fn new(order: usize) -> Result<Self> {
        if order < 2 || !order.is_power_of_two() {
            return Err(ReduceError::InvalidArgument(format!(
                "dither order must be a power of two of at least 2, got {order}"
            )));
        }

        let bits = order.trailing_zeros();
        let scale = 1.0 + (order * order) as f64;
        let mut values = Vec::with_capacity(order * order);
        for y in 0..order {
            for x in 0..order {
                values.push((1 + bayer_index(x, y, bits)) as f64 / scale);
            }
        }

        Ok(Self { order, values })
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Threshold for image coordinate `(x, y)`; the matrix tiles the plane.
    #[inline]
    pub fn value(&self, x: usize, y: usize) -> f64 {
        self.values[(y % self.order) * self.order + (x % self.order)]
    }
}

/// Recursive Bayer index built by bit interleaving. The lowest coordinate
/// bits select the coarsest quadrant and end up most significant.
fn bayer_index(x: usize, y: usize, bits: u32) -> usize {
    let mut v = 0;
    for bit in 0..bits {
        let xb = (x >> bit) & 1;
        let yb = (y >> bit) & 1;
        v = (v << 2) | (((xb ^ yb) << 1) | yb);
    }
    v
}

/// Ordered dithering against a palette.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedDither {
    matrix: BayerMatrix,
    threshold: f64,
}

impl OrderedDither {
    /// Create an ordered ditherer. The per-channel offset range is
    /// `4 * strength`.
    ///
    /// # Errors
    ///
    /// Returns [`ReduceError::InvalidArgument`] for an invalid `order` (see
    /// [`BayerMatrix::new`]) or a negative or non-finite `strength`.
    pub fn new(order: usize, strength: f64) -> Result<Self> {
        if !(strength.is_finite() && strength >= 0.0) {
            return Err(ReduceError::InvalidArgument(format!(
                "dither strength must be a non-negative number, got {strength}"
            )));
        }
        Ok(Self {
            matrix: BayerMatrix::new(order)?,
            threshold: 4.0 * strength,
        })
    }

    /// Palette index for every pixel of `image`, row-major.
    pub fn dither(&self, image: &Image, palette: &Palette) -> Vec<u32> {
        let width = image.width();
        image
            .pixels()
            .par_iter()
            .enumerate()
            .map(|(i, color)| {
                let offset = self.matrix.value(i % width, i / width) * self.threshold;
                let [r, g, b] = color.to_f64();
                palette.find_nearest_f64([r + offset, g + offset, b + offset]) as u32
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn indices(order: usize) -> Vec<usize> {
        let bits = order.trailing_zeros();
        (0..order * order)
            .map(|i| bayer_index(i % order, i / order, bits))
            .collect()
    }

    #[test]
    fn test_classic_matrices() {
        assert_eq!(indices(2), vec![0, 2, 3, 1]);
        assert_eq!(
            indices(4),
            vec![0, 8, 2, 10, 12, 4, 14, 6, 3, 11, 1, 9, 15, 7, 13, 5]
        );
    }

    #[test]
    fn test_indices_are_a_permutation() {
        let mut idx = indices(8);
        idx.sort_unstable();
        assert_eq!(idx, (0..64).collect::<Vec<_>>());
    }

    #[test]
    fn test_normalized_values() {
        let m = BayerMatrix::new(2).unwrap();
        assert_eq!(m.value(0, 0), 0.2);
        assert_eq!(m.value(1, 0), 0.6);
        assert_eq!(m.value(0, 1), 0.8);
        assert_eq!(m.value(1, 1), 0.4);
        // tiles
        assert_eq!(m.value(2, 3), m.value(0, 1));
    }

    #[test]
    fn test_invalid_orders() {
        for order in [0, 1, 3, 6, 12] {
            assert!(BayerMatrix::new(order).is_err(), "order {order}");
        }
        assert!(OrderedDither::new(4, -1.0).is_err());
        assert!(OrderedDither::new(4, f64::NAN).is_err());
    }

    #[test]
    fn test_zero_strength_is_nearest_color() {
        let palette = Palette::new(&[Color::new(0, 0, 0), Color::new(255, 255, 255)]).unwrap();
        let pixels = vec![
            Color::new(10, 10, 10),
            Color::new(200, 200, 200),
            Color::new(120, 120, 120),
            Color::new(140, 140, 140),
        ];
        let image = Image::new(2, 2, pixels).unwrap();
        let out = OrderedDither::new(4, 0.0).unwrap().dither(&image, &palette);
        assert_eq!(out, vec![0, 1, 0, 1]);
    }

    #[test]
    fn test_midtone_produces_pattern() {
        let palette = Palette::new(&[Color::new(0, 0, 0), Color::new(255, 255, 255)]).unwrap();
        let image = Image::filled(2, 2, Color::new(100, 100, 100)).unwrap();
        // offsets are 0.2, 0.6, 0.8, 0.4 times 100
        let out = OrderedDither::new(2, 25.0).unwrap().dither(&image, &palette);
        assert_eq!(out, vec![0, 1, 1, 1]);
    }
}
