//! Per-channel gamma lookup table.
//!
//! Ordered dithering only ever pushes channel values upward, so the mapper
//! darkens the source first. The darkening curve is a plain power law
//! evaluated once into a 256-entry table and applied per channel.

use crate::color::Color;
use crate::error::{ReduceError, Result};
use crate::image::Image;

/// A 256-entry lookup table applying the same tone curve to R, G and B.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GammaLut {
    table: [u8; 256],
}

impl GammaLut {
    /// Build the table for a gamma value.
    ///
    /// Each entry is `255 * (i / 255)^(1 / gamma)`, rescaled to 16 bits and
    /// truncated back to 8. Gamma values below 1 darken, above 1 brighten.
    ///
    /// # Errors
    ///
    /// Returns [`ReduceError::InvalidArgument`] if `gamma` is not a finite
    /// positive number.
    pub fn new(gamma: f64) -> Result<Self> {
        if !gamma.is_finite() || gamma <= 0.0 {
            return Err(ReduceError::InvalidArgument(format!(
                "gamma must be a finite positive number, got {gamma}"
            )));
        }

        let exponent = 1.0 / gamma;
        let mut table = [0u8; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            let mapped = 255.0 * (i as f64 / 255.0).powf(exponent);
            // 65535 / 255 == 257; the epsilon keeps exact products from
            // landing one below their integer value.
            let wide = (mapped * 257.0 + 1e-9).floor().clamp(0.0, 65535.0) as u32;
            *entry = (wide >> 8) as u8;
        }

        Ok(Self { table })
    }

    /// The identity table.
    pub fn identity() -> Self {
        let mut table = [0u8; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            *entry = i as u8;
        }
        Self { table }
    }

    /// Build the darkening table used before ordered dithering.
    ///
    /// The gamma value is `1 - coefficient * strength`, so the effective
    /// exponent is `1 / (1 - coefficient * strength)`.
    ///
    /// # Errors
    ///
    /// Returns [`ReduceError::InvalidArgument`] if `strength` is negative or
    /// large enough that the gamma value is no longer positive.
    pub fn for_dither_strength(coefficient: f64, strength: f64) -> Result<Self> {
        if !strength.is_finite() || strength < 0.0 {
            return Err(ReduceError::InvalidArgument(format!(
                "dither strength must be a finite non-negative number, got {strength}"
            )));
        }
        let gamma = 1.0 - coefficient * strength;
        if gamma <= 0.0 {
            return Err(ReduceError::InvalidArgument(format!(
                "dither strength {strength} is too large (must be below {})",
                1.0 / coefficient
            )));
        }
        Self::new(gamma)
    }

    /// Look up a single channel value.
    #[inline]
    pub fn map_channel(&self, value: u8) -> u8 {
        self.table[value as usize]
    }

    /// Apply the table to every channel of a color.
    #[inline]
    pub fn apply(&self, color: Color) -> Color {
        Color::new(
            self.map_channel(color.r),
            self.map_channel(color.g),
            self.map_channel(color.b),
        )
    }

    /// Apply the table to every pixel, keeping dimensions and alpha.
    pub fn apply_image(&self, image: &Image) -> Image {
        image.map_pixels(|c| self.apply(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_gamma_is_identity() {
        let lut = GammaLut::new(1.0).unwrap();
        assert_eq!(lut, GammaLut::identity());
    }

    #[test]
    fn test_zero_strength_is_identity() {
        let lut = GammaLut::for_dither_strength(0.03, 0.0).unwrap();
        assert_eq!(lut, GammaLut::identity());
    }

    #[test]
    fn test_darkening_keeps_endpoints() {
        let lut = GammaLut::for_dither_strength(0.02, 10.0).unwrap();
        assert_eq!(lut.map_channel(0), 0);
        assert_eq!(lut.map_channel(255), 255);
        for i in 1..255u8 {
            assert!(
                lut.map_channel(i) <= i,
                "Darkening table raised value {i} to {}",
                lut.map_channel(i)
            );
        }
        assert!(lut.map_channel(128) < 128);
    }

    #[test]
    fn test_monotonic() {
        let lut = GammaLut::for_dither_strength(0.03, 5.0).unwrap();
        let mut prev = lut.map_channel(0);
        for i in 1..=255u8 {
            let curr = lut.map_channel(i);
            assert!(curr >= prev, "Gamma table not monotonic at {i}");
            prev = curr;
        }
    }

    #[test]
    fn test_invalid_strength() {
        assert!(GammaLut::for_dither_strength(0.02, -1.0).is_err());
        assert!(GammaLut::for_dither_strength(0.02, 50.0).is_err());
        assert!(GammaLut::for_dither_strength(0.02, f64::NAN).is_err());
        assert!(GammaLut::new(0.0).is_err());
    }

    #[test]
    fn test_apply_image_keeps_alpha() {
        let image = Image::new(2, 1, vec![Color::new(128, 128, 128); 2])
            .unwrap()
            .with_alpha(vec![0, 255])
            .unwrap();
        let lut = GammaLut::for_dither_strength(0.03, 10.0).unwrap();
        let out = lut.apply_image(&image);
        assert_eq!(out.alpha(), Some(&[0u8, 255][..]));
        assert!(out.pixel(0, 0).r < 128);
    }
}
