//! In-memory raster image.
//!
//! [`Image`] is the unit of exchange between pipeline stages: a row-major
//! grid of [`Color`] pixels with an optional alpha plane. Stages never
//! mutate an input image; they build a new one.

use crate::color::Color;
use crate::error::{ReduceError, Result};

/// A row-major RGB image with an optional alpha channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
    alpha: Option<Vec<u8>>,
}

impl Image {
    /// Create an image from row-major pixels.
    ///
    /// # Errors
    ///
    /// Returns [`ReduceError::InvalidArgument`] if either dimension is zero
    /// or `pixels.len() != width * height`.
    pub fn new(width: usize, height: usize, pixels: Vec<Color>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ReduceError::InvalidArgument(format!(
                "image dimensions must be positive, got {width}x{height}"
            )));
        }
        if pixels.len() != width * height {
            return Err(ReduceError::InvalidArgument(format!(
                "pixel count {} does not match {width}x{height}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
            alpha: None,
        })
    }

    /// Create an image filled with a single color.
    pub fn filled(width: usize, height: usize, color: Color) -> Result<Self> {
        Self::new(width, height, vec![color; width * height])
    }

    /// Create an image from packed `[R, G, B, ...]` bytes.
    pub fn from_rgb_bytes(width: usize, height: usize, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != width * height * 3 {
            return Err(ReduceError::InvalidArgument(format!(
                "RGB buffer of {} bytes does not match {width}x{height}",
                bytes.len()
            )));
        }
        let pixels = bytes
            .chunks_exact(3)
            .map(|p| Color::new(p[0], p[1], p[2]))
            .collect();
        Self::new(width, height, pixels)
    }

    /// Create an image from packed `[R, G, B, A, ...]` bytes.
    pub fn from_rgba_bytes(width: usize, height: usize, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != width * height * 4 {
            return Err(ReduceError::InvalidArgument(format!(
                "RGBA buffer of {} bytes does not match {width}x{height}",
                bytes.len()
            )));
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|p| Color::new(p[0], p[1], p[2]))
            .collect();
        let alpha = bytes.chunks_exact(4).map(|p| p[3]).collect();
        Self::new(width, height, pixels)?.with_alpha(alpha)
    }

    /// Attach an alpha plane.
    ///
    /// # Errors
    ///
    /// Returns [`ReduceError::InvalidArgument`] if the plane length does not
    /// match the pixel count.
    pub fn with_alpha(mut self, alpha: Vec<u8>) -> Result<Self> {
        if alpha.len() != self.pixels.len() {
            return Err(ReduceError::InvalidArgument(format!(
                "alpha plane of {} values does not match {} pixels",
                alpha.len(),
                self.pixels.len()
            )));
        }
        self.alpha = Some(alpha);
        Ok(self)
    }

    /// Drop the alpha plane.
    pub fn without_alpha(mut self) -> Self {
        self.alpha = None;
        self
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// All pixels in row-major order.
    #[inline]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// The alpha plane, if the image has one.
    #[inline]
    pub fn alpha(&self) -> Option<&[u8]> {
        self.alpha.as_deref()
    }

    /// Pixel at column `x`, row `y`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the image.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Color {
        self.pixels[y * self.width + x]
    }

    /// Collect the pixels of a rectangle in row-major order.
    ///
    /// The rectangle is `[x0, x1) x [y0, y1)` and must lie within the image.
    pub fn region(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> Vec<Color> {
        debug_assert!(x0 < x1 && x1 <= self.width, "bad column range {x0}..{x1}");
        debug_assert!(y0 < y1 && y1 <= self.height, "bad row range {y0}..{y1}");
        let mut out = Vec::with_capacity((x1 - x0) * (y1 - y0));
        for y in y0..y1 {
            let row = y * self.width;
            out.extend_from_slice(&self.pixels[row + x0..row + x1]);
        }
        out
    }

    /// Build a new image of the same size by mapping every pixel.
    /// Alpha is carried over unchanged.
    pub fn map_pixels(&self, f: impl Fn(Color) -> Color) -> Image {
        Image {
            width: self.width,
            height: self.height,
            pixels: self.pixels.iter().map(|&c| f(c)).collect(),
            alpha: self.alpha.clone(),
        }
    }

    /// Replace the pixels of this image, keeping dimensions and alpha.
    pub(crate) fn with_pixels(&self, pixels: Vec<Color>) -> Image {
        debug_assert_eq!(pixels.len(), self.pixels.len());
        Image {
            width: self.width,
            height: self.height,
            pixels,
            alpha: self.alpha.clone(),
        }
    }

    /// Number of distinct colors in the image.
    pub fn distinct_color_count(&self) -> usize {
        let mut seen = std::collections::HashSet::with_capacity(self.pixels.len().min(4096));
        self.pixels.iter().filter(|c| seen.insert(**c)).count()
    }

    /// Packed `[R, G, B, ...]` bytes.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| c.to_bytes()).collect()
    }

    /// Packed `[R, G, B, A, ...]` bytes; opaque when there is no alpha plane.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for (i, c) in self.pixels.iter().enumerate() {
            let a = self.alpha.as_ref().map_or(255, |alpha| alpha[i]);
            out.extend_from_slice(&[c.r, c.g, c.b, a]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_bad_dimensions() {
        assert!(Image::new(0, 4, vec![]).is_err());
        assert!(Image::new(2, 2, vec![Color::default(); 3]).is_err());
        assert!(Image::new(2, 2, vec![Color::default(); 4]).is_ok());
    }

    #[test]
    fn test_region_row_major() {
        let pixels: Vec<Color> = (0..12).map(|i| Color::new(i, 0, 0)).collect();
        let image = Image::new(4, 3, pixels).unwrap();
        let region = image.region(1, 1, 3, 3);
        let reds: Vec<u8> = region.iter().map(|c| c.r).collect();
        assert_eq!(reds, vec![5, 6, 9, 10]);
    }

    #[test]
    fn test_rgba_bytes_keep_alpha() {
        let bytes = [1, 2, 3, 4, 5, 6, 7, 8];
        let image = Image::from_rgba_bytes(2, 1, &bytes).unwrap();
        assert_eq!(image.pixel(1, 0), Color::new(5, 6, 7));
        assert_eq!(image.alpha(), Some(&[4u8, 8][..]));
        assert_eq!(image.to_rgba_bytes(), bytes.to_vec());
        assert_eq!(image.to_rgb_bytes(), vec![1, 2, 3, 5, 6, 7]);
    }

    #[test]
    fn test_alpha_length_checked() {
        let image = Image::filled(2, 2, Color::default()).unwrap();
        assert!(image.with_alpha(vec![255; 3]).is_err());
    }

    #[test]
    fn test_distinct_color_count() {
        let mut pixels = vec![Color::new(1, 1, 1); 6];
        pixels[2] = Color::new(2, 2, 2);
        pixels[5] = Color::new(3, 3, 3);
        let image = Image::new(3, 2, pixels).unwrap();
        assert_eq!(image.distinct_color_count(), 3);
    }
}
