//! Palette-indexed image.

use crate::color::Color;
use crate::error::{ReduceError, Result};
use crate::image::Image;
use crate::palette::Palette;

/// The result of mapping an image to a palette.
///
/// Stores one palette index per pixel in row-major order. Every pixel is,
/// by construction, an exact palette color.
///
/// # Example
///
/// ```
/// use pixel_reduce::{Color, Palette, ReducedImage};
///
/// let palette = Palette::new(&[Color::new(0, 0, 0), Color::new(255, 255, 255)]).unwrap();
/// let image = ReducedImage::new(vec![0, 1, 1, 0], 2, 2, palette).unwrap();
///
/// assert_eq!(image.color_at(1, 0), Color::new(255, 255, 255));
/// assert_eq!(image.to_rgb_bytes().len(), 2 * 2 * 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReducedImage {
    indices: Vec<u32>,
    width: usize,
    height: usize,
    palette: Palette,
    alpha: Option<Vec<u8>>,
}

impl ReducedImage {
    /// Create a reduced image from palette indices.
    ///
    /// # Errors
    ///
    /// Returns [`ReduceError::InvalidArgument`] if the index count does not
    /// match the dimensions or an index is outside the palette.
    pub fn new(indices: Vec<u32>, width: usize, height: usize, palette: Palette) -> Result<Self> {
        if width == 0 || height == 0 || indices.len() != width * height {
            return Err(ReduceError::InvalidArgument(format!(
                "{} indices do not fill a {width}x{height} image",
                indices.len()
            )));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= palette.len()) {
            return Err(ReduceError::InvalidArgument(format!(
                "palette index {bad} out of range for {} colors",
                palette.len()
            )));
        }
        Ok(Self {
            indices,
            width,
            height,
            palette,
            alpha: None,
        })
    }

    /// Attach an alpha plane, one value per pixel.
    ///
    /// # Errors
    ///
    /// Returns [`ReduceError::InvalidArgument`] on a length mismatch.
    pub fn with_alpha(mut self, alpha: Option<Vec<u8>>) -> Result<Self> {
        if let Some(alpha) = &alpha {
            if alpha.len() != self.indices.len() {
                return Err(ReduceError::InvalidArgument(format!(
                    "alpha plane has {} values for {} pixels",
                    alpha.len(),
                    self.indices.len()
                )));
            }
        }
        self.alpha = alpha;
        Ok(self)
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    #[inline]
    pub fn alpha(&self) -> Option<&[u8]> {
        self.alpha.as_deref()
    }

    /// Palette color of the pixel at `(x, y)`.
    #[inline]
    pub fn color_at(&self, x: usize, y: usize) -> Color {
        self.palette.get(self.indices[y * self.width + x] as usize)
    }

    /// Expand to an [`Image`], alpha included.
    pub fn to_image(&self) -> Result<Image> {
        let pixels = self
            .indices
            .iter()
            .map(|&i| self.palette.get(i as usize))
            .collect();
        let image = Image::new(self.width, self.height, pixels)?;
        match &self.alpha {
            Some(alpha) => image.with_alpha(alpha.clone()),
            None => Ok(image),
        }
    }

    /// Packed `[R, G, B, ...]` bytes.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.indices.len() * 3);
        for &i in &self.indices {
            rgb.extend_from_slice(&self.palette.get(i as usize).to_bytes());
        }
        rgb
    }

    /// Indices narrowed to bytes, when the palette fits an indexed PNG.
    pub fn to_u8_indices(&self) -> Option<Vec<u8>> {
        if self.palette.len() > 256 {
            return None;
        }
        Some(self.indices.iter().map(|&i| i as u8).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bw() -> Palette {
        Palette::new(&[Color::new(0, 0, 0), Color::new(255, 255, 255)]).unwrap()
    }

    #[test]
    fn test_validation() {
        assert!(ReducedImage::new(vec![0, 1, 0], 2, 2, bw()).is_err());
        assert!(ReducedImage::new(vec![0, 1, 2, 0], 2, 2, bw()).is_err());
        let image = ReducedImage::new(vec![0; 4], 2, 2, bw()).unwrap();
        assert!(image.clone().with_alpha(Some(vec![1, 2])).is_err());
        assert!(image.with_alpha(None).is_ok());
    }

    #[test]
    fn test_to_image_with_alpha() {
        let reduced = ReducedImage::new(vec![1, 0], 2, 1, bw())
            .unwrap()
            .with_alpha(Some(vec![255, 0]))
            .unwrap();
        let image = reduced.to_image().unwrap();
        assert_eq!(
            image.pixels(),
            &[Color::new(255, 255, 255), Color::new(0, 0, 0)]
        );
        assert_eq!(image.alpha(), Some(&[255u8, 0][..]));
        assert_eq!(reduced.to_u8_indices(), Some(vec![1, 0]));
    }

    #[test]
    fn test_large_palette_has_no_byte_indices() {
        let colors: Vec<Color> = (0..300u32)
            .map(|i| Color::new((i % 256) as u8, (i / 256) as u8, 0))
            .collect();
        let palette = Palette::new(&colors).unwrap();
        let reduced = ReducedImage::new(vec![299], 1, 1, palette).unwrap();
        assert_eq!(reduced.to_u8_indices(), None);
    }
}
