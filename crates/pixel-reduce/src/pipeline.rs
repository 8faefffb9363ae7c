//! Composed pipelines built from the individual stages.

use crate::api::{PaletteMapper, PalettePolicy, DEFAULT_MAX_K};
use crate::downscale::CentroidDownscaler;
use crate::error::{ReduceError, Result};
use crate::grid::{GridDetector, GridSpacing};
use crate::image::Image;
use crate::output::ReducedImage;
use crate::palette::Palette;
use crate::sizer::PaletteSizer;

/// Centroids per tile when rebuilding pixel art or sampling a strip.
const PIPELINE_CENTROIDS: usize = 2;

/// Result of [`restore_pixel_art`].
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredPixelArt {
    /// Detected cell size of the input.
    pub spacing: GridSpacing,
    /// Color count chosen for the output.
    pub color_count: usize,
    /// The restored image at native resolution.
    pub image: ReducedImage,
}

/// Recover native-resolution pixel art from an upscaled image.
///
/// Detects the grid, downscales to one pixel per cell, picks a palette size
/// and quantizes to it without dithering.
///
/// # Errors
///
/// Propagates [`ReduceError::InsufficientSignal`] when no grid is visible.
pub fn restore_pixel_art(image: &Image) -> Result<RestoredPixelArt> {
    let spacing = GridDetector::new().detect(image)?;
    let (width, height) = spacing.target_size(image.width(), image.height());

    let native = CentroidDownscaler::new().downscale(image, width, height, PIPELINE_CENTROIDS)?;
    let color_count = PaletteSizer::new().best_color_count(&native, DEFAULT_MAX_K)?;
    let reduced = PaletteMapper::new(PalettePolicy::FixedCount(color_count)).map(&native)?;

    tracing::debug!(
        cell_width = spacing.cell_width,
        cell_height = spacing.cell_height,
        width,
        height,
        color_count,
        "Restored pixel art"
    );

    Ok(RestoredPixelArt {
        spacing,
        color_count,
        image: reduced,
    })
}

/// Sample a palette from an image laid out as a horizontal color strip.
///
/// The image is downscaled to `colors x 1` and the distinct colors of that
/// strip, left to right, form the palette. Neighboring cells of the same
/// color collapse, so the palette may be shorter than `colors`.
///
/// # Errors
///
/// Returns [`ReduceError::InvalidArgument`] if `colors == 0`.
pub fn extract_palette_strip(image: &Image, colors: usize) -> Result<(Image, Palette)> {
    if colors == 0 {
        return Err(ReduceError::InvalidArgument(
            "palette strip needs at least one color".to_string(),
        ));
    }
    let strip = CentroidDownscaler::new().downscale(image, colors, 1, PIPELINE_CENTROIDS)?;
    let palette = Palette::from_image(&strip);
    Ok((strip, palette))
}
