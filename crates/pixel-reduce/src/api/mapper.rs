//! PaletteMapper builder -- the main entry point for color reduction.
//!
//! [`PaletteMapper`] composes palette resolution, optional denoising,
//! gamma darkening and ordered dithering behind a fluent builder.

use std::borrow::Cow;

use crate::cluster::ColorClusterer;
use crate::color::GammaLut;
use crate::denoise::Denoiser;
use crate::dither::{Dithering, OrderedDither};
use crate::error::{ReduceError, Result};
use crate::image::Image;
use crate::output::ReducedImage;
use crate::palette::Palette;
use crate::sizer::PaletteSizer;

/// Largest palette [`PalettePolicy::Automatic`] considers by default.
pub const DEFAULT_MAX_K: usize = 64;

/// Gamma coefficient used before dithering against a reference palette.
pub const REFERENCE_GAMMA_COEFFICIENT: f64 = 0.02;

/// Gamma coefficient used before dithering against a palette derived from
/// the image itself.
pub const DERIVED_GAMMA_COEFFICIENT: f64 = 0.03;

/// Where the output palette comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PalettePolicy {
    /// Cluster the image into this many colors.
    FixedCount(usize),
    /// Pick the count with [`PaletteSizer`], searching up to `max_k`.
    Automatic {
        /// Largest color count considered.
        max_k: usize,
    },
    /// Use these colors as they are.
    Reference(Palette),
}

impl PalettePolicy {
    /// Automatic sizing with [`DEFAULT_MAX_K`].
    pub fn automatic() -> Self {
        PalettePolicy::Automatic {
            max_k: DEFAULT_MAX_K,
        }
    }

    /// Reference palette made of the distinct colors of `image`.
    pub fn reference_image(image: &Image) -> Self {
        PalettePolicy::Reference(Palette::from_image(image))
    }

    /// Short name for log output.
    pub fn name(&self) -> &'static str {
        match self {
            PalettePolicy::FixedCount(_) => "fixed",
            PalettePolicy::Automatic { .. } => "automatic",
            PalettePolicy::Reference(_) => "reference",
        }
    }
}

impl Default for PalettePolicy {
    fn default() -> Self {
        Self::automatic()
    }
}

/// Palette after the policy has been applied to a concrete image.
enum ResolvedPalette {
    Count(usize),
    Explicit(Palette),
}

/// Maps images onto a palette.
///
/// # Design
///
/// - Constructor requires a [`PalettePolicy`]
/// - Configuration methods consume and return `self`
/// - [`map()`](Self::map) takes `&self`, so one mapper serves a whole batch
///
/// # Example
///
/// ```
/// use pixel_reduce::{Color, Dithering, Image, PaletteMapper, PalettePolicy};
///
/// let pixels = vec![
///     Color::new(0, 0, 0),
///     Color::new(10, 10, 10),
///     Color::new(240, 240, 240),
///     Color::new(255, 255, 255),
/// ];
/// let image = Image::new(2, 2, pixels).unwrap();
///
/// let reduced = PaletteMapper::new(PalettePolicy::FixedCount(2))
///     .dithering(Dithering::None)
///     .map(&image)
///     .unwrap();
/// assert_eq!(reduced.palette().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct PaletteMapper {
    policy: PalettePolicy,
    dithering: Dithering,
    dither_strength: f64,
    denoiser: Option<Denoiser>,
    clusterer: ColorClusterer,
}

impl PaletteMapper {
    /// Create a mapper for `policy` with no dithering and no denoising.
    pub fn new(policy: PalettePolicy) -> Self {
        Self {
            policy,
            dithering: Dithering::None,
            dither_strength: 0.0,
            denoiser: None,
            clusterer: ColorClusterer::new(),
        }
    }

    /// Set the dithering mode.
    #[inline]
    pub fn dithering(mut self, dithering: Dithering) -> Self {
        self.dithering = dithering;
        self
    }

    /// Set the dither strength. Zero disables dithering even when an
    /// order is set.
    #[inline]
    pub fn dither_strength(mut self, strength: f64) -> Self {
        self.dither_strength = strength;
        self
    }

    /// Denoise the image before mapping.
    #[inline]
    pub fn denoise(mut self, denoiser: Denoiser) -> Self {
        self.denoiser = Some(denoiser);
        self
    }

    /// Use a specific clusterer for quantization and sizing.
    #[inline]
    pub fn clusterer(mut self, clusterer: ColorClusterer) -> Self {
        self.clusterer = clusterer;
        self
    }

    pub fn policy(&self) -> &PalettePolicy {
        &self.policy
    }

    /// Map `image` onto the resolved palette.
    ///
    /// # Errors
    ///
    /// Returns [`ReduceError::InvalidArgument`] for a negative dither
    /// strength, an invalid dither order, `FixedCount(0)`, an Automatic
    /// `max_k` below 2, or a strength too large for the gamma curve.
    pub fn map(&self, image: &Image) -> Result<ReducedImage> {
        self.map_with_progress(image, |_, _| {})
    }

    /// Like [`map()`](Self::map), forwarding palette-sizing progress for
    /// [`PalettePolicy::Automatic`].
    pub fn map_with_progress<F>(&self, image: &Image, progress: F) -> Result<ReducedImage>
    where
        F: Fn(usize, usize) + Sync,
    {
        let ditherer = self.ditherer()?;

        let source = match &self.denoiser {
            Some(denoiser) => Cow::Owned(denoiser.denoise(image)?),
            None => Cow::Borrowed(image),
        };

        let resolved = self.resolve(&source, progress)?;

        let (indices, palette) = match (resolved, ditherer) {
            (ResolvedPalette::Explicit(palette), None) => {
                let indices = source
                    .pixels()
                    .iter()
                    .map(|&c| palette.find_nearest(c).0 as u32)
                    .collect();
                (indices, palette)
            }
            (ResolvedPalette::Count(count), None) => {
                let clustering = self.clusterer.cluster(source.pixels(), count)?;
                let palette = clustering.palette();
                let indices = clustering.assignment().iter().map(|&i| i as u32).collect();
                (indices, palette)
            }
            (ResolvedPalette::Explicit(palette), Some(ditherer)) => {
                let lut = GammaLut::for_dither_strength(
                    REFERENCE_GAMMA_COEFFICIENT,
                    self.dither_strength,
                )?;
                let darkened = lut.apply_image(&source);
                (ditherer.dither(&darkened, &palette), palette)
            }
            (ResolvedPalette::Count(count), Some(ditherer)) => {
                let palette = self.clusterer.cluster(source.pixels(), count)?.palette();
                let lut =
                    GammaLut::for_dither_strength(DERIVED_GAMMA_COEFFICIENT, self.dither_strength)?;
                let darkened = lut.apply_image(&source);
                (ditherer.dither(&darkened, &palette), palette)
            }
        };

        tracing::debug!(
            policy = self.policy.name(),
            colors = palette.len(),
            dithered = !self.dithering.is_none() && self.dither_strength > 0.0,
            "Mapped image to palette"
        );

        ReducedImage::new(indices, source.width(), source.height(), palette)?
            .with_alpha(source.alpha().map(<[u8]>::to_vec))
    }

    /// Ordered ditherer for the current settings, or `None` when the
    /// output is not dithered.
    fn ditherer(&self) -> Result<Option<OrderedDither>> {
        if !(self.dither_strength.is_finite() && self.dither_strength >= 0.0) {
            return Err(ReduceError::InvalidArgument(format!(
                "dither strength must be a non-negative number, got {}",
                self.dither_strength
            )));
        }
        match self.dithering {
            Dithering::None => Ok(None),
            Dithering::Ordered { order } => {
                let ditherer = OrderedDither::new(order, self.dither_strength)?;
                Ok((self.dither_strength > 0.0).then_some(ditherer))
            }
        }
    }

    fn resolve<F>(&self, image: &Image, progress: F) -> Result<ResolvedPalette>
    where
        F: Fn(usize, usize) + Sync,
    {
        match &self.policy {
            PalettePolicy::FixedCount(0) => Err(ReduceError::InvalidArgument(
                "palette color count must be at least 1".to_string(),
            )),
            PalettePolicy::FixedCount(count) => Ok(ResolvedPalette::Count(*count)),
            PalettePolicy::Automatic { max_k } => {
                let count = PaletteSizer::with_clusterer(self.clusterer)
                    .best_color_count_with_progress(image, *max_k, progress)?;
                Ok(ResolvedPalette::Count(count))
            }
            PalettePolicy::Reference(palette) => Ok(ResolvedPalette::Explicit(palette.clone())),
        }
    }
}

/// Map `image` with the given policy and dithering in one call.
pub fn map_to_palette(
    image: &Image,
    policy: PalettePolicy,
    dithering: Dithering,
    dither_strength: f64,
) -> Result<ReducedImage> {
    PaletteMapper::new(policy)
        .dithering(dithering)
        .dither_strength(dither_strength)
        .map(image)
}
