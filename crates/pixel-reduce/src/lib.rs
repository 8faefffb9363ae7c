#![allow(clippy::module_inception)]

//! pixel-reduce: color reduction and pixel-art reconstruction
//!
//! This library turns arbitrary images into clean, low-color pixel art. It
//! works entirely on in-memory [`Image`]s and performs no I/O.
//!
//! # Quick Start
//!
//! The [`PaletteMapper`] builder is the primary entry point:
//!
//! ```
//! use pixel_reduce::{Color, Dithering, Image, PaletteMapper, PalettePolicy};
//!
//! let pixels = (0..16u8).map(|i| Color::new(i * 16, i * 8, 255 - i * 16)).collect();
//! let image = Image::new(4, 4, pixels).unwrap();
//!
//! let reduced = PaletteMapper::new(PalettePolicy::FixedCount(3))
//!     .dithering(Dithering::Ordered { order: 4 })
//!     .dither_strength(8.0)
//!     .map(&image)
//!     .unwrap();
//!
//! assert_eq!(reduced.width(), 4);
//! assert!(reduced.palette().len() <= 3);
//! ```
//!
//! # Stages
//!
//! - [`ColorClusterer`]: deterministic k-means quantization whose
//!   representatives are always input colors
//! - [`GridDetector`]: cell size of nearest-neighbor upscaled pixel art
//! - [`CentroidDownscaler`]: majority-color downscaling per tile
//! - [`PaletteSizer`]: palette size from the elbow of the distortion curve
//! - [`Denoiser`]: neighborhood speckle removal
//! - [`OrderedDither`]: Bayer ordered dithering against a palette
//!
//! [`restore_pixel_art`] and [`extract_palette_strip`] chain these for the
//! common workflows.
//!
//! # Determinism
//!
//! Every stage is a pure function of its input. Stages that run in
//! parallel (downscaling, denoising, dithering, palette sizing) collect
//! results in coordinate order, so output never depends on thread timing.

pub mod api;
pub mod cluster;
pub mod color;
pub mod denoise;
pub mod dither;
pub mod downscale;
pub mod error;
pub mod grid;
pub mod image;
pub mod output;
pub mod palette;
pub mod pipeline;
pub mod sizer;


pub use api::{map_to_palette, PaletteMapper, PalettePolicy, DEFAULT_MAX_K};
pub use cluster::{mode_color, Clustering, ColorClusterer, ColorHistogram};
pub use color::{Color, GammaLut};
pub use denoise::Denoiser;
pub use dither::{BayerMatrix, Dithering, OrderedDither};
pub use downscale::CentroidDownscaler;
pub use error::{ReduceError, Result};
pub use grid::{Axis, GridDetector, GridSpacing};
pub use image::Image;
pub use output::ReducedImage;
pub use palette::{Palette, PaletteError, ParseColorError};
pub use pipeline::{extract_palette_strip, restore_pixel_art, RestoredPixelArt};
pub use sizer::{DistortionCurve, PaletteSizer};
