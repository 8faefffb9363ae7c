//! Color types and per-channel tone adjustment
//!
//! This module provides the 8-bit [`Color`] used by every stage of the
//! reduction pipeline, and the [`GammaLut`] used to darken images before
//! ordered dithering.
//!
//! # Example
//!
//! ```
//! use pixel_reduce::Color;
//!
//! let red: Color = "#F00".parse().unwrap();
//! assert_eq!(red, Color::new(255, 0, 0));
//! assert_eq!(red.distance_squared(Color::new(0, 0, 0)), 255 * 255);
//! ```

mod gamma;
mod rgb;

pub use gamma::GammaLut;
pub use rgb::Color;
