//! Ordered dithering.
//!
//! The only algorithm is Bayer-matrix ordered dithering: each pixel is
//! offset by a fixed threshold pattern, then mapped to its nearest palette
//! color. Pixels are independent of each other, so the pass runs in
//! parallel and gives the same output on every run.
//!
//! # Example
//!
//! ```
//! use pixel_reduce::{Color, Image, OrderedDither, Palette};
//!
//! let palette = Palette::new(&[Color::new(0, 0, 0), Color::new(255, 255, 255)]).unwrap();
//! let image = Image::filled(4, 4, Color::new(128, 128, 128)).unwrap();
//!
//! let indices = OrderedDither::new(2, 30.0).unwrap().dither(&image, &palette);
//! assert_eq!(indices.len(), 16);
//! ```

mod bayer;
mod options;

pub use bayer::{BayerMatrix, OrderedDither};
pub use options::Dithering;
