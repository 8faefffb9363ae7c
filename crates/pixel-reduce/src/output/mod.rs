//! Output types for palette mapping.
//!
//! [`ReducedImage`] stores palette indices with dimension metadata, the
//! owned [`Palette`](crate::palette::Palette) and an optional alpha plane.
//! The indexed form is canonical; RGB forms are computed on demand.

mod reduced_image;

pub use reduced_image::ReducedImage;
