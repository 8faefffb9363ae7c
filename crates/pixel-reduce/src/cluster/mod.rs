//! Color clustering
//!
//! [`ColorClusterer`] partitions a multiset of colors into at most `k`
//! groups, each summarised by one of its own member colors. Every other
//! stage of the crate (downscaling, palette sizing, denoising, palette
//! mapping) is built on it.

mod histogram;
mod kmeans;

pub use histogram::ColorHistogram;
pub use kmeans::{mode_color, Clustering, ColorClusterer, DEFAULT_MAX_ITERATIONS};
