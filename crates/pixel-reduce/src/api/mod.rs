//! Public API for the pixel-reduce crate.
//!
//! This module provides the high-level API: the [`PaletteMapper`] builder
//! and the [`PalettePolicy`] it resolves.

mod mapper;

pub use mapper::{
    map_to_palette, PaletteMapper, PalettePolicy, DEFAULT_MAX_K, DERIVED_GAMMA_COEFFICIENT,
    REFERENCE_GAMMA_COEFFICIENT,
};
