//! Pixelsmith - pixel-art restoration and palette reduction
//!
//! Command-line front end for the `pixel_reduce` core: PNG input and
//! output, reference palette retrieval, configuration and batch runs.
//! This library exposes modules for integration testing.

pub mod error;
pub mod models;
pub mod services;
