pub mod batch;
pub mod image_io;
pub mod palette_source;

pub use batch::{palettize_files, BatchFailure, BatchReport};
pub use palette_source::{resolve_policy, PaletteFetcher, PaletteSource};
