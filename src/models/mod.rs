pub mod config;

pub use config::{AppConfig, DownscaleConfig, FetchConfig, OutputConfig, PalettizeConfig};
