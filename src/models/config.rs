use serde::Deserialize;
use std::path::Path;

use crate::error::AppError;

/// Application configuration loaded from a YAML file
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    /// Palette reduction defaults
    #[serde(default)]
    pub palettize: PalettizeConfig,

    /// Downscaling defaults
    #[serde(default)]
    pub downscale: DownscaleConfig,

    /// Reference palette retrieval
    #[serde(default)]
    pub fetch: FetchConfig,

    /// PNG output
    #[serde(default)]
    pub output: OutputConfig,
}

/// Defaults for the `palettize` command
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PalettizeConfig {
    /// Largest palette automatic sizing considers
    #[serde(default = "default_max_k")]
    pub max_k: usize,

    /// Bayer matrix order; absent means no dithering
    #[serde(default)]
    pub dither_order: Option<usize>,

    #[serde(default)]
    pub dither_strength: f64,

    /// Denoise before mapping
    #[serde(default)]
    pub denoise: bool,

    #[serde(default = "default_smoothing")]
    pub smoothing: f64,

    #[serde(default = "default_denoise_strength")]
    pub denoise_strength: f64,
}

fn default_max_k() -> usize {
    pixel_reduce::DEFAULT_MAX_K
}

fn default_smoothing() -> f64 {
    5.0
}

fn default_denoise_strength() -> f64 {
    4.0
}

impl Default for PalettizeConfig {
    fn default() -> Self {
        Self {
            max_k: default_max_k(),
            dither_order: None,
            dither_strength: 0.0,
            denoise: false,
            smoothing: default_smoothing(),
            denoise_strength: default_denoise_strength(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DownscaleConfig {
    /// Colors clustered per output tile
    #[serde(default = "default_centroids")]
    pub centroids: usize,
}

fn default_centroids() -> usize {
    2
}

impl Default for DownscaleConfig {
    fn default() -> Self {
        Self {
            centroids: default_centroids(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FetchConfig {
    /// HTTP timeout for reference palettes
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct OutputConfig {
    /// Re-compress written PNGs with oxipng
    #[serde(default = "default_optimize")]
    pub optimize: bool,
}

fn default_optimize() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            optimize: default_optimize(),
        }
    }
}

impl AppConfig {
    /// Parse configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self, AppError> {
        serde_yaml::from_str(content).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Load configuration from a file, falling back to defaults
    ///
    /// Without a path the defaults are used silently. A file that cannot
    /// be read or parsed is reported with a warning.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_yaml_str(&content) {
                Ok(config) => {
                    tracing::info!(path = %path.display(), "Loaded configuration");
                    config
                }
                Err(e) => {
                    tracing::warn!(
                        %e,
                        path = %path.display(),
                        "Failed to parse config, using defaults"
                    );
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.palettize.max_k, 64);
        assert_eq!(config.palettize.dither_order, None);
        assert_eq!(config.palettize.dither_strength, 0.0);
        assert!(!config.palettize.denoise);
        assert_eq!(config.palettize.smoothing, 5.0);
        assert_eq!(config.palettize.denoise_strength, 4.0);
        assert_eq!(config.downscale.centroids, 2);
        assert_eq!(config.fetch.timeout_secs, 30);
        assert!(config.output.optimize);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
palettize:
  dither_order: 8
  dither_strength: 2.5
output:
  optimize: false
"#;
        let config = AppConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.palettize.dither_order, Some(8));
        assert_eq!(config.palettize.dither_strength, 2.5);
        assert_eq!(config.palettize.max_k, 64);
        assert_eq!(config.downscale.centroids, 2);
        assert!(!config.output.optimize);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(AppConfig::from_yaml_str("{}").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let err = AppConfig::from_yaml_str("palettize: [1, 2").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_load_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.yaml");
        assert_eq!(AppConfig::load(Some(&missing)), AppConfig::default());

        let broken = dir.path().join("broken.yaml");
        std::fs::File::create(&broken)
            .unwrap()
            .write_all(b"fetch: { timeout_secs: soon }")
            .unwrap();
        assert_eq!(AppConfig::load(Some(&broken)), AppConfig::default());

        assert_eq!(AppConfig::load(None), AppConfig::default());
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixelsmith.yaml");
        std::fs::write(&path, "downscale:\n  centroids: 3\nfetch:\n  timeout_secs: 5\n").unwrap();
        let config = AppConfig::load(Some(&path));
        assert_eq!(config.downscale.centroids, 3);
        assert_eq!(config.fetch.timeout_secs, 5);
    }
}
