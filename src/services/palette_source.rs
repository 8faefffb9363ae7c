//! Palette policy resolution from command-line sources.
//!
//! A reference palette can come from a local PNG or from a URL. Remote
//! failures never abort a run: the policy degrades to automatic sizing and
//! the failure is logged.

use std::path::PathBuf;
use std::time::Duration;

use pixel_reduce::{Image, PalettePolicy};

use crate::error::AppError;
use crate::services::image_io;

/// Where the palette for a palettize run comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum PaletteSource {
    /// Quantize each image to this many colors.
    Count(usize),
    /// Pick the count per image.
    Automatic { max_k: usize },
    /// Distinct colors of a local PNG.
    File(PathBuf),
    /// Distinct colors of a PNG served over HTTP(S).
    Url(String),
}

impl PaletteSource {
    /// Pick the source from mutually exclusive command-line choices.
    /// `auto` or no choice at all means automatic sizing.
    pub fn select(
        colors: Option<usize>,
        auto: bool,
        file: Option<PathBuf>,
        url: Option<String>,
        max_k: usize,
    ) -> Self {
        match (colors, file, url) {
            _ if auto => PaletteSource::Automatic { max_k },
            (Some(count), _, _) => PaletteSource::Count(count),
            (None, Some(path), _) => PaletteSource::File(path),
            (None, None, Some(url)) => PaletteSource::Url(url),
            (None, None, None) => PaletteSource::Automatic { max_k },
        }
    }
}

/// Fetches reference palette images over HTTP.
#[derive(Debug, Clone)]
pub struct PaletteFetcher {
    client: reqwest::blocking::Client,
}

impl PaletteFetcher {
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Fetch(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Download and decode the image at `url`.
    pub fn fetch_image(&self, url: &str) -> Result<Image, AppError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| AppError::Fetch(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Fetch(format!("HTTP {}", status.as_u16())));
        }

        let body = response
            .bytes()
            .map_err(|e| AppError::Fetch(format!("Failed to read response: {e}")))?;
        tracing::debug!(url, size = body.len(), "Fetched reference palette");
        image_io::decode_png(&body)
    }
}

/// Turn a [`PaletteSource`] into a [`PalettePolicy`].
///
/// Local files must be readable; a URL that cannot be fetched or decoded
/// falls back to [`PalettePolicy::Automatic`] with `fallback_max_k`.
pub fn resolve_policy(
    source: &PaletteSource,
    fetcher: &PaletteFetcher,
    fallback_max_k: usize,
) -> Result<PalettePolicy, AppError> {
    match source {
        PaletteSource::Count(count) => Ok(PalettePolicy::FixedCount(*count)),
        PaletteSource::Automatic { max_k } => Ok(PalettePolicy::Automatic { max_k: *max_k }),
        PaletteSource::File(path) => {
            let image = image_io::read_png(path)?;
            Ok(PalettePolicy::reference_image(&image))
        }
        PaletteSource::Url(url) => match fetcher.fetch_image(url) {
            Ok(image) => Ok(PalettePolicy::reference_image(&image)),
            Err(e) => {
                tracing::warn!(
                    url = %url,
                    error = %e,
                    "Reference palette unavailable, reverting to automatic palette"
                );
                Ok(PalettePolicy::Automatic {
                    max_k: fallback_max_k,
                })
            }
        },
    }
}
