//! Batch palettization.
//!
//! Files are processed in parallel and independently: a file that fails
//! is logged and reported while the others carry on.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use pixel_reduce::PaletteMapper;
use rayon::prelude::*;
use serde::Serialize;

use crate::error::AppError;
use crate::services::image_io;

/// A file that could not be processed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure {
    pub input: PathBuf,
    pub error: String,
}

/// Outcome of a batch run, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    /// Output paths written
    pub written: Vec<PathBuf>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Where the output for `input` is written inside `out_dir`.
pub fn output_path(input: &Path, out_dir: &Path) -> PathBuf {
    let name = input
        .file_stem()
        .map(|stem| format!("{}.png", stem.to_string_lossy()))
        .unwrap_or_else(|| "output.png".to_string());
    out_dir.join(name)
}

/// Map every input through `mapper`, writing PNGs into `out_dir`.
///
/// # Errors
///
/// Only fails when `out_dir` cannot be created; per-file errors are
/// collected in the report. An input whose output name was already taken
/// by an earlier input is recorded as a failure and not written.
pub fn palettize_files(
    inputs: &[PathBuf],
    out_dir: &Path,
    mapper: &PaletteMapper,
    optimize: bool,
) -> Result<BatchReport, AppError> {
    std::fs::create_dir_all(out_dir).map_err(|e| AppError::io(out_dir, e))?;

    // The first input claims an output name; later inputs with the same
    // stem are reported instead of overwriting it.
    let mut claimed = HashSet::new();
    let outputs: Vec<Option<PathBuf>> = inputs
        .iter()
        .map(|input| {
            let output = output_path(input, out_dir);
            claimed.insert(output.clone()).then_some(output)
        })
        .collect();

    let start = Instant::now();
    let results: Vec<_> = inputs
        .par_iter()
        .zip(outputs.par_iter())
        .map(|(input, output)| match output {
            Some(output) => {
                palettize_file(input, output, mapper, optimize).map(|()| output.clone())
            }
            None => Err(AppError::DuplicateOutput {
                input: input.clone(),
                output: output_path(input, out_dir),
            }),
        })
        .collect();

    let mut report = BatchReport::default();
    for (input, result) in inputs.iter().zip(results) {
        match result {
            Ok(output) => report.written.push(output),
            Err(e) => {
                tracing::warn!(input = %input.display(), error = %e, "Failed to palettize image");
                report.failed.push(BatchFailure {
                    input: input.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        files = report.written.len(),
        failed = report.failed.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        policy = mapper.policy().name(),
        "Palettized images"
    );

    Ok(report)
}

fn palettize_file(
    input: &Path,
    output: &Path,
    mapper: &PaletteMapper,
    optimize: bool,
) -> Result<(), AppError> {
    let image = image_io::read_png(input)?;
    let reduced = mapper.map(&image)?;
    tracing::debug!(
        input = %input.display(),
        colors = reduced.palette().len(),
        "Palettized image"
    );
    image_io::save_reduced(output, &reduced, optimize)
}
