//! Pixel-grid detection for nearest-neighbor upscaled pixel art.
//!
//! An image scaled up without blending has sharp color changes exactly on
//! the cell boundaries. Summing the horizontal pixel differences down each
//! column gives a signal that peaks on those boundaries; the median gap
//! between peaks is the cell width. Rows are handled the same way.

use std::fmt;

use crate::error::{ReduceError, Result};
use crate::image::Image;

/// Image axis, used when reporting which direction lacked signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Along image rows (column boundaries, cell width).
    Horizontal,
    /// Along image columns (row boundaries, cell height).
    Vertical,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Horizontal => f.write_str("horizontal"),
            Axis::Vertical => f.write_str("vertical"),
        }
    }
}

/// Estimated cell size in source pixels. Both values are positive and may
/// be fractional.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpacing {
    pub cell_width: f64,
    pub cell_height: f64,
}

impl GridSpacing {
    /// Output resolution implied by this spacing for a `width x height`
    /// source, rounded half to even and at least 1 on each axis.
    pub fn target_size(&self, width: usize, height: usize) -> (usize, usize) {
        let tw = (width as f64 / self.cell_width).round_ties_even().max(1.0) as usize;
        let th = (height as f64 / self.cell_height).round_ties_even().max(1.0) as usize;
        (tw, th)
    }
}

/// Estimates the cell size of upscaled pixel art.
///
/// # Example
///
/// ```
/// use pixel_reduce::{Color, GridDetector, Image};
///
/// // 3x3 checkerboard of 4x4 cells
/// let mut pixels = Vec::new();
/// for y in 0..12 {
///     for x in 0..12 {
///         let on = (x / 4 + y / 4) % 2 == 0;
///         pixels.push(if on { Color::new(255, 255, 255) } else { Color::new(0, 0, 0) });
///     }
/// }
/// let image = Image::new(12, 12, pixels).unwrap();
/// let spacing = GridDetector::new().detect(&image).unwrap();
/// assert_eq!(spacing.cell_width, 4.0);
/// assert_eq!(spacing.cell_height, 4.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct GridDetector;

impl GridDetector {
    pub fn new() -> Self {
        Self
    }

    /// Detect the grid spacing of `image`.
    ///
    /// # Errors
    ///
    /// Returns [`ReduceError::InsufficientSignal`] when either axis has
    /// fewer than two peaks, since no spacing can be measured from it.
    pub fn detect(&self, image: &Image) -> Result<GridSpacing> {
        let columns = column_signal(image);
        let rows = row_signal(image);

        let column_peaks = find_peaks(&columns);
        let row_peaks = find_peaks(&rows);
        tracing::debug!(
            columns = column_peaks.len(),
            rows = row_peaks.len(),
            "Grid peaks found"
        );

        let cell_width = peak_spacing(&column_peaks, Axis::Horizontal)?;
        let cell_height = peak_spacing(&row_peaks, Axis::Vertical)?;

        Ok(GridSpacing {
            cell_width,
            cell_height,
        })
    }
}

/// Per column boundary, the summed color distance between horizontally
/// adjacent pixels. Length is `width - 1`.
pub fn column_signal(image: &Image) -> Vec<f64> {
    let width = image.width();
    let mut signal = vec![0.0; width.saturating_sub(1)];
    for row in image.pixels().chunks_exact(width) {
        for (slot, pair) in signal.iter_mut().zip(row.windows(2)) {
            *slot += pair[0].distance(pair[1]);
        }
    }
    signal
}

/// Per row boundary, the summed color distance between vertically adjacent
/// pixels. Length is `height - 1`.
pub fn row_signal(image: &Image) -> Vec<f64> {
    let width = image.width();
    let pixels = image.pixels();
    (0..image.height().saturating_sub(1))
        .map(|y| {
            let upper = &pixels[y * width..(y + 1) * width];
            let lower = &pixels[(y + 1) * width..(y + 2) * width];
            upper.iter().zip(lower).map(|(a, b)| a.distance(*b)).sum()
        })
        .collect()
}

/// Indices of local maxima in `signal`.
///
/// A sample is a peak when it rises strictly from its left neighbor and
/// falls strictly to the first differing sample on its right. A flat
/// plateau counts once, at its middle (rounded down). The first and last
/// samples are never peaks.
pub fn find_peaks(signal: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if signal.len() < 3 {
        return peaks;
    }

    let last = signal.len() - 1;
    let mut i = 1;
    while i < last {
        if signal[i - 1] < signal[i] {
            let mut ahead = i + 1;
            while ahead < last && signal[ahead] == signal[i] {
                ahead += 1;
            }
            if signal[ahead] < signal[i] {
                peaks.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    peaks
}

fn peak_spacing(peaks: &[usize], axis: Axis) -> Result<f64> {
    if peaks.len() < 2 {
        return Err(ReduceError::InsufficientSignal {
            axis,
            peaks: peaks.len(),
        });
    }
    let mut gaps: Vec<f64> = peaks.windows(2).map(|w| (w[1] - w[0]) as f64).collect();
    Ok(median(&mut gaps))
}

/// Median of a non-empty slice; the mean of the two middle values for
/// even lengths.
fn median(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}
