//! Weighted k-means over distinct colors.
//!
//! Clustering runs on the histogram of distinct colors rather than on raw
//! pixels, so an image with a few dozen colors clusters in a few dozen
//! operations per iteration regardless of its size.
//!
//! # Algorithm
//!
//! 1. Seed: the most frequent color, then repeatedly the color with the
//!    largest `count * distance²` to its nearest seed.
//! 2. Lloyd iterations: assign each color to its nearest center, refill
//!    empty clusters from the worst-fitting color of a multi-member
//!    cluster, move centers to weighted means. Stops when assignments no
//!    longer change or after `max_iterations`.
//! 3. Snap: each cluster's representative is its most frequent member, so
//!    representatives are always colors that occur in the input.
//!
//! Every step is deterministic; ties resolve to the earliest color in
//! first-occurrence order or to the lowest cluster index.

use super::histogram::ColorHistogram;
use crate::color::Color;
use crate::error::{ReduceError, Result};
use crate::palette::Palette;

/// Default cap on Lloyd iterations per clustering.
pub const DEFAULT_MAX_ITERATIONS: usize = 16;

/// Deterministic color quantizer.
///
/// Stateless and reentrant: a single instance can be shared across threads.
///
/// # Example
///
/// ```
/// use pixel_reduce::{Color, ColorClusterer};
///
/// let red = Color::new(255, 0, 0);
/// let green = Color::new(0, 255, 0);
/// let mut colors = vec![red; 10];
/// colors.push(green);
///
/// let clustering = ColorClusterer::new().cluster(&colors, 1).unwrap();
/// assert_eq!(clustering.representatives(), &[red]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorClusterer {
    max_iterations: usize,
}

impl Default for ColorClusterer {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Result of [`ColorClusterer::cluster`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clustering {
    representatives: Vec<Color>,
    /// Representative index per input color.
    assignment: Vec<usize>,
}

impl Clustering {
    /// Representative colors, distinct, at most `k` of them.
    #[inline]
    pub fn representatives(&self) -> &[Color] {
        &self.representatives
    }

    /// For each input color, the index of its representative.
    #[inline]
    pub fn assignment(&self) -> &[usize] {
        &self.assignment
    }

    /// Representative assigned to the input color at `position`.
    #[inline]
    pub fn representative_of(&self, position: usize) -> Color {
        self.representatives[self.assignment[position]]
    }

    /// Every input color replaced by its representative.
    pub fn assigned_colors(&self) -> Vec<Color> {
        self.assignment
            .iter()
            .map(|&idx| self.representatives[idx])
            .collect()
    }

    /// The representatives as a palette, in cluster order.
    pub fn palette(&self) -> Palette {
        Palette::from_distinct(self.representatives.clone())
    }
}

impl ColorClusterer {
    /// Create a clusterer with the default iteration cap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of Lloyd iterations (at least 1).
    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations.max(1);
        self
    }

    /// Partition `colors` into at most `k` representative colors.
    ///
    /// When the input has `k` or fewer distinct colors, each distinct color
    /// is its own representative (in first-occurrence order). Otherwise
    /// exactly `k` representatives are returned.
    ///
    /// # Errors
    ///
    /// Returns [`ReduceError::InvalidArgument`] if `k == 0` or `colors` is
    /// empty.
    pub fn cluster(&self, colors: &[Color], k: usize) -> Result<Clustering> {
        if k == 0 {
            return Err(ReduceError::InvalidArgument(
                "cluster count must be at least 1".to_string(),
            ));
        }
        if colors.is_empty() {
            return Err(ReduceError::InvalidArgument(
                "cannot cluster an empty color set".to_string(),
            ));
        }

        let histogram = ColorHistogram::from_colors(colors);
        let (representatives, entry_cluster) = if histogram.len() <= k {
            let reps: Vec<Color> = histogram.entries().iter().map(|&(c, _)| c).collect();
            (reps, (0..histogram.len()).collect::<Vec<_>>())
        } else {
            self.kmeans(histogram.entries(), k)
        };

        let assignment = histogram
            .positions()
            .iter()
            .map(|&entry| entry_cluster[entry])
            .collect();

        Ok(Clustering {
            representatives,
            assignment,
        })
    }

    /// The most frequent color of a multiset; ties go to first occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`ReduceError::InvalidArgument`] if `colors` is empty.
    pub fn mode_color(&self, colors: &[Color]) -> Result<Color> {
        mode_color(colors)
    }

    fn kmeans(&self, entries: &[(Color, u32)], k: usize) -> (Vec<Color>, Vec<usize>) {
        let points: Vec<[f64; 3]> = entries.iter().map(|(c, _)| c.to_f64()).collect();
        let weights: Vec<f64> = entries.iter().map(|&(_, n)| n as f64).collect();

        let mut centers = seed_centers(&points, &weights, k);
        let mut labels = vec![usize::MAX; points.len()];

        for _ in 0..self.max_iterations {
            let changed = assign_labels(&points, &centers, &mut labels);
            fill_empty_clusters(&points, &weights, &mut centers, &mut labels);
            update_centers(&points, &weights, &labels, &mut centers);
            if !changed {
                break;
            }
        }
        assign_labels(&points, &centers, &mut labels);
        fill_empty_clusters(&points, &weights, &mut centers, &mut labels);

        snap_to_modes(entries, &labels, centers.len())
    }
}

/// The most frequent color of a multiset; ties go to first occurrence.
///
/// # Errors
///
/// Returns [`ReduceError::InvalidArgument`] if `colors` is empty.
pub fn mode_color(colors: &[Color]) -> Result<Color> {
    ColorHistogram::from_colors(colors)
        .mode()
        .ok_or_else(|| ReduceError::InvalidArgument("mode of an empty color set".to_string()))
}

#[inline]
fn dist2(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let dr = a[0] - b[0];
    let dg = a[1] - b[1];
    let db = a[2] - b[2];
    dr * dr + dg * dg + db * db
}

/// Greedy weighted farthest-point seeding. Requires `points.len() > k`.
fn seed_centers(points: &[[f64; 3]], weights: &[f64], k: usize) -> Vec<[f64; 3]> {
    let mut first = 0;
    for (i, &w) in weights.iter().enumerate() {
        if w > weights[first] {
            first = i;
        }
    }

    let mut centers = Vec::with_capacity(k);
    centers.push(points[first]);
    let mut nearest: Vec<f64> = points.iter().map(|p| dist2(p, &points[first])).collect();

    while centers.len() < k {
        let mut pick = None;
        let mut best_score = 0.0;
        for (i, (&w, &d)) in weights.iter().zip(&nearest).enumerate() {
            let score = w * d;
            if score > best_score {
                best_score = score;
                pick = Some(i);
            }
        }
        // Only identical points remain; the caller guarantees this cannot
        // happen for more than k distinct inputs.
        let Some(pick) = pick else { break };

        centers.push(points[pick]);
        for (d, p) in nearest.iter_mut().zip(points) {
            *d = d.min(dist2(p, &points[pick]));
        }
    }

    centers
}

/// Assign each point to its nearest center. Returns whether any label moved.
fn assign_labels(points: &[[f64; 3]], centers: &[[f64; 3]], labels: &mut [usize]) -> bool {
    let mut changed = false;
    for (p, label) in points.iter().zip(labels.iter_mut()) {
        let mut best = 0;
        let mut best_dist = f64::MAX;
        for (j, c) in centers.iter().enumerate() {
            let d = dist2(p, c);
            if d < best_dist {
                best_dist = d;
                best = j;
            }
        }
        if *label != best {
            *label = best;
            changed = true;
        }
    }
    changed
}

/// Give every empty cluster the point that fits its own cluster worst,
/// taken only from clusters with more than one member.
fn fill_empty_clusters(
    points: &[[f64; 3]],
    weights: &[f64],
    centers: &mut [[f64; 3]],
    labels: &mut [usize],
) {
    let mut sizes = vec![0usize; centers.len()];
    for &label in labels.iter() {
        sizes[label] += 1;
    }

    for empty in 0..centers.len() {
        if sizes[empty] > 0 {
            continue;
        }

        let mut pick: Option<(usize, f64)> = None;
        for (i, p) in points.iter().enumerate() {
            let label = labels[i];
            if sizes[label] < 2 {
                continue;
            }
            let score = weights[i] * dist2(p, &centers[label]);
            if pick.map_or(true, |(_, best)| score > best) {
                pick = Some((i, score));
            }
        }
        let Some((i, _)) = pick else { break };

        sizes[labels[i]] -= 1;
        labels[i] = empty;
        sizes[empty] = 1;
        centers[empty] = points[i];
    }
}

fn update_centers(
    points: &[[f64; 3]],
    weights: &[f64],
    labels: &[usize],
    centers: &mut [[f64; 3]],
) {
    let mut sums = vec![[0.0f64; 3]; centers.len()];
    let mut totals = vec![0.0f64; centers.len()];

    for ((p, &w), &label) in points.iter().zip(weights).zip(labels) {
        let sum = &mut sums[label];
        sum[0] += p[0] * w;
        sum[1] += p[1] * w;
        sum[2] += p[2] * w;
        totals[label] += w;
    }

    for ((center, sum), &total) in centers.iter_mut().zip(&sums).zip(&totals) {
        if total > 0.0 {
            *center = [sum[0] / total, sum[1] / total, sum[2] / total];
        }
    }
}

/// Replace each cluster by its most frequent member. Clusters left empty
/// are dropped and labels are renumbered.
fn snap_to_modes(entries: &[(Color, u32)], labels: &[usize], k: usize) -> (Vec<Color>, Vec<usize>) {
    let mut best: Vec<Option<(usize, u32)>> = vec![None; k];
    for (i, (&(_, count), &label)) in entries.iter().zip(labels).enumerate() {
        match best[label] {
            Some((_, best_count)) if count <= best_count => {}
            _ => best[label] = Some((i, count)),
        }
    }

    let mut remap = vec![usize::MAX; k];
    let mut representatives = Vec::with_capacity(k);
    for (cluster, slot) in best.iter().enumerate() {
        if let Some((entry, _)) = slot {
            remap[cluster] = representatives.len();
            representatives.push(entries[*entry].0);
        }
    }

    let entry_cluster = labels.iter().map(|&label| remap[label]).collect();
    (representatives, entry_cluster)
}
