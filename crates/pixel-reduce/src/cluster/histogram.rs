//! Weighted histogram of distinct colors.

use std::collections::HashMap;

use crate::color::Color;

/// Distinct colors of a sequence with their occurrence counts.
///
/// Entries are kept in order of first occurrence, which is what every
/// tie-break in this crate refers to.
#[derive(Debug, Clone)]
pub struct ColorHistogram {
    entries: Vec<(Color, u32)>,
    /// For each input position, the index of its entry.
    positions: Vec<usize>,
}

impl ColorHistogram {
    /// Count the distinct colors of a sequence.
    pub fn from_colors(colors: &[Color]) -> Self {
        let mut index: HashMap<Color, usize> = HashMap::new();
        let mut entries: Vec<(Color, u32)> = Vec::new();
        let mut positions = Vec::with_capacity(colors.len());

        for &color in colors {
            let idx = *index.entry(color).or_insert_with(|| {
                entries.push((color, 0));
                entries.len() - 1
            });
            entries[idx].1 += 1;
            positions.push(idx);
        }

        Self { entries, positions }
    }

    /// Distinct colors with counts, in first-occurrence order.
    #[inline]
    pub fn entries(&self) -> &[(Color, u32)] {
        &self.entries
    }

    /// Entry index for each input position.
    #[inline]
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Number of distinct colors.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most frequent color; ties go to the earliest first occurrence.
    pub fn mode(&self) -> Option<Color> {
        let mut best: Option<(Color, u32)> = None;
        for &(color, count) in &self.entries {
            match best {
                Some((_, best_count)) if count <= best_count => {}
                _ => best = Some((color, count)),
            }
        }
        best.map(|(color, _)| color)
    }
}
