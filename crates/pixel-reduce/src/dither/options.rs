//! Dithering selection for [`PaletteMapper`](crate::PaletteMapper).

/// Whether and how to dither when mapping to a palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dithering {
    /// Plain nearest-color or cluster assignment.
    #[default]
    None,
    /// Bayer ordered dithering with a matrix of the given order (a power
    /// of two, at least 2).
    Ordered {
        /// Side length of the threshold matrix.
        order: usize,
    },
}

impl Dithering {
    /// Ordered dithering for an optional order; `None` disables dithering.
    pub fn from_order(order: Option<usize>) -> Self {
        match order {
            Some(order) => Dithering::Ordered { order },
            None => Dithering::None,
        }
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Dithering::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_order() {
        assert_eq!(Dithering::from_order(None), Dithering::None);
        assert_eq!(
            Dithering::from_order(Some(8)),
            Dithering::Ordered { order: 8 }
        );
        assert!(Dithering::default().is_none());
    }
}
