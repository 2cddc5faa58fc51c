//! Warping window (Sakoe-Chiba style band) for the DP fill.

use std::ops::Range;

/// Constraint on how far the alignment may stray from the diagonal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WarpingWindow {
    /// No constraint: the full cost matrix is computed.
    #[default]
    Unconstrained,

    /// Cell `(i, j)` is in band only if `|i - j| <= max(size, |n - m|)`.
    Size(usize),
}

impl WarpingWindow {
    /// Build a window from an optional size; `None` disables banding.
    #[must_use]
    pub fn from_size(size: Option<usize>) -> Self {
        size.map_or(Self::Unconstrained, Self::Size)
    }

    /// Return the effective band half-width for sequences of widths `n` and `m`.
    ///
    /// A sized window is widened to `|n - m|` so the terminal cell is always
    /// inside the band.
    #[must_use]
    pub fn half_width(&self, n: usize, m: usize) -> usize {
        match self {
            Self::Unconstrained => n.max(m),
            Self::Size(size) => (*size).max(n.abs_diff(m)),
        }
    }

    /// Return the in-band column range of padded row `i`.
    ///
    /// `offset` is the step pattern padding, `cols` the padded column count
    /// (`m + offset`) and `w` the half-width from [`half_width`](Self::half_width).
    #[must_use]
    pub fn column_range(i: usize, offset: usize, cols: usize, w: usize) -> Range<usize> {
        let lower = i.saturating_sub(w).max(offset);
        let upper = cols.min(i.saturating_add(w).saturating_add(1));
        lower..upper
    }
}
