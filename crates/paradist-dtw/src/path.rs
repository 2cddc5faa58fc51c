//! Warp path of an optimal DTW alignment.

/// A single cell of a warp path, mapping index `a` in the first sequence
/// to index `b` in the second sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarpingStep {
    /// Time step in the first sequence.
    pub a: usize,
    /// Time step in the second sequence.
    pub b: usize,
}

/// Aligned cells ordered from `(0, 0)` towards `(n-1, m-1)`.
///
/// Patterns whose branches skip cells (such as `asymmetric`) produce paths
/// that advance more than one index per step.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WarpPath(Vec<WarpingStep>);

impl WarpPath {
    pub(crate) fn new(steps: Vec<WarpingStep>) -> Self {
        Self(steps)
    }

    /// Return the warping steps as a slice.
    #[must_use]
    pub fn steps(&self) -> &[WarpingStep] {
        &self.0
    }

    /// Return the number of steps in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the path contains no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a WarpPath {
    type Item = &'a WarpingStep;
    type IntoIter = std::slice::Iter<'a, WarpingStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
