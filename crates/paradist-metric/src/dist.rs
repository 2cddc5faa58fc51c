//! Packed triangular distance vector.

use crate::error::MetricError;

/// Slot of pair `(i, j)`, `i < j < n`, in a packed vector of `n (n - 1) / 2` distances.
///
/// Pairs are ordered `(0, 1), (0, 2), …, (0, n-1), (1, 2), …`.
#[must_use]
pub fn pair_index(i: usize, j: usize, n: usize) -> usize {
    debug_assert!(i < j && j < n, "pair ({i}, {j}) is not below n = {n}");
    i * n - i - (i * i + i) / 2 - 1 + j
}

/// Pairwise distances of `n` sequences stored as one flat vector.
///
/// Access is symmetric: `get(i, j) == get(j, i)`, and the diagonal is zero.
/// `diag` and `upper` only describe how the matrix should be displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct DistVector {
    size: usize,
    values: Vec<f64>,
    labels: Option<Vec<String>>,
    diag: bool,
    upper: bool,
    method: String,
}

impl DistVector {
    /// `values` must hold exactly `size * (size - 1) / 2` entries in [`pair_index`] order.
    pub(crate) fn new(size: usize, values: Vec<f64>, method: impl Into<String>) -> Self {
        debug_assert_eq!(values.len(), size * size.saturating_sub(1) / 2);
        Self {
            size,
            values,
            labels: None,
            diag: false,
            upper: false,
            method: method.into(),
        }
    }

    /// Attach one label per sequence.
    ///
    /// # Errors
    ///
    /// Returns [`MetricError::LabelCount`] if `labels.len()` differs from [`len`](Self::len).
    pub fn with_labels(mut self, labels: Vec<String>) -> Result<Self, MetricError> {
        if labels.len() != self.size {
            return Err(MetricError::LabelCount {
                expected: self.size,
                got: labels.len(),
            });
        }
        self.labels = Some(labels);
        Ok(self)
    }

    /// Mark the diagonal as displayed.
    #[must_use]
    pub fn with_diag(mut self, diag: bool) -> Self {
        self.diag = diag;
        self
    }

    /// Mark the upper triangle as displayed.
    #[must_use]
    pub fn with_upper(mut self, upper: bool) -> Self {
        self.upper = upper;
        self
    }

    /// Return the number of sequences.
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Return true if there are no sequences.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Return the packed distances.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Return the distance between sequences `i` and `j`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len()` or `j >= len()`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.size, "row index {i} out of bounds for {} sequences", self.size);
        assert!(j < self.size, "column index {j} out of bounds for {} sequences", self.size);
        if i == j {
            return 0.0;
        }
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        self.values[pair_index(lo, hi, self.size)]
    }

    /// Iterate over `(i, j, distance)` with `i < j`, in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let n = self.size;
        (0..n)
            .flat_map(move |i| (i + 1..n).map(move |j| (i, j)))
            .zip(self.values.iter().copied())
            .map(|((i, j), d)| (i, j, d))
    }

    /// Return the distances from sequence `i` to every sequence.
    #[must_use]
    pub fn row(&self, i: usize) -> Vec<f64> {
        (0..self.size).map(|j| self.get(i, j)).collect()
    }

    #[must_use]
    pub fn labels(&self) -> Option<&[String]> {
        self.labels.as_deref()
    }

    #[must_use]
    pub fn diag(&self) -> bool {
        self.diag
    }

    #[must_use]
    pub fn upper(&self) -> bool {
        self.upper
    }

    /// Return the name of the measure that produced the distances.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }
}
