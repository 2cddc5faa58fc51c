//! Mahalanobis distance and the small dense linear algebra it needs.

use paradist_dtw::SequenceView;
use tracing::debug;

use crate::error::{MetricError, Shape};

/// Dense square matrix, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct SquareMatrix {
    size: usize,
    values: Vec<f64>,
}

impl SquareMatrix {
    /// Create a matrix from row-major values.
    ///
    /// # Errors
    ///
    /// Returns [`MetricError::InvalidArgument`] if `values.len() != size * size`
    /// or `size` is zero.
    pub fn new(size: usize, values: Vec<f64>) -> Result<Self, MetricError> {
        if size == 0 || values.len() != size * size {
            return Err(MetricError::InvalidArgument {
                key: "cov".to_string(),
                value: format!("{} values", values.len()),
                reason: "expected a non-empty square matrix",
            });
        }
        Ok(Self { size, values })
    }

    /// Create a matrix from explicit rows.
    ///
    /// # Errors
    ///
    /// Returns [`MetricError::InvalidArgument`] unless every row has as many
    /// entries as there are rows.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, MetricError> {
        let size = rows.len();
        if let Some(row) = rows.iter().find(|r| r.len() != size) {
            return Err(MetricError::InvalidArgument {
                key: "cov".to_string(),
                value: format!("row of {} values in a {size}-row matrix", row.len()),
                reason: "expected a square matrix",
            });
        }
        Self::new(size, rows.into_iter().flatten().collect())
    }

    /// Create the identity matrix.
    #[must_use]
    pub fn identity(size: usize) -> Self {
        let mut values = vec![0.0; size * size];
        for i in 0..size {
            values[i * size + i] = 1.0;
        }
        Self { size, values }
    }

    /// Sample covariance of observations given as equally long rows.
    ///
    /// The result has one row and column per variable (entry of a row) and is
    /// normalized by `rows.len() - 1`.
    ///
    /// # Errors
    ///
    /// Returns [`MetricError::InvalidArgument`] if there are no rows, the rows are
    /// empty, or their lengths differ.
    pub fn covariance(rows: &[&[f64]]) -> Result<Self, MetricError> {
        let Some(first) = rows.first() else {
            return Err(MetricError::InvalidArgument {
                key: "cov".to_string(),
                value: "0 observations".to_string(),
                reason: "covariance needs at least one observation",
            });
        };
        let size = first.len();
        if let Some(row) = rows.iter().find(|r| r.len() != size) {
            return Err(MetricError::InvalidArgument {
                key: "cov".to_string(),
                value: format!("observation of {} values", row.len()),
                reason: "observations must have equal length",
            });
        }
        let n = rows.len() as f64;
        let means: Vec<f64> = (0..size)
            .map(|k| rows.iter().map(|r| r[k]).sum::<f64>() / n)
            .collect();
        let denom = if rows.len() > 1 { n - 1.0 } else { 1.0 };

        let mut values = vec![0.0; size * size];
        for k in 0..size {
            for l in k..size {
                let c = rows
                    .iter()
                    .map(|r| (r[k] - means[k]) * (r[l] - means[l]))
                    .sum::<f64>()
                    / denom;
                values[k * size + l] = c;
                values[l * size + k] = c;
            }
        }
        Self::new(size, values)
    }

    /// Return the number of rows (and columns).
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Return entry `(i, j)`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.size + j]
    }

    /// Invert with Gauss-Jordan elimination and partial pivoting.
    ///
    /// # Errors
    ///
    /// Returns [`MetricError::SingularMatrix`] if a pivot vanishes relative to
    /// the largest entry of the matrix, or the matrix holds non-finite values.
    pub fn inverse(&self) -> Result<Self, MetricError> {
        let n = self.size;
        let singular = || MetricError::SingularMatrix { size: n };
        let scale = self.values.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        if !scale.is_finite() || scale == 0.0 {
            return Err(singular());
        }
        let tolerance = scale * n as f64 * f64::EPSILON;

        let mut work = self.values.clone();
        let mut inv = Self::identity(n).values;
        for col in 0..n {
            let pivot_row = (col..n)
                .max_by(|&r, &s| work[r * n + col].abs().total_cmp(&work[s * n + col].abs()))
                .ok_or_else(singular)?;
            let pivot = work[pivot_row * n + col];
            if pivot.abs() <= tolerance {
                return Err(singular());
            }
            if pivot_row != col {
                for k in 0..n {
                    work.swap(pivot_row * n + k, col * n + k);
                    inv.swap(pivot_row * n + k, col * n + k);
                }
            }
            for k in 0..n {
                work[col * n + k] /= pivot;
                inv[col * n + k] /= pivot;
            }
            for row in (0..n).filter(|&r| r != col) {
                let factor = work[row * n + col];
                if factor == 0.0 {
                    continue;
                }
                for k in 0..n {
                    work[row * n + k] -= factor * work[col * n + k];
                    inv[row * n + k] -= factor * inv[col * n + k];
                }
            }
        }
        Ok(Self { size: n, values: inv })
    }

    /// `Σ_k (c · M)_k c_k` for a row vector `c`.
    fn quadratic_form(&self, c: &[f64]) -> f64 {
        (0..self.size)
            .map(|k| {
                let projected: f64 = c.iter().enumerate().map(|(l, cl)| cl * self.get(l, k)).sum();
                projected * c[k]
            })
            .sum()
    }
}

/// Mahalanobis distance under a fixed inverted covariance matrix.
///
/// The covariance spans the time steps of the sequence; every feature is
/// treated as a separate observation row and the quadratic forms are summed.
#[derive(Debug, Clone, PartialEq)]
pub struct Mahalanobis {
    inverted_cov: SquareMatrix,
}

impl Mahalanobis {
    /// Build from a covariance matrix, inverting it unless `inverted` is set.
    ///
    /// # Errors
    ///
    /// Returns [`MetricError::SingularMatrix`] if the matrix must be inverted and cannot be.
    pub fn from_covariance(cov: SquareMatrix, inverted: bool) -> Result<Self, MetricError> {
        let inverted_cov = if inverted { cov } else { cov.inverse()? };
        debug!(size = inverted_cov.size(), "mahalanobis matrix ready");
        Ok(Self { inverted_cov })
    }

    /// Return the inverted covariance matrix.
    #[must_use]
    pub fn inverted_cov(&self) -> &SquareMatrix {
        &self.inverted_cov
    }

    /// Return the sequence width this measure applies to.
    #[must_use]
    pub fn width(&self) -> usize {
        self.inverted_cov.size()
    }

    /// Compute `sqrt(Σ_rows (x - y) Σ⁻¹ (x - y)ᵀ)`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`MetricError::ShapeMismatch`] | `a` and `b` differ in shape |
    /// | [`MetricError::CovarianceMismatch`] | the width differs from the matrix size |
    pub fn distance(&self, a: SequenceView<'_>, b: SequenceView<'_>) -> Result<f64, MetricError> {
        if a.dim() != b.dim() || a.width() != b.width() {
            return Err(MetricError::ShapeMismatch {
                a: Shape { dim: a.dim(), width: a.width() },
                b: Shape { dim: b.dim(), width: b.width() },
            });
        }
        if a.width() != self.width() {
            return Err(MetricError::CovarianceMismatch {
                size: self.width(),
                width: a.width(),
            });
        }
        let dim = a.dim();
        let mut diff = vec![0.0; a.width()];
        let mut total = 0.0;
        for r in 0..dim {
            for (t, slot) in diff.iter_mut().enumerate() {
                *slot = a.values()[t * dim + r] - b.values()[t * dim + r];
            }
            total += self.inverted_cov.quadratic_form(&diff);
        }
        Ok(total.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paradist_dtw::Sequence;

    #[test]
    fn inverse_of_diagonal() {
        let m = SquareMatrix::new(2, vec![2.0, 0.0, 0.0, 4.0]).unwrap();
        let inv = m.inverse().unwrap();
        assert!((inv.get(0, 0) - 0.5).abs() < 1e-12);
        assert!((inv.get(1, 1) - 0.25).abs() < 1e-12);
        assert!(inv.get(0, 1).abs() < 1e-12);
    }

    #[test]
    fn inverse_needs_pivoting() {
        // [[0, 1], [1, 0]] is its own inverse
        let m = SquareMatrix::new(2, vec![0.0, 1.0, 1.0, 0.0]).unwrap();
        assert_eq!(m.inverse().unwrap(), m);
    }

    #[test]
    fn inverse_times_matrix_is_identity() {
        let m = SquareMatrix::from_rows(vec![
            vec![4.0, 7.0, 2.0],
            vec![3.0, 6.0, 1.0],
            vec![2.0, 5.0, 3.0],
        ])
        .unwrap();
        let inv = m.inverse().unwrap();
        for i in 0..3 {
            for j in 0..3 {
                let v: f64 = (0..3).map(|k| m.get(i, k) * inv.get(k, j)).sum();
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((v - expected).abs() < 1e-10, "({i},{j}) = {v}");
            }
        }
    }

    #[test]
    fn singular_matrix_rejected() {
        let m = SquareMatrix::new(2, vec![1.0, 2.0, 2.0, 4.0]).unwrap();
        assert!(matches!(m.inverse(), Err(MetricError::SingularMatrix { size: 2 })));
    }

    #[test]
    fn non_square_rows_rejected() {
        let result = SquareMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(result, Err(MetricError::InvalidArgument { .. })));
    }

    #[test]
    fn covariance_hand_computed() {
        let rows: [&[f64]; 3] = [&[1.0, 2.0], &[2.0, 4.0], &[3.0, 9.0]];
        let cov = SquareMatrix::covariance(&rows).unwrap();
        // means 2 and 5; var x = 1, var y = 13, cov = (−1·−3 + 0 + 1·4) / 2 = 3.5
        assert!((cov.get(0, 0) - 1.0).abs() < 1e-12);
        assert!((cov.get(1, 1) - 13.0).abs() < 1e-12);
        assert!((cov.get(0, 1) - 3.5).abs() < 1e-12);
        assert!((cov.get(1, 0) - 3.5).abs() < 1e-12);
    }

    #[test]
    fn identity_covariance_is_euclidean() {
        let a = Sequence::univariate(vec![0.0, 0.0, 0.0]).unwrap();
        let b = Sequence::univariate(vec![1.0, 2.0, 2.0]).unwrap();
        let m = Mahalanobis::from_covariance(SquareMatrix::identity(3), true).unwrap();
        let d = m.distance(a.as_view(), b.as_view()).unwrap();
        assert!((d - 3.0).abs() < 1e-12);
    }

    #[test]
    fn scaled_covariance() {
        // cov = diag(4, 1): first difference counts a quarter
        let a = Sequence::univariate(vec![0.0, 0.0]).unwrap();
        let b = Sequence::univariate(vec![2.0, 1.0]).unwrap();
        let cov = SquareMatrix::new(2, vec![4.0, 0.0, 0.0, 1.0]).unwrap();
        let m = Mahalanobis::from_covariance(cov, false).unwrap();
        let d = m.distance(a.as_view(), b.as_view()).unwrap();
        assert!((d - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn width_must_match_matrix() {
        let a = Sequence::univariate(vec![0.0, 0.0]).unwrap();
        let m = Mahalanobis::from_covariance(SquareMatrix::identity(3), true).unwrap();
        assert!(matches!(
            m.distance(a.as_view(), a.as_view()),
            Err(MetricError::CovarianceMismatch { size: 3, width: 2 })
        ));
    }
}
