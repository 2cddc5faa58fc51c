//! Sequence types: column-major feature matrices with shape guarantees.

use crate::error::DtwError;

/// Owned sequence of feature columns.
///
/// Values are stored column-major: column `t` (one time step) occupies
/// `values[t * dim..(t + 1) * dim]`. Guaranteed to have at least one column
/// and at least one feature. Values are not required to be finite; NaN and
/// infinities propagate through every distance computation.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    dim: usize,
    values: Vec<f64>,
}

impl Sequence {
    /// Create a sequence from column-major values with `dim` features per column.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::ZeroDimension`] | `dim` is zero |
    /// | [`DtwError::EmptySequence`] | `values` is empty |
    /// | [`DtwError::RaggedValues`] | `values.len()` is not a multiple of `dim` |
    pub fn new(dim: usize, values: Vec<f64>) -> Result<Self, DtwError> {
        validate_shape(dim, values.len())?;
        Ok(Self { dim, values })
    }

    /// Create a single-feature sequence, one value per time step.
    ///
    /// # Errors
    ///
    /// Returns [`DtwError::EmptySequence`] if `values` is empty.
    pub fn univariate(values: Vec<f64>) -> Result<Self, DtwError> {
        Self::new(1, values)
    }

    /// Create a sequence from explicit columns, one `Vec` per time step.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptySequence`] | `columns` is empty |
    /// | [`DtwError::ZeroDimension`] | the first column is empty |
    /// | [`DtwError::RaggedColumn`] | a column differs in length from the first |
    pub fn from_columns(columns: Vec<Vec<f64>>) -> Result<Self, DtwError> {
        let dim = columns.first().ok_or(DtwError::EmptySequence)?.len();
        if dim == 0 {
            return Err(DtwError::ZeroDimension);
        }
        let mut values = Vec::with_capacity(dim * columns.len());
        for (index, column) in columns.into_iter().enumerate() {
            if column.len() != dim {
                return Err(DtwError::RaggedColumn {
                    index,
                    expected: dim,
                    got: column.len(),
                });
            }
            values.extend(column);
        }
        Ok(Self { dim, values })
    }

    /// Borrow this sequence as a zero-copy view.
    #[must_use]
    pub fn as_view(&self) -> SequenceView<'_> {
        SequenceView {
            dim: self.dim,
            values: &self.values,
        }
    }

    /// Return the number of time steps (columns).
    #[must_use]
    pub fn width(&self) -> usize {
        self.values.len() / self.dim
    }

    /// Return the number of features per time step.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Return all values in column-major order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Consume and return the column-major values.
    #[must_use]
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

impl TryFrom<Vec<f64>> for Sequence {
    type Error = DtwError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::univariate(values)
    }
}

/// Borrowed view of a sequence. `Copy`, so it can be passed freely to workers.
#[derive(Debug, Clone, Copy)]
pub struct SequenceView<'a> {
    dim: usize,
    values: &'a [f64],
}

impl<'a> SequenceView<'a> {
    /// Create a view over column-major values, validating the shape.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Sequence::new`].
    pub fn new(dim: usize, values: &'a [f64]) -> Result<Self, DtwError> {
        validate_shape(dim, values.len())?;
        Ok(Self { dim, values })
    }

    /// Return the number of time steps (columns).
    #[must_use]
    pub fn width(&self) -> usize {
        self.values.len() / self.dim
    }

    /// Return the number of features per time step.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Return all values in column-major order.
    #[must_use]
    pub fn values(&self) -> &'a [f64] {
        self.values
    }

    /// Return the features of time step `t`.
    ///
    /// # Panics
    ///
    /// Panics if `t >= self.width()`.
    #[must_use]
    pub fn column(&self, t: usize) -> &'a [f64] {
        &self.values[t * self.dim..(t + 1) * self.dim]
    }

    /// Iterate over the first feature of every time step.
    pub fn first_feature(&self) -> impl Iterator<Item = f64> + 'a {
        self.values.iter().step_by(self.dim).copied()
    }
}

fn validate_shape(dim: usize, len: usize) -> Result<(), DtwError> {
    if dim == 0 {
        return Err(DtwError::ZeroDimension);
    }
    if len == 0 {
        return Err(DtwError::EmptySequence);
    }
    if len % dim != 0 {
        return Err(DtwError::RaggedValues { len, dim });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_values() {
        let result = Sequence::univariate(vec![]);
        assert!(matches!(result, Err(DtwError::EmptySequence)));
    }

    #[test]
    fn rejects_zero_dimension() {
        let result = Sequence::new(0, vec![1.0]);
        assert!(matches!(result, Err(DtwError::ZeroDimension)));
    }

    #[test]
    fn rejects_ragged_values() {
        let result = Sequence::new(2, vec![1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(DtwError::RaggedValues { len: 3, dim: 2 })));
    }

    #[test]
    fn accepts_non_finite_values() {
        let seq = Sequence::univariate(vec![1.0, f64::NAN, f64::INFINITY]).unwrap();
        assert_eq!(seq.width(), 3);
        assert!(seq.values()[1].is_nan());
    }

    #[test]
    fn columns_are_contiguous() {
        let seq = Sequence::new(2, vec![1.0, 10.0, 2.0, 20.0, 3.0, 30.0]).unwrap();
        let view = seq.as_view();
        assert_eq!(view.width(), 3);
        assert_eq!(view.dim(), 2);
        assert_eq!(view.column(1), &[2.0, 20.0]);
        assert_eq!(view.first_feature().collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn from_columns_builds_column_major() {
        let seq = Sequence::from_columns(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(seq.values(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(seq.dim(), 2);
    }

    #[test]
    fn from_columns_rejects_ragged() {
        let result = Sequence::from_columns(vec![vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(
            result,
            Err(DtwError::RaggedColumn { index: 1, expected: 2, got: 1 })
        ));
    }

    #[test]
    fn view_rejects_empty() {
        let result = SequenceView::new(1, &[]);
        assert!(matches!(result, Err(DtwError::EmptySequence)));
    }

    #[test]
    fn try_from_vec() {
        let seq: Result<Sequence, _> = vec![1.0, 2.0].try_into();
        assert_eq!(seq.unwrap().width(), 2);
    }
}
