//! Parallel computation of every pairwise distance.

use paradist_dtw::{Sequence, SequenceView};
use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::dist::DistVector;
use crate::error::MetricError;
use crate::measure::Measure;

impl Measure {
    /// Compute the distances of all unique pairs of `series`.
    ///
    /// The value stored for pair `(i, j)`, `i < j`, is
    /// `self.distance(series[j], series[i])`. Rows of the triangle are
    /// distributed over the rayon pool, each worker writing its own disjoint
    /// slice of the output. Non-finite distances are stored as computed.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`MetricError::IncompatibleSequence`] | a sequence cannot be compared under this measure |
    /// | [`MetricError::AllocationFailure`] | the output vector cannot be allocated |
    /// | any error of [`Measure::distance`] | the first failing pair aborts the batch |
    #[instrument(skip(self, series), fields(n = series.len(), method = self.name()))]
    pub fn pairwise(&self, series: &[Sequence]) -> Result<DistVector, MetricError> {
        self.check_compatible(series)?;

        let n = series.len();
        let len = n * n.saturating_sub(1) / 2;
        let mut values = Vec::new();
        values
            .try_reserve_exact(len)
            .map_err(|_| MetricError::AllocationFailure { len })?;
        values.resize(len, 0.0);

        let views: Vec<SequenceView<'_>> = series.iter().map(Sequence::as_view).collect();

        // Row i holds the pairs (i, i+1) .. (i, n-1).
        let mut rows: Vec<(usize, &mut [f64])> = Vec::with_capacity(n);
        let mut rest: &mut [f64] = &mut values;
        for i in 0..n.saturating_sub(1) {
            let (row, tail) = std::mem::take(&mut rest).split_at_mut(n - 1 - i);
            rows.push((i, row));
            rest = tail;
        }
        debug!(rows = rows.len(), pairs = len, "dispatching rows");

        rows.into_par_iter().try_for_each(|(i, row)| {
            for (offset, slot) in row.iter_mut().enumerate() {
                let j = i + 1 + offset;
                *slot = self.distance(views[j], views[i])?;
            }
            Ok::<(), MetricError>(())
        })?;

        info!(pairs = len, "pairwise distances computed");
        Ok(DistVector::new(n, values, self.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::continuous::Formula;
    use crate::dist::pair_index;
    use paradist_dtw::{Dtw, Normalization, StepPattern, WarpingWindow};

    fn seq(values: &[f64]) -> Sequence {
        Sequence::univariate(values.to_vec()).unwrap()
    }

    #[test]
    fn pairwise_matches_individual() {
        let series = vec![
            seq(&[1.0, 2.0, 3.0]),
            seq(&[4.0, 5.0, 6.0]),
            seq(&[1.0, 3.0, 2.0]),
            seq(&[0.0, 0.0, 1.0]),
        ];
        let measure = Measure::Formula(Formula::Manhattan);
        let dist = measure.pairwise(&series).unwrap();

        assert_eq!(dist.len(), 4);
        assert_eq!(dist.values().len(), 6);
        for i in 0..4 {
            for j in i + 1..4 {
                let direct = measure.distance(series[j].as_view(), series[i].as_view()).unwrap();
                assert!((dist.values()[pair_index(i, j, 4)] - direct).abs() < 1e-10);
            }
        }
        assert_eq!(dist.method(), "manhattan");
    }

    #[test]
    fn later_sequence_is_passed_first() {
        // d(a, b) = 1 and d(b, a) = 0 under the asymmetric pattern
        let series = vec![seq(&[0.0, 1.0, 2.0]), seq(&[0.0, 2.0])];
        let dtw = Dtw::configure(
            StepPattern::Asymmetric,
            WarpingWindow::Unconstrained,
            Normalization::None,
        )
        .unwrap();
        let dist = Measure::Dtw(dtw).pairwise(&series).unwrap();
        assert!(dist.get(0, 1).abs() < 1e-10);
    }

    #[test]
    fn custom_measure_sees_row_and_column() {
        let series: Vec<Sequence> = (0..5).map(|k| seq(&[f64::from(k)])).collect();
        let measure = Measure::custom(|a, b| a.values()[0] * 10.0 + b.values()[0]);
        let dist = measure.pairwise(&series).unwrap();
        for (i, j, d) in dist.iter() {
            assert_eq!(d, (j * 10 + i) as f64);
        }
    }

    #[test]
    fn small_inputs() {
        let measure = Measure::Formula(Formula::Euclidean);
        let none = measure.pairwise(&[]).unwrap();
        assert!(none.is_empty());
        assert!(none.values().is_empty());

        let one = measure.pairwise(&[seq(&[1.0])]).unwrap();
        assert_eq!(one.len(), 1);
        assert!(one.values().is_empty());
    }

    #[test]
    fn incompatible_input_fails_before_computing() {
        let series = vec![seq(&[1.0, 2.0]), seq(&[1.0, 2.0, 3.0])];
        let result = Measure::Formula(Formula::Euclidean).pairwise(&series);
        assert!(matches!(result, Err(MetricError::IncompatibleSequence { index: 1, .. })));
    }

    #[test]
    fn non_finite_values_are_stored() {
        let series = vec![seq(&[f64::NAN, 1.0]), seq(&[0.0, 1.0]), seq(&[0.0, 2.0])];
        let dist = Measure::Formula(Formula::Euclidean).pairwise(&series).unwrap();
        assert!(dist.get(0, 1).is_nan());
        assert!(dist.get(0, 2).is_nan());
        assert!((dist.get(1, 2) - 1.0).abs() < 1e-10);
    }
}
