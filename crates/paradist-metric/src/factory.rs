//! Name-keyed construction of [`Measure`] values.

use paradist_dtw::{Dtw, Normalization, Sequence, StepPattern, WarpingWindow};
use tracing::{debug, instrument, warn};

use crate::args::MetricArgs;
use crate::binary::BinaryFormula;
use crate::continuous::Formula;
use crate::error::MetricError;
use crate::mahalanobis::{Mahalanobis, SquareMatrix};
use crate::measure::Measure;

/// Builds measures by method name for one dataset.
///
/// The dataset is only consulted by `mahalanobis` without an explicit `cov`,
/// which derives the covariance from the data when it came from a matrix.
#[derive(Debug, Clone, Copy)]
pub struct MeasureFactory<'a> {
    series: &'a [Sequence],
    matrix_input: bool,
}

impl<'a> MeasureFactory<'a> {
    /// Create a factory for a list of sequences.
    #[must_use]
    pub fn new(series: &'a [Sequence]) -> Self {
        Self {
            series,
            matrix_input: false,
        }
    }

    /// Declare whether the sequences are the rows of one data matrix.
    #[must_use]
    pub fn with_matrix_input(mut self, matrix_input: bool) -> Self {
        self.matrix_input = matrix_input;
        self
    }

    /// Build the measure named `method`.
    ///
    /// Unknown names select `euclidean`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`MetricError::CustomRequiresCallable`] | `method` is `"custom"` |
    /// | [`MetricError::CovarianceRequiresMatrix`] | `mahalanobis` without `cov` on list input |
    /// | [`MetricError::SingularMatrix`] | the covariance matrix cannot be inverted |
    /// | [`MetricError::Dtw`] | `path.length` normalization with a 5-branch step pattern |
    #[instrument(skip(self, args), fields(n = self.series.len()))]
    pub fn create(&self, method: &str, args: &MetricArgs) -> Result<Measure, MetricError> {
        if let Some(formula) = Formula::from_name(method) {
            return Ok(Measure::Formula(formula));
        }
        if let Some(formula) = BinaryFormula::from_name(method) {
            return Ok(Measure::Binary(formula));
        }
        match method {
            "minkowski" => Ok(Measure::Minkowski { p: args.p() }),
            "mahalanobis" => self.mahalanobis(args).map(Measure::Mahalanobis),
            "dtw" => Ok(Measure::Dtw(dtw(args)?)),
            "custom" => Err(MetricError::CustomRequiresCallable),
            _ => {
                warn!(method, "unknown method, using euclidean");
                Ok(Measure::Formula(Formula::Euclidean))
            }
        }
    }

    fn mahalanobis(&self, args: &MetricArgs) -> Result<Mahalanobis, MetricError> {
        let cov = match args.cov() {
            Some(cov) => cov.clone(),
            None if self.matrix_input => {
                let rows: Vec<&[f64]> = self.series.iter().map(Sequence::values).collect();
                debug!(observations = rows.len(), "estimating covariance from data matrix");
                SquareMatrix::covariance(&rows)?
            }
            None => return Err(MetricError::CovarianceRequiresMatrix),
        };
        Mahalanobis::from_covariance(cov, args.inverted())
    }
}

fn dtw(args: &MetricArgs) -> Result<Dtw, MetricError> {
    let pattern = args.step_pattern().map_or(StepPattern::default(), StepPattern::parse);
    let window = WarpingWindow::from_size(args.window_size());
    let normalization = args.norm_method().map_or(Normalization::None, Normalization::parse);
    debug!(%pattern, ?window, ?normalization, "configuring dtw");
    Ok(Dtw::configure(pattern, window, normalization)?)
}
