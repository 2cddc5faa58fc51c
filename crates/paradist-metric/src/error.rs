use std::fmt;

use paradist_dtw::DtwError;

/// Shape of a sequence: features per time step and number of time steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    /// Features per time step.
    pub dim: usize,
    /// Number of time steps.
    pub width: usize,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.dim, self.width)
    }
}

/// Errors from measure construction and pairwise distance computation.
#[derive(Debug, thiserror::Error)]
pub enum MetricError {
    /// Wraps an error raised by the DTW engine.
    #[error("DTW error: {0}")]
    Dtw(#[from] DtwError),

    /// Returned when a closed-form measure is applied to sequences of different shape.
    #[error("closed-form measures need equal shapes, got {a} and {b}")]
    ShapeMismatch {
        /// Shape of the first sequence.
        a: Shape,
        /// Shape of the second sequence.
        b: Shape,
    },

    /// Returned by the batch pre-check when a sequence cannot be compared with the first one.
    #[error("sequence {index} has shape {got}, expected {expected}")]
    IncompatibleSequence {
        /// Zero-based position of the offending sequence.
        index: usize,
        /// Shape required by the measure.
        expected: Shape,
        /// Shape of the offending sequence.
        got: Shape,
    },

    /// Returned when a textual argument cannot be parsed.
    #[error("invalid value \"{value}\" for argument \"{key}\": {reason}")]
    InvalidArgument {
        /// Argument name.
        key: String,
        /// Raw value supplied.
        value: String,
        /// What was expected.
        reason: &'static str,
    },

    /// Returned when a covariance matrix cannot be inverted.
    #[error("covariance matrix of size {size} is singular")]
    SingularMatrix {
        /// Number of rows (and columns).
        size: usize,
    },

    /// Returned when Mahalanobis needs a covariance matrix but the data did not come from a matrix.
    #[error("computing the covariance matrix is only supported for matrix input; pass `cov` explicitly")]
    CovarianceRequiresMatrix,

    /// Returned when the covariance size differs from the sequence width.
    #[error("covariance matrix of size {size} cannot be applied to sequences of width {width}")]
    CovarianceMismatch {
        /// Size of the (inverted) covariance matrix.
        size: usize,
        /// Width of the compared sequences.
        width: usize,
    },

    /// Returned when `"custom"` is requested by name.
    #[error("the custom measure needs a callable; build it with Measure::custom")]
    CustomRequiresCallable,

    /// Returned when the label count does not match the number of sequences.
    #[error("got {got} labels for {expected} sequences")]
    LabelCount {
        /// Number of sequences.
        expected: usize,
        /// Number of labels supplied.
        got: usize,
    },

    /// Returned when the output buffer cannot be allocated.
    #[error("cannot allocate output buffer of {len} distances")]
    AllocationFailure {
        /// Requested number of distances.
        len: usize,
    },
}
