//! Error types for sequence validation and DTW computation.

/// Errors from sequence construction and DTW distance computation.
#[derive(Debug, thiserror::Error)]
pub enum DtwError {
    /// Returned when a sequence has no time steps.
    #[error("sequence must have at least one time step")]
    EmptySequence,

    /// Returned when a sequence is declared with zero features per time step.
    #[error("sequence feature dimensionality must be at least 1")]
    ZeroDimension,

    /// Returned when the flat value count is not a multiple of the feature dimensionality.
    #[error("{len} values cannot be split into columns of {dim} features")]
    RaggedValues {
        /// Number of values supplied.
        len: usize,
        /// Declared feature dimensionality.
        dim: usize,
    },

    /// Returned when columns passed to [`Sequence::from_columns`](crate::Sequence::from_columns)
    /// differ in length.
    #[error("column {index} has {got} features, expected {expected}")]
    RaggedColumn {
        /// Zero-based time step of the offending column.
        index: usize,
        /// Feature count of the first column.
        expected: usize,
        /// Feature count of the offending column.
        got: usize,
    },

    /// Returned when the two compared sequences have different feature dimensionality.
    #[error("feature dimensionality differs: {a} vs {b}")]
    DimensionMismatch {
        /// Feature count of the first sequence.
        a: usize,
        /// Feature count of the second sequence.
        b: usize,
    },

    /// Returned when a cost or backtrace buffer cannot be allocated.
    #[error("cannot allocate DP buffer of {rows}x{cols} cells")]
    AllocationFailure {
        /// Requested row count (including pattern offset).
        rows: usize,
        /// Requested column count (including pattern offset).
        cols: usize,
    },

    /// Returned when path reconstruction is requested for a step pattern whose
    /// branch indices have no single-step backward decoding.
    #[error("step pattern {pattern} has {branches} branches; path reconstruction is only defined for 3-branch patterns")]
    UnsupportedBacktrace {
        /// Name of the step pattern.
        pattern: &'static str,
        /// Number of branches of the pattern.
        branches: usize,
    },

    /// Returned by strict step pattern parsing for a name outside the catalog.
    #[error("unknown step pattern \"{name}\"")]
    UnknownStepPattern {
        /// The unrecognized name.
        name: String,
    },
}
