//! Typed view of the string-keyed measure arguments.

use tracing::warn;

use crate::error::MetricError;
use crate::mahalanobis::SquareMatrix;

/// Arguments consumed by [`MeasureFactory::create`](crate::MeasureFactory::create).
///
/// | Key | Type | Used by |
/// |---|---|---|
/// | `window.size` | unsigned integer | `dtw` |
/// | `norm.method` | `n`, `n+m` or `path.length` | `dtw` |
/// | `step.pattern` | step pattern name | `dtw` |
/// | `p` | float, default 2 | `minkowski` |
/// | `cov` | square matrix, rows separated by `;`, entries by `,` | `mahalanobis` |
/// | `inverted` | bool | `mahalanobis` |
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricArgs {
    window_size: Option<usize>,
    norm_method: Option<String>,
    step_pattern: Option<String>,
    p: Option<f64>,
    cov: Option<SquareMatrix>,
    inverted: bool,
}

impl MetricArgs {
    /// Create an empty argument set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse textual `key=value` pairs. Unknown keys are ignored with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`MetricError::InvalidArgument`] if a known key has an unparseable value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, MetricError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut args = Self::default();
        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref().trim());
            let invalid = |reason| MetricError::InvalidArgument {
                key: key.to_string(),
                value: value.to_string(),
                reason,
            };
            match key {
                "window.size" => {
                    args.window_size = Some(value.parse().map_err(|_| invalid("expected an unsigned integer"))?);
                }
                "norm.method" => args.norm_method = Some(value.to_string()),
                "step.pattern" => args.step_pattern = Some(value.to_string()),
                "p" => args.p = Some(value.parse().map_err(|_| invalid("expected a number"))?),
                "cov" => args.cov = Some(parse_matrix(value).ok_or_else(|| invalid("expected rows like `1,0;0,1`"))??),
                "inverted" => args.inverted = parse_bool(value).ok_or_else(|| invalid("expected true or false"))?,
                _ => warn!(key, "ignoring unknown measure argument"),
            }
        }
        Ok(args)
    }

    /// Set the DTW warping window size.
    #[must_use]
    pub fn with_window_size(mut self, size: usize) -> Self {
        self.window_size = Some(size);
        self
    }

    /// Set the DTW normalization method.
    #[must_use]
    pub fn with_norm_method(mut self, method: impl Into<String>) -> Self {
        self.norm_method = Some(method.into());
        self
    }

    /// Set the DTW step pattern name.
    #[must_use]
    pub fn with_step_pattern(mut self, name: impl Into<String>) -> Self {
        self.step_pattern = Some(name.into());
        self
    }

    /// Set the Minkowski order.
    #[must_use]
    pub fn with_p(mut self, p: f64) -> Self {
        self.p = Some(p);
        self
    }

    /// Set the Mahalanobis covariance matrix.
    #[must_use]
    pub fn with_cov(mut self, cov: SquareMatrix) -> Self {
        self.cov = Some(cov);
        self
    }

    /// Declare the covariance matrix as already inverted.
    #[must_use]
    pub fn with_inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }

    #[must_use]
    pub fn window_size(&self) -> Option<usize> {
        self.window_size
    }

    #[must_use]
    pub fn norm_method(&self) -> Option<&str> {
        self.norm_method.as_deref()
    }

    #[must_use]
    pub fn step_pattern(&self) -> Option<&str> {
        self.step_pattern.as_deref()
    }

    /// Return the Minkowski order, 2 if unset.
    #[must_use]
    pub fn p(&self) -> f64 {
        self.p.unwrap_or(2.0)
    }

    #[must_use]
    pub fn cov(&self) -> Option<&SquareMatrix> {
        self.cov.as_ref()
    }

    #[must_use]
    pub fn inverted(&self) -> bool {
        self.inverted
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" => Some(true),
        "false" | "f" | "0" => Some(false),
        _ => None,
    }
}

/// `None` if a cell is not a number; `Some(Err)` if the rows do not form a square.
fn parse_matrix(value: &str) -> Option<Result<SquareMatrix, MetricError>> {
    let mut rows = Vec::new();
    for row in value.split(';') {
        let cells: Option<Vec<f64>> = row.split(',').map(|c| c.trim().parse().ok()).collect();
        rows.push(cells?);
    }
    Some(SquareMatrix::from_rows(rows))
}
