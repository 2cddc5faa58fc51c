//! The distance measure applied to every pair.

use std::fmt;
use std::sync::Arc;

use paradist_dtw::{Dtw, Sequence, SequenceView};

use crate::binary::BinaryFormula;
use crate::continuous::{Formula, minkowski};
use crate::error::{MetricError, Shape};
use crate::mahalanobis::Mahalanobis;

type CustomFn = dyn Fn(SequenceView<'_>, SequenceView<'_>) -> f64 + Send + Sync;

/// User-supplied distance function.
#[derive(Clone)]
pub struct CustomMeasure(Arc<CustomFn>);

impl CustomMeasure {
    fn call(&self, a: SequenceView<'_>, b: SequenceView<'_>) -> f64 {
        (self.0)(a, b)
    }
}

impl fmt::Debug for CustomMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomMeasure(..)")
    }
}

/// Immutable, thread-safe pairwise distance measure.
///
/// Built by [`MeasureFactory`](crate::MeasureFactory) from a method name, or
/// directly from its parts.
#[derive(Debug, Clone)]
pub enum Measure {
    /// Parameter-free closed-form formula.
    Formula(Formula),
    /// Presence/absence formula.
    Binary(BinaryFormula),
    /// Minkowski distance of order `p`.
    Minkowski {
        /// Order of the norm.
        p: f64,
    },
    /// Mahalanobis distance with a fixed inverted covariance.
    Mahalanobis(Mahalanobis),
    /// Dynamic time warping.
    Dtw(Dtw),
    /// User-supplied function.
    Custom(CustomMeasure),
}

impl Measure {
    /// Wrap a distance function.
    ///
    /// The function receives `(a, b)` exactly as the scheduler passes them and
    /// is not shape-checked.
    #[must_use]
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(SequenceView<'_>, SequenceView<'_>) -> f64 + Send + Sync + 'static,
    {
        Self::Custom(CustomMeasure(Arc::new(f)))
    }

    /// Return the method name recorded in the output.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Formula(f) => f.name(),
            Self::Binary(f) => f.name(),
            Self::Minkowski { .. } => "minkowski",
            Self::Mahalanobis(_) => "mahalanobis",
            Self::Dtw(_) => "dtw",
            Self::Custom(_) => "custom",
        }
    }

    /// Compute the distance between two sequences.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`MetricError::ShapeMismatch`] | closed-form measure on sequences of different shape |
    /// | [`MetricError::CovarianceMismatch`] | Mahalanobis on sequences whose width differs from the matrix |
    /// | [`MetricError::Dtw`] | the DTW engine failed |
    pub fn distance(&self, a: SequenceView<'_>, b: SequenceView<'_>) -> Result<f64, MetricError> {
        match self {
            Self::Formula(f) => {
                same_shape(a, b)?;
                Ok(f.evaluate(a, b))
            }
            Self::Binary(f) => {
                same_shape(a, b)?;
                Ok(f.evaluate(a, b))
            }
            Self::Minkowski { p } => {
                same_shape(a, b)?;
                Ok(minkowski(a, b, *p))
            }
            Self::Mahalanobis(m) => m.distance(a, b),
            Self::Dtw(dtw) => Ok(dtw.distance(a, b)?),
            Self::Custom(f) => Ok(f.call(a, b)),
        }
    }

    /// Check that every sequence can be compared with the first one.
    ///
    /// DTW only needs a common feature count; closed-form measures need a
    /// common shape, and Mahalanobis a width matching its matrix. Custom
    /// measures accept anything.
    ///
    /// # Errors
    ///
    /// Returns [`MetricError::IncompatibleSequence`] for the first offending sequence.
    pub fn check_compatible(&self, series: &[Sequence]) -> Result<(), MetricError> {
        let Some(first) = series.first() else {
            return Ok(());
        };
        let expected = match self {
            Self::Custom(_) => return Ok(()),
            Self::Mahalanobis(m) => Shape {
                dim: first.dim(),
                width: m.width(),
            },
            _ => shape(first.as_view()),
        };
        for (index, s) in series.iter().enumerate() {
            let got = shape(s.as_view());
            let compatible = match self {
                Self::Dtw(_) => got.dim == expected.dim,
                _ => got == expected,
            };
            if !compatible {
                let expected = match self {
                    Self::Dtw(_) => Shape {
                        dim: expected.dim,
                        width: got.width,
                    },
                    _ => expected,
                };
                return Err(MetricError::IncompatibleSequence {
                    index,
                    expected,
                    got,
                });
            }
        }
        Ok(())
    }
}

impl From<Dtw> for Measure {
    fn from(dtw: Dtw) -> Self {
        Self::Dtw(dtw)
    }
}

fn shape(s: SequenceView<'_>) -> Shape {
    Shape {
        dim: s.dim(),
        width: s.width(),
    }
}

fn same_shape(a: SequenceView<'_>, b: SequenceView<'_>) -> Result<(), MetricError> {
    let (sa, sb) = (shape(a), shape(b));
    if sa == sb {
        Ok(())
    } else {
        Err(MetricError::ShapeMismatch { a: sa, b: sb })
    }
}
