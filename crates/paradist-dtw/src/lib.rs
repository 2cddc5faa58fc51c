//! Dynamic time warping over multivariate sequences.
//!
//! Pure math library, zero I/O. Provides a banded DTW engine parameterized
//! by a step pattern catalog, an optional warping window and a cost
//! normalization, plus warp path reconstruction.

mod engine;
mod error;
mod grid;
mod local_cost;
mod normalization;
mod path;
mod sequence;
mod step_pattern;
mod window;

pub use engine::Dtw;
pub use error::DtwError;
pub use local_cost::LocalCost;
pub use normalization::Normalization;
pub use path::{WarpPath, WarpingStep};
pub use sequence::{Sequence, SequenceView};
pub use step_pattern::{Branch, StepPattern, Term};
pub use window::WarpingWindow;
