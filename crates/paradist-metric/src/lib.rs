//! Pairwise distance measures and their parallel evaluation.
//!
//! Provides the closed-form formula catalog, Mahalanobis and DTW measures,
//! name-keyed measure construction, and a rayon scheduler that fills a packed
//! triangular distance vector.

mod args;
mod binary;
mod continuous;
mod dist;
mod error;
mod factory;
mod mahalanobis;
mod measure;
mod pairwise;

pub use args::MetricArgs;
pub use binary::{BinaryCount, BinaryFormula};
pub use continuous::{Formula, minkowski, similarity_to_distance};
pub use dist::{DistVector, pair_index};
pub use error::{MetricError, Shape};
pub use factory::MeasureFactory;
pub use mahalanobis::{Mahalanobis, SquareMatrix};
pub use measure::{CustomMeasure, Measure};
