//! Step pattern catalog: the local recurrence rules of the DP fill.
//!
//! Every pattern is a list of branches. A branch extends the accumulated cost
//! of one earlier cell `g[i - from.0, j - from.1]` with a weighted sum of
//! local costs `weight * d[i - di, j - dj]`. The engine keeps the cheapest
//! branch at each cell.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::error::DtwError;

/// A weighted local-cost term `weight * d[i - di, j - dj]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Term {
    /// Row distance back from the current cell.
    pub di: usize,
    /// Column distance back from the current cell.
    pub dj: usize,
    /// Multiplier applied to the local cost.
    pub weight: f64,
}

/// One alternative of a step pattern recurrence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Branch {
    /// Offset `(Δi, Δj)` of the referenced accumulated-cost cell.
    pub from: (usize, usize),
    /// Local-cost terms added on top of the referenced cell, in summation order.
    pub terms: &'static [Term],
}

const fn t(di: usize, dj: usize, weight: f64) -> Term {
    Term { di, dj, weight }
}

const fn b(from: (usize, usize), terms: &'static [Term]) -> Branch {
    Branch { from, terms }
}

const THIRD: f64 = 1.0 / 3.0;
const TWO_THIRDS: f64 = 2.0 / 3.0;

// g[i,j] = min(g[i-1,j-1] + d[i,j], g[i,j-1] + d[i,j], g[i-1,j] + d[i,j])
const SYMMETRIC1: &[Branch] = &[
    b((1, 1), &[t(0, 0, 1.0)]),
    b((0, 1), &[t(0, 0, 1.0)]),
    b((1, 0), &[t(0, 0, 1.0)]),
];

const SYMMETRIC2: &[Branch] = &[
    b((1, 1), &[t(0, 0, 2.0)]),
    b((0, 1), &[t(0, 0, 1.0)]),
    b((1, 0), &[t(0, 0, 1.0)]),
];

const ASYMMETRIC: &[Branch] = &[
    b((1, 0), &[t(0, 0, 1.0)]),
    b((1, 1), &[t(0, 0, 1.0)]),
    b((1, 2), &[t(0, 0, 1.0)]),
];

// The horizontal branch is free: no term at all, so an infinite local cost
// cannot turn it into NaN.
const ASYMMETRIC_P0: &[Branch] = &[
    b((0, 1), &[]),
    b((1, 1), &[t(0, 0, 1.0)]),
    b((1, 0), &[t(0, 0, 1.0)]),
];

const ASYMMETRIC_P05: &[Branch] = &[
    b((1, 3), &[t(0, 2, THIRD), t(0, 1, THIRD), t(0, 0, THIRD)]),
    b((1, 2), &[t(0, 1, 0.5), t(0, 0, 0.5)]),
    b((1, 1), &[t(0, 0, 1.0)]),
    b((2, 1), &[t(1, 0, 1.0), t(0, 0, 1.0)]),
    b((3, 1), &[t(2, 0, 1.0), t(1, 0, 1.0), t(0, 0, 1.0)]),
];

const SYMMETRIC_P05: &[Branch] = &[
    b((1, 3), &[t(0, 2, 2.0), t(0, 1, 1.0), t(0, 0, 1.0)]),
    b((1, 2), &[t(0, 1, 2.0), t(0, 0, 1.0)]),
    b((1, 1), &[t(0, 0, 2.0)]),
    b((2, 1), &[t(1, 0, 2.0), t(0, 0, 1.0)]),
    b((3, 1), &[t(2, 0, 2.0), t(1, 0, 1.0), t(0, 0, 1.0)]),
];

const ASYMMETRIC_P1: &[Branch] = &[
    b((1, 2), &[t(0, 1, 0.5), t(0, 0, 0.5)]),
    b((1, 1), &[t(0, 0, 1.0)]),
    b((2, 1), &[t(1, 0, 1.0), t(0, 0, 1.0)]),
];

const SYMMETRIC_P1: &[Branch] = &[
    b((1, 2), &[t(0, 1, 2.0), t(0, 0, 1.0)]),
    b((1, 1), &[t(0, 0, 2.0)]),
    b((2, 1), &[t(1, 0, 2.0), t(0, 0, 1.0)]),
];

const ASYMMETRIC_P2: &[Branch] = &[
    b((2, 3), &[t(1, 2, TWO_THIRDS), t(0, 1, TWO_THIRDS), t(0, 0, TWO_THIRDS)]),
    b((1, 1), &[t(0, 0, 1.0)]),
    b((3, 2), &[t(2, 1, 1.0), t(1, 0, 1.0), t(0, 0, 1.0)]),
];

const SYMMETRIC_P2: &[Branch] = &[
    b((2, 3), &[t(1, 2, 2.0), t(0, 1, 2.0), t(0, 0, 1.0)]),
    b((1, 1), &[t(0, 0, 2.0)]),
    b((3, 2), &[t(2, 1, 2.0), t(1, 0, 2.0), t(0, 0, 1.0)]),
];

/// Named local recurrence rule used to fill the DTW cost matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StepPattern {
    /// Unit-weight diagonal, horizontal and vertical steps.
    #[default]
    Symmetric1,
    /// Like [`StepPattern::Symmetric1`] with the diagonal step weighted twice.
    Symmetric2,
    /// Every step advances the first sequence by exactly one element.
    Asymmetric,
    /// Asymmetric pattern with a free horizontal step.
    AsymmetricP0,
    /// Slope-constrained asymmetric pattern, P = 1/2.
    AsymmetricP05,
    /// Slope-constrained symmetric pattern, P = 1/2.
    SymmetricP05,
    /// Slope-constrained asymmetric pattern, P = 1.
    AsymmetricP1,
    /// Slope-constrained symmetric pattern, P = 1.
    SymmetricP1,
    /// Slope-constrained asymmetric pattern, P = 2.
    AsymmetricP2,
    /// Slope-constrained symmetric pattern, P = 2.
    SymmetricP2,
}

impl StepPattern {
    /// Every pattern in the catalog.
    pub const ALL: [StepPattern; 10] = [
        Self::Symmetric1,
        Self::Symmetric2,
        Self::Asymmetric,
        Self::AsymmetricP0,
        Self::AsymmetricP05,
        Self::SymmetricP05,
        Self::AsymmetricP1,
        Self::SymmetricP1,
        Self::AsymmetricP2,
        Self::SymmetricP2,
    ];

    /// Return the catalog name of the pattern.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Symmetric1 => "symmetric1",
            Self::Symmetric2 => "symmetric2",
            Self::Asymmetric => "asymmetric",
            Self::AsymmetricP0 => "asymmetricP0",
            Self::AsymmetricP05 => "asymmetricP05",
            Self::SymmetricP05 => "symmetricP05",
            Self::AsymmetricP1 => "asymmetricP1",
            Self::SymmetricP1 => "symmetricP1",
            Self::AsymmetricP2 => "asymmetricP2",
            Self::SymmetricP2 => "symmetricP2",
        }
    }

    /// Return the number of padding rows/columns the recurrence needs.
    ///
    /// No branch of the pattern reaches further back than this offset.
    #[must_use]
    pub fn offset(self) -> usize {
        match self {
            Self::Symmetric1 | Self::Symmetric2 | Self::AsymmetricP0 => 1,
            Self::Asymmetric | Self::AsymmetricP1 | Self::SymmetricP1 => 2,
            Self::AsymmetricP05 | Self::SymmetricP05 | Self::AsymmetricP2 | Self::SymmetricP2 => 3,
        }
    }

    /// Return the ordered branches of the recurrence.
    #[must_use]
    pub fn branches(self) -> &'static [Branch] {
        match self {
            Self::Symmetric1 => SYMMETRIC1,
            Self::Symmetric2 => SYMMETRIC2,
            Self::Asymmetric => ASYMMETRIC,
            Self::AsymmetricP0 => ASYMMETRIC_P0,
            Self::AsymmetricP05 => ASYMMETRIC_P05,
            Self::SymmetricP05 => SYMMETRIC_P05,
            Self::AsymmetricP1 => ASYMMETRIC_P1,
            Self::SymmetricP1 => SYMMETRIC_P1,
            Self::AsymmetricP2 => ASYMMETRIC_P2,
            Self::SymmetricP2 => SYMMETRIC_P2,
        }
    }

    /// Return true if swapping the two inputs leaves the distance unchanged.
    #[must_use]
    pub fn is_symmetric(self) -> bool {
        matches!(
            self,
            Self::Symmetric1
                | Self::Symmetric2
                | Self::SymmetricP05
                | Self::SymmetricP1
                | Self::SymmetricP2
        )
    }

    /// Return true if the winning branch index decodes to a single backward step.
    ///
    /// Only 3-branch patterns have this property.
    #[must_use]
    pub fn supports_backtrace(self) -> bool {
        self.branches().len() == 3
    }

    /// Resolve a catalog name, falling back to [`StepPattern::Symmetric1`].
    ///
    /// `"symmetricP0"` is accepted as an alias of `"symmetric2"`. Unknown names
    /// are not an error: they select the default pattern and log a warning.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.parse() {
            Ok(pattern) => pattern,
            Err(_) => {
                warn!(name, "unknown step pattern, using symmetric1");
                Self::Symmetric1
            }
        }
    }

    /// Evaluate every branch at cell `(i, j)` and return the cheapest total
    /// cost together with the index of the winning branch.
    ///
    /// Ties keep the earliest branch. A NaN candidate never replaces the
    /// incumbent. `cell` reads accumulated costs, `local` reads local costs;
    /// both are addressed in padded coordinates.
    pub(crate) fn best_branch(
        self,
        i: usize,
        j: usize,
        cell: impl Fn(usize, usize) -> f64,
        local: impl Fn(usize, usize) -> f64,
    ) -> (f64, u8) {
        let mut best = (f64::INFINITY, 0u8);
        for (index, branch) in self.branches().iter().enumerate() {
            let mut total = cell(i - branch.from.0, j - branch.from.1);
            for term in branch.terms {
                total += term.weight * local(i - term.di, j - term.dj);
            }
            if index == 0 || total < best.0 {
                best = (total, index as u8);
            }
        }
        best
    }
}

impl fmt::Display for StepPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StepPattern {
    type Err = DtwError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "symmetricP0" {
            return Ok(Self::Symmetric2);
        }
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| DtwError::UnknownStepPattern { name: s.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_cover_every_reference() {
        for pattern in StepPattern::ALL {
            let offset = pattern.offset();
            for branch in pattern.branches() {
                assert!(branch.from.0 <= offset && branch.from.1 <= offset, "{pattern}");
                for term in branch.terms {
                    assert!(term.di <= offset && term.dj <= offset, "{pattern}");
                }
            }
        }
    }

    #[test]
    fn references_precede_current_cell() {
        // Row-major fill order: a reference must be on an earlier row, or on
        // the same row further left.
        for pattern in StepPattern::ALL {
            for branch in pattern.branches() {
                assert!(branch.from.0 > 0 || branch.from.1 > 0, "{pattern}");
            }
        }
    }

    #[test]
    fn every_pattern_has_a_diagonal_step() {
        for pattern in StepPattern::ALL {
            assert!(
                pattern.branches().iter().any(|b| b.from == (1, 1)),
                "{pattern} has no (1,1) branch"
            );
        }
    }

    #[test]
    fn branch_counts() {
        assert_eq!(StepPattern::AsymmetricP05.branches().len(), 5);
        assert_eq!(StepPattern::SymmetricP05.branches().len(), 5);
        for pattern in StepPattern::ALL {
            if !matches!(pattern, StepPattern::AsymmetricP05 | StepPattern::SymmetricP05) {
                assert!(pattern.supports_backtrace(), "{pattern}");
            }
        }
        assert!(!StepPattern::SymmetricP05.supports_backtrace());
    }

    #[test]
    fn asymmetric_p0_horizontal_step_is_free() {
        let horizontal = StepPattern::AsymmetricP0.branches()[0];
        assert_eq!(horizontal.from, (0, 1));
        assert!(horizontal.terms.is_empty());
    }

    #[test]
    fn names_round_trip() {
        for pattern in StepPattern::ALL {
            assert_eq!(pattern.name().parse::<StepPattern>().unwrap(), pattern);
        }
    }

    #[test]
    fn symmetric_p0_alias() {
        assert_eq!("symmetricP0".parse::<StepPattern>().unwrap(), StepPattern::Symmetric2);
    }

    #[test]
    fn strict_parse_rejects_unknown() {
        let result = "rabinerJuang".parse::<StepPattern>();
        assert!(matches!(result, Err(DtwError::UnknownStepPattern { .. })));
    }

    #[test]
    fn permissive_parse_falls_back_to_symmetric1() {
        assert_eq!(StepPattern::parse("no-such-pattern"), StepPattern::Symmetric1);
        assert_eq!(StepPattern::parse("asymmetricP1"), StepPattern::AsymmetricP1);
    }

    #[test]
    fn best_branch_prefers_first_on_tie() {
        let (cost, tag) = StepPattern::Symmetric1.best_branch(1, 1, |_, _| 0.0, |_, _| 1.0);
        assert_eq!(cost, 1.0);
        assert_eq!(tag, 0);
    }

    #[test]
    fn best_branch_picks_minimum() {
        // Only the vertical reference (i-1, j) is finite.
        let cell = |i: usize, j: usize| if (i, j) == (4, 5) { 2.0 } else { f64::INFINITY };
        let (cost, tag) = StepPattern::Symmetric2.best_branch(5, 5, cell, |_, _| 3.0);
        assert_eq!(cost, 5.0);
        assert_eq!(tag, 2);
    }

    #[test]
    fn best_branch_weights_terms() {
        // symmetricP1 diagonal branch: g[i-1,j-1] + 2 d[i,j]
        let cell = |i: usize, j: usize| if (i, j) == (2, 2) { 1.0 } else { f64::INFINITY };
        let (cost, tag) = StepPattern::SymmetricP1.best_branch(3, 3, cell, |_, _| 0.25);
        assert_eq!(cost, 1.5);
        assert_eq!(tag, 1);
    }

    #[test]
    fn best_branch_ignores_nan_challenger() {
        let cell = |i: usize, j: usize| match (i, j) {
            (1, 1) => 1.0,
            (2, 1) => f64::NAN,
            _ => f64::INFINITY,
        };
        let (cost, tag) = StepPattern::Symmetric1.best_branch(2, 2, cell, |_, _| 0.0);
        assert_eq!(cost, 1.0);
        assert_eq!(tag, 0);
    }
}
