//! DTW distance computation over a padded, banded cost matrix.

use tracing::{debug, instrument};

use crate::error::DtwError;
use crate::grid::Grid;
use crate::local_cost::LocalCost;
use crate::normalization::Normalization;
use crate::path::{WarpPath, WarpingStep};
use crate::sequence::SequenceView;
use crate::step_pattern::StepPattern;
use crate::window::WarpingWindow;

/// Immutable DTW configuration. Thread-safe and copyable.
///
/// Every call to [`distance`](Dtw::distance) allocates its own cost matrix
/// (and backtrace matrix when needed) and releases it before returning, so a
/// single `Dtw` can be shared by any number of workers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dtw {
    pattern: StepPattern,
    window: WarpingWindow,
    normalization: Normalization,
    local_cost: LocalCost,
}

/// Result of the forward DP pass.
struct Fill {
    terminal: f64,
    tags: Option<Grid<u8>>,
}

impl Dtw {
    /// Create a DTW calculator from a step pattern, window and normalization.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::UnsupportedBacktrace`] | `ByPathLength` with a pattern that does not support backtracking |
    pub fn configure(
        pattern: StepPattern,
        window: WarpingWindow,
        normalization: Normalization,
    ) -> Result<Self, DtwError> {
        if normalization.needs_backtrace() {
            ensure_backtrace(pattern)?;
        }
        Ok(Self {
            pattern,
            window,
            normalization,
            local_cost: LocalCost::default(),
        })
    }

    /// Use a different column comparator.
    #[must_use]
    pub fn with_local_cost(mut self, local_cost: LocalCost) -> Self {
        self.local_cost = local_cost;
        self
    }

    /// Return the step pattern.
    #[must_use]
    pub fn pattern(&self) -> StepPattern {
        self.pattern
    }

    /// Return the warping window.
    #[must_use]
    pub fn window(&self) -> WarpingWindow {
        self.window
    }

    /// Return the normalization.
    #[must_use]
    pub fn normalization(&self) -> Normalization {
        self.normalization
    }

    /// Return the column comparator.
    #[must_use]
    pub fn local_cost(&self) -> LocalCost {
        self.local_cost
    }

    /// Compute the normalized DTW distance between two sequences.
    ///
    /// Non-finite inputs are not rejected: NaN and infinities propagate into
    /// the result. With [`Normalization::ByPathLength`] a one-column input
    /// yields a zero step count, so the result is infinite or NaN.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::DimensionMismatch`] | `a` and `b` differ in feature count |
    /// | [`DtwError::AllocationFailure`] | the DP buffers cannot be allocated |
    #[instrument(skip(self, a, b), fields(n = a.width(), m = b.width(), pattern = %self.pattern))]
    pub fn distance(&self, a: SequenceView<'_>, b: SequenceView<'_>) -> Result<f64, DtwError> {
        let fill = self.fill(a, b, self.normalization.needs_backtrace())?;
        let n = a.width();
        let m = b.width();
        let dist = match self.normalization {
            Normalization::None => fill.terminal,
            Normalization::ByInputALength => fill.terminal / n as f64,
            Normalization::ByInputABLength => fill.terminal / (n + m) as f64,
            Normalization::ByPathLength => {
                let steps = fill.tags.as_ref().map_or(0, |tags| self.walk(tags, n, m));
                fill.terminal / steps as f64
            }
        };
        debug!(dist, "dtw distance");
        Ok(dist)
    }

    /// Recover the warp path of the optimal alignment.
    ///
    /// Each stored tag is decoded through its branch of the step pattern, so
    /// the path follows the moves the forward pass actually chose, including
    /// the intermediate cells of multi-cell branches. The path runs from
    /// `(0, 0)` to `(n - 1, m - 1)` when the terminal cell is reachable.
    ///
    /// This is not the step count used by [`Normalization::ByPathLength`],
    /// which decodes tags with a fixed up/diagonal/left meaning.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::DimensionMismatch`] | `a` and `b` differ in feature count |
    /// | [`DtwError::AllocationFailure`] | the DP buffers cannot be allocated |
    #[instrument(skip(self, a, b), fields(n = a.width(), m = b.width(), pattern = %self.pattern))]
    pub fn warp_path(&self, a: SequenceView<'_>, b: SequenceView<'_>) -> Result<WarpPath, DtwError> {
        let fill = self.fill(a, b, true)?;
        let Some(tags) = &fill.tags else {
            return Ok(WarpPath::default());
        };

        let offset = self.pattern.offset();
        let branches = self.pattern.branches();
        let mut i = a.width() + offset - 1;
        let mut j = b.width() + offset - 1;
        let mut cells = vec![(i, j)];
        while (i, j) != (offset, offset) {
            let branch = &branches[usize::from(tags.get(i, j))];
            let (di, dj) = branch.from;
            if i < offset + di || j < offset + dj {
                debug!(i, j, "backtrace left the grid");
                break;
            }
            cells.extend(
                branch
                    .terms
                    .iter()
                    .rev()
                    .filter(|term| (term.di, term.dj) != (0, 0))
                    .map(|term| (i - term.di, j - term.dj)),
            );
            i -= di;
            j -= dj;
            cells.push((i, j));
        }

        let steps = cells
            .into_iter()
            .rev()
            .map(|(i, j)| WarpingStep {
                a: i - offset,
                b: j - offset,
            })
            .collect();
        Ok(WarpPath::new(steps))
    }

    /// Forward pass: fill the banded cost matrix and return the terminal cell.
    ///
    /// The grids are padded by `offset` rows and columns of +∞ so that every
    /// branch reference stays in bounds.
    fn fill(&self, a: SequenceView<'_>, b: SequenceView<'_>, backtrace: bool) -> Result<Fill, DtwError> {
        if a.dim() != b.dim() {
            return Err(DtwError::DimensionMismatch {
                a: a.dim(),
                b: b.dim(),
            });
        }

        let n = a.width();
        let m = b.width();
        let offset = self.pattern.offset();
        let rows = n + offset;
        let cols = m + offset;

        let mut cost = Grid::try_filled(rows, cols, f64::INFINITY)?;
        let mut tags = if backtrace {
            Some(Grid::try_filled(rows, cols, 0u8)?)
        } else {
            None
        };

        let local = |i: usize, j: usize| -> f64 {
            if i < offset || j < offset {
                f64::INFINITY
            } else {
                self.local_cost.between(a.column(i - offset), b.column(j - offset))
            }
        };

        let w = self.window.half_width(n, m);
        for i in offset..rows {
            for j in WarpingWindow::column_range(i, offset, cols, w) {
                if i == offset && j == offset {
                    cost.set(i, j, local(i, j));
                    continue;
                }
                let (best, tag) = self.pattern.best_branch(i, j, |p, q| cost.get(p, q), &local);
                cost.set(i, j, best);
                if let Some(tags) = tags.as_mut() {
                    tags.set(i, j, tag);
                }
            }
        }

        Ok(Fill {
            terminal: cost.get(rows - 1, cols - 1),
            tags,
        })
    }

    /// Walk the backtrace tags from the terminal cell and return the step count
    /// used by path-length normalization.
    ///
    /// Stops when either coordinate reaches the first real row or column.
    /// On the second row the walk moves left, on the second column it moves up;
    /// elsewhere tag 0 steps up a row, tag 1 diagonally and tag 2 left a column.
    fn walk(&self, tags: &Grid<u8>, n: usize, m: usize) -> usize {
        let offset = self.pattern.offset();
        let mut i = n + offset - 1;
        let mut j = m + offset - 1;
        let mut steps = 0;
        while i != offset && j != offset {
            steps += 1;
            if i == offset + 1 {
                j -= 1;
            } else if j == offset + 1 {
                i -= 1;
            } else {
                match tags.get(i, j) {
                    0 => i -= 1,
                    1 => {
                        i -= 1;
                        j -= 1;
                    }
                    _ => j -= 1,
                }
            }
        }
        steps
    }
}

fn ensure_backtrace(pattern: StepPattern) -> Result<(), DtwError> {
    if pattern.supports_backtrace() {
        Ok(())
    } else {
        Err(DtwError::UnsupportedBacktrace {
            pattern: pattern.name(),
            branches: pattern.branches().len(),
        })
    }
}
