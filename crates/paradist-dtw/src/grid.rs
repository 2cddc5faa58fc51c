//! Dense row-major DP buffers owned by a single distance call.

use crate::error::DtwError;

/// Dense `rows × cols` buffer, row-major with stride `cols`.
#[derive(Debug, Clone)]
pub(crate) struct Grid<T> {
    cols: usize,
    cells: Vec<T>,
}

impl<T: Copy> Grid<T> {
    /// Allocate a grid with every cell set to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`DtwError::AllocationFailure`] if the cell count overflows or
    /// the allocator refuses the request.
    pub(crate) fn try_filled(rows: usize, cols: usize, value: T) -> Result<Self, DtwError> {
        let failure = || DtwError::AllocationFailure { rows, cols };
        let len = rows.checked_mul(cols).ok_or_else(failure)?;
        let mut cells = Vec::new();
        cells.try_reserve_exact(len).map_err(|_| failure())?;
        cells.resize(len, value);
        Ok(Self { cols, cells })
    }

    #[inline]
    pub(crate) fn get(&self, i: usize, j: usize) -> T {
        self.cells[i * self.cols + j]
    }

    #[inline]
    pub(crate) fn set(&mut self, i: usize, j: usize, value: T) {
        self.cells[i * self.cols + j] = value;
    }
}
