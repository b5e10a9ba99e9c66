//! SparseMatrix trait: the row view shared by every storage format.
//!
//! All preconditioners are written once against this trait. A format only has
//! to say where the stored entries of row `i` live ([`RowSpan`]) and expose its
//! column-index and value arrays; iteration, lookup, the diagonal split and
//! SpMV are provided on top of that.
//!
//! Invariant relied on by every factorization: the positions of a row are
//! visited in strictly ascending column order, at most one entry per column.

use crate::core::traits::Real;
use crate::error::KError;
use std::iter::StepBy;
use std::ops::Range;

/// Storage positions of one row: `start, start + stride, …` (`len` entries).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowSpan {
    pub start: usize,
    pub len: usize,
    pub stride: usize,
}

impl RowSpan {
    /// A contiguous run `start..end`.
    pub fn contiguous(start: usize, end: usize) -> Self {
        Self { start, len: end - start, stride: 1 }
    }

    /// Storage position of the `k`-th entry of the row.
    #[inline]
    pub fn at(&self, k: usize) -> usize {
        self.start + k * self.stride
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Positions in ascending column order; reversible for backward sweeps.
    pub fn positions(&self) -> StepBy<Range<usize>> {
        (self.start..self.start + self.len * self.stride).step_by(self.stride.max(1))
    }
}

/// A read-only sparse matrix seen row by row.
pub trait SparseMatrix<T: Real>: Clone + Sized {
    /// Number of rows.
    fn nrows(&self) -> usize;
    /// Number of columns.
    fn ncols(&self) -> usize;
    /// Number of stored (non-padding) entries.
    fn used_elements(&self) -> usize;
    /// Where the entries of row `i` are stored.
    fn row_span(&self, i: usize) -> RowSpan;
    /// Column index per storage position.
    fn col_ind(&self) -> &[usize];
    /// Value per storage position.
    fn values(&self) -> &[T];
    /// Column indices and mutable values at the same time.
    fn split_mut(&mut self) -> (&[usize], &mut [T]);
    /// Chunk height of sliced formats; 1 for unchunked ones.
    fn chunk_size(&self) -> usize {
        1
    }
    /// A matrix of the same format, shape and chunk size holding `rows`
    /// (one list of `(column, value)` per row, ascending columns).
    fn assemble_like(&self, rows: &[Vec<(usize, T)>]) -> Result<Self, KError>;

    fn is_square(&self) -> bool {
        self.nrows() == self.ncols()
    }

    fn ensure_square(&self) -> Result<(), KError> {
        KError::check_square(self.nrows(), self.ncols())
    }

    /// Stored `(column, value)` pairs of row `i`, ascending column.
    fn row(&self, i: usize) -> impl DoubleEndedIterator<Item = (usize, T)> + '_ {
        let cols = self.col_ind();
        let vals = self.values();
        self.row_span(i).positions().map(move |p| (cols[p], vals[p]))
    }

    /// A(i, j), zero when not stored.
    fn get(&self, i: usize, j: usize) -> T {
        self.row(i)
            .find(|&(c, _)| c == j)
            .map(|(_, v)| v)
            .unwrap_or_else(T::zero)
    }

    /// Storage position of A(i, i), if stored.
    fn diagonal_position(&self, i: usize) -> Option<usize> {
        let cols = self.col_ind();
        self.row_span(i).positions().find(|&p| cols[p] == i)
    }

    /// Fails with the first row that stores no diagonal entry.
    fn ensure_diagonal(&self) -> Result<(), KError> {
        for i in 0..self.nrows().min(self.ncols()) {
            if self.diagonal_position(i).is_none() {
                return Err(KError::MissingDiagonal(i));
            }
        }
        Ok(())
    }

    /// Compute y = A * x.  `x.len() == ncols()`, `y.len() == nrows()`.
    fn spmv(&self, x: &[T], y: &mut [T]) {
        assert_eq!(x.len(), self.ncols(), "Input vector x has incorrect length");
        assert_eq!(y.len(), self.nrows(), "Output vector y has incorrect length");
        for (i, yi) in y.iter_mut().enumerate() {
            *yi = self.row(i).fold(T::zero(), |acc, (c, v)| acc + v * x[c]);
        }
    }

    /// Column indices of every row.
    fn pattern(&self) -> Vec<Vec<usize>> {
        (0..self.nrows())
            .map(|i| self.row(i).map(|(c, _)| c).collect())
            .collect()
    }

    /// `(column, value)` lists of every row.
    fn row_entries(&self) -> Vec<Vec<(usize, T)>> {
        (0..self.nrows()).map(|i| self.row(i).collect()).collect()
    }

    /// Dense copy, mostly for inspection and tests.
    fn to_dense(&self) -> faer::Mat<T> {
        let (m, n) = (self.nrows(), self.ncols());
        let mut data = vec![T::zero(); m * n];
        for i in 0..m {
            for (c, v) in self.row(i) {
                data[i * n + c] = v;
            }
        }
        faer::Mat::from_fn(m, n, |i, j| data[i * n + j])
    }
}

/// Checks the row lists handed to a format constructor.
pub(crate) fn validate_rows<T>(
    nrows: usize,
    ncols: usize,
    rows: &[Vec<(usize, T)>],
) -> Result<(), KError> {
    if rows.len() != nrows {
        return Err(KError::InvalidMatrix(format!(
            "expected {} rows, got {}",
            nrows,
            rows.len()
        )));
    }
    for (i, row) in rows.iter().enumerate() {
        validate_columns(i, ncols, row.iter().map(|&(c, _)| c))?;
    }
    Ok(())
}

/// Columns of one row must be in bounds and strictly ascending.
pub(crate) fn validate_columns(
    row: usize,
    ncols: usize,
    cols: impl Iterator<Item = usize>,
) -> Result<(), KError> {
    let mut prev: Option<usize> = None;
    for c in cols {
        if c >= ncols {
            return Err(KError::InvalidMatrix(format!(
                "column {} out of bounds in row {} ({} columns)",
                c, row, ncols
            )));
        }
        if let Some(p) = prev {
            if c <= p {
                return Err(KError::InvalidMatrix(format!(
                    "columns of row {} are not strictly ascending ({} after {})",
                    row, c, p
                )));
            }
        }
        prev = Some(c);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strided_span_positions() {
        let span = RowSpan { start: 1, len: 3, stride: 4 };
        assert_eq!(span.positions().collect::<Vec<_>>(), vec![1, 5, 9]);
        assert_eq!(span.positions().rev().collect::<Vec<_>>(), vec![9, 5, 1]);
        assert_eq!(span.at(2), 9);
    }

    #[test]
    fn empty_span() {
        let span = RowSpan::contiguous(7, 7);
        assert!(span.is_empty());
        assert_eq!(span.positions().count(), 0);
    }

    #[test]
    fn rejects_unsorted_columns() {
        let rows = vec![vec![(1usize, 1.0f64), (0, 2.0)]];
        assert!(matches!(validate_rows(1, 2, &rows), Err(KError::InvalidMatrix(_))));
        let rows = vec![vec![(0usize, 1.0f64), (2, 2.0)]];
        assert!(matches!(validate_rows(1, 2, &rows), Err(KError::InvalidMatrix(_))));
    }
}
