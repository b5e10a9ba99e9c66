//! Coordinate storage.
//!
//! Triples are kept sorted by `(row, column)` so each row is a contiguous run
//! that can be located by binary search; this is what lets the sweep kernels
//! find the diagonal split of a row without a row-pointer array.

use crate::core::traits::{MatVec, Real};
use crate::error::KError;
use crate::matrix::sparse::{validate_rows, RowSpan, SparseMatrix};

#[derive(Clone, Debug, PartialEq)]
pub struct CooMatrix<T> {
    nrows: usize,
    ncols: usize,
    row_ind: Vec<usize>,
    col_ind: Vec<usize>,
    values: Vec<T>,
}

impl<T: Real> CooMatrix<T> {
    /// An empty `nrows × ncols` matrix.
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self { nrows, ncols, row_ind: Vec::new(), col_ind: Vec::new(), values: Vec::new() }
    }

    /// Build from unordered `(row, column, value)` triples; duplicates are rejected.
    pub fn from_triplets(
        nrows: usize,
        ncols: usize,
        mut triplets: Vec<(usize, usize, T)>,
    ) -> Result<Self, KError> {
        for &(r, c, _) in &triplets {
            check_bounds(nrows, ncols, r, c)?;
        }
        triplets.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        for w in triplets.windows(2) {
            if (w[0].0, w[0].1) == (w[1].0, w[1].1) {
                return Err(KError::InvalidMatrix(format!(
                    "duplicate entry at ({}, {})",
                    w[0].0, w[0].1
                )));
            }
        }
        let mut m = Self::new(nrows, ncols);
        for (r, c, v) in triplets {
            m.row_ind.push(r);
            m.col_ind.push(c);
            m.values.push(v);
        }
        Ok(m)
    }

    /// Build from per-row `(column, value)` lists with ascending columns.
    pub fn from_rows(nrows: usize, ncols: usize, rows: &[Vec<(usize, T)>]) -> Result<Self, KError> {
        validate_rows(nrows, ncols, rows)?;
        Ok(Self::from_rows_unchecked(nrows, ncols, rows))
    }

    fn from_rows_unchecked(nrows: usize, ncols: usize, rows: &[Vec<(usize, T)>]) -> Self {
        let mut m = Self::new(nrows, ncols);
        for (i, row) in rows.iter().enumerate() {
            for &(c, v) in row {
                m.row_ind.push(i);
                m.col_ind.push(c);
                m.values.push(v);
            }
        }
        m
    }

    /// Convert any other format to COO.
    pub fn from_sparse<M: SparseMatrix<T>>(m: &M) -> Self {
        Self::from_rows_unchecked(m.nrows(), m.ncols(), &m.row_entries())
    }

    /// Set A(row, col) = value, overwriting a stored entry or inserting a new
    /// one at its sorted position.
    pub fn insert(&mut self, row: usize, col: usize, value: T) -> Result<(), KError> {
        check_bounds(self.nrows, self.ncols, row, col)?;
        let span = self.row_span(row);
        let cols = &self.col_ind[span.start..span.start + span.len];
        match cols.binary_search(&col) {
            Ok(k) => self.values[span.start + k] = value,
            Err(k) => {
                let p = span.start + k;
                self.row_ind.insert(p, row);
                self.col_ind.insert(p, col);
                self.values.insert(p, value);
            }
        }
        Ok(())
    }

    pub fn row_ind(&self) -> &[usize] {
        &self.row_ind
    }
}

fn check_bounds(nrows: usize, ncols: usize, r: usize, c: usize) -> Result<(), KError> {
    if r >= nrows || c >= ncols {
        return Err(KError::InvalidMatrix(format!(
            "entry ({}, {}) outside a {}x{} matrix",
            r, c, nrows, ncols
        )));
    }
    Ok(())
}

impl<T: Real> SparseMatrix<T> for CooMatrix<T> {
    fn nrows(&self) -> usize {
        self.nrows
    }
    fn ncols(&self) -> usize {
        self.ncols
    }
    fn used_elements(&self) -> usize {
        self.values.len()
    }
    fn row_span(&self, i: usize) -> RowSpan {
        let start = self.row_ind.partition_point(|&r| r < i);
        let len = self.row_ind[start..].partition_point(|&r| r == i);
        RowSpan { start, len, stride: 1 }
    }
    fn col_ind(&self) -> &[usize] {
        &self.col_ind
    }
    fn values(&self) -> &[T] {
        &self.values
    }
    fn split_mut(&mut self) -> (&[usize], &mut [T]) {
        (&self.col_ind, &mut self.values)
    }
    fn assemble_like(&self, rows: &[Vec<(usize, T)>]) -> Result<Self, KError> {
        Self::from_rows(self.nrows, self.ncols, rows)
    }
}

impl<T: Real> MatVec<T> for CooMatrix<T> {
    fn matvec(&self, x: &[T], y: &mut [T]) {
        self.spmv(x, y);
    }
    fn dim(&self) -> usize {
        self.nrows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triplets_are_sorted() {
        let m = CooMatrix::from_triplets(
            3, 3,
            vec![(2, 2, 3.0), (0, 1, -1.0), (0, 0, 2.0), (1, 1, 5.0)],
        )
        .unwrap();
        assert_eq!(m.row_ind(), &[0, 0, 1, 2]);
        assert_eq!(m.col_ind(), &[0, 1, 1, 2]);
        assert_eq!(m.row(0).collect::<Vec<_>>(), vec![(0, 2.0), (1, -1.0)]);
        assert_eq!(m.row_span(1), RowSpan { start: 2, len: 1, stride: 1 });
    }

    #[test]
    fn duplicates_rejected() {
        let err = CooMatrix::from_triplets(2, 2, vec![(0, 0, 1.0), (0, 0, 2.0)]);
        assert!(matches!(err, Err(KError::InvalidMatrix(_))));
    }

    #[test]
    fn insert_keeps_order() {
        let mut m = CooMatrix::new(3, 3);
        m.insert(1, 2, 1.0).unwrap();
        m.insert(0, 0, 4.0).unwrap();
        m.insert(1, 0, 2.0).unwrap();
        m.insert(1, 2, 7.0).unwrap();
        assert_eq!(m.row(1).collect::<Vec<_>>(), vec![(0, 2.0), (2, 7.0)]);
        assert_eq!(m.used_elements(), 3);
        assert!(m.row_span(2).is_empty());
        assert!(m.insert(3, 0, 1.0).is_err());
    }
}
