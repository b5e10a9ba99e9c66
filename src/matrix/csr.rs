//! Compressed-row storage.

use crate::core::traits::{MatVec, Real};
use crate::error::KError;
use crate::matrix::sparse::{validate_columns, validate_rows, RowSpan, SparseMatrix};

/// CSR matrix: `row_ptr[i]..row_ptr[i + 1]` indexes the entries of row `i`.
#[derive(Clone, Debug, PartialEq)]
pub struct CsrMatrix<T> {
    nrows: usize,
    ncols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<T>,
}

impl<T: Real> CsrMatrix<T> {
    /// Build a CSR from raw row‐ptr, col‐idx, and values.
    pub fn from_csr(
        nrows: usize,
        ncols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<T>,
    ) -> Result<Self, KError> {
        if row_ptr.len() != nrows + 1 {
            return Err(KError::InvalidMatrix(format!(
                "row_ptr has length {}, expected {}",
                row_ptr.len(),
                nrows + 1
            )));
        }
        if col_idx.len() != values.len() {
            return Err(KError::InvalidMatrix(format!(
                "{} column indices but {} values",
                col_idx.len(),
                values.len()
            )));
        }
        if row_ptr[0] != 0 || row_ptr[nrows] != col_idx.len() {
            return Err(KError::InvalidMatrix(
                "row_ptr must start at 0 and end at the number of entries".to_string(),
            ));
        }
        if let Some(i) = row_ptr.windows(2).position(|w| w[0] > w[1]) {
            return Err(KError::InvalidMatrix(format!("row_ptr decreases at row {}", i)));
        }
        for i in 0..nrows {
            validate_columns(i, ncols, col_idx[row_ptr[i]..row_ptr[i + 1]].iter().copied())?;
        }
        Ok(Self { nrows, ncols, row_ptr, col_idx, values })
    }

    /// Build from per-row `(column, value)` lists with ascending columns.
    pub fn from_rows(nrows: usize, ncols: usize, rows: &[Vec<(usize, T)>]) -> Result<Self, KError> {
        validate_rows(nrows, ncols, rows)?;
        Ok(Self::from_rows_unchecked(nrows, ncols, rows))
    }

    pub(crate) fn from_rows_unchecked(nrows: usize, ncols: usize, rows: &[Vec<(usize, T)>]) -> Self {
        let nnz = rows.iter().map(Vec::len).sum();
        let mut row_ptr = Vec::with_capacity(nrows + 1);
        let mut col_idx = Vec::with_capacity(nnz);
        let mut values = Vec::with_capacity(nnz);
        row_ptr.push(0);
        for row in rows {
            for &(c, v) in row {
                col_idx.push(c);
                values.push(v);
            }
            row_ptr.push(col_idx.len());
        }
        Self { nrows, ncols, row_ptr, col_idx, values }
    }

    /// Convert any other format to CSR.
    pub fn from_sparse<M: SparseMatrix<T>>(m: &M) -> Self {
        Self::from_rows_unchecked(m.nrows(), m.ncols(), &m.row_entries())
    }

    /// The n×n identity.
    pub fn identity(n: usize) -> Self {
        Self {
            nrows: n,
            ncols: n,
            row_ptr: (0..=n).collect(),
            col_idx: (0..n).collect(),
            values: vec![T::one(); n],
        }
    }

    pub fn row_ptr(&self) -> &[usize] {
        &self.row_ptr
    }
}

impl<T: Real> SparseMatrix<T> for CsrMatrix<T> {
    fn nrows(&self) -> usize {
        self.nrows
    }
    fn ncols(&self) -> usize {
        self.ncols
    }
    fn used_elements(&self) -> usize {
        self.col_idx.len()
    }
    fn row_span(&self, i: usize) -> RowSpan {
        RowSpan::contiguous(self.row_ptr[i], self.row_ptr[i + 1])
    }
    fn col_ind(&self) -> &[usize] {
        &self.col_idx
    }
    fn values(&self) -> &[T] {
        &self.values
    }
    fn split_mut(&mut self) -> (&[usize], &mut [T]) {
        (&self.col_idx, &mut self.values)
    }
    fn assemble_like(&self, rows: &[Vec<(usize, T)>]) -> Result<Self, KError> {
        Self::from_rows(self.nrows, self.ncols, rows)
    }

    fn spmv(&self, x: &[T], y: &mut [T]) {
        assert_eq!(x.len(), self.ncols, "Input vector x has incorrect length");
        assert_eq!(y.len(), self.nrows, "Output vector y has incorrect length");
        let row_sum = |i: usize| {
            (self.row_ptr[i]..self.row_ptr[i + 1])
                .fold(T::zero(), |acc, p| acc + self.values[p] * x[self.col_idx[p]])
        };
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            y.par_iter_mut().enumerate().for_each(|(i, yi)| *yi = row_sum(i));
        }
        #[cfg(not(feature = "rayon"))]
        {
            for (i, yi) in y.iter_mut().enumerate() {
                *yi = row_sum(i);
            }
        }
    }
}

impl<T: Real> MatVec<T> for CsrMatrix<T> {
    fn matvec(&self, x: &[T], y: &mut [T]) {
        self.spmv(x, y);
    }
    fn dim(&self) -> usize {
        self.nrows
    }
}
