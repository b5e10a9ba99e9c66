//! Fixed-width (sliced ELLPACK, SELL-C) storage.
//!
//! Rows are grouped into chunks of `C` consecutive rows. Every row of a chunk
//! is padded to the width of the longest row in that chunk and the chunk is
//! stored lane-major, so entry `j` of row `i` sits at
//! `cs[i / C] + i % C + j * C`. A chunk size equal to the (padded) number of
//! rows gives classic ELLPACK. Padding slots carry column 0 and value 0 and are
//! never visited: `rl[i]` bounds every row walk.

use crate::core::traits::{MatVec, Real};
use crate::error::KError;
use crate::matrix::sparse::{validate_rows, RowSpan, SparseMatrix};

/// Chunk height used when the caller has no preference.
pub const DEFAULT_CHUNK: usize = 32;

#[derive(Clone, Debug, PartialEq)]
pub struct EllMatrix<T> {
    nrows: usize,
    ncols: usize,
    chunk: usize,
    /// Start of each chunk in the value/column arrays; `cs.len() == chunks + 1`.
    cs: Vec<usize>,
    /// Stored entries per row.
    rl: Vec<usize>,
    col_ind: Vec<usize>,
    values: Vec<T>,
    used: usize,
}

impl<T: Real> EllMatrix<T> {
    /// Build from per-row `(column, value)` lists with ascending columns.
    pub fn from_rows(
        nrows: usize,
        ncols: usize,
        chunk: usize,
        rows: &[Vec<(usize, T)>],
    ) -> Result<Self, KError> {
        check_chunk(chunk)?;
        validate_rows(nrows, ncols, rows)?;
        Ok(Self::from_rows_unchecked(nrows, ncols, chunk, rows))
    }

    fn from_rows_unchecked(nrows: usize, ncols: usize, chunk: usize, rows: &[Vec<(usize, T)>]) -> Self {
        let chunks = nrows.div_ceil(chunk);
        let mut cs = Vec::with_capacity(chunks + 1);
        cs.push(0);
        for c in 0..chunks {
            let lo = c * chunk;
            let hi = (lo + chunk).min(nrows);
            let width = rows[lo..hi].iter().map(Vec::len).max().unwrap_or(0);
            cs.push(cs[c] + width * chunk);
        }
        let storage = cs[chunks];
        let mut col_ind = vec![0; storage];
        let mut values = vec![T::zero(); storage];
        let rl: Vec<usize> = rows.iter().map(Vec::len).collect();
        for (i, row) in rows.iter().enumerate() {
            let base = cs[i / chunk] + i % chunk;
            for (j, &(c, v)) in row.iter().enumerate() {
                col_ind[base + j * chunk] = c;
                values[base + j * chunk] = v;
            }
        }
        let used = rl.iter().sum();
        Self { nrows, ncols, chunk, cs, rl, col_ind, values, used }
    }

    /// Convert any other format to SELL-C with chunk height `chunk`.
    pub fn from_sparse<M: SparseMatrix<T>>(m: &M, chunk: usize) -> Result<Self, KError> {
        check_chunk(chunk)?;
        Ok(Self::from_rows_unchecked(m.nrows(), m.ncols(), chunk, &m.row_entries()))
    }

    /// Chunk height `C`.
    pub fn chunk(&self) -> usize {
        self.chunk
    }

    /// Chunk start offsets.
    pub fn cs(&self) -> &[usize] {
        &self.cs
    }

    /// Row lengths.
    pub fn rl(&self) -> &[usize] {
        &self.rl
    }

    /// Length of the padded storage arrays.
    pub fn storage_len(&self) -> usize {
        self.values.len()
    }
}

fn check_chunk(chunk: usize) -> Result<(), KError> {
    if chunk == 0 {
        return Err(KError::InvalidMatrix("chunk size must be at least 1".to_string()));
    }
    Ok(())
}

impl<T: Real> SparseMatrix<T> for EllMatrix<T> {
    fn nrows(&self) -> usize {
        self.nrows
    }
    fn ncols(&self) -> usize {
        self.ncols
    }
    fn used_elements(&self) -> usize {
        self.used
    }
    fn row_span(&self, i: usize) -> RowSpan {
        RowSpan {
            start: self.cs[i / self.chunk] + i % self.chunk,
            len: self.rl[i],
            stride: self.chunk,
        }
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
    fn chunk_size(&self) -> usize {
        self.chunk
    }
    fn assemble_like(&self, rows: &[Vec<(usize, T)>]) -> Result<Self, KError> {
        Self::from_rows(self.nrows, self.ncols, self.chunk, rows)
    }
}

impl<T: Real> MatVec<T> for EllMatrix<T> {
    fn matvec(&self, x: &[T], y: &mut [T]) {
        self.spmv(x, y);
    }
    fn dim(&self) -> usize {
        self.nrows
    }
}
