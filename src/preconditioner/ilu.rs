//! Incomplete LU factorisation with level-of-fill p.
//!
//! Construction runs in two phases. The symbolic phase (p > 0) grows A's
//! sparsity pattern by the fill positions whose level is at most p; the
//! numeric phase overwrites a private copy of A, laid out on that pattern,
//! with the combined factors: strict lower part = L (unit diagonal implied),
//! diagonal and upper part = U. `apply` is a forward then a backward
//! substitution over the stored rows.

use std::marker::PhantomData;

use crate::core::traits::Real;
use crate::core::vector;
use crate::error::KError;
use crate::matrix::{RowSpan, SparseMatrix};
use crate::preconditioner::Preconditioner;

#[derive(Clone, Debug)]
pub struct Ilu<T, M> {
    lu: M,
    /// Storage position of the U diagonal of every row.
    diag_pos: Vec<usize>,
    _marker: PhantomData<T>,
}

impl<T: Real, M: SparseMatrix<T>> Ilu<T, M> {
    /// ILU(p) of `a`. For `p == 0` the factors live on A's own pattern.
    pub fn new(a: &M, p: usize) -> Result<Self, KError> {
        a.ensure_square()?;
        a.ensure_diagonal()?;
        let mut lu = if p == 0 {
            a.clone()
        } else {
            let pattern = symbolic_fill(a, p);
            let rows: Vec<Vec<(usize, T)>> = pattern
                .into_iter()
                .map(|row| row.into_iter().map(|c| (c, T::zero())).collect())
                .collect();
            let mut lu = a.assemble_like(&rows)?;
            copy_entries(a, &mut lu);
            lu
        };
        let diag_pos = factorize(&mut lu);
        log::debug!(
            "ILU({}): n={}, nnz(A)={}, nnz(LU)={}",
            p,
            a.nrows(),
            a.used_elements(),
            lu.used_elements()
        );
        Ok(Self { lu, diag_pos, _marker: PhantomData })
    }

    /// Factorise `a` on an externally supplied pattern. Entries of `a` that
    /// the layout does not store are dropped; layout positions that `a` does
    /// not store start from zero.
    pub fn with_layout(a: &M, layout: &M) -> Result<Self, KError> {
        a.ensure_square()?;
        layout.ensure_square()?;
        if layout.nrows() != a.nrows() {
            return Err(KError::LayoutMismatch(format!(
                "layout is {}x{}, matrix is {}x{}",
                layout.nrows(),
                layout.ncols(),
                a.nrows(),
                a.ncols()
            )));
        }
        if layout.chunk_size() != a.chunk_size() {
            return Err(KError::LayoutMismatch(format!(
                "layout chunk size {} differs from matrix chunk size {}",
                layout.chunk_size(),
                a.chunk_size()
            )));
        }
        layout.ensure_diagonal()?;
        let mut lu = layout.clone();
        copy_entries(a, &mut lu);
        let diag_pos = factorize(&mut lu);
        log::debug!("ILU(layout): n={}, nnz(LU)={}", a.nrows(), lu.used_elements());
        Ok(Self { lu, diag_pos, _marker: PhantomData })
    }

    /// Wrap an already computed combined LU matrix; only the triangular solves run.
    pub fn from_factors(lu: M) -> Result<Self, KError> {
        lu.ensure_square()?;
        lu.ensure_diagonal()?;
        let diag_pos = (0..lu.nrows())
            .map(|i| lu.diagonal_position(i).ok_or(KError::MissingDiagonal(i)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { lu, diag_pos, _marker: PhantomData })
    }

    /// The combined factors.
    pub fn lu(&self) -> &M {
        &self.lu
    }

    /// Stored entries of the factorisation.
    pub fn fill_count(&self) -> usize {
        self.lu.used_elements()
    }

    /// First row whose U pivot is zero or not finite.
    pub fn check_pivots(&self) -> Result<(), KError> {
        let vals = self.lu.values();
        for (i, &p) in self.diag_pos.iter().enumerate() {
            let d = vals[p];
            if d == T::zero() || !d.is_finite() {
                return Err(KError::ZeroPivot(i));
            }
        }
        Ok(())
    }

    fn solve_in_place(&self, x: &mut [T]) {
        let n = self.lu.nrows();
        for i in 0..n {
            let mut s = x[i];
            for (c, v) in self.lu.row(i) {
                if c >= i {
                    break;
                }
                s = s - v * x[c];
            }
            x[i] = s;
        }
        let vals = self.lu.values();
        for i in (0..n).rev() {
            let mut s = x[i];
            for (c, v) in self.lu.row(i).rev() {
                if c <= i {
                    break;
                }
                s = s - v * x[c];
            }
            x[i] = s / vals[self.diag_pos[i]];
        }
    }
}

impl<T: Real, M: SparseMatrix<T>> Preconditioner<T> for Ilu<T, M> {
    fn apply(&self, r: &[T], z: &mut [T]) -> Result<(), KError> {
        KError::check_len(self.lu.nrows(), r.len())?;
        KError::check_len(self.lu.nrows(), z.len())?;
        vector::copy(z, r);
        self.solve_in_place(z);
        Ok(())
    }

    fn apply_in_place(&self, x: &mut [T]) -> Result<(), KError> {
        KError::check_len(self.lu.nrows(), x.len())?;
        self.solve_in_place(x);
        Ok(())
    }

    fn supports_in_place(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "ILU_Preconditioner"
    }
}

/// Column pattern of ILU(p), row by row.
///
/// Every entry of A starts at level n. Walking the entries left of the
/// diagonal of row `row` (fill inserted earlier in the same walk included),
/// each entry `(l, k)` combined with an entry `(l2, j)` of row k right of its
/// diagonal proposes column j at level `2n − l − l2 + 1`; it is inserted when
/// that level is at most p and column j is not stored yet. Row i only reads
/// rows below i, so rows are processed strictly in order.
pub(crate) fn symbolic_fill<T: Real, M: SparseMatrix<T>>(a: &M, p: usize) -> Vec<Vec<usize>> {
    let n = a.nrows();
    let base = n as i64;
    let p = i64::try_from(p).unwrap_or(i64::MAX);
    let mut ll: Vec<Vec<(i64, usize)>> = (0..n)
        .map(|i| a.row(i).map(|(c, _)| (base, c)).collect())
        .collect();

    for row in 1..n {
        let (done, rest) = ll.split_at_mut(row);
        let cur = &mut rest[0];
        let mut k = 0;
        while k < cur.len() && cur[k].1 < row {
            let (l, col) = cur[k];
            for &(l2, col2) in done[col].iter().filter(|e| e.1 > col) {
                let level = 2 * base - l - l2 + 1;
                if level > p {
                    continue;
                }
                if let Err(pos) = cur.binary_search_by_key(&col2, |e| e.1) {
                    cur.insert(pos, (level, col2));
                }
            }
            k += 1;
        }
    }

    ll.into_iter()
        .map(|row| row.into_iter().map(|(_, c)| c).collect())
        .collect()
}

/// Overwrite `lu`'s values with the entries of `a` at matching positions,
/// zero elsewhere. Both patterns are walked as sorted column lists.
pub(crate) fn copy_entries<T: Real, M: SparseMatrix<T>>(a: &M, lu: &mut M) {
    let spans: Vec<RowSpan> = (0..lu.nrows()).map(|i| lu.row_span(i)).collect();
    let (cols, vals) = lu.split_mut();
    for (i, span) in spans.iter().enumerate() {
        let mut src = a.row(i).peekable();
        for p in span.positions() {
            vals[p] = T::zero();
            while let Some(&(c, v)) = src.peek() {
                if c > cols[p] {
                    break;
                }
                src.next();
                if c == cols[p] {
                    vals[p] = v;
                    break;
                }
            }
        }
    }
}

/// In-place, no-pivoting ILU sweep over the stored pattern of `lu`.
/// Returns the storage position of every row's diagonal.
///
/// Every row must store its diagonal.
pub(crate) fn factorize<T: Real, M: SparseMatrix<T>>(lu: &mut M) -> Vec<usize> {
    let n = lu.nrows();
    let spans: Vec<RowSpan> = (0..n).map(|i| lu.row_span(i)).collect();
    let (cols, vals) = lu.split_mut();
    let mut diag_pos = vec![0usize; n];
    let mut diag_idx = vec![0usize; n];

    for i in 0..n {
        let si = spans[i];
        let mut k = 0;
        while k < si.len() && cols[si.at(k)] < i {
            let pk = si.at(k);
            let ck = cols[pk];
            vals[pk] = vals[pk] / vals[diag_pos[ck]];
            let lik = vals[pk];

            let sk = spans[ck];
            let mut m = diag_idx[ck] + 1;
            let mut j = k + 1;
            while j < si.len() && m < sk.len() {
                let (pj, pm) = (si.at(j), sk.at(m));
                match cols[pj].cmp(&cols[pm]) {
                    std::cmp::Ordering::Less => j += 1,
                    std::cmp::Ordering::Greater => m += 1,
                    std::cmp::Ordering::Equal => {
                        vals[pj] = vals[pj] - lik * vals[pm];
                        j += 1;
                        m += 1;
                    }
                }
            }
            k += 1;
        }
        diag_idx[i] = k;
        diag_pos[i] = si.at(k);
    }
    diag_pos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{CsrMatrix, EllMatrix};
    use approx::assert_abs_diff_eq;

    /// Arrow matrix: full first row and column plus the diagonal.
    fn arrow(n: usize) -> CsrMatrix<f64> {
        let rows: Vec<Vec<(usize, f64)>> = (0..n)
            .map(|i| {
                if i == 0 {
                    (0..n).map(|j| (j, if j == 0 { n as f64 } else { 1.0 })).collect()
                } else {
                    vec![(0, 1.0), (i, n as f64)]
                }
            })
            .collect();
        CsrMatrix::from_rows(n, n, &rows).unwrap()
    }

    #[test]
    fn first_generation_fill_only() {
        // 4x4 pentadiagonal-like band with a gap: row 2 couples to 0, row 0 to 3
        let a = CsrMatrix::from_rows(
            4,
            4,
            &[
                vec![(0, 4.0), (3, 1.0)],
                vec![(1, 4.0)],
                vec![(0, 1.0), (2, 4.0)],
                vec![(2, 1.0), (3, 4.0)],
            ],
        )
        .unwrap();
        let pat = symbolic_fill(&a, 1);
        assert_eq!(pat[2], vec![0, 2, 3]);
        // (3,2) with the new fill (2,3) would be second generation; (3,3) is stored anyway
        assert_eq!(pat[3], vec![2, 3]);
        assert_eq!(symbolic_fill(&a, 0), a.pattern());
    }

    #[test]
    fn arrow_fill_is_dense() {
        let a = arrow(4);
        let ilu = Ilu::new(&a, 1).unwrap();
        assert_eq!(ilu.fill_count(), 16);
        // a full pattern makes ILU an exact LU
        let x = [1.0, -1.0, 2.0, 0.5];
        let mut b = vec![0.0; 4];
        a.spmv(&x, &mut b);
        let mut y = vec![0.0; 4];
        ilu.apply(&b, &mut y).unwrap();
        assert_abs_diff_eq!(y.as_slice(), x.as_slice(), epsilon = 1e-12);
    }

    #[test]
    fn copy_entries_drops_missing_positions() {
        let a = CsrMatrix::from_rows(2, 2, &[vec![(0, 2.0), (1, 3.0)], vec![(1, 5.0)]]).unwrap();
        let mut layout = CsrMatrix::from_rows(2, 2, &[vec![(0, 9.0)], vec![(0, 9.0), (1, 9.0)]]).unwrap();
        copy_entries(&a, &mut layout);
        assert_eq!(layout.values(), &[2.0, 0.0, 5.0]);
    }

    #[test]
    fn layout_chunk_mismatch() {
        let a = arrow(3);
        let e1 = EllMatrix::from_sparse(&a, 1).unwrap();
        let e2 = EllMatrix::from_sparse(&a, 2).unwrap();
        assert!(matches!(Ilu::with_layout(&e1, &e2), Err(KError::LayoutMismatch(_))));
        let small = arrow(2);
        assert!(matches!(Ilu::with_layout(&a, &small), Err(KError::LayoutMismatch(_))));
    }

    #[test]
    fn from_factors_only_solves() {
        // L = [1 0; 0.5 1], U = [2 1; 0 3]
        let lu = CsrMatrix::from_rows(2, 2, &[vec![(0, 2.0), (1, 1.0)], vec![(0, 0.5), (1, 3.0)]]).unwrap();
        let ilu = Ilu::from_factors(lu).unwrap();
        // A = LU = [2 1; 1 3.5]; A [1, 1] = [3, 4.5]
        let mut y = vec![0.0; 2];
        ilu.apply(&[3.0, 4.5], &mut y).unwrap();
        assert_abs_diff_eq!(y.as_slice(), [1.0, 1.0].as_slice(), epsilon = 1e-14);
    }

    #[test]
    fn zero_pivot_diagnostic() {
        let a = CsrMatrix::from_rows(2, 2, &[vec![(0, 1.0), (1, 1.0)], vec![(0, 1.0), (1, 1.0)]]).unwrap();
        let ilu = Ilu::new(&a, 0).unwrap();
        assert_eq!(ilu.check_pivots(), Err(KError::ZeroPivot(1)));
    }
}
