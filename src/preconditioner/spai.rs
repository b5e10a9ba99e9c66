//! Sparse approximate inverse.
//!
//! M is built one column at a time. For column k the support J starts from a
//! band (or a caller layout); I collects every row that a column of A in J
//! touches, and `min ‖A(I,J) m − e_k(I)‖₂` is solved by Householder QR. While
//! the residual is above `eps_res` and budget remains, the rows of I with a
//! significant residual component are scored and the most profitable ones join
//! J; only the new columns are orthogonalised against the existing reflectors.

use std::marker::PhantomData;

use crate::core::traits::Real;
use crate::core::vector;
use crate::error::KError;
use crate::matrix::SparseMatrix;
use crate::preconditioner::Preconditioner;

/// Construction parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct SpaiParams<T> {
    /// Outer enlargement rounds per column.
    pub max_iter: usize,
    /// Residual norm at which a column is accepted.
    pub eps_res: T,
    /// Upper bound on |J| per column.
    pub fill_in: usize,
    /// Residual components below this are not worth a new index.
    pub eps_res_comp: T,
    /// Candidates whose residual drop is at most this are ignored.
    pub max_rho: T,
    /// Store Mᵗ row-wise instead of M.
    pub transpose: bool,
}

impl<T: Real> Default for SpaiParams<T> {
    fn default() -> Self {
        Self {
            max_iter: 10,
            eps_res: T::from(1e-2).unwrap_or_else(T::epsilon),
            fill_in: 10,
            eps_res_comp: T::from(1e-3).unwrap_or_else(T::epsilon),
            max_rho: T::from(1e-3).unwrap_or_else(T::epsilon),
            transpose: false,
        }
    }
}

impl<T: Real> SpaiParams<T> {
    fn validate(&self) -> Result<(), KError> {
        for (name, v) in [
            ("eps_res", self.eps_res),
            ("eps_res_comp", self.eps_res_comp),
            ("max_rho", self.max_rho),
        ] {
            if !v.is_finite() || v < T::zero() {
                return Err(KError::InvalidParameter(format!(
                    "SPAI {name} must be finite and non-negative, got {v:?}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct Spai<T, M> {
    /// M, or Mᵗ when `transposed`.
    m: M,
    transposed: bool,
    _marker: PhantomData<T>,
}

impl<T: Real, M: SparseMatrix<T>> Spai<T, M> {
    /// Initial support of column k: rows `k − bandwidth ..= k + bandwidth`.
    pub fn new(a: &M, bandwidth: usize, params: SpaiParams<T>) -> Result<Self, KError> {
        a.ensure_square()?;
        let n = a.nrows();
        let supports = (0..n)
            .map(|k| {
                let end = n.min(k.saturating_add(bandwidth).saturating_add(1));
                (k.saturating_sub(bandwidth)..end).collect()
            })
            .collect();
        Self::build(a, supports, params)
    }

    /// Initial support of column k: the rows of `layout` that store column k.
    pub fn with_layout(a: &M, layout: &M, params: SpaiParams<T>) -> Result<Self, KError> {
        a.ensure_square()?;
        if !layout.is_square() {
            return Err(KError::LayoutMismatch(format!(
                "layout is not square ({}x{})",
                layout.nrows(),
                layout.ncols()
            )));
        }
        if layout.nrows() != a.nrows() {
            return Err(KError::LayoutMismatch(format!(
                "layout dimension {} does not match matrix dimension {}",
                layout.nrows(),
                a.nrows()
            )));
        }
        let mut supports = vec![Vec::new(); a.nrows()];
        for i in 0..layout.nrows() {
            for (c, _) in layout.row(i) {
                supports[c].push(i);
            }
        }
        Self::build(a, supports, params)
    }

    fn build(a: &M, supports: Vec<Vec<usize>>, params: SpaiParams<T>) -> Result<Self, KError> {
        params.validate()?;
        let n = a.nrows();
        let a_cols = columns_of(a);
        if let Some(c) = a_cols.iter().position(Vec::is_empty) {
            return Err(KError::EmptyColumn(c));
        }

        let mut marker = vec![usize::MAX; n];
        let mut columns = Vec::with_capacity(n);
        let mut total = 0;
        for (k, support) in supports.into_iter().enumerate() {
            let col = ColumnFit::new(&a_cols, &params, &mut marker).solve(k, support)?;
            total += col.len();
            columns.push(col);
        }

        let rows: Vec<Vec<(usize, T)>> = if params.transpose {
            columns
                .into_iter()
                .map(|mut col| {
                    col.sort_unstable_by_key(|e| e.0);
                    col
                })
                .collect()
        } else {
            let mut rows = vec![Vec::new(); n];
            for (k, col) in columns.into_iter().enumerate() {
                for (j, v) in col {
                    rows[j].push((k, v));
                }
            }
            rows
        };
        let m = a.assemble_like(&rows)?;
        log::debug!(
            "SPAI: n={}, nnz(M)={}, avg support {:.2}, transpose={}",
            n,
            total,
            total as f64 / n.max(1) as f64,
            params.transpose
        );
        Ok(Self { m, transposed: params.transpose, _marker: PhantomData })
    }

    /// The approximate inverse (its transpose when [`Self::is_transposed`]).
    pub fn matrix(&self) -> &M {
        &self.m
    }

    pub fn is_transposed(&self) -> bool {
        self.transposed
    }
}

impl<T: Real, M: SparseMatrix<T>> Preconditioner<T> for Spai<T, M> {
    fn apply(&self, r: &[T], z: &mut [T]) -> Result<(), KError> {
        KError::check_len(self.m.nrows(), r.len())?;
        KError::check_len(self.m.nrows(), z.len())?;
        if self.transposed {
            z.fill(T::zero());
            for (k, &rk) in r.iter().enumerate() {
                for (j, v) in self.m.row(k) {
                    z[j] = z[j] + v * rk;
                }
            }
        } else {
            self.m.spmv(r, z);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "SPAI_Preconditioner"
    }
}

/// Column lists of A: `(row, value)` ascending by row.
fn columns_of<T: Real, M: SparseMatrix<T>>(a: &M) -> Vec<Vec<(usize, T)>> {
    let mut cols = vec![Vec::new(); a.ncols()];
    for i in 0..a.nrows() {
        for (c, v) in a.row(i) {
            cols[c].push((i, v));
        }
    }
    cols
}

/// Least-squares state of one column of M.
struct ColumnFit<'w, T> {
    a_cols: &'w [Vec<(usize, T)>],
    params: &'w SpaiParams<T>,
    /// Position of a row in `rows`, `usize::MAX` when absent.
    marker: &'w mut [usize],
    /// J in QR column order.
    cols: Vec<usize>,
    /// I in QR row order.
    rows: Vec<usize>,
    /// Householder vectors (below the diagonal) and R (above), column-wise.
    qr: Vec<Vec<T>>,
    /// A(I,J) column-wise, as it was when each column joined.
    local: Vec<Vec<T>>,
    /// Diagonal of R.
    d: Vec<T>,
}

impl<'w, T: Real> ColumnFit<'w, T> {
    fn new(a_cols: &'w [Vec<(usize, T)>], params: &'w SpaiParams<T>, marker: &'w mut [usize]) -> Self {
        Self {
            a_cols,
            params,
            marker,
            cols: Vec::new(),
            rows: Vec::new(),
            qr: Vec::new(),
            local: Vec::new(),
            d: Vec::new(),
        }
    }

    /// Column k of M as `(row of M, value)` in support order.
    fn solve(mut self, k: usize, support: Vec<usize>) -> Result<Vec<(usize, T)>, KError> {
        let p = self.params;
        self.cols = support;
        self.extend_rows(0);

        let mut factored = 0;
        let mut iter = 0;
        let mut last_res = None;
        let mut converged = false;
        let mut m;
        loop {
            self.factor_new_columns(k, factored)?;
            m = self.least_squares(k);

            if iter >= p.max_iter || self.cols.len() >= p.fill_in {
                break;
            }
            iter += 1;

            let r = self.residual(k, &m);
            let res = vector::norm2(&r);
            last_res = Some(res);
            factored = self.cols.len();
            if res < p.eps_res {
                converged = true;
                break;
            }

            let added = self.select_candidates(&r);
            if added.is_empty() {
                break;
            }
            self.cols.extend(added);
            self.extend_rows(factored);
        }

        if let (false, Some(res)) = (converged, last_res) {
            if res >= p.eps_res {
                log::warn!(
                    "SPAI column {k}: residual {res:?} above eps_res {:?} with |J| = {}",
                    p.eps_res,
                    self.cols.len()
                );
            }
        }

        for &row in &self.rows {
            self.marker[row] = usize::MAX;
        }
        Ok(self.cols.iter().copied().zip(m).collect())
    }

    /// Append the rows touched by `cols[from..]` that are not in I yet.
    fn extend_rows(&mut self, from: usize) {
        let mut fresh = Vec::new();
        for &c in &self.cols[from..] {
            for &(row, _) in &self.a_cols[c] {
                if self.marker[row] == usize::MAX {
                    self.marker[row] = 0;
                    fresh.push(row);
                }
            }
        }
        fresh.sort_unstable();
        for row in fresh {
            self.marker[row] = self.rows.len();
            self.rows.push(row);
        }
    }

    /// Bring A(I, J[from..]) into the QR factorisation.
    fn factor_new_columns(&mut self, k: usize, from: usize) -> Result<(), KError> {
        let (nn, mm) = (self.cols.len(), self.rows.len());
        if nn > mm {
            return Err(KError::InvalidMatrix(format!(
                "least-squares problem of SPAI column {k} is rank deficient ({mm} rows, {nn} columns)"
            )));
        }
        for &c in &self.cols[from..] {
            let mut col = vec![T::zero(); mm];
            for &(row, v) in &self.a_cols[c] {
                col[self.marker[row]] = v;
            }
            self.qr.push(col.clone());
            self.local.push(col);
        }

        // apply the existing reflectors to the new columns
        let (old, new) = self.qr.split_at_mut(from);
        for col in new.iter_mut() {
            for (j, h) in old.iter().enumerate() {
                reflect(h, col, j, h.len());
            }
        }

        self.d.resize(nn, T::zero());
        for j in from..nn {
            let (left, right) = self.qr.split_at_mut(j + 1);
            let h = &mut left[j];
            let s = h[j..mm].iter().fold(T::zero(), |acc, &x| acc + x * x).sqrt();
            self.d[j] = if h[j] > T::zero() { -s } else { s };
            let fak = (s * (s + h[j].abs())).sqrt();
            h[j] = h[j] - self.d[j];
            for x in &mut h[j..mm] {
                *x = *x / fak;
            }
            for other in right.iter_mut() {
                reflect(h, other, j, mm);
            }
        }
        Ok(())
    }

    /// Solve R m = Qᵗ e_k.
    fn least_squares(&self, k: usize) -> Vec<T> {
        let nn = self.cols.len();
        let mut e = vec![T::zero(); self.rows.len()];
        if let Some(&pos) = self.marker.get(k).filter(|&&p| p != usize::MAX) {
            e[pos] = T::one();
        }
        for (j, h) in self.qr.iter().enumerate() {
            reflect(h, &mut e, j, h.len());
        }
        for i in (0..nn).rev() {
            for j in i + 1..nn {
                e[i] = e[i] - self.qr[j][i] * e[j];
            }
            e[i] = e[i] / self.d[i];
        }
        e.truncate(nn);
        e
    }

    /// r = A(I,J) m − e_k over I.
    fn residual(&self, k: usize, m: &[T]) -> Vec<T> {
        let mut r = vec![T::zero(); self.rows.len()];
        if let Some(&pos) = self.marker.get(k).filter(|&&p| p != usize::MAX) {
            r[pos] = -T::one();
        }
        for (col, &mj) in self.local.iter().zip(m) {
            for (ri, &v) in r.iter_mut().zip(col) {
                *ri = *ri + v * mj;
            }
        }
        r
    }

    /// New support indices, best first, sorted ascending among themselves.
    fn select_candidates(&self, r: &[T]) -> Vec<usize> {
        let p = self.params;
        let mut rho: Vec<(T, usize)> = Vec::new();
        for (pos, &row) in self.rows.iter().enumerate() {
            if r[pos].abs() < p.eps_res_comp || self.cols.contains(&row) {
                continue;
            }
            let (mut dot, mut sq) = (T::zero(), T::zero());
            for &(i, v) in &self.a_cols[row] {
                sq = sq + v * v;
                if let Some(&q) = self.marker.get(i).filter(|&&q| q != usize::MAX) {
                    dot = dot + r[q] * v;
                }
            }
            rho.push((dot * dot / sq, row));
        }

        let mut added = Vec::new();
        while self.cols.len() + added.len() < p.fill_in {
            let best = rho
                .iter_mut()
                .filter(|e| e.0 > T::zero())
                .max_by(|x, y| x.0.partial_cmp(&y.0).unwrap_or(std::cmp::Ordering::Equal));
            match best {
                Some(e) if e.0 > p.max_rho => {
                    e.0 = T::zero();
                    added.push(e.1);
                }
                _ => break,
            }
        }
        added.sort_unstable();
        added
    }
}

/// Apply the reflector stored in `h` (acting from index `j`) to `x[j..len]`.
fn reflect<T: Real>(h: &[T], x: &mut [T], j: usize, len: usize) {
    let s = (j..len).fold(T::zero(), |acc, l| acc + h[l] * x[l]);
    for l in j..len {
        x[l] = x[l] - h[l] * s;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::CsrMatrix;
    use approx::assert_abs_diff_eq;

    fn tridiag(n: usize) -> CsrMatrix<f64> {
        let rows: Vec<Vec<(usize, f64)>> = (0..n)
            .map(|i| {
                let mut r = Vec::new();
                if i > 0 {
                    r.push((i - 1, -1.0));
                }
                r.push((i, 4.0));
                if i + 1 < n {
                    r.push((i + 1, -1.0));
                }
                r
            })
            .collect();
        CsrMatrix::from_rows(n, n, &rows).unwrap()
    }

    #[test]
    fn diagonal_matrix_inverts_exactly() {
        let a = CsrMatrix::from_rows(3, 3, &[vec![(0, 2.0)], vec![(1, -4.0)], vec![(2, 5.0)]]).unwrap();
        let spai = Spai::new(&a, 0, SpaiParams::default()).unwrap();
        let m = spai.matrix();
        assert_abs_diff_eq!(m.get(0, 0), 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(m.get(1, 1), -0.25, epsilon = 1e-15);
        assert_abs_diff_eq!(m.get(2, 2), 0.2, epsilon = 1e-15);
        assert_eq!(m.used_elements(), 3);
    }

    #[test]
    fn full_band_solves_small_system() {
        let a = tridiag(4);
        let params = SpaiParams { max_iter: 0, ..SpaiParams::default() };
        let spai = Spai::new(&a, 3, params).unwrap();
        let x = [1.0, 2.0, -1.0, 0.5];
        let mut b = vec![0.0; 4];
        a.spmv(&x, &mut b);
        let mut y = vec![0.0; 4];
        spai.apply(&b, &mut y).unwrap();
        assert_abs_diff_eq!(y.as_slice(), x.as_slice(), epsilon = 1e-12);
    }

    #[test]
    fn transposed_storage_applies_the_same_operator() {
        let a = tridiag(6);
        let plain = Spai::new(&a, 1, SpaiParams::default()).unwrap();
        let params = SpaiParams { transpose: true, ..SpaiParams::default() };
        let trans = Spai::new(&a, 1, params).unwrap();
        assert!(trans.is_transposed());
        let r = [1.0, -1.0, 0.5, 2.0, 0.0, 3.0];
        let (mut z1, mut z2) = (vec![0.0; 6], vec![0.0; 6]);
        plain.apply(&r, &mut z1).unwrap();
        trans.apply(&r, &mut z2).unwrap();
        assert_abs_diff_eq!(z1.as_slice(), z2.as_slice(), epsilon = 1e-14);
    }

    #[test]
    fn empty_column_rejected() {
        let a = CsrMatrix::from_rows(2, 2, &[vec![(0, 1.0)], vec![(0, 1.0)]]).unwrap();
        assert!(matches!(Spai::new(&a, 1, SpaiParams::default()), Err(KError::EmptyColumn(1))));
    }

    #[test]
    fn in_place_unsupported() {
        let a = tridiag(3);
        let spai = Spai::new(&a, 0, SpaiParams::default()).unwrap();
        assert!(!spai.supports_in_place());
        assert!(spai.apply_in_place(&mut [1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn negative_threshold_rejected() {
        let a = tridiag(3);
        let params = SpaiParams { eps_res: -1.0, ..SpaiParams::default() };
        assert!(matches!(Spai::new(&a, 0, params), Err(KError::InvalidParameter(_))));
    }

    #[test]
    fn huge_bandwidth_clamps_to_full_columns() {
        let a = tridiag(4);
        let params = SpaiParams { max_iter: 0, ..SpaiParams::default() };
        let wide = Spai::new(&a, usize::MAX, params.clone()).unwrap();
        let full = Spai::new(&a, 3, params).unwrap();
        assert_eq!(wide.matrix(), full.matrix());
    }
}
