//! Successive over-relaxation and the triangular sweep shared by the
//! Gauss-Seidel, SOR and SSOR preconditioners.
//!
//! The sweep walks the stored entries of each row through
//! [`SparseMatrix::row`], so CSR, SELL-C and COO all run the same loop; only
//! the [`RowSpan`](crate::matrix::RowSpan) of a row differs between formats.

use std::fmt;

use bitflags::bitflags;

use crate::core::traits::Real;
use crate::error::KError;
use crate::matrix::SparseMatrix;
use crate::preconditioner::Preconditioner;

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct MatSorType: u32 {
        const APPLY_LOWER     = 0b0000_0010; // forward Gauss–Seidel
        const APPLY_UPPER     = 0b0000_0100; // backward
        const SYMMETRIC_SWEEP = Self::APPLY_LOWER.bits() | Self::APPLY_UPPER.bits();
    }
}

/// Default relaxation factor for [`Sor`].
pub const DEFAULT_OMEGA: f64 = 0.7;

/// One relaxation sweep over `a`.
///
/// * `APPLY_LOWER`: `out[i] = ω (in[i] − Σ_{j<i} a_ij out[j]) / a_ii`.
/// * `APPLY_UPPER`: the same going backwards over the strictly upper part.
/// * `SYMMETRIC_SWEEP`: forward `out[i] = (in[i] − ω Σ_{j<i} a_ij out[j]) / a_ii`,
///   then backward `out[i] -= ω Σ_{j>i} a_ij out[j] / a_ii`. The caller applies
///   the ω(2 − ω) normalisation.
///
/// With `input == None` the right-hand side is read from `out[i]` just before
/// it is overwritten, which makes every sweep safe to run in place.
pub fn sweep<T: Real, M: SparseMatrix<T>>(
    a: &M,
    input: Option<&[T]>,
    out: &mut [T],
    flag: MatSorType,
    omega: T,
) {
    let n = a.nrows();
    let symmetric = flag.contains(MatSorType::SYMMETRIC_SWEEP);

    if flag.contains(MatSorType::APPLY_LOWER) {
        let (alpha, beta) = if symmetric { (T::one(), omega) } else { (omega, T::one()) };
        for i in 0..n {
            let mut d = T::zero();
            let mut diag = T::zero();
            for (c, v) in a.row(i) {
                if c < i {
                    d = d + v * out[c];
                } else {
                    if c == i {
                        diag = v;
                    }
                    break;
                }
            }
            let rhs = input.map_or(out[i], |x| x[i]);
            out[i] = alpha * (rhs - beta * d) / diag;
        }
    }

    if flag.contains(MatSorType::APPLY_UPPER) {
        for i in (0..n).rev() {
            let mut d = T::zero();
            let mut diag = T::zero();
            for (c, v) in a.row(i).rev() {
                if c > i {
                    d = d + v * out[c];
                } else {
                    if c == i {
                        diag = v;
                    }
                    break;
                }
            }
            if symmetric {
                out[i] = out[i] - omega * d / diag;
            } else {
                let rhs = input.map_or(out[i], |x| x[i]);
                out[i] = omega * (rhs - d) / diag;
            }
        }
    }
}

/// Checks shared by every sweep-based preconditioner.
pub(crate) fn check_sweep_matrix<T: Real, M: SparseMatrix<T>>(a: &M) -> Result<(), KError> {
    a.ensure_square()?;
    a.ensure_diagonal()
}

/// SOR: a single forward sweep with relaxation ω, no damping epilogue.
#[derive(Clone, Debug)]
pub struct Sor<'a, T, M> {
    pub(crate) a: &'a M,
    omega: T,
}

impl<'a, T: Real, M: SparseMatrix<T>> Sor<'a, T, M> {
    pub fn new(a: &'a M, omega: T) -> Result<Self, KError> {
        check_sweep_matrix(a)?;
        log::debug!("SOR: n={}, nnz={}", a.nrows(), a.used_elements());
        Ok(Self { a, omega })
    }

    pub fn omega(&self) -> T {
        self.omega
    }
}

impl<'a, T, M> fmt::Display for Sor<'a, T, M>
where
    T: Real + fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SOR(omega={}, sym={:?})", self.omega, MatSorType::APPLY_LOWER)
    }
}

impl<'a, T: Real, M: SparseMatrix<T>> Preconditioner<T> for Sor<'a, T, M> {
    fn apply(&self, r: &[T], z: &mut [T]) -> Result<(), KError> {
        KError::check_len(self.a.nrows(), r.len())?;
        KError::check_len(self.a.nrows(), z.len())?;
        sweep(self.a, Some(r), z, MatSorType::APPLY_LOWER, self.omega);
        Ok(())
    }

    fn apply_in_place(&self, x: &mut [T]) -> Result<(), KError> {
        KError::check_len(self.a.nrows(), x.len())?;
        sweep(self.a, None, x, MatSorType::APPLY_LOWER, self.omega);
        Ok(())
    }

    fn supports_in_place(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "SOR_Preconditioner"
    }
}
