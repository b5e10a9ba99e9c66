//! Symmetric SOR: forward then backward sweep, scaled by ω(2 − ω).

use crate::core::traits::Real;
use crate::core::vector;
use crate::error::KError;
use crate::matrix::SparseMatrix;
use crate::preconditioner::sor::{check_sweep_matrix, sweep, MatSorType};
use crate::preconditioner::Preconditioner;

/// Default relaxation factor for [`Ssor`].
pub const DEFAULT_OMEGA: f64 = 1.3;

#[derive(Clone, Debug)]
pub struct Ssor<'a, T, M> {
    pub(crate) a: &'a M,
    omega: T,
    scale: T,
}

impl<'a, T: Real, M: SparseMatrix<T>> Ssor<'a, T, M> {
    /// Rejects ω within 1e-10 of 2, where the normalisation vanishes.
    pub fn new(a: &'a M, omega: T) -> Result<Self, KError> {
        check_sweep_matrix(a)?;
        let two = T::one() + T::one();
        let guard = T::from(1e-10).unwrap_or_else(T::epsilon);
        if (omega - two).abs() < guard {
            return Err(KError::InvalidParameter(format!(
                "SSOR omega {omega:?} is too close to 2"
            )));
        }
        log::debug!("SSOR: n={}, nnz={}", a.nrows(), a.used_elements());
        Ok(Self { a, omega, scale: omega * (two - omega) })
    }

    pub fn omega(&self) -> T {
        self.omega
    }
}

impl<'a, T: Real, M: SparseMatrix<T>> Preconditioner<T> for Ssor<'a, T, M> {
    fn apply(&self, r: &[T], z: &mut [T]) -> Result<(), KError> {
        KError::check_len(self.a.nrows(), r.len())?;
        KError::check_len(self.a.nrows(), z.len())?;
        sweep(self.a, Some(r), z, MatSorType::SYMMETRIC_SWEEP, self.omega);
        vector::scale(z, self.scale);
        Ok(())
    }

    fn apply_in_place(&self, x: &mut [T]) -> Result<(), KError> {
        KError::check_len(self.a.nrows(), x.len())?;
        sweep(self.a, None, x, MatSorType::SYMMETRIC_SWEEP, self.omega);
        vector::scale(x, self.scale);
        Ok(())
    }

    fn supports_in_place(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "SSOR_Preconditioner"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::CsrMatrix;
    use approx::assert_abs_diff_eq;

    fn spd3() -> CsrMatrix<f64> {
        CsrMatrix::from_rows(
            3,
            3,
            &[
                vec![(0, 4.0), (1, -1.0)],
                vec![(0, -1.0), (1, 4.0), (2, -1.0)],
                vec![(1, -1.0), (2, 4.0)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn unit_omega_is_symmetric_gauss_seidel() {
        let a = spd3();
        let r = [1.0, 2.0, 3.0];
        let mut z = vec![0.0; 3];
        Ssor::new(&a, 1.0).unwrap().apply(&r, &mut z).unwrap();

        // (D + L) y = r, then (D + U) z = D y
        let dense = a.to_dense();
        let mut y = [0.0; 3];
        for i in 0..3 {
            let s: f64 = (0..i).map(|j| dense[(i, j)] * y[j]).sum();
            y[i] = (r[i] - s) / dense[(i, i)];
        }
        let mut expect = [0.0; 3];
        for i in (0..3).rev() {
            let s: f64 = (i + 1..3).map(|j| dense[(i, j)] * expect[j]).sum();
            expect[i] = y[i] - s / dense[(i, i)];
        }
        assert_abs_diff_eq!(z.as_slice(), expect.as_slice(), epsilon = 1e-14);
    }

    #[test]
    fn omega_near_two_rejected() {
        let a = spd3();
        assert!(matches!(Ssor::new(&a, 2.0 - 1e-12), Err(KError::InvalidParameter(_))));
        assert!(Ssor::new(&a, 1.99).is_ok());
    }
}
