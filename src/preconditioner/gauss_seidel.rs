// Gauss-Seidel preconditioner: one forward sweep, then damping

use crate::core::traits::Real;
use crate::core::vector;
use crate::error::KError;
use crate::matrix::SparseMatrix;
use crate::preconditioner::sor::{check_sweep_matrix, sweep, MatSorType};
use crate::preconditioner::Preconditioner;

#[derive(Clone, Debug)]
pub struct GaussSeidel<'a, T, M> {
    pub(crate) a: &'a M,
    damping: T,
}

impl<'a, T: Real, M: SparseMatrix<T>> GaussSeidel<'a, T, M> {
    pub fn new(a: &'a M, damping: T) -> Result<Self, KError> {
        check_sweep_matrix(a)?;
        log::debug!("Gauss-Seidel: n={}, nnz={}", a.nrows(), a.used_elements());
        Ok(Self { a, damping })
    }

    pub fn damping(&self) -> T {
        self.damping
    }
}

impl<'a, T: Real, M: SparseMatrix<T>> Preconditioner<T> for GaussSeidel<'a, T, M> {
    fn apply(&self, r: &[T], z: &mut [T]) -> Result<(), KError> {
        KError::check_len(self.a.nrows(), r.len())?;
        KError::check_len(self.a.nrows(), z.len())?;
        vector::copy(z, r);
        self.apply_in_place(z)
    }

    fn apply_in_place(&self, x: &mut [T]) -> Result<(), KError> {
        KError::check_len(self.a.nrows(), x.len())?;
        sweep(self.a, None, x, MatSorType::APPLY_LOWER, T::one());
        if self.damping != T::one() {
            vector::scale(x, self.damping);
        }
        Ok(())
    }

    fn supports_in_place(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "GaussSeidel_Preconditioner"
    }
}
