// Jacobi preconditioner implementation

use crate::core::traits::Real;
use crate::core::vector;
use crate::error::KError;
use crate::matrix::SparseMatrix;
use crate::preconditioner::Preconditioner;

/// Jacobi preconditioner: M = damping · D⁻¹
///
/// A zero diagonal entry is not rejected; it yields an infinite scaling factor
/// that shows up in every later `apply`. Call [`Jacobi::check_pivots`] to
/// detect it explicitly.
#[derive(Clone, Debug)]
pub struct Jacobi<T> {
    pub(crate) inv_diag: Vec<T>,
}

impl<T: Real> Jacobi<T> {
    /// Compute `damping / A[i,i]` for every row of the square matrix `a`.
    pub fn new<M: SparseMatrix<T>>(a: &M, damping: T) -> Result<Self, KError> {
        a.ensure_square()?;
        let inv_diag: Vec<T> = (0..a.nrows()).map(|i| damping / a.get(i, i)).collect();
        log::debug!("Jacobi: {} diagonal scalings", inv_diag.len());
        Ok(Self { inv_diag })
    }

    /// The scaling vector `damping / diag(A)`.
    pub fn inv_diag(&self) -> &[T] {
        &self.inv_diag
    }

    /// Reports the first row whose scaling is not finite.
    pub fn check_pivots(&self) -> Result<(), KError> {
        match self.inv_diag.iter().position(|d| !d.is_finite()) {
            Some(i) => Err(KError::ZeroPivot(i)),
            None => Ok(()),
        }
    }
}

impl<T: Real> Preconditioner<T> for Jacobi<T> {
    fn apply(&self, x: &[T], y: &mut [T]) -> Result<(), KError> {
        KError::check_len(self.inv_diag.len(), x.len())?;
        KError::check_len(self.inv_diag.len(), y.len())?;
        vector::component_product(y, &self.inv_diag, x);
        Ok(())
    }

    fn apply_in_place(&self, x: &mut [T]) -> Result<(), KError> {
        KError::check_len(self.inv_diag.len(), x.len())?;
        vector::component_product_in_place(x, &self.inv_diag);
        Ok(())
    }

    fn supports_in_place(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "Jacobi_Preconditioner"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::CsrMatrix;

    #[test]
    fn damped_inverse_diagonal() {
        let a = CsrMatrix::<f64>::from_rows(2, 2, &[vec![(0, 4.0), (1, 1.0)], vec![(0, 1.0), (1, 2.0)]]).unwrap();
        let pc = Jacobi::new(&a, 0.5).unwrap();
        assert_eq!(pc.inv_diag(), &[0.125, 0.25]);
        let mut y = vec![0.0; 2];
        pc.apply(&[8.0, 8.0], &mut y).unwrap();
        assert_eq!(y, vec![1.0, 2.0]);
    }

    #[test]
    fn zero_diagonal_propagates_infinity() {
        let a = CsrMatrix::<f64>::from_rows(2, 2, &[vec![(1, 1.0)], vec![(1, 2.0)]]).unwrap();
        let pc = Jacobi::new(&a, 1.0).unwrap();
        assert!(pc.inv_diag()[0].is_infinite());
        assert_eq!(pc.check_pivots(), Err(KError::ZeroPivot(0)));
    }
}
