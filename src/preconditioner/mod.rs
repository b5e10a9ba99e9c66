//! Preconditioners for linear solvers.
//!
//! This module defines the Preconditioner trait and the [`Precond`] variant
//! that wraps every implementation: None, Jacobi, Gauss-Seidel, SOR, SSOR,
//! ILU(p), SPAI and the Neumann polynomial. Each one is built once around a
//! square [`SparseMatrix`](crate::matrix::SparseMatrix) (expensive set-up
//! happens in the constructor) and then applied many times.

use crate::core::traits::Real;
use crate::error::KError;
use crate::matrix::SparseMatrix;

/// A preconditioner M ≈ A⁻¹.
pub trait Preconditioner<T> {
    /// Apply M to r, writing z = M r.
    fn apply(&self, r: &[T], z: &mut [T]) -> Result<(), KError>;
    /// Overwrite x with M x. Only preconditioners whose sweep tolerates the
    /// input and output being the same buffer support this.
    fn apply_in_place(&self, _x: &mut [T]) -> Result<(), KError> {
        Err(KError::Unsupported("in-place apply"))
    }
    fn supports_in_place(&self) -> bool {
        false
    }
    /// Short descriptive name.
    fn name(&self) -> &'static str;
}

// Submodules for various preconditioners
pub mod gauss_seidel;
pub mod ilu;
pub mod jacobi;
pub mod none;
pub mod polynomial;
pub mod sor;
pub mod spai;
pub mod ssor;

// Re-exports for convenience
pub use self::sor::{sweep, MatSorType};
pub use gauss_seidel::GaussSeidel;
pub use ilu::Ilu;
pub use jacobi::Jacobi;
pub use none::NonePc;
pub use polynomial::Polynomial;
pub use sor::Sor;
pub use spai::{Spai, SpaiParams};
pub use ssor::Ssor;

/// Declarative preconditioner description and factory.
pub use crate::context::pc_context::PC;

/// Every preconditioner behind one type; what a solver loop holds on to.
pub enum Precond<'a, T: Real, M: SparseMatrix<T>> {
    None(NonePc<T>),
    Jacobi(Jacobi<T>),
    GaussSeidel(GaussSeidel<'a, T, M>),
    Sor(Sor<'a, T, M>),
    Ssor(Ssor<'a, T, M>),
    Ilu(Ilu<T, M>),
    Spai(Spai<T, M>),
    Polynomial(Polynomial<'a, T, M>),
}

impl<'a, T: Real, M: SparseMatrix<T>> Precond<'a, T, M> {
    fn inner(&self) -> &dyn Preconditioner<T> {
        match self {
            Precond::None(p) => p,
            Precond::Jacobi(p) => p,
            Precond::GaussSeidel(p) => p,
            Precond::Sor(p) => p,
            Precond::Ssor(p) => p,
            Precond::Ilu(p) => p,
            Precond::Spai(p) => p,
            Precond::Polynomial(p) => p,
        }
    }

    /// Operator dimension; `None` for the matrix-free identity.
    pub fn dim(&self) -> Option<usize> {
        match self {
            Precond::None(_) => None,
            Precond::Jacobi(p) => Some(p.inv_diag().len()),
            Precond::GaussSeidel(p) => Some(p.a.nrows()),
            Precond::Sor(p) => Some(p.a.nrows()),
            Precond::Ssor(p) => Some(p.a.nrows()),
            Precond::Ilu(p) => Some(p.lu().nrows()),
            Precond::Spai(p) => Some(p.matrix().nrows()),
            Precond::Polynomial(p) => Some(p.a.nrows()),
        }
    }
}

impl<'a, T: Real, M: SparseMatrix<T>> Preconditioner<T> for Precond<'a, T, M> {
    fn apply(&self, r: &[T], z: &mut [T]) -> Result<(), KError> {
        self.inner().apply(r, z)
    }
    fn apply_in_place(&self, x: &mut [T]) -> Result<(), KError> {
        self.inner().apply_in_place(x)
    }
    fn supports_in_place(&self) -> bool {
        self.inner().supports_in_place()
    }
    fn name(&self) -> &'static str {
        self.inner().name()
    }
}

macro_rules! precond_from {
    ($variant:ident, $ty:ty) => {
        impl<'a, T: Real, M: SparseMatrix<T>> From<$ty> for Precond<'a, T, M> {
            fn from(p: $ty) -> Self {
                Precond::$variant(p)
            }
        }
    };
}

precond_from!(None, NonePc<T>);
precond_from!(Jacobi, Jacobi<T>);
precond_from!(GaussSeidel, GaussSeidel<'a, T, M>);
precond_from!(Sor, Sor<'a, T, M>);
precond_from!(Ssor, Ssor<'a, T, M>);
precond_from!(Ilu, Ilu<T, M>);
precond_from!(Spai, Spai<T, M>);
precond_from!(Polynomial, Polynomial<'a, T, M>);
