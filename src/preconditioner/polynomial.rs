//! Neumann-series polynomial preconditioner
//! `M = Σ_{j=0}^{m} (I − P A)^j P` around an inner preconditioner P.
//!
//! Evaluated as `z₀ = P r`, `z ← z + z₀ − P A z` repeated m times. The series
//! converges only when `‖I − P A‖ < 1`; that is not checked.

use std::cell::RefCell;

use crate::core::traits::Real;
use crate::error::KError;
use crate::matrix::SparseMatrix;
use crate::preconditioner::{Precond, Preconditioner};

struct Work<T> {
    z0: Vec<T>,
    aux: Vec<T>,
    /// Only allocated when the inner preconditioner cannot run in place.
    tmp: Vec<T>,
}

pub struct Polynomial<'a, T: Real, M: SparseMatrix<T>> {
    pub(crate) a: &'a M,
    order: usize,
    inner: Box<Precond<'a, T, M>>,
    in_place: bool,
    work: RefCell<Work<T>>,
}

impl<'a, T: Real, M: SparseMatrix<T>> Polynomial<'a, T, M> {
    pub fn new(a: &'a M, order: usize, inner: impl Into<Precond<'a, T, M>>) -> Result<Self, KError> {
        a.ensure_square()?;
        let inner = Box::new(inner.into());
        let n = a.nrows();
        if let Some(m) = inner.dim() {
            if m != n {
                return Err(KError::DimensionMismatch { expected: n, found: m });
            }
        }
        let in_place = inner.supports_in_place();
        let tmp = if in_place { Vec::new() } else { vec![T::zero(); n] };
        log::debug!("Polynomial: order {} around {}", order, inner.name());
        Ok(Self {
            a,
            order,
            inner,
            in_place,
            work: RefCell::new(Work { z0: vec![T::zero(); n], aux: vec![T::zero(); n], tmp }),
        })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn inner(&self) -> &Precond<'a, T, M> {
        &self.inner
    }

    /// `z` holds P r on entry.
    fn accumulate(&self, z: &mut [T]) -> Result<(), KError> {
        let mut work = self.work.borrow_mut();
        let Work { z0, aux, tmp } = &mut *work;
        z0.copy_from_slice(z);
        for _ in 0..self.order {
            self.a.spmv(z, aux);
            let pa: &[T] = if self.in_place {
                self.inner.apply_in_place(aux)?;
                &aux[..]
            } else {
                self.inner.apply(aux, tmp)?;
                &tmp[..]
            };
            for ((zi, &z0i), &pai) in z.iter_mut().zip(z0.iter()).zip(pa) {
                *zi = *zi + z0i - pai;
            }
        }
        Ok(())
    }
}

impl<'a, T: Real, M: SparseMatrix<T>> Preconditioner<T> for Polynomial<'a, T, M> {
    fn apply(&self, r: &[T], z: &mut [T]) -> Result<(), KError> {
        KError::check_len(self.a.nrows(), r.len())?;
        KError::check_len(self.a.nrows(), z.len())?;
        self.inner.apply(r, z)?;
        self.accumulate(z)
    }

    fn apply_in_place(&self, x: &mut [T]) -> Result<(), KError> {
        KError::check_len(self.a.nrows(), x.len())?;
        if self.in_place {
            self.inner.apply_in_place(x)?;
        } else {
            let mut work = self.work.borrow_mut();
            work.tmp.copy_from_slice(x);
            self.inner.apply(&work.tmp, x)?;
        }
        self.accumulate(x)
    }

    fn supports_in_place(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "Polynomial_Preconditioner"
    }
}
