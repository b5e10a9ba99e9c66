//! Preconditioned Richardson iteration: x ← x + ω M (b − A x).

use crate::core::traits::{MatVec, Real};
use crate::core::vector::{axpy, norm2};
use crate::error::KError;
use crate::preconditioner::Preconditioner;
use crate::solver::LinearSolver;
use crate::utils::convergence::{Convergence, SolveStats};

pub struct RichardsonSolver<T> {
    pub conv: Convergence<T>,
    /// Step length ω.
    pub omega: T,
    pub residual_history: Vec<T>,
}

impl<T: Real> RichardsonSolver<T> {
    pub fn new(tol: T, max_iters: usize) -> Self {
        Self { conv: Convergence { tol, max_iters }, omega: T::one(), residual_history: Vec::new() }
    }

    pub fn with_omega(mut self, omega: T) -> Self {
        self.omega = omega;
        self
    }
}

impl<M, T> LinearSolver<T, M> for RichardsonSolver<T>
where
    M: MatVec<T> + ?Sized,
    T: Real,
{
    type Error = KError;

    fn solve(
        &mut self,
        a: &M,
        pc: Option<&dyn Preconditioner<T>>,
        b: &[T],
        x: &mut [T],
    ) -> Result<SolveStats<T>, KError> {
        let n = a.dim();
        KError::check_len(n, b.len())?;
        KError::check_len(n, x.len())?;
        let mut r = vec![T::zero(); n];
        let mut z = vec![T::zero(); n];

        let residual = |x: &[T], r: &mut [T]| {
            a.matvec(x, r);
            for (ri, &bi) in r.iter_mut().zip(b) {
                *ri = bi - *ri;
            }
            norm2(r)
        };

        let res0 = residual(&*x, &mut r[..]);
        self.residual_history.push(res0);
        let (mut stop, mut stats) = self.conv.check(res0, res0, 0);
        let mut i = 0;
        while !stop {
            match pc {
                Some(pc) => pc.apply(&r, &mut z)?,
                None => z.copy_from_slice(&r),
            }
            axpy(x, self.omega, &z);
            i += 1;
            let res = residual(&*x, &mut r[..]);
            log::trace!("Richardson iter {}: residual {:?}", i, res);
            self.residual_history.push(res);
            (stop, stats) = self.conv.check(res, res0, i);
        }
        log::debug!(
            "Richardson finished: {} iterations, residual {:?}, converged={}",
            stats.iterations,
            stats.final_residual,
            stats.converged
        );
        Ok(stats)
    }
}
