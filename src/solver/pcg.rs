//! Preconditioned Conjugate Gradient (PCG) per Saad §9.2

use crate::core::traits::{InnerProduct, MatVec, Real};
use crate::core::vector::axpy;
use crate::error::KError;
use crate::preconditioner::Preconditioner;
use crate::solver::LinearSolver;
use crate::utils::convergence::{Convergence, SolveStats};

/// Which residual norm drives the stopping test.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CgNormType {
    Preconditioned,
    Unpreconditioned,
    Natural,
}

pub struct PcgSolver<T> {
    pub conv: Convergence<T>,
    pub norm_type: CgNormType,
    pub monitor: Option<Box<dyn FnMut(usize, T)>>,
    pub residual_history: Vec<T>,
}

impl<T: Real> PcgSolver<T> {
    pub fn new(tol: T, max_iters: usize) -> Self {
        Self {
            conv: Convergence { tol, max_iters },
            norm_type: CgNormType::Unpreconditioned,
            monitor: None,
            residual_history: Vec::new(),
        }
    }
    pub fn with_norm(mut self, norm_type: CgNormType) -> Self {
        self.norm_type = norm_type;
        self
    }
    pub fn with_monitor<F>(mut self, f: F) -> Self
    where
        F: FnMut(usize, T) + 'static,
    {
        self.monitor = Some(Box::new(f));
        self
    }
    pub fn clear_history(&mut self) {
        self.residual_history.clear();
    }

    fn norm(&self, r: &[T], z: &[T]) -> T {
        let ip = ();
        match self.norm_type {
            CgNormType::Preconditioned => ip.norm(z),
            CgNormType::Unpreconditioned => ip.norm(r),
            CgNormType::Natural => ip.dot(r, z).abs().sqrt(),
        }
    }
}

fn precondition<T: Real>(pc: Option<&dyn Preconditioner<T>>, r: &[T], z: &mut [T]) -> Result<(), KError> {
    match pc {
        Some(pc) => pc.apply(r, z),
        None => {
            z.copy_from_slice(r);
            Ok(())
        }
    }
}

impl<M, T> LinearSolver<T, M> for PcgSolver<T>
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

        let ip = ();
        let mut r = vec![T::zero(); n];
        a.matvec(x, &mut r);
        for (ri, &bi) in r.iter_mut().zip(b) {
            *ri = bi - *ri;
        }
        let mut z = vec![T::zero(); n];
        precondition(pc, &r, &mut z)?;
        let mut p = z.clone();
        let mut ap = vec![T::zero(); n];
        let mut rz = ip.dot(&r[..], &z[..]);

        let res0 = self.norm(&r, &z);
        if let Some(ref mut monitor) = self.monitor {
            monitor(0, res0);
        }
        self.residual_history.push(res0);
        let (_, mut stats) = self.conv.check(res0, res0, 0);
        if res0 == T::zero() {
            return Ok(stats);
        }

        for i in 0..self.conv.max_iters {
            a.matvec(&p, &mut ap);
            let p_dot_ap = ip.dot(&p[..], &ap[..]);
            // Indefinite-matrix detection
            if p_dot_ap <= T::zero() {
                return Err(KError::IndefiniteMatrix);
            }
            let alpha = rz / p_dot_ap;
            axpy(x, alpha, &p);
            axpy(&mut r, -alpha, &ap);
            precondition(pc, &r, &mut z)?;
            let rz_new = ip.dot(&r[..], &z[..]);
            let res_norm = self.norm(&r, &z);
            log::trace!("PCG iter {}: residual {:?}", i + 1, res_norm);
            if let Some(ref mut monitor) = self.monitor {
                monitor(i + 1, res_norm);
            }
            self.residual_history.push(res_norm);
            let (stop, s) = self.conv.check(res_norm, res0, i + 1);
            stats = s;
            if stop {
                break;
            }
            let beta = rz_new / rz;
            for (pj, &zj) in p.iter_mut().zip(&z) {
                *pj = zj + beta * *pj;
            }
            rz = rz_new;
        }
        log::debug!(
            "PCG finished: {} iterations, residual {:?}, converged={}",
            stats.iterations,
            stats.final_residual,
            stats.converged
        );
        Ok(stats)
    }
}
