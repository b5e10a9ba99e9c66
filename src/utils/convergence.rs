//! Convergence tracking & tolerance checks for iterative solvers.

use crate::core::traits::Real;

/// Stopping criteria & stats.
#[derive(Clone, Debug)]
pub struct Convergence<T> {
    /// Relative residual tolerance ‖r‖ / ‖r₀‖.
    pub tol: T,
    pub max_iters: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SolveStats<T> {
    pub iterations: usize,
    pub final_residual: T,
    pub converged: bool,
}

impl<T: Real> Convergence<T> {
    /// Returns (should_stop, stats) given current `res_norm` and iteration `i`.
    ///
    /// `converged` is set only when the tolerance is met; running out of
    /// iterations stops without it. A zero initial residual counts as met.
    pub fn check(&self, res_norm: T, res0_norm: T, i: usize) -> (bool, SolveStats<T>) {
        let converged = if res0_norm == T::zero() {
            true
        } else {
            res_norm / res0_norm <= self.tol
        };
        (
            converged || i >= self.max_iters,
            SolveStats { iterations: i, final_residual: res_norm, converged },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_exhaustion_is_not_convergence() {
        let conv = Convergence { tol: 1e-6, max_iters: 5 };
        let (stop, stats) = conv.check(0.5, 1.0, 5);
        assert!(stop);
        assert!(!stats.converged);
        let (stop, stats) = conv.check(1e-7, 1.0, 2);
        assert!(stop && stats.converged);
    }
}
