//! Iterative solvers that drive the preconditioners.

use crate::preconditioner::Preconditioner;
use crate::utils::convergence::SolveStats;

/// Common interface for iterative solvers.
pub trait LinearSolver<T, M: ?Sized> {
    type Error;
    /// Solve A·x = b starting from the contents of `x`, writing the result into `x`.
    /// Returns iteration stats (including convergence info).
    fn solve(
        &mut self,
        a: &M,
        pc: Option<&dyn Preconditioner<T>>,
        b: &[T],
        x: &mut [T],
    ) -> Result<SolveStats<T>, Self::Error>;
}

pub mod pcg;
pub use pcg::PcgSolver;

pub mod richardson;
pub use richardson::RichardsonSolver;
