//! sparse-precond: sparse-matrix preconditioners over interchangeable storage formats
//!
//! A caller assembles A in one of the storage formats (CSR, SELL-C fixed
//! width, COO), builds a preconditioner around it once (None, Jacobi,
//! Gauss-Seidel, SOR, SSOR, ILU(p), SPAI, Neumann polynomial) and then calls
//! `apply` inside an iterative solver. Every algorithm is written once against
//! the [`SparseMatrix`] row view, so all formats give the same results.

pub mod config;
pub mod context;
pub mod core;
pub mod error;
pub mod matrix;
pub mod preconditioner;
pub mod solver;
pub mod utils;

// Re-exports for convenience
pub use crate::config::{PcOptions, PcType};
pub use crate::context::PC;
pub use crate::core::traits::{InnerProduct, MatVec, Real};
pub use crate::error::KError;
pub use crate::matrix::{CooMatrix, CsrMatrix, EllMatrix, RowSpan, SparseMatrix};
pub use crate::preconditioner::{
    GaussSeidel, Ilu, Jacobi, NonePc, Polynomial, Precond, Preconditioner, Sor, Spai, SpaiParams,
    Ssor,
};
pub use crate::solver::{LinearSolver, PcgSolver, RichardsonSolver};

// Re-export SolveStats at the crate root for convenience
pub use crate::utils::convergence::SolveStats;
