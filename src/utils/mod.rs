//! Utilities shared by the solvers.

pub mod convergence;
