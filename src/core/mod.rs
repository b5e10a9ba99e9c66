//! Core scalar bounds, operator traits and dense vector kernels.

pub mod traits;
pub mod vector;

pub use traits::{InnerProduct, MatVec, Real};
