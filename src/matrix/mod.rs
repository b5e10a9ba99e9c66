//! Matrix module: the sparse row-view trait and its three storage formats.

pub mod sparse;
pub use sparse::{RowSpan, SparseMatrix};
pub mod csr;
pub use csr::CsrMatrix;
pub mod ell;
pub use ell::EllMatrix;
pub mod coo;
pub use coo::CooMatrix;
