//! Configuration: PETSc-style preconditioner options.

pub mod options;

pub use options::{PcOptions, PcType};
