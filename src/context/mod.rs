//! Context module: declarative preconditioner descriptions and their factory.
//!
//! Modules:
//! - [`pc_context`]: the `PC` description, built from [`PcOptions`](crate::config::PcOptions)
//!   or by hand, and turned into a ready preconditioner with `PC::build`.

pub mod pc_context;

pub use pc_context::PC;
