//! Preconditioner context: a declarative description of a preconditioner and
//! the factory that builds it around a matrix.
//!
//! # Example
//!
//! ```rust
//! use sparse_precond::context::pc_context::PC;
//! use sparse_precond::matrix::CsrMatrix;
//! use sparse_precond::preconditioner::Preconditioner;
//!
//! let a = CsrMatrix::<f64>::identity(3);
//! let pc = PC::Ilu { levels: 1 }.build(&a).unwrap();
//! let mut z = vec![0.0; 3];
//! pc.apply(&[1.0, 2.0, 3.0], &mut z).unwrap();
//! assert_eq!(z, vec![1.0, 2.0, 3.0]);
//! ```

use crate::config::options::{PcOptions, PcType};
use crate::core::traits::Real;
use crate::error::KError;
use crate::matrix::SparseMatrix;
use crate::preconditioner::{
    ssor, sor, GaussSeidel, Ilu, Jacobi, NonePc, Polynomial, Precond, Spai, SpaiParams, Sor,
    Ssor,
};

/// Unified preconditioner description.
///
/// Each variant carries the construction parameters of one preconditioner;
/// [`PC::build`] turns it into a ready [`Precond`].
#[derive(Debug, Clone, PartialEq)]
pub enum PC<T> {
    /// Identity scaled by `damping`.
    None { damping: T },
    /// Diagonal scaling `damping / A[i,i]`.
    Jacobi { damping: T },
    /// Forward Gauss-Seidel sweep followed by `damping`.
    GaussSeidel { damping: T },
    /// Single forward SOR sweep.
    Sor { omega: T },
    /// Symmetric SOR; ω must stay away from 2.
    Ssor { omega: T },
    /// ILU(p) with `levels` = p.
    Ilu { levels: usize },
    /// Sparse approximate inverse seeded with a band of half width `bandwidth`.
    Spai { bandwidth: usize, params: SpaiParams<T> },
    /// Neumann polynomial of order `order` around `inner`.
    Polynomial { order: usize, inner: Box<PC<T>> },
}

impl<T: Real> PC<T> {
    /// Translate parsed options into a description.
    pub fn from_options(opts: &PcOptions) -> Result<Self, KError> {
        if opts.pc_type == PcType::Polynomial {
            if opts.poly_inner == PcType::Polynomial {
                return Err(KError::InvalidOption(
                    "-pc_poly_inner cannot be polynomial".to_string(),
                ));
            }
            let inner = Self::single(opts.poly_inner, opts)?;
            return Ok(PC::Polynomial { order: opts.poly_order, inner: Box::new(inner) });
        }
        Self::single(opts.pc_type, opts)
    }

    fn single(kind: PcType, opts: &PcOptions) -> Result<Self, KError> {
        let damping = scalar("-pc_damping", opts.damping)?;
        Ok(match kind {
            PcType::None => PC::None { damping },
            PcType::Jacobi => PC::Jacobi { damping },
            PcType::GaussSeidel => PC::GaussSeidel { damping },
            PcType::Sor => PC::Sor {
                omega: scalar("-pc_omega", opts.omega.unwrap_or(sor::DEFAULT_OMEGA))?,
            },
            PcType::Ssor => PC::Ssor {
                omega: scalar("-pc_omega", opts.omega.unwrap_or(ssor::DEFAULT_OMEGA))?,
            },
            PcType::Ilu => PC::Ilu { levels: opts.ilu_levels },
            PcType::Spai => PC::Spai {
                bandwidth: opts.spai_bandwidth,
                params: SpaiParams {
                    max_iter: opts.spai_max_iter,
                    eps_res: scalar("-pc_spai_eps_res", opts.spai_eps_res)?,
                    fill_in: opts.spai_fill_in,
                    eps_res_comp: scalar("-pc_spai_eps_res_comp", opts.spai_eps_res_comp)?,
                    max_rho: scalar("-pc_spai_max_rho", opts.spai_max_rho)?,
                    transpose: opts.spai_transpose,
                },
            },
            PcType::Polynomial => {
                return Err(KError::InvalidOption(
                    "polynomial preconditioner needs an inner type".to_string(),
                ));
            }
        })
    }

    /// Construct the described preconditioner around `a`.
    pub fn build<'a, M: SparseMatrix<T>>(&self, a: &'a M) -> Result<Precond<'a, T, M>, KError> {
        Ok(match self {
            PC::None { damping } => {
                a.ensure_square()?;
                NonePc::new(*damping).into()
            }
            PC::Jacobi { damping } => Jacobi::new(a, *damping)?.into(),
            PC::GaussSeidel { damping } => GaussSeidel::new(a, *damping)?.into(),
            PC::Sor { omega } => Sor::new(a, *omega)?.into(),
            PC::Ssor { omega } => Ssor::new(a, *omega)?.into(),
            PC::Ilu { levels } => Ilu::new(a, *levels)?.into(),
            PC::Spai { bandwidth, params } => Spai::new(a, *bandwidth, params.clone())?.into(),
            PC::Polynomial { order, inner } => {
                Polynomial::new(a, *order, inner.build(a)?)?.into()
            }
        })
    }
}

fn scalar<T: Real>(key: &str, v: f64) -> Result<T, KError> {
    T::from(v).ok_or_else(|| KError::InvalidOption(format!("'{v}' for '{key}' is not representable")))
}
