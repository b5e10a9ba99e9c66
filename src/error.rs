use thiserror::Error;

// Unified error type for sparse-precond

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KError {
    #[error("matrix is not square ({rows}x{cols})")]
    NotSquare { rows: usize, cols: usize },
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("layout mismatch: {0}")]
    LayoutMismatch(String),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("invalid matrix: {0}")]
    InvalidMatrix(String),
    #[error("no diagonal entry stored in row {0}")]
    MissingDiagonal(usize),
    #[error("column {0} has no stored entries")]
    EmptyColumn(usize),
    #[error("zero pivot at row {0}")]
    ZeroPivot(usize),
    #[error("invalid option: {0}")]
    InvalidOption(String),
    #[error("indefinite matrix detected (p^T A p <= 0)")]
    IndefiniteMatrix,
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}

impl KError {
    /// Rejects non-square operators; every preconditioner constructor starts here.
    pub fn check_square(rows: usize, cols: usize) -> Result<(), KError> {
        if rows != cols {
            return Err(KError::NotSquare { rows, cols });
        }
        Ok(())
    }

    /// Rejects vectors whose length differs from the operator dimension.
    pub fn check_len(expected: usize, found: usize) -> Result<(), KError> {
        if expected != found {
            return Err(KError::DimensionMismatch { expected, found });
        }
        Ok(())
    }
}
