//! Core linear-algebra traits for sparse-precond.

use num_traits::Float;

/// Scalar type accepted by every matrix, preconditioner and solver.
pub trait Real: Float + Send + Sync + std::fmt::Debug + 'static {}

impl<T: Float + Send + Sync + std::fmt::Debug + 'static> Real for T {}

/// Matrix–vector product: y ← A x.
pub trait MatVec<T> {
    /// Compute y = A · x.
    fn matvec(&self, x: &[T], y: &mut [T]);
    /// Dimension of the (square) operator.
    fn dim(&self) -> usize;
}

/// Inner products & norms.
pub trait InnerProduct<V: ?Sized> {
    /// Associated scalar type.
    type Scalar: Copy + PartialOrd;
    /// Compute dot(x, y).
    fn dot(&self, x: &V, y: &V) -> Self::Scalar;
    /// Compute ‖x‖₂.
    fn norm(&self, x: &V) -> Self::Scalar;
}

/// Inner product over plain slices, parallel when the `rayon` feature is on.
impl<T: Real> InnerProduct<[T]> for () {
    type Scalar = T;
    fn dot(&self, x: &[T], y: &[T]) -> T {
        crate::core::vector::dot(x, y)
    }
    fn norm(&self, x: &[T]) -> T {
        crate::core::vector::norm2(x)
    }
}
