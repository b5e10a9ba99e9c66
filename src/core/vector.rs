//! Dense vector kernels.
//!
//! The preconditioners and solvers work on caller-owned slices; these helpers
//! are the element-wise operations they need (copy, scale, axpy, component
//! product, dot, norm). Reductions run on rayon when the `rayon` feature is
//! enabled, everything else is a plain sequential loop. None of them resize
//! their arguments; mismatched lengths are a programming error and panic.

use crate::core::traits::Real;

/// dst ← src
pub fn copy<T: Real>(dst: &mut [T], src: &[T]) {
    dst.copy_from_slice(src);
}

/// x ← α x
pub fn scale<T: Real>(x: &mut [T], alpha: T) {
    for xi in x.iter_mut() {
        *xi = *xi * alpha;
    }
}

/// dst ← α src
pub fn scale_into<T: Real>(dst: &mut [T], src: &[T], alpha: T) {
    assert_eq!(dst.len(), src.len(), "Vectors must have the same length");
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = s * alpha;
    }
}

/// y ← y + α x
pub fn axpy<T: Real>(y: &mut [T], alpha: T, x: &[T]) {
    assert_eq!(x.len(), y.len(), "Vectors must have the same length");
    for (yi, &xi) in y.iter_mut().zip(x) {
        *yi = *yi + alpha * xi;
    }
}

/// out ← a ⊙ b
pub fn component_product<T: Real>(out: &mut [T], a: &[T], b: &[T]) {
    assert_eq!(a.len(), b.len(), "Vectors must have the same length");
    assert_eq!(out.len(), a.len(), "Vectors must have the same length");
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        out.par_iter_mut()
            .zip(a.par_iter().zip(b.par_iter()))
            .for_each(|(o, (&ai, &bi))| *o = ai * bi);
    }
    #[cfg(not(feature = "rayon"))]
    {
        for ((o, &ai), &bi) in out.iter_mut().zip(a).zip(b) {
            *o = ai * bi;
        }
    }
}

/// x ← a ⊙ x
pub fn component_product_in_place<T: Real>(x: &mut [T], a: &[T]) {
    assert_eq!(x.len(), a.len(), "Vectors must have the same length");
    for (xi, &ai) in x.iter_mut().zip(a) {
        *xi = ai * *xi;
    }
}

/// Computes the dot product of two vectors: `x^T y`.
pub fn dot<T: Real>(x: &[T], y: &[T]) -> T {
    assert_eq!(x.len(), y.len(), "Vectors must have the same length");
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        x.par_iter()
            .zip(y.par_iter())
            .map(|(xi, yi)| *xi * *yi)
            .reduce(|| T::zero(), |acc, v| acc + v)
    }
    #[cfg(not(feature = "rayon"))]
    {
        x.iter()
            .zip(y.iter())
            .map(|(xi, yi)| *xi * *yi)
            .fold(T::zero(), |acc, v| acc + v)
    }
}

/// Computes the Euclidean norm of a vector: `||x||_2`.
pub fn norm2<T: Real>(x: &[T]) -> T {
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        x.par_iter()
            .map(|xi| *xi * *xi)
            .reduce(|| T::zero(), |acc, v| acc + v)
            .sqrt()
    }
    #[cfg(not(feature = "rayon"))]
    {
        x.iter()
            .map(|xi| *xi * *xi)
            .fold(T::zero(), |acc, v| acc + v)
            .sqrt()
    }
}
