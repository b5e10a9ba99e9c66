// Identity (optionally damped) preconditioner

use crate::core::traits::Real;
use crate::core::vector;
use crate::error::KError;
use crate::preconditioner::Preconditioner;

/// M = damping · I. A plain copy when damping is one.
#[derive(Clone, Debug)]
pub struct NonePc<T> {
    damping: T,
}

impl<T: Real> NonePc<T> {
    pub fn new(damping: T) -> Self {
        Self { damping }
    }

    pub fn damping(&self) -> T {
        self.damping
    }
}

impl<T: Real> Default for NonePc<T> {
    fn default() -> Self {
        Self::new(T::one())
    }
}

impl<T: Real> Preconditioner<T> for NonePc<T> {
    fn apply(&self, r: &[T], z: &mut [T]) -> Result<(), KError> {
        KError::check_len(r.len(), z.len())?;
        if self.damping == T::one() {
            vector::copy(z, r);
        } else {
            vector::scale_into(z, r, self.damping);
        }
        Ok(())
    }

    fn apply_in_place(&self, x: &mut [T]) -> Result<(), KError> {
        if self.damping != T::one() {
            vector::scale(x, self.damping);
        }
        Ok(())
    }

    fn supports_in_place(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "None_Preconditioner"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_and_damped_scale() {
        let r = vec![1.0, -2.0, 4.0];
        let mut z = vec![0.0; 3];
        NonePc::default().apply(&r, &mut z).unwrap();
        assert_eq!(z, r);
        NonePc::new(0.5).apply(&r, &mut z).unwrap();
        assert_eq!(z, vec![0.5, -1.0, 2.0]);
        let mut x = r.clone();
        NonePc::new(2.0).apply_in_place(&mut x).unwrap();
        assert_eq!(x, vec![2.0, -4.0, 8.0]);
    }

    #[test]
    fn length_mismatch_is_reported() {
        let mut z = vec![0.0; 2];
        let err = NonePc::<f64>::default().apply(&[1.0, 2.0, 3.0], &mut z);
        assert_eq!(err, Err(KError::DimensionMismatch { expected: 3, found: 2 }));
    }
}
