//! Core traits for linear algebra operations
//!
//! This module defines the fundamental abstractions used throughout the solver library:
//! - [`RealField`]: Trait for the real scalar types coefficients are stored in
//! - [`LinearOperator`]: Trait for matrix-like objects that can perform matrix-vector products
//! - [`Preconditioner`]: Trait for preconditioning operations

use ndarray::Array1;
use num_traits::{Float, FromPrimitive, NumAssign, ToPrimitive};
use std::fmt::{Debug, Display};
use std::iter::Sum;

/// Trait for scalar types that can be used in linear algebra operations.
///
/// # Implementations
///
/// Provided for:
/// - `f64` (default for finite-volume matrices)
/// - `f32` (for memory-constrained applications)
pub trait RealField:
    Float + NumAssign + FromPrimitive + ToPrimitive + Sum + Send + Sync + Debug + Display + 'static
{
    /// Guard added to residual normalisation factors
    const SMALL: Self;
    /// Threshold below which a denominator is treated as zero
    const VSMALL: Self;
    /// Value treated as unbounded
    const GREAT: Self;

    /// Convert from `f64`, saturating to the representable range
    fn from_f64_lossy(v: f64) -> Self;

    /// Widen to `f64`
    fn to_f64_lossy(self) -> f64;

    /// Check if this is approximately zero
    fn is_zero_approx(&self, tol: Self) -> bool {
        self.abs() < tol
    }
}

impl RealField for f64 {
    const SMALL: Self = 1.0e-20;
    const VSMALL: Self = 1.0e-300;
    const GREAT: Self = 1.0e300;

    #[inline]
    fn from_f64_lossy(v: f64) -> Self {
        v
    }

    #[inline]
    fn to_f64_lossy(self) -> f64 {
        self
    }
}

impl RealField for f32 {
    const SMALL: Self = 1.0e-20;
    const VSMALL: Self = 1.0e-37;
    const GREAT: Self = 1.0e37;

    #[inline]
    fn from_f64_lossy(v: f64) -> Self {
        v.clamp(-(f32::MAX as f64), f32::MAX as f64) as f32
    }

    #[inline]
    fn to_f64_lossy(self) -> f64 {
        self as f64
    }
}

/// Trait for linear operators (matrices) that can perform matrix-vector products.
///
/// This abstraction allows solvers to work with LDU matrices, CSR matrices and
/// matrix-free operators interchangeably.
pub trait LinearOperator<T: RealField>: Send + Sync {
    /// Number of rows in the operator
    fn num_rows(&self) -> usize;

    /// Number of columns in the operator
    fn num_cols(&self) -> usize;

    /// Apply the operator: y = A * x
    fn apply(&self, x: &Array1<T>) -> Array1<T>;

    /// Apply the transpose: y = A^T * x
    fn apply_transpose(&self, x: &Array1<T>) -> Array1<T>;

    /// Check if the operator is square
    fn is_square(&self) -> bool {
        self.num_rows() == self.num_cols()
    }
}

/// Trait for preconditioners used in iterative solvers.
///
/// A preconditioner M approximates A^(-1), so that M*A is better conditioned
/// than A alone. This accelerates convergence of iterative methods.
pub trait Preconditioner<T: RealField>: Send + Sync {
    /// Apply the preconditioner: y = M * r
    ///
    /// This should approximate solving A * y = r
    fn apply(&self, r: &Array1<T>) -> Array1<T>;
}

/// Identity preconditioner (no preconditioning)
#[derive(Clone, Debug, Default)]
pub struct IdentityPreconditioner;

impl<T: RealField> Preconditioner<T> for IdentityPreconditioner {
    fn apply(&self, r: &Array1<T>) -> Array1<T> {
        r.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_f64_field() {
        let x: f64 = -3.0;
        assert_relative_eq!(x.abs(), 3.0);
        assert!(1e-12_f64.is_zero_approx(1e-10));
        assert!(!x.is_zero_approx(1e-10));
        assert_eq!(2.5_f64.to_f64_lossy(), 2.5);
    }

    #[test]
    fn test_f32_saturates() {
        assert_eq!(f32::from_f64_lossy(1e300), f32::MAX);
        assert_eq!(f32::from_f64_lossy(-1e300), -f32::MAX);
        assert_relative_eq!(f32::from_f64_lossy(0.5), 0.5_f32);
    }

    #[test]
    fn test_identity_preconditioner() {
        let precond = IdentityPreconditioner;
        let r = Array1::from_vec(vec![1.0_f64, 2.0, 3.0]);
        let y = precond.apply(&r);
        assert_eq!(r, y);
    }
}
