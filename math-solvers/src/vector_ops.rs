//! Vector reductions shared by the iterative solvers
//!
//! Residuals of finite-volume systems are measured in the L1 norm, normalised
//! so that the measure is independent of the magnitude of the solution; see
//! [`norm_factor`].

use crate::traits::{LinearOperator, RealField};
use ndarray::Array1;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Vector length above which reductions run in parallel
#[cfg(feature = "rayon")]
const PARALLEL_THRESHOLD: usize = 10_000;

/// Compute inner product (x, y) = Σ x_i * y_i
#[inline]
pub fn inner_product<T: RealField>(x: &Array1<T>, y: &Array1<T>) -> T {
    assert_eq!(
        x.len(),
        y.len(),
        "Vector lengths must match for inner product"
    );

    #[cfg(feature = "rayon")]
    {
        if let (Some(xs), Some(ys)) = (x.as_slice(), y.as_slice()) {
            if xs.len() >= PARALLEL_THRESHOLD {
                return xs.par_iter().zip(ys.par_iter()).map(|(&a, &b)| a * b).sum();
            }
        }
    }

    x.iter()
        .zip(y.iter())
        .fold(T::zero(), |acc, (&xi, &yi)| acc + xi * yi)
}

/// Compute vector 2-norm: ||x||_2 = sqrt(Σ x_i^2)
#[inline]
pub fn vector_norm<T: RealField>(x: &Array1<T>) -> T {
    inner_product(x, x).sqrt()
}

/// Sum of magnitudes: ||x||_1
#[inline]
pub fn sum_mag<T: RealField>(x: &Array1<T>) -> T {
    x.iter().fold(T::zero(), |acc, &xi| acc + xi.abs())
}

/// Arithmetic mean, zero for an empty vector
pub fn average<T: RealField>(x: &Array1<T>) -> T {
    if x.is_empty() {
        return T::zero();
    }
    let n = T::from_usize(x.len()).unwrap_or_else(T::one);
    x.iter().copied().sum::<T>() / n
}

/// y += alpha * x
#[inline]
pub fn axpy<T: RealField>(alpha: T, x: &Array1<T>, y: &mut Array1<T>) {
    y.zip_mut_with(x, |yi, &xi| *yi += alpha * xi);
}

/// Residual normalisation factor
///
/// `Σ |A x - A x̄| + |b - A x̄| + SMALL`, where `x̄` is the uniform vector of the
/// average of `x`. A residual divided by this factor is the same for a
/// solution and for that solution shifted or scaled, which makes tolerances
/// comparable between fields.
pub fn norm_factor<T, A>(operator: &A, x: &Array1<T>, ax: &Array1<T>, b: &Array1<T>) -> T
where
    T: RealField,
    A: LinearOperator<T> + ?Sized,
{
    let x_ref = Array1::from_elem(x.len(), average(x));
    let a_ref = operator.apply(&x_ref);

    let mut sum = T::zero();
    for ((&axi, &bi), &pi) in ax.iter().zip(b.iter()).zip(a_ref.iter()) {
        sum += (axi - pi).abs() + (bi - pi).abs();
    }
    sum + T::SMALL
}
