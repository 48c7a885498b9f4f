//! Diagonal incomplete-Cholesky (DIC) preconditioner
//!
//! Incomplete Cholesky factorisation restricted to the diagonal: the
//! off-diagonal pattern of the factor is the matrix pattern itself, so only the
//! modified diagonal has to be stored. Symmetric matrices only.

use crate::error::SolverError;
use crate::sparse::LduMatrix;
use crate::traits::{Preconditioner, RealField};
use ndarray::Array1;

/// DIC preconditioner over a borrowed symmetric LDU matrix
#[derive(Debug, Clone)]
pub struct DicPreconditioner<'a, T: RealField> {
    matrix: &'a LduMatrix<T>,
    /// Reciprocal of the factorised diagonal
    r_d: Vec<T>,
}

impl<'a, T: RealField> DicPreconditioner<'a, T> {
    pub fn new(matrix: &'a LduMatrix<T>) -> Result<Self, SolverError> {
        if matrix.is_asymmetric() {
            return Err(SolverError::NotSymmetric {
                solver: "DIC".to_string(),
            });
        }

        let addr = matrix.addressing();
        let (l, u) = (addr.lower_addr(), addr.upper_addr());
        let upper = matrix.upper();

        let mut r_d = matrix.diag().to_vec();
        for face in 0..upper.len() {
            let delta = upper[face] * upper[face] / guarded(r_d[l[face]]);
            r_d[u[face]] -= delta;
        }
        for d in r_d.iter_mut() {
            *d = guarded(*d).recip();
        }

        Ok(Self { matrix, r_d })
    }

    /// Reciprocal factorised diagonal
    pub fn reciprocal_diagonal(&self) -> &[T] {
        &self.r_d
    }
}

/// Keep pivots away from zero while preserving sign
pub(crate) fn guarded<T: RealField>(d: T) -> T {
    if d.abs() < T::VSMALL {
        if d < T::zero() { -T::VSMALL } else { T::VSMALL }
    } else {
        d
    }
}

impl<T: RealField> Preconditioner<T> for DicPreconditioner<'_, T> {
    fn apply(&self, r: &Array1<T>) -> Array1<T> {
        let addr = self.matrix.addressing();
        let (l, u) = (addr.lower_addr(), addr.upper_addr());
        let upper = self.matrix.upper();
        let r_d = &self.r_d;

        let mut w: Vec<T> = r.iter().zip(r_d).map(|(&ri, &di)| ri * di).collect();

        for face in 0..upper.len() {
            let delta = r_d[u[face]] * upper[face] * w[l[face]];
            w[u[face]] -= delta;
        }
        for face in (0..upper.len()).rev() {
            let delta = r_d[l[face]] * upper[face] * w[u[face]];
            w[l[face]] -= delta;
        }

        Array1::from_vec(w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse::LduAddressing;
    use approx::assert_relative_eq;
    use ndarray::array;
    use std::sync::Arc;

    fn tridiagonal(n: usize) -> LduMatrix<f64> {
        let lower: Vec<usize> = (0..n - 1).collect();
        let upper: Vec<usize> = (1..n).collect();
        let addr = Arc::new(LduAddressing::new(n, lower, upper, vec![]).unwrap());
        LduMatrix::from_parts(addr, vec![2.0; n], vec![-1.0; n - 1], None).unwrap()
    }

    #[test]
    fn test_dic_is_exact_for_tridiagonal() {
        // Incomplete Cholesky has no fill-in to drop on a chain, so it inverts A
        let m = tridiagonal(5);
        let precond = DicPreconditioner::new(&m).unwrap();

        let b = array![1.0, 0.0, 2.0, 0.0, 1.0];
        let x = precond.apply(&b);
        let ax = m.amul(x.as_slice().unwrap());
        for (a, e) in ax.iter().zip(b.iter()) {
            assert_relative_eq!(*a, *e, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_dic_reciprocal_diagonal() {
        let m = tridiagonal(3);
        let precond = DicPreconditioner::new(&m).unwrap();
        let r_d = precond.reciprocal_diagonal();
        assert_relative_eq!(r_d[0], 0.5);
        assert_relative_eq!(r_d[1], 1.0 / 1.5);
        assert_relative_eq!(r_d[2], 1.0 / (2.0 - 1.0 / 1.5));
    }

    #[test]
    fn test_dic_rejects_asymmetric() {
        let mut m = tridiagonal(3);
        m.lower_mut()[0] = -0.5;
        assert!(DicPreconditioner::new(&m).is_err());
    }
}
