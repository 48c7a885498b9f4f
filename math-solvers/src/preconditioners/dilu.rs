//! Diagonal incomplete-LU (DILU) preconditioner
//!
//! Asymmetric counterpart of DIC. The forward substitution walks faces in
//! upper-address order so every cell is complete before it is used.

use crate::sparse::LduMatrix;
use crate::traits::{Preconditioner, RealField};
use ndarray::Array1;

use super::dic::guarded;

/// DILU preconditioner over a borrowed LDU matrix
#[derive(Debug, Clone)]
pub struct DiluPreconditioner<'a, T: RealField> {
    matrix: &'a LduMatrix<T>,
    r_d: Vec<T>,
}

impl<'a, T: RealField> DiluPreconditioner<'a, T> {
    pub fn new(matrix: &'a LduMatrix<T>) -> Self {
        let addr = matrix.addressing();
        let (l, u) = (addr.lower_addr(), addr.upper_addr());
        let (upper, lower) = (matrix.upper(), matrix.lower());

        let mut r_d = matrix.diag().to_vec();
        for face in 0..upper.len() {
            let delta = upper[face] * lower[face] / guarded(r_d[l[face]]);
            r_d[u[face]] -= delta;
        }
        for d in r_d.iter_mut() {
            *d = guarded(*d).recip();
        }

        Self { matrix, r_d }
    }

    pub fn reciprocal_diagonal(&self) -> &[T] {
        &self.r_d
    }
}

impl<T: RealField> Preconditioner<T> for DiluPreconditioner<'_, T> {
    fn apply(&self, r: &Array1<T>) -> Array1<T> {
        let addr = self.matrix.addressing();
        let (l, u) = (addr.lower_addr(), addr.upper_addr());
        let (upper, lower) = (self.matrix.upper(), self.matrix.lower());
        let r_d = &self.r_d;

        let mut w: Vec<T> = r.iter().zip(r_d).map(|(&ri, &di)| ri * di).collect();

        for &face in addr.losort_addr() {
            let delta = r_d[u[face]] * lower[face] * w[l[face]];
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
    use crate::preconditioners::DicPreconditioner;
    use crate::sparse::LduAddressing;
    use approx::assert_relative_eq;
    use ndarray::array;
    use std::sync::Arc;

    fn chain(n: usize) -> Arc<LduAddressing> {
        let lower: Vec<usize> = (0..n - 1).collect();
        let upper: Vec<usize> = (1..n).collect();
        Arc::new(LduAddressing::new(n, lower, upper, vec![]).unwrap())
    }

    #[test]
    fn test_dilu_is_exact_for_asymmetric_chain() {
        let n = 4;
        let m = LduMatrix::from_parts(
            chain(n),
            vec![3.0; n],
            vec![-1.0; n - 1],
            Some(vec![-1.5; n - 1]),
        )
        .unwrap();
        let precond = DiluPreconditioner::new(&m);

        let b = array![1.0, 2.0, 3.0, 4.0];
        let x = precond.apply(&b);
        let ax = m.amul(x.as_slice().unwrap());
        for (a, e) in ax.iter().zip(b.iter()) {
            assert_relative_eq!(*a, *e, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_dilu_matches_dic_when_symmetric() {
        let m = LduMatrix::from_parts(chain(5), vec![4.0; 5], vec![-1.0; 4], None).unwrap();
        let dic = DicPreconditioner::new(&m).unwrap();
        let dilu = DiluPreconditioner::new(&m);

        let r = array![1.0, -1.0, 0.5, 2.0, 0.0];
        let a = dic.apply(&r);
        let b = dilu.apply(&r);
        for (x, y) in a.iter().zip(b.iter()) {
            assert_relative_eq!(*x, *y, epsilon = 1e-14);
        }
    }
}
