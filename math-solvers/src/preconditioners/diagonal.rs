//! Diagonal (Jacobi) preconditioner
//!
//! Scales each residual component by the reciprocal of the matrix diagonal.
//!
//! This preconditioner is embarrassingly parallel since it only involves
//! element-wise operations.

use crate::sparse::{CsrMatrix, LduMatrix};
use crate::traits::{Preconditioner, RealField};
use ndarray::Array1;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Diagonal (Jacobi) preconditioner
///
/// M = diag(A), so M^(-1) scales each component by 1/A_ii.
/// Rows with a vanishing diagonal are passed through unscaled.
#[derive(Debug, Clone)]
pub struct DiagonalPreconditioner<T: RealField> {
    /// Inverse diagonal elements
    inv_diag: Array1<T>,
}

impl<T: RealField> DiagonalPreconditioner<T> {
    /// Create a diagonal preconditioner from a CSR matrix
    pub fn from_csr(matrix: &CsrMatrix<T>) -> Self {
        Self::from_diagonal(&matrix.diagonal())
    }

    /// Create a diagonal preconditioner from an LDU matrix
    pub fn from_ldu(matrix: &LduMatrix<T>) -> Self {
        Self::from_diagonal(&Array1::from_vec(matrix.diag().to_vec()))
    }

    /// Create from a diagonal vector directly
    pub fn from_diagonal(diag: &Array1<T>) -> Self {
        let inv_diag = diag.mapv(|d| {
            if d.abs() > T::VSMALL {
                d.recip()
            } else {
                T::one()
            }
        });
        Self { inv_diag }
    }
}

impl<T: RealField> Preconditioner<T> for DiagonalPreconditioner<T> {
    fn apply(&self, r: &Array1<T>) -> Array1<T> {
        #[cfg(feature = "rayon")]
        {
            if r.len() >= 1000 {
                if let (Some(rs), Some(ds)) = (r.as_slice(), self.inv_diag.as_slice()) {
                    let results: Vec<T> = rs
                        .par_iter()
                        .zip(ds.par_iter())
                        .map(|(&ri, &di)| ri * di)
                        .collect();
                    return Array1::from_vec(results);
                }
            }
        }
        r.iter()
            .zip(self.inv_diag.iter())
            .map(|(&ri, &di)| ri * di)
            .collect()
    }
}
