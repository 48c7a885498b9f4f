//! Gauss-Seidel smoothers for LDU matrices
//!
//! Each sweep updates cells in place in increasing index order, using the
//! already-updated values of lower-numbered neighbours. The symmetric variant
//! follows every forward sweep with a backward one.

use crate::error::SolverError;
use crate::sparse::LduMatrix;
use crate::traits::RealField;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Smoother selection, named as in solver control dictionaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SmootherType {
    #[default]
    #[serde(rename = "GaussSeidel")]
    GaussSeidel,
    #[serde(rename = "symGaussSeidel")]
    SymGaussSeidel,
}

impl SmootherType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::GaussSeidel => "GaussSeidel",
            Self::SymGaussSeidel => "symGaussSeidel",
        }
    }

    /// Apply `n_sweeps` sweeps to `psi`
    pub fn smooth<T: RealField>(
        &self,
        matrix: &LduMatrix<T>,
        psi: &mut [T],
        source: &[T],
        n_sweeps: usize,
    ) {
        for _ in 0..n_sweeps {
            forward_sweep(matrix, psi, source);
            if *self == Self::SymGaussSeidel {
                backward_sweep(matrix, psi, source);
            }
        }
    }
}

impl fmt::Display for SmootherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SmootherType {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GaussSeidel" => Ok(Self::GaussSeidel),
            "symGaussSeidel" => Ok(Self::SymGaussSeidel),
            other => Err(SolverError::UnknownSmoother(other.to_string())),
        }
    }
}

/// `(b_c - Σ off-diagonal * psi) / diag_c` for one cell
#[inline]
fn relaxed_value<T: RealField>(matrix: &LduMatrix<T>, psi: &[T], source: &[T], cell: usize) -> T {
    let addr = matrix.addressing();
    let (l, u) = (addr.lower_addr(), addr.upper_addr());
    let (upper, lower) = (matrix.upper(), matrix.lower());
    let (owner_start, losort_start) = (addr.owner_start_addr(), addr.losort_start_addr());
    let losort = addr.losort_addr();

    let mut value = source[cell];
    for face in owner_start[cell]..owner_start[cell + 1] {
        value -= upper[face] * psi[u[face]];
    }
    for &face in &losort[losort_start[cell]..losort_start[cell + 1]] {
        value -= lower[face] * psi[l[face]];
    }

    let diag = matrix.diag()[cell];
    if diag.abs() > T::VSMALL { value / diag } else { psi[cell] }
}

fn forward_sweep<T: RealField>(matrix: &LduMatrix<T>, psi: &mut [T], source: &[T]) {
    for cell in 0..matrix.n_cells() {
        psi[cell] = relaxed_value(matrix, psi, source, cell);
    }
}

fn backward_sweep<T: RealField>(matrix: &LduMatrix<T>, psi: &mut [T], source: &[T]) {
    for cell in (0..matrix.n_cells()).rev() {
        psi[cell] = relaxed_value(matrix, psi, source, cell);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse::LduAddressing;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn laplacian_1d(n: usize) -> LduMatrix<f64> {
        let lower: Vec<usize> = (0..n - 1).collect();
        let upper: Vec<usize> = (1..n).collect();
        let addr = Arc::new(LduAddressing::new(n, lower, upper, vec![]).unwrap());
        LduMatrix::from_parts(addr, vec![2.0; n], vec![-1.0; n - 1], None).unwrap()
    }

    #[test]
    fn test_single_forward_sweep() {
        let m = laplacian_1d(3);
        let mut psi = vec![0.0; 3];
        SmootherType::GaussSeidel.smooth(&m, &mut psi, &[1.0, 1.0, 1.0], 1);

        assert_relative_eq!(psi[0], 0.5);
        assert_relative_eq!(psi[1], 0.75);
        assert_relative_eq!(psi[2], 0.875);
    }

    #[test]
    fn test_sweeps_converge() {
        // Exact solution of [2 -1; -1 2 -1; -1 2] x = [1 0 1] is [1 1 1]
        let m = laplacian_1d(3);
        for smoother in [SmootherType::GaussSeidel, SmootherType::SymGaussSeidel] {
            let mut psi = vec![0.0; 3];
            smoother.smooth(&m, &mut psi, &[1.0, 0.0, 1.0], 200);
            for v in &psi {
                assert_relative_eq!(*v, 1.0, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_smoother_names() {
        assert_eq!(
            "symGaussSeidel".parse::<SmootherType>().unwrap(),
            SmootherType::SymGaussSeidel
        );
        assert!("DICGaussSeidel".parse::<SmootherType>().is_err());
    }
}
