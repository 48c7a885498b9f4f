//! Compressed Sparse Row (CSR) matrix format
//!
//! CSR format stores:
//! - `values`: Non-zero entries in row-major order
//! - `col_indices`: Column index for each value
//! - `row_ptrs`: Index into values/col_indices where each row starts
//!
//! Finite-volume matrices are assembled in LDU form; CSR is the general
//! format they convert to for inspection and for operators without face
//! addressing.

use crate::traits::{LinearOperator, RealField};
use ndarray::{Array1, Array2};
use std::ops::Range;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Compressed Sparse Row (CSR) matrix format
#[derive(Debug, Clone)]
pub struct CsrMatrix<T: RealField> {
    /// Number of rows
    pub num_rows: usize,
    /// Number of columns
    pub num_cols: usize,
    /// Non-zero values in row-major order
    pub values: Vec<T>,
    /// Column indices for each value
    pub col_indices: Vec<usize>,
    /// Row pointers: row_ptrs[i] is the start index in values/col_indices for row i
    /// row_ptrs[num_rows] = nnz (total number of non-zeros)
    pub row_ptrs: Vec<usize>,
}

impl<T: RealField> CsrMatrix<T> {
    /// Create a new empty CSR matrix
    pub fn new(num_rows: usize, num_cols: usize) -> Self {
        Self {
            num_rows,
            num_cols,
            values: Vec::new(),
            col_indices: Vec::new(),
            row_ptrs: vec![0; num_rows + 1],
        }
    }

    /// Create a CSR matrix from a dense matrix
    ///
    /// Only stores entries with magnitude > threshold
    pub fn from_dense(dense: &Array2<T>, threshold: T) -> Self {
        let num_rows = dense.nrows();
        let num_cols = dense.ncols();

        let mut values = Vec::new();
        let mut col_indices = Vec::new();
        let mut row_ptrs = vec![0usize; num_rows + 1];

        for i in 0..num_rows {
            for j in 0..num_cols {
                let val = dense[[i, j]];
                if val.abs() > threshold {
                    values.push(val);
                    col_indices.push(j);
                }
            }
            row_ptrs[i + 1] = values.len();
        }

        Self {
            num_rows,
            num_cols,
            values,
            col_indices,
            row_ptrs,
        }
    }

    /// Create a CSR matrix from COO (Coordinate) format triplets
    ///
    /// Triplets are (row, col, value). Duplicate entries are summed.
    pub fn from_triplets(
        num_rows: usize,
        num_cols: usize,
        mut triplets: Vec<(usize, usize, T)>,
    ) -> Self {
        if triplets.is_empty() {
            return Self::new(num_rows, num_cols);
        }

        triplets.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        let mut values: Vec<T> = Vec::with_capacity(triplets.len());
        let mut col_indices = Vec::with_capacity(triplets.len());
        let mut row_counts = vec![0usize; num_rows];
        let mut prev: Option<(usize, usize)> = None;

        for (row, col, val) in triplets {
            if prev == Some((row, col)) {
                if let Some(last) = values.last_mut() {
                    *last += val;
                }
            } else {
                values.push(val);
                col_indices.push(col);
                row_counts[row] += 1;
                prev = Some((row, col));
            }
        }

        let mut row_ptrs = Vec::with_capacity(num_rows + 1);
        row_ptrs.push(0);
        for count in row_counts {
            let last = row_ptrs[row_ptrs.len() - 1];
            row_ptrs.push(last + count);
        }

        Self {
            num_rows,
            num_cols,
            values,
            col_indices,
            row_ptrs,
        }
    }

    /// Number of non-zero entries
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Get the range of indices in values/col_indices for a given row
    pub fn row_range(&self, row: usize) -> Range<usize> {
        self.row_ptrs[row]..self.row_ptrs[row + 1]
    }

    /// Get the (col, value) pairs for a row
    pub fn row_entries(&self, row: usize) -> impl Iterator<Item = (usize, T)> + '_ {
        let range = self.row_range(row);
        self.col_indices[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    /// Matrix-vector product: y = A * x
    ///
    /// Uses parallel processing when the `rayon` feature is enabled and the
    /// matrix is large enough to benefit from parallelization.
    pub fn matvec(&self, x: &Array1<T>) -> Array1<T> {
        assert_eq!(x.len(), self.num_cols, "Input vector size mismatch");

        #[cfg(feature = "rayon")]
        {
            if self.num_rows >= 246 {
                if let Some(xs) = x.as_slice() {
                    return self.matvec_parallel(xs);
                }
            }
        }

        self.matvec_sequential(x)
    }

    fn matvec_sequential(&self, x: &Array1<T>) -> Array1<T> {
        let mut y = Array1::from_elem(self.num_rows, T::zero());

        for i in 0..self.num_rows {
            let mut sum = T::zero();
            for idx in self.row_range(i) {
                sum += self.values[idx] * x[self.col_indices[idx]];
            }
            y[i] = sum;
        }

        y
    }

    #[cfg(feature = "rayon")]
    fn matvec_parallel(&self, x: &[T]) -> Array1<T> {
        let results: Vec<T> = (0..self.num_rows)
            .into_par_iter()
            .map(|i| {
                let mut sum = T::zero();
                for idx in self.row_range(i) {
                    sum += self.values[idx] * x[self.col_indices[idx]];
                }
                sum
            })
            .collect();

        Array1::from_vec(results)
    }

    /// Transpose matrix-vector product: y = A^T * x
    pub fn matvec_transpose(&self, x: &Array1<T>) -> Array1<T> {
        assert_eq!(x.len(), self.num_rows, "Input vector size mismatch");

        let mut y = Array1::from_elem(self.num_cols, T::zero());

        for i in 0..self.num_rows {
            for idx in self.row_range(i) {
                y[self.col_indices[idx]] += self.values[idx] * x[i];
            }
        }

        y
    }

    /// Get element at (i, j), returns 0 if not stored
    pub fn get(&self, i: usize, j: usize) -> T {
        self.row_entries(i)
            .find(|&(col, _)| col == j)
            .map_or(T::zero(), |(_, v)| v)
    }

    /// Extract diagonal elements
    pub fn diagonal(&self) -> Array1<T> {
        let n = self.num_rows.min(self.num_cols);
        Array1::from_shape_fn(n, |i| self.get(i, i))
    }

    /// Create identity matrix in CSR format
    pub fn identity(n: usize) -> Self {
        Self {
            num_rows: n,
            num_cols: n,
            values: vec![T::one(); n],
            col_indices: (0..n).collect(),
            row_ptrs: (0..=n).collect(),
        }
    }

    /// Check structural and numerical symmetry within `tol`
    pub fn is_symmetric(&self, tol: T) -> bool {
        if self.num_rows != self.num_cols {
            return false;
        }
        (0..self.num_rows).all(|i| {
            self.row_entries(i)
                .all(|(j, v)| (v - self.get(j, i)).abs() <= tol)
        })
    }

    /// Convert to dense matrix (for debugging/small matrices)
    pub fn to_dense(&self) -> Array2<T> {
        let mut dense = Array2::from_elem((self.num_rows, self.num_cols), T::zero());

        for i in 0..self.num_rows {
            for idx in self.row_range(i) {
                dense[[i, self.col_indices[idx]]] = self.values[idx];
            }
        }

        dense
    }
}

impl<T: RealField> LinearOperator<T> for CsrMatrix<T> {
    fn num_rows(&self) -> usize {
        self.num_rows
    }

    fn num_cols(&self) -> usize {
        self.num_cols
    }

    fn apply(&self, x: &Array1<T>) -> Array1<T> {
        self.matvec(x)
    }

    fn apply_transpose(&self, x: &Array1<T>) -> Array1<T> {
        self.matvec_transpose(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_csr_from_dense() {
        let dense = array![[1.0_f64, 0.0, 2.0], [0.0, 3.0, 0.0], [4.0, 0.0, 5.0]];

        let csr = CsrMatrix::from_dense(&dense, 1e-15);

        assert_eq!(csr.num_rows, 3);
        assert_eq!(csr.num_cols, 3);
        assert_eq!(csr.nnz(), 5);

        assert_relative_eq!(csr.get(0, 0), 1.0);
        assert_relative_eq!(csr.get(0, 2), 2.0);
        assert_relative_eq!(csr.get(1, 1), 3.0);
        assert_relative_eq!(csr.get(2, 0), 4.0);
        assert_relative_eq!(csr.get(2, 2), 5.0);
        assert_eq!(csr.get(0, 1), 0.0);
    }

    #[test]
    fn test_csr_matvec() {
        let dense = array![[1.0_f64, 2.0], [3.0, 4.0]];

        let csr = CsrMatrix::from_dense(&dense, 1e-15);
        let x = array![1.0_f64, 2.0];

        let y = csr.matvec(&x);

        // [1 2] * [1]   [5]
        // [3 4]   [2] = [11]
        assert_relative_eq!(y[0], 5.0, epsilon = 1e-10);
        assert_relative_eq!(y[1], 11.0, epsilon = 1e-10);

        let yt = csr.matvec_transpose(&x);
        assert_relative_eq!(yt[0], 7.0, epsilon = 1e-10);
        assert_relative_eq!(yt[1], 10.0, epsilon = 1e-10);
    }

    #[test]
    fn test_csr_from_triplets_with_empty_rows() {
        let triplets = vec![(2, 2, 5.0_f64), (0, 2, 2.0), (0, 0, 1.0), (2, 0, 4.0)];

        let csr = CsrMatrix::from_triplets(3, 3, triplets);

        assert_eq!(csr.nnz(), 4);
        assert_eq!(csr.row_ptrs, vec![0, 2, 2, 4]);
        assert_relative_eq!(csr.get(0, 0), 1.0);
        assert_relative_eq!(csr.get(2, 0), 4.0);
        assert_eq!(csr.row_entries(1).count(), 0);
    }

    #[test]
    fn test_csr_triplets_duplicate() {
        let triplets = vec![(0, 0, 1.0_f64), (0, 0, 2.0), (1, 1, 3.0)];

        let csr = CsrMatrix::from_triplets(2, 2, triplets);

        assert_relative_eq!(csr.get(0, 0), 3.0); // 1 + 2 = 3
    }

    #[test]
    fn test_csr_identity() {
        let id: CsrMatrix<f64> = CsrMatrix::identity(3);

        assert_eq!(id.nnz(), 3);
        assert_relative_eq!(id.get(1, 1), 1.0);
        assert_eq!(id.diagonal(), array![1.0, 1.0, 1.0]);
        assert!(id.is_symmetric(0.0));
    }

    #[test]
    fn test_csr_to_dense_roundtrip() {
        let original = array![[1.0_f64, 0.0], [2.0, 3.0]];

        let csr = CsrMatrix::from_dense(&original, 1e-15);
        assert_eq!(csr.to_dense(), original);
        assert!(!csr.is_symmetric(1e-12));
    }

    #[test]
    fn test_linear_operator_impl() {
        let dense = array![[1.0_f32, 2.0], [3.0, 4.0]];

        let csr = CsrMatrix::from_dense(&dense, 1e-6);
        let x = array![1.0_f32, 2.0];

        let y = csr.apply(&x);
        assert_relative_eq!(y[0], 5.0, epsilon = 1e-6);
        assert_relative_eq!(y[1], 11.0, epsilon = 1e-6);

        assert!(csr.is_square());
        assert_eq!(LinearOperator::num_rows(&csr), 2);
    }
}
