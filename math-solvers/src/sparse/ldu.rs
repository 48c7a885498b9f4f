//! LDU matrix format
//!
//! Face-addressed sparse storage for matrices whose off-diagonal pattern is the
//! cell adjacency graph of a mesh:
//! - `diag`: one coefficient per cell (row)
//! - `upper`: one coefficient per face, at (lower address, upper address)
//! - `lower`: one coefficient per face, at (upper address, lower address);
//!   absent for symmetric matrices, where it equals `upper`
//!
//! Faces are in upper-triangular order: each face's lower address is smaller
//! than its upper address and faces are sorted by lower address. Boundary
//! (patch) faces carry no off-diagonal coefficient; the addressing only keeps
//! the cell each patch face is attached to.

use crate::error::SolverError;
use crate::sparse::CsrMatrix;
use crate::traits::{LinearOperator, RealField};
use ndarray::Array1;
use std::sync::Arc;

/// Face-to-cell addressing shared by every matrix on the same mesh
#[derive(Debug, Clone, PartialEq)]
pub struct LduAddressing {
    n_cells: usize,
    lower: Vec<usize>,
    upper: Vec<usize>,
    losort: Vec<usize>,
    owner_start: Vec<usize>,
    losort_start: Vec<usize>,
    patch_addr: Vec<Vec<usize>>,
}

impl LduAddressing {
    /// Build addressing from per-face lower/upper cell indices and the
    /// face-cell lists of each boundary patch
    pub fn new(
        n_cells: usize,
        lower: Vec<usize>,
        upper: Vec<usize>,
        patch_addr: Vec<Vec<usize>>,
    ) -> Result<Self, SolverError> {
        if lower.len() != upper.len() {
            return Err(SolverError::DimensionMismatch {
                expected: lower.len(),
                actual: upper.len(),
            });
        }

        for (face, (&l, &u)) in lower.iter().zip(upper.iter()).enumerate() {
            if l >= u || u >= n_cells {
                return Err(SolverError::InvalidAddressing(format!(
                    "face {face} connects cells {l} and {u} with {n_cells} cells"
                )));
            }
            if face > 0 && lower[face - 1] > l {
                return Err(SolverError::InvalidAddressing(format!(
                    "face {face} breaks upper-triangular order"
                )));
            }
        }

        for (patch, cells) in patch_addr.iter().enumerate() {
            if let Some(&c) = cells.iter().find(|&&c| c >= n_cells) {
                return Err(SolverError::InvalidAddressing(format!(
                    "patch {patch} addresses cell {c} with {n_cells} cells"
                )));
            }
        }

        let owner_start = start_addressing(n_cells, &lower);

        let mut losort: Vec<usize> = (0..upper.len()).collect();
        losort.sort_by_key(|&f| upper[f]);
        let sorted_upper: Vec<usize> = losort.iter().map(|&f| upper[f]).collect();
        let losort_start = start_addressing(n_cells, &sorted_upper);

        Ok(Self {
            n_cells,
            lower,
            upper,
            losort,
            owner_start,
            losort_start,
            patch_addr,
        })
    }

    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    pub fn n_faces(&self) -> usize {
        self.lower.len()
    }

    /// Lower cell of each face
    pub fn lower_addr(&self) -> &[usize] {
        &self.lower
    }

    /// Upper cell of each face
    pub fn upper_addr(&self) -> &[usize] {
        &self.upper
    }

    /// Faces ordered by upper address
    pub fn losort_addr(&self) -> &[usize] {
        &self.losort
    }

    /// `owner_start[c]..owner_start[c + 1]` are the faces whose lower cell is `c`
    pub fn owner_start_addr(&self) -> &[usize] {
        &self.owner_start
    }

    /// `losort_start[c]..losort_start[c + 1]` index into [`Self::losort_addr`]
    /// for the faces whose upper cell is `c`
    pub fn losort_start_addr(&self) -> &[usize] {
        &self.losort_start
    }

    pub fn n_patches(&self) -> usize {
        self.patch_addr.len()
    }

    /// Cells attached to the faces of `patch`
    pub fn patch_addr(&self, patch: usize) -> &[usize] {
        &self.patch_addr[patch]
    }
}

/// Prefix offsets of a sorted cell index list
fn start_addressing(n_cells: usize, sorted_cells: &[usize]) -> Vec<usize> {
    let mut start = vec![0usize; n_cells + 1];
    for &c in sorted_cells {
        start[c + 1] += 1;
    }
    for c in 0..n_cells {
        start[c + 1] += start[c];
    }
    start
}

/// LDU matrix over a shared [`LduAddressing`]
#[derive(Debug, Clone)]
pub struct LduMatrix<T: RealField> {
    addressing: Arc<LduAddressing>,
    diag: Vec<T>,
    upper: Vec<T>,
    lower: Option<Vec<T>>,
}

impl<T: RealField> LduMatrix<T> {
    /// All-zero symmetric matrix
    pub fn new(addressing: Arc<LduAddressing>) -> Self {
        let n_cells = addressing.n_cells();
        let n_faces = addressing.n_faces();
        Self {
            addressing,
            diag: vec![T::zero(); n_cells],
            upper: vec![T::zero(); n_faces],
            lower: None,
        }
    }

    /// Matrix from explicit coefficients; `lower = None` gives a symmetric matrix
    pub fn from_parts(
        addressing: Arc<LduAddressing>,
        diag: Vec<T>,
        upper: Vec<T>,
        lower: Option<Vec<T>>,
    ) -> Result<Self, SolverError> {
        if diag.len() != addressing.n_cells() {
            return Err(SolverError::DimensionMismatch {
                expected: addressing.n_cells(),
                actual: diag.len(),
            });
        }
        for coeffs in std::iter::once(&upper).chain(lower.as_ref()) {
            if coeffs.len() != addressing.n_faces() {
                return Err(SolverError::DimensionMismatch {
                    expected: addressing.n_faces(),
                    actual: coeffs.len(),
                });
            }
        }
        Ok(Self {
            addressing,
            diag,
            upper,
            lower,
        })
    }

    pub fn addressing(&self) -> &Arc<LduAddressing> {
        &self.addressing
    }

    pub fn n_cells(&self) -> usize {
        self.diag.len()
    }

    pub fn n_faces(&self) -> usize {
        self.upper.len()
    }

    pub fn diag(&self) -> &[T] {
        &self.diag
    }

    pub fn diag_mut(&mut self) -> &mut [T] {
        &mut self.diag
    }

    pub fn upper(&self) -> &[T] {
        &self.upper
    }

    /// Upper coefficients; for a symmetric matrix this also changes the lower ones
    pub fn upper_mut(&mut self) -> &mut [T] {
        &mut self.upper
    }

    /// Lower coefficients, equal to the upper ones when symmetric
    pub fn lower(&self) -> &[T] {
        self.lower.as_deref().unwrap_or(&self.upper)
    }

    /// Lower coefficients, making the matrix asymmetric
    pub fn lower_mut(&mut self) -> &mut [T] {
        let upper = &self.upper;
        self.lower.get_or_insert_with(|| upper.clone())
    }

    pub fn is_symmetric(&self) -> bool {
        self.lower.is_none()
    }

    pub fn is_asymmetric(&self) -> bool {
        self.lower.is_some()
    }

    fn check_addressing(&self, other: &Self) -> Result<(), SolverError> {
        if Arc::ptr_eq(&self.addressing, &other.addressing) || self.addressing == other.addressing
        {
            Ok(())
        } else {
            Err(SolverError::AddressingMismatch)
        }
    }

    /// self += other
    pub fn add_matrix(&mut self, other: &Self) -> Result<(), SolverError> {
        self.check_addressing(other)?;
        add_to(&mut self.diag, &other.diag, T::one());
        if other.is_asymmetric() || self.is_asymmetric() {
            add_to(self.lower_mut(), other.lower(), T::one());
        }
        add_to(&mut self.upper, &other.upper, T::one());
        Ok(())
    }

    /// self -= other
    pub fn sub_matrix(&mut self, other: &Self) -> Result<(), SolverError> {
        self.check_addressing(other)?;
        add_to(&mut self.diag, &other.diag, -T::one());
        if other.is_asymmetric() || self.is_asymmetric() {
            add_to(self.lower_mut(), other.lower(), -T::one());
        }
        add_to(&mut self.upper, &other.upper, -T::one());
        Ok(())
    }

    /// Multiply every coefficient by `s`
    pub fn scale(&mut self, s: T) {
        self.diag.iter_mut().for_each(|d| *d *= s);
        self.upper.iter_mut().for_each(|u| *u *= s);
        if let Some(lower) = self.lower.as_mut() {
            lower.iter_mut().for_each(|l| *l *= s);
        }
    }

    /// Multiply row `c` by `row_scale[c]`, which in general makes the matrix
    /// asymmetric
    pub fn scale_rows(&mut self, row_scale: &[T]) -> Result<(), SolverError> {
        if row_scale.len() != self.n_cells() {
            return Err(SolverError::DimensionMismatch {
                expected: self.n_cells(),
                actual: row_scale.len(),
            });
        }
        let addressing = Arc::clone(&self.addressing);
        let (l, u) = (addressing.lower_addr(), addressing.upper_addr());

        self.diag
            .iter_mut()
            .zip(row_scale)
            .for_each(|(d, &s)| *d *= s);
        let lower = self.lower_mut();
        for face in 0..lower.len() {
            lower[face] *= row_scale[u[face]];
        }
        for face in 0..self.upper.len() {
            self.upper[face] *= row_scale[l[face]];
        }
        Ok(())
    }

    /// A * psi
    pub fn amul(&self, psi: &[T]) -> Vec<T> {
        let (l, u) = (self.addressing.lower_addr(), self.addressing.upper_addr());
        let lower = self.lower();

        let mut a_psi: Vec<T> = self
            .diag
            .iter()
            .zip(psi)
            .map(|(&d, &p)| d * p)
            .collect();
        for face in 0..self.upper.len() {
            a_psi[u[face]] += lower[face] * psi[l[face]];
            a_psi[l[face]] += self.upper[face] * psi[u[face]];
        }
        a_psi
    }

    /// A^T * psi
    pub fn tmul(&self, psi: &[T]) -> Vec<T> {
        let (l, u) = (self.addressing.lower_addr(), self.addressing.upper_addr());
        let lower = self.lower();

        let mut t_psi: Vec<T> = self
            .diag
            .iter()
            .zip(psi)
            .map(|(&d, &p)| d * p)
            .collect();
        for face in 0..self.upper.len() {
            t_psi[u[face]] += self.upper[face] * psi[l[face]];
            t_psi[l[face]] += lower[face] * psi[u[face]];
        }
        t_psi
    }

    /// source - A * psi
    pub fn residual(&self, psi: &[T], source: &[T]) -> Vec<T> {
        self.amul(psi)
            .into_iter()
            .zip(source)
            .map(|(a, &b)| b - a)
            .collect()
    }

    /// Sum of off-diagonal magnitudes in each row
    pub fn sum_mag_off_diag(&self) -> Vec<T> {
        let (l, u) = (self.addressing.lower_addr(), self.addressing.upper_addr());
        let lower = self.lower();

        let mut sum_off = vec![T::zero(); self.n_cells()];
        for face in 0..self.upper.len() {
            sum_off[u[face]] += lower[face].abs();
            sum_off[l[face]] += self.upper[face].abs();
        }
        sum_off
    }

    /// Set the diagonal to minus the sum of the off-diagonals in each column,
    /// so that uniform vectors are in the null space
    pub fn neg_sum_diag(&mut self) {
        let addressing = Arc::clone(&self.addressing);
        let (l, u) = (addressing.lower_addr(), addressing.upper_addr());
        let lower = self.lower.as_deref().unwrap_or(&self.upper);

        for face in 0..self.upper.len() {
            self.diag[l[face]] -= lower[face];
            self.diag[u[face]] -= self.upper[face];
        }
    }

    /// Off-diagonal part applied to psi, negated: `-(L + U) psi`
    pub fn h(&self, psi: &[T]) -> Vec<T> {
        let (l, u) = (self.addressing.lower_addr(), self.addressing.upper_addr());
        let lower = self.lower();

        let mut h_psi = vec![T::zero(); self.n_cells()];
        for face in 0..self.upper.len() {
            h_psi[u[face]] -= lower[face] * psi[l[face]];
            h_psi[l[face]] -= self.upper[face] * psi[u[face]];
        }
        h_psi
    }

    /// Negated row sums of the off-diagonals
    pub fn h1(&self) -> Vec<T> {
        let (l, u) = (self.addressing.lower_addr(), self.addressing.upper_addr());
        let lower = self.lower();

        let mut h1 = vec![T::zero(); self.n_cells()];
        for face in 0..self.upper.len() {
            h1[u[face]] -= lower[face];
            h1[l[face]] -= self.upper[face];
        }
        h1
    }

    /// Per-face flux of the off-diagonal part: `upper psi_u - lower psi_l`
    pub fn face_h(&self, psi: &[T]) -> Vec<T> {
        let (l, u) = (self.addressing.lower_addr(), self.addressing.upper_addr());
        let lower = self.lower();

        (0..self.upper.len())
            .map(|face| self.upper[face] * psi[u[face]] - lower[face] * psi[l[face]])
            .collect()
    }

    /// Convert to CSR with rows sorted by column
    pub fn to_csr(&self) -> CsrMatrix<T> {
        let (l, u) = (self.addressing.lower_addr(), self.addressing.upper_addr());
        let lower = self.lower();

        let mut triplets = Vec::with_capacity(self.n_cells() + 2 * self.n_faces());
        triplets.extend(self.diag.iter().enumerate().map(|(c, &d)| (c, c, d)));
        for face in 0..self.upper.len() {
            triplets.push((l[face], u[face], self.upper[face]));
            triplets.push((u[face], l[face], lower[face]));
        }
        CsrMatrix::from_triplets(self.n_cells(), self.n_cells(), triplets)
    }
}

fn add_to<T: RealField>(dst: &mut [T], src: &[T], sign: T) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d += sign * s;
    }
}

impl<T: RealField> LinearOperator<T> for LduMatrix<T> {
    fn num_rows(&self) -> usize {
        self.n_cells()
    }

    fn num_cols(&self) -> usize {
        self.n_cells()
    }

    fn apply(&self, x: &Array1<T>) -> Array1<T> {
        match x.as_slice() {
            Some(xs) => Array1::from_vec(self.amul(xs)),
            None => Array1::from_vec(self.amul(&x.to_vec())),
        }
    }

    fn apply_transpose(&self, x: &Array1<T>) -> Array1<T> {
        match x.as_slice() {
            Some(xs) => Array1::from_vec(self.tmul(xs)),
            None => Array1::from_vec(self.tmul(&x.to_vec())),
        }
    }
}
