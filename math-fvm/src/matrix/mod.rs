//! Finite-volume equation matrices
//!
//! An [`FvMatrix`] is the discretised form of one equation for one field:
//!
//! ```text
//! (A + iC) ψ = source + bC
//! ```
//!
//! where `A` is an LDU matrix over the mesh's cell adjacency (one diagonal per
//! cell, one upper and optionally one lower coefficient per internal face),
//! `source` the per-cell right-hand side and `iC`/`bC` the boundary
//! contributions per patch face: `iC` is added to the diagonal of the
//! adjacent cell and `bC` to its source when the system is solved.
//!
//! As an expression the matrix stands for `(A + iC) ψ - (source + bC)`, so
//! adding an explicit field `s` subtracts `V s` from the source.
//!
//! # Lifecycle
//!
//! Matrices move through [`MatrixState`]: built empty or by an operator,
//! combined while assembling, optionally relaxed and reference-constrained,
//! then solved. Combining two matrices is only possible while both are still
//! assembling; a solved matrix must be [`FvMatrix::reset_state`] before it is
//! solved again.

mod algebra;
mod solve;

use crate::error::FvmError;
use crate::field::{SurfaceField, VolField};
use crate::mesh::{MeshRef, same_mesh};
use solvers::LduMatrix;
use vector_space::{DimensionSet, FieldType};

/// Where a matrix is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixState {
    Empty,
    Assembling,
    Relaxed,
    ReferenceConstrained,
    Solved,
}

/// Discretised equation for one field
#[derive(Debug, Clone)]
pub struct FvMatrix<T: FieldType> {
    field: String,
    field_dimensions: DimensionSet,
    mesh: MeshRef,
    dimensions: DimensionSet,
    ldu: LduMatrix<f64>,
    source: Vec<T>,
    internal_coeffs: Vec<Vec<f64>>,
    boundary_coeffs: Vec<Vec<T>>,
    face_flux_correction: Option<SurfaceField<T>>,
    state: MatrixState,
    relaxed: bool,
    reference_cell: Option<usize>,
}

impl<T: FieldType> FvMatrix<T> {
    /// All-zero matrix for `psi`; `dimensions` are those of `A ψ`
    pub fn new(psi: &VolField<T>, dimensions: DimensionSet) -> Self {
        let mesh = psi.mesh().clone();
        let patches = mesh.patches();
        Self {
            field: psi.name().to_string(),
            field_dimensions: psi.dimensions(),
            dimensions,
            ldu: LduMatrix::new(mesh.ldu_addressing().clone()),
            source: vec![T::ZERO; mesh.n_cells()],
            internal_coeffs: patches.iter().map(|p| vec![0.0; p.size()]).collect(),
            boundary_coeffs: patches.iter().map(|p| vec![T::ZERO; p.size()]).collect(),
            face_flux_correction: None,
            state: MatrixState::Empty,
            relaxed: false,
            reference_cell: None,
            mesh,
        }
    }

    /// Zero matrix already in the assembling state, as returned by operators
    pub(crate) fn assembling(psi: &VolField<T>, dimensions: DimensionSet) -> Self {
        let mut matrix = Self::new(psi, dimensions);
        matrix.state = MatrixState::Assembling;
        matrix
    }

    pub fn field_name(&self) -> &str {
        &self.field
    }

    pub fn mesh(&self) -> &MeshRef {
        &self.mesh
    }

    /// Dimensions of `A ψ`
    pub fn dimensions(&self) -> DimensionSet {
        self.dimensions
    }

    pub fn state(&self) -> MatrixState {
        self.state
    }

    pub fn reference_cell(&self) -> Option<usize> {
        self.reference_cell
    }

    pub fn ldu(&self) -> &LduMatrix<f64> {
        &self.ldu
    }

    pub(crate) fn ldu_mut(&mut self) -> &mut LduMatrix<f64> {
        &mut self.ldu
    }

    pub fn diag(&self) -> &[f64] {
        self.ldu.diag()
    }

    pub fn upper(&self) -> &[f64] {
        self.ldu.upper()
    }

    pub fn lower(&self) -> &[f64] {
        self.ldu.lower()
    }

    pub fn source(&self) -> &[T] {
        &self.source
    }

    pub(crate) fn source_mut(&mut self) -> &mut [T] {
        &mut self.source
    }

    pub fn internal_coeffs(&self) -> &[Vec<f64>] {
        &self.internal_coeffs
    }

    pub(crate) fn internal_coeffs_mut(&mut self) -> &mut [Vec<f64>] {
        &mut self.internal_coeffs
    }

    pub fn boundary_coeffs(&self) -> &[Vec<T>] {
        &self.boundary_coeffs
    }

    pub(crate) fn boundary_coeffs_mut(&mut self) -> &mut [Vec<T>] {
        &mut self.boundary_coeffs
    }

    /// Explicit face flux added to [`FvMatrix::flux`], e.g. the
    /// non-orthogonal correction of a Laplacian
    pub fn face_flux_correction(&self) -> Option<&SurfaceField<T>> {
        self.face_flux_correction.as_ref()
    }

    pub(crate) fn set_face_flux_correction(&mut self, correction: SurfaceField<T>) {
        self.face_flux_correction = Some(correction);
    }

    /// Diagonal including the boundary internal coefficients
    pub fn d(&self) -> Vec<f64> {
        let mut d = self.ldu.diag().to_vec();
        self.add_boundary_diag(&mut d);
        d
    }

    pub(crate) fn add_boundary_diag(&self, diag: &mut [f64]) {
        for (patch, coeffs) in self.mesh.patches().iter().zip(&self.internal_coeffs) {
            for (&c, &ic) in patch.face_cells.iter().zip(coeffs) {
                diag[c] += ic;
            }
        }
    }

    pub(crate) fn add_boundary_source(&self, source: &mut [T]) {
        for (patch, coeffs) in self.mesh.patches().iter().zip(&self.boundary_coeffs) {
            for (&c, &bc) in patch.face_cells.iter().zip(coeffs) {
                source[c] += bc;
            }
        }
    }

    /// Error unless `psi` is the field this matrix was built for
    pub(crate) fn check_field(&self, psi: &VolField<T>) -> Result<(), FvmError> {
        if psi.name() == self.field && same_mesh(psi.mesh(), &self.mesh) {
            Ok(())
        } else {
            Err(FvmError::FieldMismatch {
                lhs: self.field.clone(),
                rhs: psi.name().to_string(),
            })
        }
    }

    pub(crate) fn invalid_transition(&self, operation: &'static str) -> FvmError {
        FvmError::InvalidTransition {
            field: self.field.clone(),
            state: self.state,
            operation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::line_mesh;
    use std::sync::Arc;
    use vector_space::si;

    #[test]
    fn test_new_matrix_is_empty_and_sized() {
        let mesh: MeshRef = Arc::new(line_mesh(4, 1.0).unwrap());
        let t = VolField::uniform("T", mesh, si::TEMPERATURE, 0.0);
        let m = FvMatrix::new(&t, si::TEMPERATURE * si::VOLUME / si::TIME);

        assert_eq!(m.state(), MatrixState::Empty);
        assert_eq!(m.diag().len(), 4);
        assert_eq!(m.upper().len(), 3);
        assert_eq!(m.source().len(), 4);
        assert_eq!(m.internal_coeffs().len(), 2);
        assert_eq!(m.field_name(), "T");
        assert!(m.face_flux_correction().is_none());
    }

    #[test]
    fn test_field_check() {
        let mesh: MeshRef = Arc::new(line_mesh(2, 1.0).unwrap());
        let t = VolField::uniform("T", mesh.clone(), si::TEMPERATURE, 0.0);
        let m = FvMatrix::new(&t, si::TEMPERATURE);

        let other_name = VolField::uniform("p", mesh, si::TEMPERATURE, 0.0);
        assert!(matches!(m.check_field(&other_name), Err(FvmError::FieldMismatch { .. })));

        // Same name on a different mesh object
        let other_mesh: MeshRef = Arc::new(line_mesh(2, 1.0).unwrap());
        let t2 = VolField::uniform("T", other_mesh, si::TEMPERATURE, 0.0);
        assert!(m.check_field(&t2).is_err());
        assert!(m.check_field(&t).is_ok());
    }
}
