//! Implicit finite-volume operators
//!
//! Each operator returns an [`FvMatrix`] in the assembling state whose
//! coefficients discretise one term of a transport equation. Terms combine
//! with `+`/`-` into a complete equation:
//!
//! ```text
//! ddt(T) + div(phi, T) - laplacian(D, T) == su
//! ```
//!
//! Operators taking the [`vector_space::Zero`] or [`vector_space::ZeroField`]
//! tags return [`vector_space::ZeroField`] instead of a matrix, so omitted
//! terms cost nothing.

mod ddt;
mod div;
mod laplacian;
mod sources;

pub use ddt::{DdtScheme, ddt, ddt_coeff};
pub(crate) use ddt::ddt_coefficients;
pub use div::{bounded_div, div};
pub use laplacian::{laplacian, laplacian_corrected};
pub use sources::{ExplicitSource, ImplicitSource, sp, su, susp};

use crate::error::FvmError;
use crate::field::VolField;
use crate::interpolation::Coefficient;
use crate::matrix::FvMatrix;
use crate::mesh::same_mesh;
use vector_space::FieldType;

/// Error unless a field-valued coefficient lives on the mesh of `psi`
pub(crate) fn check_coefficient_mesh<T: FieldType>(
    gamma: &Coefficient<'_>,
    psi: &VolField<T>,
) -> Result<(), FvmError> {
    let mesh = match gamma {
        Coefficient::Uniform(_) => return Ok(()),
        Coefficient::Cell(f) => f.mesh(),
        Coefficient::Face(f) => f.mesh(),
    };
    if same_mesh(mesh, psi.mesh()) {
        Ok(())
    } else {
        Err(FvmError::FieldMismatch {
            lhs: psi.name().to_string(),
            rhs: gamma.name().to_string(),
        })
    }
}

/// Accumulate per-patch boundary coefficients into `iC` and `bC`
pub(crate) fn add_boundary_coeffs<T: FieldType>(
    matrix: &mut FvMatrix<T>,
    internal: Vec<Vec<f64>>,
    boundary: Vec<Vec<T>>,
) {
    for (mine, coeffs) in matrix.internal_coeffs_mut().iter_mut().zip(internal) {
        for (a, b) in mine.iter_mut().zip(coeffs) {
            *a += b;
        }
    }
    for (mine, coeffs) in matrix.boundary_coeffs_mut().iter_mut().zip(boundary) {
        for (a, b) in mine.iter_mut().zip(coeffs) {
            *a += b;
        }
    }
}
