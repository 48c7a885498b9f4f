//! Diffusion

use super::{add_boundary_coeffs, check_coefficient_mesh};
use crate::error::FvmError;
use crate::field::{SurfaceField, VolField};
use crate::fvc;
use crate::interpolation::Coefficient;
use crate::matrix::FvMatrix;
use vector_space::{FieldType, si};

/// Implicit diffusion `∇·(Γ ∇ψ)` with orthogonal face gradients
///
/// `gamma` may be a uniform [`vector_space::Dimensioned`] value, a cell
/// field (linearly interpolated) or a face field; the three give identical
/// matrices for the same face values.
pub fn laplacian<'a, T: FieldType>(
    gamma: impl Into<Coefficient<'a>>,
    psi: &VolField<T>,
) -> Result<FvMatrix<T>, FvmError> {
    let gamma = gamma.into();
    check_coefficient_mesh(&gamma, psi)?;
    let mesh = psi.mesh().clone();
    let (gamma_f, gamma_b) = gamma.face_values(mesh.as_ref());

    let mut matrix = FvMatrix::assembling(
        psi,
        gamma.dimensions() * psi.dimensions() * si::LENGTH,
    );

    let ldu = matrix.ldu_mut();
    for (f, upper) in ldu.upper_mut().iter_mut().enumerate() {
        *upper = gamma_f[f] * mesh.face_mag_areas()[f] * mesh.non_orth_delta_coeffs()[f];
    }
    ldu.neg_sum_diag();

    let mut internal = Vec::with_capacity(mesh.patches().len());
    let mut boundary = Vec::with_capacity(mesh.patches().len());
    for (p, patch) in mesh.patches().iter().enumerate() {
        let field = &psi.boundary()[p];
        let scale: Vec<f64> = patch
            .face_mag_areas
            .iter()
            .zip(&gamma_b[p])
            .map(|(&mag, &g)| g * mag)
            .collect();
        internal.push(
            field
                .gradient_internal_coeffs(&patch.delta_coeffs)
                .into_iter()
                .zip(&scale)
                .map(|(c, &s)| c * s)
                .collect(),
        );
        boundary.push(
            field
                .gradient_boundary_coeffs(&patch.delta_coeffs)
                .into_iter()
                .zip(&scale)
                .map(|(c, &s)| c * -s)
                .collect(),
        );
    }
    add_boundary_coeffs(&mut matrix, internal, boundary);
    Ok(matrix)
}

/// Diffusion of a scalar with explicit non-orthogonal correction
///
/// The part of the face gradient not aligned with the cell-centre vector is
/// evaluated from the interpolated Gauss gradient of the current `psi` and
/// added to the source. The correction flux is kept on the matrix so that
/// [`FvMatrix::flux`] stays consistent with the solved equation.
pub fn laplacian_corrected<'a>(
    gamma: impl Into<Coefficient<'a>>,
    psi: &VolField<f64>,
) -> Result<FvMatrix<f64>, FvmError> {
    let gamma = gamma.into();
    let mut matrix = laplacian(gamma.clone(), psi)?;
    let mesh = psi.mesh().clone();
    let (gamma_f, _) = gamma.face_values(mesh.as_ref());

    let grad_f = fvc::interpolate(&fvc::grad(psi));
    let correction: Vec<f64> = (0..mesh.n_internal_faces())
        .map(|f| {
            gamma_f[f]
                * mesh.face_mag_areas()[f]
                * mesh.non_orth_correction_vectors()[f].dot(&grad_f.internal()[f])
        })
        .collect();

    let source = matrix.source_mut();
    for (f, &c) in correction.iter().enumerate() {
        source[mesh.owner()[f]] -= c;
        source[mesh.neighbour()[f]] += c;
    }

    let boundary = mesh.patches().iter().map(|p| vec![0.0; p.size()]).collect();
    let dimensions = matrix.dimensions();
    matrix.set_face_flux_correction(SurfaceField::from_parts(
        format!("{}*correction(snGrad({}))", gamma.name(), psi.name()),
        mesh,
        dimensions,
        correction,
        boundary,
    ));
    Ok(matrix)
}
