//! Convection

use super::{add_boundary_coeffs, sp};
use crate::error::FvmError;
use crate::field::{SurfaceField, VolField};
use crate::fvc;
use crate::interpolation::InterpolationScheme;
use crate::matrix::FvMatrix;
use vector_space::FieldType;

/// Implicit convection `∇·(φ ψ)` of `psi` by the face flux `flux`
///
/// The diagonal is the negated column sum of the off-diagonals, so a uniform
/// field transported by a divergence-free flux has no net contribution.
pub fn div<T: FieldType>(
    flux: &SurfaceField<f64>,
    psi: &VolField<T>,
    scheme: InterpolationScheme,
) -> Result<FvMatrix<T>, FvmError> {
    fvc::check_mesh(psi.mesh(), flux.mesh(), psi.name(), flux.name())?;
    let mesh = psi.mesh().clone();
    let weights = scheme.weights(mesh.as_ref(), flux.internal());

    let mut matrix = FvMatrix::assembling(psi, flux.dimensions() * psi.dimensions());

    let ldu = matrix.ldu_mut();
    for ((lower, &w), &f) in ldu.lower_mut().iter_mut().zip(&weights).zip(flux.internal()) {
        *lower = -w * f;
    }
    let lower = ldu.lower().to_vec();
    for ((upper, &l), &f) in ldu.upper_mut().iter_mut().zip(&lower).zip(flux.internal()) {
        *upper = l + f;
    }
    ldu.neg_sum_diag();

    let mut internal = Vec::with_capacity(mesh.patches().len());
    let mut boundary = Vec::with_capacity(mesh.patches().len());
    for (p, patch) in mesh.patches().iter().enumerate() {
        let field = &psi.boundary()[p];
        let flux_b = &flux.boundary()[p];
        internal.push(
            field
                .value_internal_coeffs()
                .into_iter()
                .zip(flux_b)
                .map(|(c, &f)| c * f)
                .collect(),
        );
        boundary.push(
            field
                .value_boundary_coeffs(&patch.delta_coeffs)
                .into_iter()
                .zip(flux_b)
                .map(|(c, &f)| c * -f)
                .collect(),
        );
    }
    add_boundary_coeffs(&mut matrix, internal, boundary);
    Ok(matrix)
}

/// Convection with the continuity error removed, `∇·(φ ψ) - (∇·φ) ψ`
///
/// Keeps transported quantities bounded while the flux does not yet satisfy
/// continuity; matches [`fvc::bounded_div`].
pub fn bounded_div<T: FieldType>(
    flux: &SurfaceField<f64>,
    psi: &VolField<T>,
    scheme: InterpolationScheme,
) -> Result<FvMatrix<T>, FvmError> {
    let mut matrix = div(flux, psi, scheme)?;
    let continuity = fvc::surface_integrate(flux);
    matrix.try_sub(&sp(&continuity, psi)?)?;
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::PatchField;
    use crate::mesh::{MeshRef, box_mesh, line_mesh};
    use approx::assert_relative_eq;
    use std::sync::Arc;
    use vector_space::{Vector, si};

    fn compressing_flux(mesh: &MeshRef) -> SurfaceField<f64> {
        SurfaceField::new(
            "phi",
            mesh.clone(),
            si::VOLUMETRIC_FLUX,
            vec![1.0, 0.5],
            vec![vec![-1.0], vec![0.5]],
        )
        .unwrap()
    }

    #[test]
    fn test_upwind_coefficients() {
        let mesh: MeshRef = Arc::new(line_mesh(3, 3.0).unwrap());
        let mut phi = SurfaceField::uniform("phi", mesh.clone(), si::VOLUMETRIC_FLUX, 1.0);
        phi.boundary_mut()[0][0] = -1.0;
        let t = VolField::uniform("T", mesh, si::DIMLESS, 0.0)
            .with_patch("left", PatchField::fixed_value(vec![1.0]))
            .unwrap();

        let m = div(&phi, &t, InterpolationScheme::Upwind).unwrap();
        assert!(m.ldu().is_asymmetric());
        assert_eq!(m.lower(), &[-1.0, -1.0]);
        assert_eq!(m.upper(), &[0.0, 0.0]);
        assert_eq!(m.d(), vec![1.0, 1.0, 1.0]);
        // Inflow value enters the source of the first cell
        assert_relative_eq!(m.boundary_coeffs()[0][0], 1.0);
        assert_eq!(m.dimensions(), si::VOLUMETRIC_FLUX);
    }

    #[test]
    fn test_uniform_field_with_divergence_free_flux() {
        let mesh: MeshRef = Arc::new(box_mesh([3, 2, 2], [1.0, 1.0, 1.0]).unwrap());
        let u = VolField::uniform("U", mesh.clone(), si::VELOCITY, Vector::new(0.3, -0.2, 0.1));
        let phi = fvc::flux(&u);
        let t = VolField::uniform("T", mesh, si::DIMLESS, 4.0);

        for scheme in [InterpolationScheme::Linear, InterpolationScheme::Upwind] {
            let m = div(&phi, &t, scheme).unwrap();
            for r in m.residual(&t).unwrap() {
                assert_relative_eq!(r, 0.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_matches_explicit_divergence() {
        let mesh: MeshRef = Arc::new(box_mesh([3, 3, 1], [1.0, 1.0, 1.0]).unwrap());
        let u = VolField::uniform("U", mesh.clone(), si::VELOCITY, Vector::new(1.0, 0.5, 0.0));
        let phi = fvc::flux(&u);
        let mut t = VolField::uniform("T", mesh.clone(), si::DIMLESS, 0.0)
            .with_patch("xMin", PatchField::fixed_value(vec![2.0; 3]))
            .unwrap();
        for (v, c) in t.internal_mut().iter_mut().zip(mesh.cell_centres()) {
            *v = c.x() * c.x() + c.y();
        }
        t.correct_boundary_conditions();

        for scheme in [InterpolationScheme::Linear, InterpolationScheme::Upwind] {
            let residual = div(&phi, &t, scheme).unwrap().residual(&t).unwrap();
            let explicit = fvc::div(&phi, &t, scheme).unwrap();
            for c in 0..mesh.n_cells() {
                let volume = mesh.cell_volumes()[c];
                assert_relative_eq!(-residual[c], explicit.internal()[c] * volume, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_bounded_removes_continuity_error() {
        let mesh: MeshRef = Arc::new(line_mesh(3, 3.0).unwrap());
        let phi = compressing_flux(&mesh);
        let t = VolField::uniform("T", mesh, si::DIMLESS, 2.0);

        let plain = div(&phi, &t, InterpolationScheme::Upwind).unwrap();
        assert_relative_eq!(plain.residual(&t).unwrap()[1], 1.0, epsilon = 1e-12);

        let bounded = bounded_div(&phi, &t, InterpolationScheme::Upwind).unwrap();
        for r in bounded.residual(&t).unwrap() {
            assert_relative_eq!(r, 0.0, epsilon = 1e-12);
        }
    }
}
