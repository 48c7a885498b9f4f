//! Explicit finite-volume calculus
//!
//! These operators evaluate a differential operator at the current field
//! values and return a field, in contrast to [`crate::fvm`], which returns
//! matrix coefficients. Gauss-theorem operators sum face values times face
//! areas over each cell and divide by the cell volume.

use crate::error::FvmError;
use crate::field::{SurfaceField, VolField};
use crate::interpolation::{Coefficient, InterpolationScheme, interpolate_with};
use crate::mesh::{MeshRef, same_mesh};
use crate::parallel::g_sum;
use crate::time::TimeState;
use crate::fvm::DdtScheme;
use vector_space::{FieldType, Vector, si};

pub(crate) fn check_mesh(mesh: &MeshRef, other: &MeshRef, lhs: &str, rhs: &str) -> Result<(), FvmError> {
    if same_mesh(mesh, other) {
        Ok(())
    } else {
        Err(FvmError::FieldMismatch {
            lhs: lhs.to_string(),
            rhs: rhs.to_string(),
        })
    }
}

/// Linear interpolation to faces
pub fn interpolate<T: FieldType>(vf: &VolField<T>) -> SurfaceField<T> {
    let (internal, boundary) = interpolate_with(vf, vf.mesh().weights());
    SurfaceField::from_parts(
        format!("interpolate({})", vf.name()),
        vf.mesh().clone(),
        vf.dimensions(),
        internal,
        boundary,
    )
}

/// Interpolation to faces with a flux-dependent scheme
pub fn interpolate_scheme<T: FieldType>(
    vf: &VolField<T>,
    flux: &SurfaceField<f64>,
    scheme: InterpolationScheme,
) -> Result<SurfaceField<T>, FvmError> {
    check_mesh(vf.mesh(), flux.mesh(), vf.name(), flux.name())?;
    let weights = scheme.weights(vf.mesh().as_ref(), flux.internal());
    let (internal, boundary) = interpolate_with(vf, &weights);
    Ok(SurfaceField::from_parts(
        format!("interpolate({})", vf.name()),
        vf.mesh().clone(),
        vf.dimensions(),
        internal,
        boundary,
    ))
}

/// Volumetric face flux `Sf · U_f` of a velocity field
pub fn flux(u: &VolField<Vector>) -> SurfaceField<f64> {
    let mesh = u.mesh();
    let u_f = interpolate(u);
    let internal = u_f
        .internal()
        .iter()
        .zip(mesh.face_areas())
        .map(|(uf, sf)| sf.dot(uf))
        .collect();
    let boundary = mesh
        .patches()
        .iter()
        .zip(u_f.boundary())
        .map(|(patch, values)| {
            patch
                .face_areas
                .iter()
                .zip(values)
                .map(|(sf, ub)| sf.dot(ub))
                .collect()
        })
        .collect();
    SurfaceField::from_parts(
        format!("phi({})", u.name()),
        mesh.clone(),
        u.dimensions() * si::AREA,
        internal,
        boundary,
    )
}

/// Unsigned sum of face values over the faces of each cell
pub fn surface_sum<T: FieldType>(sf: &SurfaceField<T>) -> VolField<T> {
    let mesh = sf.mesh();
    let mut sum = vec![T::ZERO; mesh.n_cells()];
    for (f, &v) in sf.internal().iter().enumerate() {
        sum[mesh.owner()[f]] += v;
        sum[mesh.neighbour()[f]] += v;
    }
    for (patch, values) in mesh.patches().iter().zip(sf.boundary()) {
        for (&c, &v) in patch.face_cells.iter().zip(values) {
            sum[c] += v;
        }
    }
    VolField::extrapolated(
        format!("surfaceSum({})", sf.name()),
        mesh.clone(),
        sf.dimensions(),
        sum,
    )
}

/// Net outflow of a face quantity per unit cell volume
///
/// Internal face values count positive for the owner and negative for the
/// neighbour; boundary values are outward.
pub fn surface_integrate<T: FieldType>(sf: &SurfaceField<T>) -> VolField<T> {
    let mesh = sf.mesh();
    let mut net = vec![T::ZERO; mesh.n_cells()];
    for (f, &v) in sf.internal().iter().enumerate() {
        net[mesh.owner()[f]] += v;
        net[mesh.neighbour()[f]] -= v;
    }
    for (patch, values) in mesh.patches().iter().zip(sf.boundary()) {
        for (&c, &v) in patch.face_cells.iter().zip(values) {
            net[c] += v;
        }
    }
    for (n, &vol) in net.iter_mut().zip(mesh.cell_volumes()) {
        *n *= 1.0 / vol;
    }
    VolField::extrapolated(
        format!("surfaceIntegrate({})", sf.name()),
        mesh.clone(),
        sf.dimensions() / si::VOLUME,
        net,
    )
}

/// Divergence of a face flux field
pub fn div_surface<T: FieldType>(sf: &SurfaceField<T>) -> VolField<T> {
    let mut div = surface_integrate(sf);
    div.rename(format!("div({})", sf.name()));
    div
}

/// Explicit convection `∇·(φ ψ)`
pub fn div<T: FieldType>(
    flux: &SurfaceField<f64>,
    vf: &VolField<T>,
    scheme: InterpolationScheme,
) -> Result<VolField<T>, FvmError> {
    let vf_f = interpolate_scheme(vf, flux, scheme)?;
    let mut div = surface_integrate(&vf_f.scaled_by(flux));
    div.rename(format!("div({},{})", flux.name(), vf.name()));
    Ok(div)
}

/// Convection with the continuity error removed: `∇·(φ ψ) - (∇·φ) ψ`
pub fn bounded_div<T: FieldType>(
    flux: &SurfaceField<f64>,
    vf: &VolField<T>,
    scheme: InterpolationScheme,
) -> Result<VolField<T>, FvmError> {
    let mut div = div(flux, vf, scheme)?;
    let continuity = surface_integrate(flux);
    for ((d, &c), &psi) in div
        .internal_mut()
        .iter_mut()
        .zip(continuity.internal())
        .zip(vf.internal())
    {
        *d -= psi * c;
    }
    div.correct_boundary_conditions();
    let name = format!("bounded({})", div.name());
    div.rename(name);
    Ok(div)
}

/// Gauss linear gradient of a scalar field
pub fn grad(vf: &VolField<f64>) -> VolField<Vector> {
    let mesh = vf.mesh();
    let vf_f = interpolate(vf);
    let sf = SurfaceField::from_parts(
        format!("Sf*{}", vf_f.name()),
        mesh.clone(),
        vf.dimensions() * si::AREA,
        vf_f.internal()
            .iter()
            .zip(mesh.face_areas())
            .map(|(&v, &s)| s * v)
            .collect(),
        mesh.patches()
            .iter()
            .zip(vf_f.boundary())
            .map(|(patch, values)| {
                patch
                    .face_areas
                    .iter()
                    .zip(values)
                    .map(|(&s, &v)| s * v)
                    .collect()
            })
            .collect(),
    );
    let mut grad = surface_integrate(&sf);
    grad.rename(format!("grad({})", vf.name()));
    grad
}

/// Explicit diffusion `∇·(Γ ∇ψ)` without non-orthogonal correction
pub fn laplacian<'a, T: FieldType>(
    gamma: impl Into<Coefficient<'a>>,
    vf: &VolField<T>,
) -> Result<VolField<T>, FvmError> {
    let gamma = gamma.into();
    crate::fvm::check_coefficient_mesh(&gamma, vf)?;
    let mesh = vf.mesh();
    let (gamma_f, gamma_b) = gamma.face_values(mesh.as_ref());
    let psi = vf.internal();

    let internal = (0..mesh.n_internal_faces())
        .map(|f| {
            let (o, n) = (mesh.owner()[f], mesh.neighbour()[f]);
            (psi[n] - psi[o]) * (gamma_f[f] * mesh.face_mag_areas()[f] * mesh.non_orth_delta_coeffs()[f])
        })
        .collect();
    let boundary = mesh
        .patches()
        .iter()
        .enumerate()
        .map(|(p, patch)| {
            let sn_grad = vf.boundary()[p].sn_grad(&vf.patch_internal_values(p), &patch.delta_coeffs);
            sn_grad
                .into_iter()
                .zip(&patch.face_mag_areas)
                .zip(&gamma_b[p])
                .map(|((g, &mag), &gb)| g * (gb * mag))
                .collect()
        })
        .collect();

    let sf = SurfaceField::from_parts(
        format!("{}*snGrad({})", gamma.name(), vf.name()),
        mesh.clone(),
        gamma.dimensions() * vf.dimensions() * si::LENGTH,
        internal,
        boundary,
    );
    let mut lap = surface_integrate(&sf);
    lap.rename(format!("laplacian({},{})", gamma.name(), vf.name()));
    Ok(lap)
}

/// Explicit time derivative
pub fn ddt<T: FieldType>(
    vf: &VolField<T>,
    time: &TimeState,
    scheme: DdtScheme,
) -> Result<VolField<T>, FvmError> {
    let name = format!("ddt({})", vf.name());
    let dimensions = vf.dimensions() / si::TIME;
    if scheme == DdtScheme::SteadyState {
        return Ok(VolField::extrapolated(
            name,
            vf.mesh().clone(),
            dimensions,
            vec![T::ZERO; vf.size()],
        ));
    }

    let coeffs = crate::fvm::ddt_coefficients(vf, time, scheme)?;
    let old = vf.old_time()?;
    let values = (0..vf.size())
        .map(|c| {
            let mut v = vf.internal()[c] * coeffs.current - old.internal()[c] * coeffs.old;
            if let Some(old_old) = vf.old_old_time() {
                v += old_old.internal()[c] * coeffs.old_old;
            }
            v
        })
        .collect();
    Ok(VolField::extrapolated(name, vf.mesh().clone(), dimensions, values))
}

/// Volume integral `Σ V ψ` over the whole (possibly decomposed) domain
pub fn domain_integrate<T: FieldType>(vf: &VolField<T>) -> T {
    let mesh = vf.mesh();
    let mut total = T::ZERO;
    for d in 0..T::N_COMPONENTS {
        let local: Vec<f64> = vf
            .internal()
            .iter()
            .zip(mesh.cell_volumes())
            .map(|(v, &vol)| v.component(d) * vol)
            .collect();
        total.set_component(d, g_sum(mesh.communicator(), &local));
    }
    total
}

/// Volume-weighted domain average
pub fn domain_average<T: FieldType>(vf: &VolField<T>) -> T {
    let volume = vf.mesh().total_volume();
    if volume > 0.0 {
        domain_integrate(vf) * (1.0 / volume)
    } else {
        T::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::PatchField;
    use crate::mesh::{box_mesh, line_mesh};
    use approx::assert_relative_eq;
    use std::sync::Arc;
    use vector_space::Dimensioned;

    fn linear_field(mesh: &MeshRef) -> VolField<f64> {
        // ψ = 2x with consistent fixed values on the x patches
        let values = mesh.cell_centres().iter().map(|c| 2.0 * c.x()).collect();
        let boundary = mesh
            .patches()
            .iter()
            .map(|p| {
                let face_values = p.face_centres.iter().map(|c| 2.0 * c.x()).collect();
                PatchField::fixed_value(face_values)
            })
            .collect();
        VolField::new("psi", mesh.clone(), si::DIMLESS, values, boundary).unwrap()
    }

    #[test]
    fn test_grad_of_linear_field_is_exact() {
        let mesh: MeshRef = Arc::new(box_mesh([4, 3, 2], [2.0, 1.0, 1.0]).unwrap());
        let psi = linear_field(&mesh);
        let g = grad(&psi);
        for v in g.internal() {
            assert_relative_eq!(v.x(), 2.0, epsilon = 1e-12);
            assert_relative_eq!(v.y(), 0.0, epsilon = 1e-12);
            assert_relative_eq!(v.z(), 0.0, epsilon = 1e-12);
        }
        assert_eq!(g.dimensions(), si::DIMLESS / si::LENGTH);
    }

    #[test]
    fn test_laplacian_of_linear_field_vanishes() {
        let mesh: MeshRef = Arc::new(box_mesh([4, 2, 1], [2.0, 1.0, 1.0]).unwrap());
        let psi = linear_field(&mesh);
        let lap = laplacian(Dimensioned::new("D", si::DIFFUSIVITY, 1.5), &psi).unwrap();
        for &v in lap.internal() {
            assert_relative_eq!(v, 0.0, epsilon = 1e-10);
        }
        assert_eq!(lap.dimensions(), si::INV_TIME);
    }

    #[test]
    fn test_divergence_of_uniform_velocity() {
        let mesh: MeshRef = Arc::new(box_mesh([3, 3, 1], [1.0, 1.0, 1.0]).unwrap());
        let u = VolField::uniform("U", mesh.clone(), si::VELOCITY, Vector::new(1.0, 0.5, 0.0));
        let phi = flux(&u);
        assert_eq!(phi.dimensions(), si::VOLUMETRIC_FLUX);

        for &d in div_surface(&phi).internal() {
            assert_relative_eq!(d, 0.0, epsilon = 1e-12);
        }
        // Uniform ψ convected by a divergence-free flux stays uniform
        let t = VolField::uniform("T", mesh, si::DIMLESS, 3.0);
        for scheme in [InterpolationScheme::Linear, InterpolationScheme::Upwind] {
            for &d in div(&phi, &t, scheme).unwrap().internal() {
                assert_relative_eq!(d, 0.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_bounded_div_removes_continuity_error() {
        let mesh: MeshRef = Arc::new(line_mesh(3, 3.0).unwrap());
        // Compressing flux: 1 in, 0.5 out of the middle cell
        let phi = SurfaceField::new(
            "phi",
            mesh.clone(),
            si::VOLUMETRIC_FLUX,
            vec![1.0, 0.5],
            vec![vec![-1.0], vec![0.5]],
        )
        .unwrap();
        let t = VolField::uniform("T", mesh, si::DIMLESS, 2.0);
        let plain = div(&phi, &t, InterpolationScheme::Upwind).unwrap();
        assert_relative_eq!(plain.internal()[1], -1.0);

        let bounded = bounded_div(&phi, &t, InterpolationScheme::Upwind).unwrap();
        for &v in bounded.internal() {
            assert_relative_eq!(v, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_surface_sum_and_domain_reductions() {
        let mesh: MeshRef = Arc::new(line_mesh(4, 2.0).unwrap());
        let ones = SurfaceField::uniform("one", mesh.clone(), si::DIMLESS, 1.0);
        // Every cell of a chain has two faces
        assert_eq!(surface_sum(&ones).internal(), &[2.0, 2.0, 2.0, 2.0]);

        let t = VolField::new(
            "T",
            mesh.clone(),
            si::TEMPERATURE,
            vec![1.0, 2.0, 3.0, 4.0],
            vec![PatchField::zero_gradient(1), PatchField::zero_gradient(1)],
        )
        .unwrap();
        assert_relative_eq!(domain_integrate(&t), 5.0);
        assert_relative_eq!(domain_average(&t), 2.5);
    }

    #[test]
    fn test_explicit_ddt() {
        let mesh: MeshRef = Arc::new(line_mesh(2, 2.0).unwrap());
        let mut t = VolField::uniform("T", mesh, si::TEMPERATURE, 1.0);
        let time = TimeState::new(0.0, 0.5);
        assert!(matches!(ddt(&t, &time, DdtScheme::Euler), Err(FvmError::MissingOldTime(_))));

        t.store_old_time();
        t.internal_mut()[0] = 2.0;
        let rate = ddt(&t, &time, DdtScheme::Euler).unwrap();
        assert_relative_eq!(rate.internal()[0], 2.0);
        assert_relative_eq!(rate.internal()[1], 0.0);
        assert_eq!(ddt(&t, &time, DdtScheme::SteadyState).unwrap().internal(), &[0.0, 0.0]);
    }
}
