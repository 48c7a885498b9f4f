//! Segregated solution and derived quantities
//!
//! Tuple-valued equations are solved one component at a time with the same
//! scalar coefficients. [`FvMatrix::residual`], [`FvMatrix::a`],
//! [`FvMatrix::h`], [`FvMatrix::h1`] and [`FvMatrix::flux`] read the current
//! coefficients, so they agree with a solve only if the matrix is not changed
//! in between.

use super::{FvMatrix, MatrixState};
use crate::error::FvmError;
use crate::field::{SurfaceField, VolField};
use crate::solution::FvSolution;
use log::debug;
use solvers::{LduMatrix, SolverControls, SolverPerformance, SolverRegistry};
use vector_space::{FieldType, si};

/// Name a component is solved under, `Ux` for the x component of `U`
fn component_name<T: FieldType>(field: &str, d: usize) -> String {
    if T::N_COMPONENTS == 1 {
        field.to_string()
    } else {
        format!("{field}{}", T::component_names()[d])
    }
}

impl<T: FieldType> FvMatrix<T> {
    /// Solve with the controls configured for this field
    pub fn solve(
        &mut self,
        psi: &mut VolField<T>,
        solution: &FvSolution,
    ) -> Result<SolverPerformance, FvmError> {
        let controls = solution.solver_controls(&self.field)?.clone();
        self.solve_with_controls(psi, &controls, &SolverRegistry::new())
    }

    /// Solve with the controls of the final outer iteration
    pub fn solve_final(
        &mut self,
        psi: &mut VolField<T>,
        solution: &FvSolution,
    ) -> Result<SolverPerformance, FvmError> {
        let controls = solution.final_solver_controls(&self.field)?;
        self.solve_with_controls(psi, &controls, &SolverRegistry::new())
    }

    /// Solve `(A + iC) ψ = source + bC` for `psi` in place
    ///
    /// The backend is looked up in `registry` by `controls.solver`. The
    /// returned record merges the components: worst residuals, most
    /// iterations. A diverged component aborts the solve with an error.
    pub fn solve_with_controls(
        &mut self,
        psi: &mut VolField<T>,
        controls: &SolverControls,
        registry: &SolverRegistry<f64>,
    ) -> Result<SolverPerformance, FvmError> {
        self.check_field(psi)?;
        if !matches!(
            self.state,
            MatrixState::Assembling | MatrixState::Relaxed | MatrixState::ReferenceConstrained
        ) {
            return Err(self.invalid_transition("solve"));
        }

        let (matrix, source) = self.system();
        let mut performance = SolverPerformance::new(&controls.solver, &self.field);
        performance.converged = true;

        let mut solved = Vec::with_capacity(T::N_COMPONENTS);
        for d in 0..T::N_COMPONENTS {
            let mut psi_d = psi.component(d);
            let source_d: Vec<f64> = source.iter().map(|s| s.component(d)).collect();
            let perf = registry.solve(
                &matrix,
                &mut psi_d,
                &source_d,
                controls,
                &component_name::<T>(&self.field, d),
            )?;
            performance.merge(&perf);
            solved.push(psi_d);
        }

        // psi is only written once every component has converged
        for (d, values) in solved.iter().enumerate() {
            psi.replace_component(d, values)?;
        }
        psi.correct_boundary_conditions();
        self.state = MatrixState::Solved;
        debug!("{performance}");
        Ok(performance)
    }

    /// Matrix and source with the boundary contributions folded in
    fn system(&self) -> (LduMatrix<f64>, Vec<T>) {
        let mut matrix = self.ldu.clone();
        self.add_boundary_diag(matrix.diag_mut());
        let mut source = self.source.clone();
        self.add_boundary_source(&mut source);
        (matrix, source)
    }

    /// Cell residual `source + bC - (A + iC) ψ`
    pub fn residual(&self, psi: &VolField<T>) -> Result<Vec<T>, FvmError> {
        self.check_field(psi)?;
        let (matrix, source) = self.system();
        let mut residual = vec![T::ZERO; source.len()];
        for d in 0..T::N_COMPONENTS {
            let source_d: Vec<f64> = source.iter().map(|s| s.component(d)).collect();
            let r = matrix.residual(&psi.component(d), &source_d);
            for (res, r) in residual.iter_mut().zip(r) {
                res.set_component(d, r);
            }
        }
        Ok(residual)
    }

    /// Central coefficient per unit volume, `(D + iC) / V`
    pub fn a(&self) -> VolField<f64> {
        let values = self
            .d()
            .iter()
            .zip(self.mesh.cell_volumes())
            .map(|(d, v)| d / v)
            .collect();
        VolField::extrapolated(
            format!("A({})", self.field),
            self.mesh.clone(),
            self.dimensions / self.field_dimensions / si::VOLUME,
            values,
        )
    }

    /// Off-diagonal part per unit volume, `(source + bC - N ψ) / V`
    ///
    /// At the solution `A ψ = H`, which is what pressure-velocity coupling
    /// builds its predicted velocity from.
    pub fn h(&self, psi: &VolField<T>) -> Result<VolField<T>, FvmError> {
        self.check_field(psi)?;
        let mut values = self.source.clone();
        self.add_boundary_source(&mut values);
        for d in 0..T::N_COMPONENTS {
            let h_d = self.ldu.h(&psi.component(d));
            for (v, h) in values.iter_mut().zip(h_d) {
                v.set_component(d, v.component(d) + h);
            }
        }
        for (v, &vol) in values.iter_mut().zip(self.mesh.cell_volumes()) {
            *v *= 1.0 / vol;
        }
        Ok(VolField::extrapolated(
            format!("H({})", self.field),
            self.mesh.clone(),
            self.dimensions / si::VOLUME,
            values,
        ))
    }

    /// Negated off-diagonal row sums per unit volume
    pub fn h1(&self) -> VolField<f64> {
        let values = self
            .ldu
            .h1()
            .iter()
            .zip(self.mesh.cell_volumes())
            .map(|(h, v)| h / v)
            .collect();
        VolField::extrapolated(
            format!("H(1)({})", self.field),
            self.mesh.clone(),
            self.dimensions / self.field_dimensions / si::VOLUME,
            values,
        )
    }

    /// Face flux implied by the implicit operator at `psi`
    ///
    /// Internal faces carry `upper ψ_N - lower ψ_P`, boundary faces
    /// `iC ψ_P - bC`, plus any stored explicit correction. Summing the flux
    /// over the faces of a cell gives `(A + iC) ψ - bC` for operators whose
    /// diagonal is the negated sum of their off-diagonals.
    pub fn flux(&self, psi: &VolField<T>) -> Result<SurfaceField<T>, FvmError> {
        self.check_field(psi)?;
        let mesh = &self.mesh;

        let mut internal = vec![T::ZERO; mesh.n_internal_faces()];
        for d in 0..T::N_COMPONENTS {
            let face_h = self.ldu.face_h(&psi.component(d));
            for (f, h) in internal.iter_mut().zip(face_h) {
                f.set_component(d, h);
            }
        }

        let boundary = mesh
            .patches()
            .iter()
            .enumerate()
            .map(|(p, patch)| {
                patch
                    .face_cells
                    .iter()
                    .enumerate()
                    .map(|(face, &c)| {
                        psi.internal()[c] * self.internal_coeffs[p][face]
                            - self.boundary_coeffs[p][face]
                    })
                    .collect()
            })
            .collect();

        let mut flux = SurfaceField::from_parts(
            format!("flux({})", self.field),
            mesh.clone(),
            self.dimensions,
            internal,
            boundary,
        );
        if let Some(correction) = &self.face_flux_correction {
            flux.add_assign(correction)?;
        }
        Ok(flux)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{MeshRef, line_mesh};
    use approx::assert_relative_eq;
    use std::sync::Arc;
    use vector_space::Vector;

    fn chain(t: &VolField<f64>) -> FvMatrix<f64> {
        let mut m = FvMatrix::assembling(t, si::VOLUME / si::TIME);
        m.ldu_mut().diag_mut().copy_from_slice(&[3.0, 2.0, 3.0]);
        m.ldu_mut().upper_mut().copy_from_slice(&[-1.0, -1.0]);
        m.source_mut().copy_from_slice(&[1.0, 0.0, 1.0]);
        m
    }

    fn pcg() -> SolverControls {
        SolverControls::new("PCG").with_tolerance(1e-12, 0.0)
    }

    #[test]
    fn test_solve_moves_to_solved_and_matches_h_over_a() {
        let mesh: MeshRef = Arc::new(line_mesh(3, 3.0).unwrap());
        let mut t = VolField::uniform("T", mesh, si::DIMLESS, 0.0);
        let mut m = chain(&t);

        let perf = m.solve_with_controls(&mut t, &pcg(), &SolverRegistry::new()).unwrap();
        assert!(perf.converged);
        assert_eq!(perf.field, "T");
        assert_eq!(m.state(), MatrixState::Solved);

        // [3 -1 0; -1 2 -1; 0 -1 3] x = [1 0 1] gives x = 1/2
        for &v in t.internal() {
            assert_relative_eq!(v, 0.5, epsilon = 1e-10);
        }
        for r in m.residual(&t).unwrap() {
            assert_relative_eq!(r, 0.0, epsilon = 1e-10);
        }

        let a = m.a();
        let h = m.h(&t).unwrap();
        for c in 0..3 {
            assert_relative_eq!(a.internal()[c] * t.internal()[c], h.internal()[c], epsilon = 1e-10);
        }
        assert_eq!(h.dimensions(), si::INV_TIME);

        // Solving again needs an explicit reset
        assert!(matches!(
            m.solve_with_controls(&mut t, &pcg(), &SolverRegistry::new()),
            Err(FvmError::InvalidTransition { .. })
        ));
        m.reset_state();
        assert_eq!(m.state(), MatrixState::Assembling);
    }

    #[test]
    fn test_vector_solve_is_segregated() {
        let mesh: MeshRef = Arc::new(line_mesh(3, 3.0).unwrap());
        let mut u = VolField::uniform("U", mesh, si::VELOCITY, Vector::ZERO);
        let mut m = FvMatrix::assembling(&u, si::VELOCITY * si::VOLUME);
        m.ldu_mut().diag_mut().copy_from_slice(&[2.0, 2.0, 2.0]);
        for s in m.source_mut() {
            *s = Vector::new(2.0, 4.0, -2.0);
        }

        let perf = m
            .solve_with_controls(&mut u, &SolverControls::new("diagonal"), &SolverRegistry::new())
            .unwrap();
        assert_eq!(perf.solver, "diagonal");
        for v in u.internal() {
            assert_relative_eq!(v.x(), 1.0);
            assert_relative_eq!(v.y(), 2.0);
            assert_relative_eq!(v.z(), -1.0);
        }
        assert_eq!(component_name::<Vector>("U", 1), "Uy");
        assert_eq!(component_name::<f64>("p", 0), "p");
    }

    #[test]
    fn test_diverged_component_leaves_field_untouched() {
        let mesh: MeshRef = Arc::new(line_mesh(3, 3.0).unwrap());
        let mut u = VolField::uniform("U", mesh, si::VELOCITY, Vector::ZERO);
        let mut m = FvMatrix::assembling(&u, si::VELOCITY * si::VOLUME);
        m.ldu_mut().diag_mut().copy_from_slice(&[3.0, 2.0, 3.0]);
        m.ldu_mut().upper_mut().copy_from_slice(&[-1.0, -1.0]);
        for s in m.source_mut() {
            *s = Vector::new(1.0, f64::NAN, 0.0);
        }

        let result = m.solve_with_controls(&mut u, &pcg(), &SolverRegistry::new());
        assert!(matches!(result, Err(FvmError::Solver(_))));
        for v in u.internal() {
            assert_eq!(*v, Vector::ZERO);
        }
        assert_ne!(m.state(), MatrixState::Solved);
    }

    #[test]
    fn test_solve_rejects_empty_and_foreign_fields() {
        let mesh: MeshRef = Arc::new(line_mesh(3, 3.0).unwrap());
        let mut t = VolField::uniform("T", mesh.clone(), si::DIMLESS, 0.0);
        let mut empty = FvMatrix::new(&t, si::VOLUME);
        assert!(empty.solve_with_controls(&mut t, &pcg(), &SolverRegistry::new()).is_err());

        let mut p = VolField::uniform("p", mesh, si::DIMLESS, 0.0);
        let mut m = chain(&t);
        assert!(matches!(
            m.solve_with_controls(&mut p, &pcg(), &SolverRegistry::new()),
            Err(FvmError::FieldMismatch { .. })
        ));
    }

    #[test]
    fn test_unknown_solver_is_reported() {
        let mesh: MeshRef = Arc::new(line_mesh(3, 3.0).unwrap());
        let mut t = VolField::uniform("T", mesh, si::DIMLESS, 0.0);
        let mut m = chain(&t);
        let result =
            m.solve_with_controls(&mut t, &SolverControls::new("GAMG"), &SolverRegistry::new());
        assert!(matches!(result, Err(FvmError::Solver(_))));
    }
}
