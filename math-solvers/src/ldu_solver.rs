//! Linear-solver backends for LDU systems
//!
//! A backend takes an assembled [`LduMatrix`], the current solution (updated in
//! place) and the source, and reports a [`SolverPerformance`]. Backends are
//! selected by name, either through the closed [`SolverType`] enum or through a
//! [`SolverRegistry`] that also accepts user-supplied [`LduSolver`] objects.
//!
//! # Solver Types
//!
//! - **PCG**: preconditioned conjugate gradient, symmetric matrices
//! - **PBiCGStab**: preconditioned BiCGStab, any matrix
//! - **smoothSolver**: repeated Gauss-Seidel sweeps
//! - **diagonal**: `psi = source / diag`, for matrices without off-diagonals

use crate::controls::{SolverControls, SolverPerformance};
use crate::error::SolverError;
use crate::iterative::{pbicgstab, pcg};
use crate::sparse::LduMatrix;
use crate::traits::RealField;
use crate::vector_ops::{norm_factor, sum_mag};
use ndarray::Array1;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A linear-solver backend for LDU matrices
pub trait LduSolver<T: RealField>: Send + Sync {
    /// Name reported in the performance record
    fn name(&self) -> &str;

    /// Solve `matrix * psi = source`, starting from and overwriting `psi`
    fn solve(
        &self,
        matrix: &LduMatrix<T>,
        psi: &mut [T],
        source: &[T],
        controls: &SolverControls,
        field: &str,
    ) -> Result<SolverPerformance, SolverError>;
}

/// Built-in backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverType {
    Pcg,
    PBiCGStab,
    Smooth,
    Diagonal,
}

impl SolverType {
    pub const ALL: [SolverType; 4] = [Self::Pcg, Self::PBiCGStab, Self::Smooth, Self::Diagonal];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Pcg => "PCG",
            Self::PBiCGStab => "PBiCGStab",
            Self::Smooth => "smoothSolver",
            Self::Diagonal => "diagonal",
        }
    }

    pub fn backend<T: RealField>(&self) -> Box<dyn LduSolver<T>> {
        match self {
            Self::Pcg => Box::new(PcgSolver),
            Self::PBiCGStab => Box::new(PBiCGStabSolver),
            Self::Smooth => Box::new(SmoothSolver),
            Self::Diagonal => Box::new(DiagonalSolver),
        }
    }
}

impl fmt::Display for SolverType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SolverType {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| SolverError::UnknownSolver(s.to_string()))
    }
}

fn check_sizes<T: RealField>(
    matrix: &LduMatrix<T>,
    psi: &[T],
    source: &[T],
) -> Result<(), SolverError> {
    for len in [psi.len(), source.len()] {
        if len != matrix.n_cells() {
            return Err(SolverError::DimensionMismatch {
                expected: matrix.n_cells(),
                actual: len,
            });
        }
    }
    Ok(())
}

/// Log the outcome and turn divergence into an error
fn finish(
    performance: SolverPerformance,
    controls: &SolverControls,
) -> Result<SolverPerformance, SolverError> {
    log::info!("{performance}");
    if performance.singular {
        log::warn!(
            "{} solving for {} stopped on a singular update",
            performance.solver,
            performance.field
        );
    }
    performance.check_divergence(controls.divergence_threshold)?;
    Ok(performance)
}

/// Preconditioned conjugate gradient
#[derive(Debug, Clone, Copy, Default)]
pub struct PcgSolver;

impl<T: RealField> LduSolver<T> for PcgSolver {
    fn name(&self) -> &str {
        "PCG"
    }

    fn solve(
        &self,
        matrix: &LduMatrix<T>,
        psi: &mut [T],
        source: &[T],
        controls: &SolverControls,
        field: &str,
    ) -> Result<SolverPerformance, SolverError> {
        check_sizes(matrix, psi, source)?;
        if matrix.is_asymmetric() {
            return Err(SolverError::NotSymmetric {
                solver: "PCG".to_string(),
            });
        }

        let precond = controls.preconditioner.build(matrix)?;
        let b = Array1::from_vec(source.to_vec());
        let solution = pcg(
            matrix,
            precond.as_ref(),
            &b,
            Array1::from_vec(psi.to_vec()),
            &controls.krylov_config(),
        );

        psi.iter_mut()
            .zip(solution.x.iter())
            .for_each(|(p, &x)| *p = x);

        finish(
            SolverPerformance {
                initial_residual: solution.initial_residual.to_f64_lossy(),
                final_residual: solution.residual.to_f64_lossy(),
                iterations: solution.iterations,
                converged: solution.converged,
                singular: solution.singular,
                ..SolverPerformance::new("PCG", field)
            },
            controls,
        )
    }
}

/// Preconditioned BiCGStab
#[derive(Debug, Clone, Copy, Default)]
pub struct PBiCGStabSolver;

impl<T: RealField> LduSolver<T> for PBiCGStabSolver {
    fn name(&self) -> &str {
        "PBiCGStab"
    }

    fn solve(
        &self,
        matrix: &LduMatrix<T>,
        psi: &mut [T],
        source: &[T],
        controls: &SolverControls,
        field: &str,
    ) -> Result<SolverPerformance, SolverError> {
        check_sizes(matrix, psi, source)?;

        let precond = controls.preconditioner.build(matrix)?;
        let b = Array1::from_vec(source.to_vec());
        let solution = pbicgstab(
            matrix,
            precond.as_ref(),
            &b,
            Array1::from_vec(psi.to_vec()),
            &controls.krylov_config(),
        );

        psi.iter_mut()
            .zip(solution.x.iter())
            .for_each(|(p, &x)| *p = x);

        finish(
            SolverPerformance {
                initial_residual: solution.initial_residual.to_f64_lossy(),
                final_residual: solution.residual.to_f64_lossy(),
                iterations: solution.iterations,
                converged: solution.converged,
                singular: solution.singular,
                ..SolverPerformance::new("PBiCGStab", field)
            },
            controls,
        )
    }
}

/// Smoother iterations with residual checks every `n_sweeps` sweeps
#[derive(Debug, Clone, Copy, Default)]
pub struct SmoothSolver;

impl<T: RealField> LduSolver<T> for SmoothSolver {
    fn name(&self) -> &str {
        "smoothSolver"
    }

    fn solve(
        &self,
        matrix: &LduMatrix<T>,
        psi: &mut [T],
        source: &[T],
        controls: &SolverControls,
        field: &str,
    ) -> Result<SolverPerformance, SolverError> {
        check_sizes(matrix, psi, source)?;

        let b = Array1::from_vec(source.to_vec());
        let x = Array1::from_vec(psi.to_vec());
        let ax = Array1::from_vec(matrix.amul(psi));
        let norm = norm_factor(matrix, &x, &ax, &b);
        let residual_of = |psi: &[T]| {
            sum_mag(&Array1::from_vec(matrix.residual(psi, source))).to_f64_lossy()
                / norm.to_f64_lossy()
        };

        let mut performance = SolverPerformance::new("smoothSolver", field);
        performance.initial_residual = sum_mag(&(&b - &ax)).to_f64_lossy() / norm.to_f64_lossy();
        performance.final_residual = performance.initial_residual;

        let initial = performance.initial_residual;
        let n_sweeps = controls.n_sweeps.max(1);
        if controls.min_iter > 0 || !controls.is_converged(initial, initial) {
            loop {
                controls.smoother.smooth(matrix, psi, source, n_sweeps);
                performance.iterations += n_sweeps;
                performance.final_residual = residual_of(psi);

                let converged = controls.is_converged(initial, performance.final_residual);
                if performance.iterations >= controls.min_iter
                    && (converged || performance.iterations >= controls.max_iter)
                {
                    break;
                }
            }
        }
        performance.converged = controls.is_converged(initial, performance.final_residual);

        finish(performance, controls)
    }
}

/// Direct solve of a purely diagonal matrix
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagonalSolver;

impl<T: RealField> LduSolver<T> for DiagonalSolver {
    fn name(&self) -> &str {
        "diagonal"
    }

    fn solve(
        &self,
        matrix: &LduMatrix<T>,
        psi: &mut [T],
        source: &[T],
        controls: &SolverControls,
        field: &str,
    ) -> Result<SolverPerformance, SolverError> {
        check_sizes(matrix, psi, source)?;

        let mut singular = false;
        for ((p, &s), &d) in psi.iter_mut().zip(source).zip(matrix.diag()) {
            if d.abs() > T::VSMALL {
                *p = s / d;
            } else {
                singular = true;
            }
        }

        finish(
            SolverPerformance {
                converged: true,
                singular,
                ..SolverPerformance::new("diagonal", field)
            },
            controls,
        )
    }
}

/// Name-to-backend table
///
/// Starts with the built-in backends; [`SolverRegistry::register`] adds or
/// replaces entries.
pub struct SolverRegistry<T: RealField = f64> {
    backends: HashMap<String, Box<dyn LduSolver<T>>>,
}

impl<T: RealField> Default for SolverRegistry<T> {
    fn default() -> Self {
        let backends = SolverType::ALL
            .into_iter()
            .map(|t| (t.name().to_string(), t.backend::<T>()))
            .collect();
        Self { backends }
    }
}

impl<T: RealField> SolverRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `backend` under `name`, returning any backend it replaces
    pub fn register(
        &mut self,
        name: impl Into<String>,
        backend: Box<dyn LduSolver<T>>,
    ) -> Option<Box<dyn LduSolver<T>>> {
        self.backends.insert(name.into(), backend)
    }

    pub fn get(&self, name: &str) -> Result<&dyn LduSolver<T>, SolverError> {
        self.backends
            .get(name)
            .map(|b| b.as_ref())
            .ok_or_else(|| SolverError::UnknownSolver(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.backends.contains_key(name)
    }

    /// Sorted backend names
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.backends.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Solve with the backend named by `controls.solver`
    pub fn solve(
        &self,
        matrix: &LduMatrix<T>,
        psi: &mut [T],
        source: &[T],
        controls: &SolverControls,
        field: &str,
    ) -> Result<SolverPerformance, SolverError> {
        self.get(&controls.solver)?
            .solve(matrix, psi, source, controls, field)
    }
}

impl<T: RealField> fmt::Debug for SolverRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverRegistry")
            .field("backends", &self.names())
            .finish()
    }
}
