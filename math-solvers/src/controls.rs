//! Solver controls and performance records
//!
//! [`SolverControls`] is the per-field entry of a solution-control dictionary;
//! its JSON keys follow the classic names (`relTol`, `maxIter`, `nSweeps`).
//! [`SolverPerformance`] is what every solve reports back to the outer loop.

use crate::error::SolverError;
use crate::iterative::KrylovConfig;
use crate::preconditioners::PreconditionerType;
use crate::smoothers::SmootherType;
use crate::traits::RealField;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Linear-solver settings for one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SolverControls {
    /// Solver name, resolved through [`crate::SolverType`] or a registry
    pub solver: String,
    pub preconditioner: PreconditionerType,
    pub smoother: SmootherType,
    /// Absolute tolerance on the normalised residual
    pub tolerance: f64,
    /// Tolerance relative to the initial residual (0 = disabled)
    pub rel_tol: f64,
    pub max_iter: usize,
    pub min_iter: usize,
    /// Smoother sweeps between residual evaluations
    pub n_sweeps: usize,
    /// Final residual above which a solve is reported as diverged
    pub divergence_threshold: f64,
    /// Log Krylov progress every N iterations (0 = no output)
    pub print_interval: usize,
}

impl Default for SolverControls {
    fn default() -> Self {
        Self {
            solver: "PBiCGStab".to_string(),
            preconditioner: PreconditionerType::None,
            smoother: SmootherType::GaussSeidel,
            tolerance: 1e-6,
            rel_tol: 0.0,
            max_iter: 1000,
            min_iter: 0,
            n_sweeps: 1,
            divergence_threshold: 1e10,
            print_interval: 0,
        }
    }
}

impl SolverControls {
    /// Controls for the named solver with default settings
    pub fn new(solver: impl Into<String>) -> Self {
        Self {
            solver: solver.into(),
            ..Default::default()
        }
    }

    pub fn with_preconditioner(mut self, preconditioner: PreconditionerType) -> Self {
        self.preconditioner = preconditioner;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64, rel_tol: f64) -> Self {
        self.tolerance = tolerance;
        self.rel_tol = rel_tol;
        self
    }

    /// Krylov loop settings in the matrix scalar type
    pub fn krylov_config<T: RealField>(&self) -> KrylovConfig<T> {
        KrylovConfig {
            max_iterations: self.max_iter,
            min_iterations: self.min_iter,
            tolerance: T::from_f64_lossy(self.tolerance),
            rel_tol: T::from_f64_lossy(self.rel_tol),
            print_interval: self.print_interval,
        }
    }

    /// Whether `residual` satisfies the absolute or relative tolerance
    pub fn is_converged(&self, initial: f64, residual: f64) -> bool {
        residual < self.tolerance || (self.rel_tol > 0.0 && residual < self.rel_tol * initial)
    }
}

/// Outcome of one linear solve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverPerformance {
    pub solver: String,
    pub field: String,
    pub initial_residual: f64,
    pub final_residual: f64,
    pub iterations: usize,
    pub converged: bool,
    pub singular: bool,
}

impl SolverPerformance {
    pub fn new(solver: &str, field: &str) -> Self {
        Self {
            solver: solver.to_string(),
            field: field.to_string(),
            initial_residual: 0.0,
            final_residual: 0.0,
            iterations: 0,
            converged: false,
            singular: false,
        }
    }

    /// Error if the final residual is not finite or above `threshold`
    pub fn check_divergence(&self, threshold: f64) -> Result<(), SolverError> {
        if !self.final_residual.is_finite() || self.final_residual > threshold {
            return Err(SolverError::Diverged {
                solver: self.solver.clone(),
                field: self.field.clone(),
                iterations: self.iterations,
                residual: self.final_residual,
            });
        }
        Ok(())
    }

    /// Combine the performance of the components of a multi-component solve,
    /// keeping the worst residuals and the largest iteration count
    pub fn merge(&mut self, other: &SolverPerformance) {
        self.initial_residual = self.initial_residual.max(other.initial_residual);
        self.final_residual = self.final_residual.max(other.final_residual);
        self.iterations = self.iterations.max(other.iterations);
        self.converged &= other.converged;
        self.singular |= other.singular;
    }
}

impl fmt::Display for SolverPerformance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:  Solving for {}, Initial residual = {:e}, Final residual = {:e}, No Iterations {}",
            self.solver, self.field, self.initial_residual, self.final_residual, self.iterations
        )
    }
}
