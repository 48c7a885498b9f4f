//! Iterative solvers for linear systems
//!
//! This module provides preconditioned Krylov subspace methods:
//! - [`pcg`]: Conjugate Gradient - for symmetric positive definite systems
//! - [`pbicgstab`]: BiCGStab - for asymmetric systems
//!
//! Both start from an initial guess and report the residual normalised by
//! [`crate::vector_ops::norm_factor`], so that `tolerance` means the same
//! thing for every field.

mod pbicgstab;
mod pcg;

pub use pbicgstab::pbicgstab;
pub use pcg::pcg;

use crate::traits::RealField;
use ndarray::Array1;

/// Krylov solver configuration
#[derive(Debug, Clone)]
pub struct KrylovConfig<R> {
    /// Maximum number of iterations
    pub max_iterations: usize,
    /// Minimum number of iterations, even when already converged
    pub min_iterations: usize,
    /// Absolute tolerance on the normalised residual
    pub tolerance: R,
    /// Tolerance relative to the initial residual (0 = disabled)
    pub rel_tol: R,
    /// Log progress every N iterations (0 = no output)
    pub print_interval: usize,
}

impl Default for KrylovConfig<f64> {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            min_iterations: 0,
            tolerance: 1e-6,
            rel_tol: 0.0,
            print_interval: 0,
        }
    }
}

/// Krylov solver result
#[derive(Debug, Clone)]
pub struct KrylovSolution<T: RealField> {
    /// Solution vector
    pub x: Array1<T>,
    /// Number of iterations
    pub iterations: usize,
    /// Normalised residual of the initial guess
    pub initial_residual: T,
    /// Final normalised residual
    pub residual: T,
    /// Whether convergence was achieved
    pub converged: bool,
    /// Whether the iteration broke down on a vanishing denominator
    pub singular: bool,
}

/// Tolerance bookkeeping shared by the Krylov loops
pub(crate) struct ConvergenceCheck<T> {
    pub initial: T,
    tolerance: T,
    rel_tol: T,
    min_iterations: usize,
    max_iterations: usize,
}

impl<T: RealField> ConvergenceCheck<T> {
    pub fn new(config: &KrylovConfig<T>, initial: T) -> Self {
        Self {
            initial,
            tolerance: config.tolerance,
            rel_tol: config.rel_tol,
            min_iterations: config.min_iterations,
            max_iterations: config.max_iterations,
        }
    }

    /// Residual below the absolute or the relative tolerance
    pub fn reached(&self, residual: T) -> bool {
        residual < self.tolerance
            || (self.rel_tol > T::zero() && residual < self.rel_tol * self.initial)
    }

    pub fn converged_at(&self, residual: T, iterations: usize) -> bool {
        iterations >= self.min_iterations && self.reached(residual)
    }

    /// Whether the loop should stop after `iterations` iterations
    ///
    /// A non-finite residual stops the loop at once.
    pub fn finished(&self, residual: T, iterations: usize) -> bool {
        !residual.is_finite()
            || (iterations >= self.min_iterations
                && (iterations >= self.max_iterations || self.reached(residual)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convergence_check() {
        let config = KrylovConfig {
            max_iterations: 10,
            min_iterations: 2,
            tolerance: 1e-6,
            rel_tol: 0.1,
            print_interval: 0,
        };
        let check = ConvergenceCheck::new(&config, 1.0);

        assert!(check.reached(1e-7));
        assert!(check.reached(0.05));
        assert!(!check.reached(0.5));
        assert!(!check.converged_at(1e-7, 1));
        assert!(check.converged_at(1e-7, 2));
        assert!(!check.finished(0.5, 9));
        assert!(check.finished(0.5, 10));
        assert!(check.finished(f64::NAN, 1));
        assert!(check.finished(f64::INFINITY, 0));
    }
}
