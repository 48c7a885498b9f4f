//! Solver errors

use thiserror::Error;

/// Errors raised while assembling or solving LDU systems
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Matrix dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid LDU addressing: {0}")]
    InvalidAddressing(String),

    #[error("Matrices do not share the same addressing")]
    AddressingMismatch,

    #[error(
        "{solver} diverged solving for {field} after {iterations} iterations (residual: {residual:e})"
    )]
    Diverged {
        solver: String,
        field: String,
        iterations: usize,
        residual: f64,
    },

    #[error("Unknown linear solver '{0}'")]
    UnknownSolver(String),

    #[error("Unknown preconditioner '{0}'")]
    UnknownPreconditioner(String),

    #[error("Unknown smoother '{0}'")]
    UnknownSmoother(String),

    #[error("{solver} requires a symmetric matrix")]
    NotSymmetric { solver: String },
}
