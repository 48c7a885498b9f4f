//! Finite-volume errors

use crate::matrix::MatrixState;
use solvers::SolverError;
use thiserror::Error;
use vector_space::DimensionError;

/// Errors raised while building, combining or solving finite-volume equations
#[derive(Debug, Error)]
pub enum FvmError {
    #[error(transparent)]
    Dimensions(#[from] DimensionError),

    #[error("operands refer to different fields: {lhs} and {rhs}")]
    FieldMismatch { lhs: String, rhs: String },

    #[error("field {0} has no stored old-time value")]
    MissingOldTime(String),

    #[error("field {0} has no stored previous-iteration value")]
    MissingPrevIter(String),

    #[error("relaxation factor {factor} for {field} is outside (0, 1]")]
    InvalidRelaxationFactor { field: String, factor: f64 },

    #[error("cannot {operation} a matrix for {field} in state {state:?}")]
    InvalidTransition {
        field: String,
        state: MatrixState,
        operation: &'static str,
    },

    #[error("reference already set for {field} (cell {cell})")]
    ReferenceAlreadySet { field: String, cell: usize },

    #[error("cell {cell} out of range for a mesh of {n_cells} cells")]
    InvalidCell { cell: usize, n_cells: usize },

    #[error("size mismatch for {what}: expected {expected}, got {actual}")]
    SizeMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    #[error("no patch named {0}")]
    UnknownPatch(String),

    #[error("unknown scheme '{0}'")]
    UnknownScheme(String),

    #[error("no solver controls for field {0}")]
    MissingSolverControls(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for FvmError {
    fn from(e: serde_json::Error) -> Self {
        FvmError::Config(e.to_string())
    }
}

/// Check that `actual` equals `expected`
pub(crate) fn check_size(what: &str, expected: usize, actual: usize) -> Result<(), FvmError> {
    if expected == actual {
        Ok(())
    } else {
        Err(FvmError::SizeMismatch {
            what: what.to_string(),
            expected,
            actual,
        })
    }
}
