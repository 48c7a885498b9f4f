//! Linear solvers for finite-volume systems
//!
//! This crate provides the sparse storage and iterative solvers that
//! finite-volume matrices are handed to when they are solved.
//!
//! # Features
//!
//! - **Sparse Matrices**: face-addressed LDU format with CSR conversion
//! - **Iterative Solvers**: PCG, PBiCGStab, Gauss-Seidel smooth solver, diagonal
//! - **Preconditioners**: DIC, DILU, diagonal (Jacobi)
//! - **Backend Selection**: by name, through [`SolverType`] or a [`SolverRegistry`]
//! - **Generic Scalar Types**: Works with f64, f32
//!
//! # Example
//!
//! ```
//! use math_cfd_solvers::{LduAddressing, LduMatrix, SolverControls, SolverRegistry};
//! use std::sync::Arc;
//!
//! // Three cells in a chain
//! let addressing = Arc::new(LduAddressing::new(3, vec![0, 1], vec![1, 2], vec![]).unwrap());
//! let matrix =
//!     LduMatrix::from_parts(addressing, vec![2.0, 2.0, 2.0], vec![-1.0, -1.0], None).unwrap();
//!
//! let mut psi = vec![0.0_f64; 3];
//! let controls = SolverControls::new("PCG").with_tolerance(1e-10, 0.0);
//! let performance = SolverRegistry::new()
//!     .solve(&matrix, &mut psi, &[1.0, 0.0, 1.0], &controls, "T")
//!     .unwrap();
//!
//! assert!(performance.converged);
//! assert!((psi[1] - 1.0).abs() < 1e-8);
//! ```

pub mod controls;
pub mod error;
pub mod iterative;
pub mod ldu_solver;
pub mod preconditioners;
pub mod smoothers;
pub mod sparse;
pub mod traits;
pub mod vector_ops;

// Re-export main types
pub use controls::{SolverControls, SolverPerformance};
pub use error::SolverError;
pub use sparse::{CsrMatrix, LduAddressing, LduMatrix};
pub use traits::{LinearOperator, Preconditioner, RealField};

// Re-export iterative solvers
pub use iterative::{KrylovConfig, KrylovSolution, pbicgstab, pcg};

// Re-export backends
pub use ldu_solver::{
    DiagonalSolver, LduSolver, PBiCGStabSolver, PcgSolver, SmoothSolver, SolverRegistry,
    SolverType,
};

// Re-export preconditioners and smoothers
pub use preconditioners::{
    DiagonalPreconditioner, DicPreconditioner, DiluPreconditioner, IdentityPreconditioner,
    PreconditionerType,
};
pub use smoothers::SmootherType;
