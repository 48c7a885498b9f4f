//! Finite-volume discretisation of transport equations
//!
//! This crate turns the terms of a partial differential equation on a
//! polyhedral mesh into sparse linear systems, combines them into one
//! equation per field, and hands that equation to the solvers of
//! `math-cfd-solvers`.
//!
//! # Features
//!
//! - **Meshes**: the [`FvMesh`] interface with a general [`PolyMesh`] and
//!   structured generators
//! - **Fields**: cell and face fields of any [`vector_space::FieldType`], with
//!   fixed-value, zero-gradient, fixed-gradient, mixed and calculated patches
//! - **Implicit operators** ([`fvm`]): time derivative, diffusion,
//!   convection and source terms returning an [`FvMatrix`]
//! - **Explicit operators** ([`fvc`]): gradient, divergence, Laplacian,
//!   interpolation and domain reductions returning fields
//! - **Equation algebra**: dimension-checked combination, under-relaxation,
//!   reference pinning, segregated solution and post-solve extraction of
//!   `A`, `H` and face fluxes
//! - **Configuration**: [`FvSolution`] read from JSON
//!
//! # Example
//!
//! Steady conduction along a bar held at 0 and 10 at its ends:
//!
//! ```
//! use fvm::{FvmError, PatchField, VolField, fvm as implicit, line_mesh};
//! use solvers::SolverControls;
//! use std::sync::Arc;
//! use vector_space::{Dimensioned, si};
//!
//! # fn main() -> Result<(), FvmError> {
//! let mesh = Arc::new(line_mesh(4, 1.0)?);
//! let mut t = VolField::uniform("T", mesh, si::TEMPERATURE, 0.0)
//!     .with_patch("left", PatchField::fixed_value(vec![0.0]))?
//!     .with_patch("right", PatchField::fixed_value(vec![10.0]))?;
//!
//! let k = Dimensioned::new("k", si::DIFFUSIVITY, 1.0);
//! let mut equation = implicit::laplacian(k, &t)?;
//!
//! let controls = SolverControls::new("PCG").with_tolerance(1e-12, 0.0);
//! let performance =
//!     equation.solve_with_controls(&mut t, &controls, &solvers::SolverRegistry::new())?;
//!
//! assert!(performance.converged);
//! assert!((t.internal()[0] - 1.25).abs() < 1e-8);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod field;
pub mod fvc;
pub mod fvm;
pub mod interpolation;
pub mod matrix;
pub mod mesh;
pub mod parallel;
pub mod solution;
pub mod time;

pub use error::FvmError;
pub use field::{
    PatchField, PatchKind, SurfaceField, SurfaceScalarField, VolField, VolScalarField,
    VolVectorField,
};
pub use fvm::DdtScheme;
pub use interpolation::{Coefficient, InterpolationScheme};
pub use matrix::{FvMatrix, MatrixState};
pub use mesh::{BoundaryFace, FvMesh, InternalFace, MeshRef, Patch, PolyMesh, box_mesh, line_mesh};
pub use parallel::{Communicator, SerialCommunicator};
pub use solution::{FvSolution, RelaxationFactors, SimpleControls};
pub use time::TimeState;

/// Library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
