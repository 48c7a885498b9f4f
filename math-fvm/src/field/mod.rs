//! Mesh-indexed fields
//!
//! [`VolField`] stores one value per cell with a [`PatchField`] per boundary
//! patch; [`SurfaceField`] stores one value per face. Both are generic over
//! any [`vector_space::FieldType`].

mod patch;
mod surface_field;
mod vol_field;

pub use patch::{PatchField, PatchKind};
pub use surface_field::SurfaceField;
pub use vol_field::VolField;

/// Scalar cell field
pub type VolScalarField = VolField<f64>;
/// Vector cell field
pub type VolVectorField = VolField<vector_space::Vector>;
/// Scalar face field, e.g. a volumetric flux
pub type SurfaceScalarField = SurfaceField<f64>;
