//! Face interpolation
//!
//! Convection needs the face value of the transported field; diffusion needs
//! the face value of the diffusivity. Both reduce to an owner-side weight per
//! internal face.

use crate::error::FvmError;
use crate::field::{SurfaceField, VolField};
use crate::mesh::FvMesh;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use vector_space::{DimensionSet, Dimensioned, FieldType};

/// Convection interpolation scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterpolationScheme {
    /// Geometric (central) weights; second order, unbounded
    #[default]
    #[serde(rename = "linear")]
    Linear,
    /// Take the value from the upstream cell; first order, bounded
    #[serde(rename = "upwind")]
    Upwind,
}

impl InterpolationScheme {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Upwind => "upwind",
        }
    }

    /// Owner-side weight per internal face given the face flux
    pub fn weights(&self, mesh: &dyn FvMesh, flux: &[f64]) -> Vec<f64> {
        match self {
            Self::Linear => mesh.weights().to_vec(),
            Self::Upwind => flux
                .iter()
                .map(|&f| if f >= 0.0 { 1.0 } else { 0.0 })
                .collect(),
        }
    }
}

impl fmt::Display for InterpolationScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InterpolationScheme {
    type Err = FvmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept "Gauss <scheme>" as well as the bare scheme name
        let name = s.trim().strip_prefix("Gauss").unwrap_or(s).trim();
        match name {
            "linear" => Ok(Self::Linear),
            "upwind" => Ok(Self::Upwind),
            _ => Err(FvmError::UnknownScheme(s.to_string())),
        }
    }
}

/// Interpolate cell values to internal faces with owner-side weights and
/// take boundary values from the patch fields
pub fn interpolate_with<T: FieldType>(field: &VolField<T>, weights: &[f64]) -> (Vec<T>, Vec<Vec<T>>) {
    let mesh = field.mesh();
    let psi = field.internal();
    let internal = mesh
        .owner()
        .iter()
        .zip(mesh.neighbour())
        .zip(weights)
        .map(|((&o, &n), &w)| psi[o] * w + psi[n] * (1.0 - w))
        .collect();
    let boundary = field.boundary().iter().map(|p| p.values().to_vec()).collect();
    (internal, boundary)
}

/// A diffusivity or other scalar face coefficient
///
/// All three forms give identical matrices when the field forms are uniform.
#[derive(Debug, Clone)]
pub enum Coefficient<'a> {
    Uniform(Dimensioned<f64>),
    Cell(&'a VolField<f64>),
    Face(&'a SurfaceField<f64>),
}

impl Coefficient<'_> {
    pub fn name(&self) -> &str {
        match self {
            Self::Uniform(d) => &d.name,
            Self::Cell(f) => f.name(),
            Self::Face(f) => f.name(),
        }
    }

    pub fn dimensions(&self) -> DimensionSet {
        match self {
            Self::Uniform(d) => d.dimensions,
            Self::Cell(f) => f.dimensions(),
            Self::Face(f) => f.dimensions(),
        }
    }

    /// Face values: internal faces and per-patch boundary faces
    pub fn face_values(&self, mesh: &dyn FvMesh) -> (Vec<f64>, Vec<Vec<f64>>) {
        match self {
            Self::Uniform(d) => (
                vec![d.value; mesh.n_internal_faces()],
                mesh.patches().iter().map(|p| vec![d.value; p.size()]).collect(),
            ),
            Self::Cell(f) => interpolate_with(f, mesh.weights()),
            Self::Face(f) => (f.internal().to_vec(), f.boundary().to_vec()),
        }
    }
}

impl From<Dimensioned<f64>> for Coefficient<'_> {
    fn from(value: Dimensioned<f64>) -> Self {
        Self::Uniform(value)
    }
}

impl<'a> From<&'a VolField<f64>> for Coefficient<'a> {
    fn from(value: &'a VolField<f64>) -> Self {
        Self::Cell(value)
    }
}

impl<'a> From<&'a SurfaceField<f64>> for Coefficient<'a> {
    fn from(value: &'a SurfaceField<f64>) -> Self {
        Self::Face(value)
    }
}
