//! Single-component spherical tensor `ii * I`

use crate::component::Cmpt;
use crate::symm_tensor::SymmTensor;
use crate::tensor::Tensor;
use crate::vector_space::{VectorSpace, declare_kind};

declare_kind!(
    /// Marker for spherical (isotropic) tensors
    SphericalTensorKind,
    "sphericalTensor",
    ["ii"]
);

/// Spherical tensor `(ii)`
pub type SphericalTensor<C = f64> = VectorSpace<SphericalTensorKind, C, 1>;

impl<C: Cmpt> SphericalTensor<C> {
    pub const fn new(ii: C) -> Self {
        Self::from_array([ii])
    }

    pub fn ii(&self) -> C {
        self[0]
    }

    pub fn trace(&self) -> C {
        self[0] + self[0] + self[0]
    }

    pub fn to_symm_tensor(&self) -> SymmTensor<C> {
        SymmTensor::identity() * self[0]
    }

    pub fn to_tensor(&self) -> Tensor<C> {
        Tensor::identity() * self[0]
    }
}
