//! Six-component symmetric tensor

use crate::component::Cmpt;
use crate::tensor::Tensor;
use crate::vector::Vector;
use crate::vector_space::{VectorSpace, declare_kind};

declare_kind!(
    /// Marker for symmetric 3x3 tensors, upper triangle stored
    SymmTensorKind,
    "symmTensor",
    ["xx", "xy", "xz", "yy", "yz", "zz"]
);

/// Symmetric tensor `(xx xy xz yy yz zz)`
pub type SymmTensor<C = f64> = VectorSpace<SymmTensorKind, C, 6>;

impl<C: Cmpt> SymmTensor<C> {
    pub const fn new(xx: C, xy: C, xz: C, yy: C, yz: C, zz: C) -> Self {
        Self::from_array([xx, xy, xz, yy, yz, zz])
    }

    pub fn identity() -> Self {
        let (o, z) = (C::ONE, C::ZERO);
        Self::new(o, z, z, o, z, o)
    }

    pub fn xx(&self) -> C {
        self[0]
    }
    pub fn xy(&self) -> C {
        self[1]
    }
    pub fn xz(&self) -> C {
        self[2]
    }
    pub fn yy(&self) -> C {
        self[3]
    }
    pub fn yz(&self) -> C {
        self[4]
    }
    pub fn zz(&self) -> C {
        self[5]
    }

    pub fn trace(&self) -> C {
        self[0] + self[3] + self[5]
    }

    pub fn det(&self) -> C {
        self.to_tensor().det()
    }

    /// Expand to a full tensor
    pub fn to_tensor(&self) -> Tensor<C> {
        Tensor::new(
            self[0], self[1], self[2], self[1], self[3], self[4], self[2], self[4], self[5],
        )
    }

    /// Symmetric-tensor / vector inner product
    pub fn dot_vector(&self, v: &Vector<C>) -> Vector<C> {
        self.to_tensor().dot_vector(v)
    }
}

impl<C: Cmpt> Vector<C> {
    /// Symmetric outer product `v v`
    pub fn sqr(&self) -> SymmTensor<C> {
        SymmTensor::new(
            self[0] * self[0],
            self[0] * self[1],
            self[0] * self[2],
            self[1] * self[1],
            self[1] * self[2],
            self[2] * self[2],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_tensor() {
        let s = SymmTensor::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        let t = s.to_tensor();
        assert_eq!(t, t.transpose());
        assert_eq!(t.symm(), s);
        assert_eq!(s.trace(), 11.0);
    }

    #[test]
    fn test_sqr_matches_outer() {
        let v = Vector::new(1.0, -2.0, 0.5);
        assert_eq!(v.sqr().to_tensor(), v.outer(&v));
    }
}
