//! Three-component vector

use crate::component::Cmpt;
use crate::tensor::Tensor;
use crate::vector_space::{VectorSpace, declare_kind};

declare_kind!(
    /// Marker for three-component spatial vectors
    VectorKind,
    "vector",
    ["x", "y", "z"]
);

/// Spatial vector `(x y z)`
pub type Vector<C = f64> = VectorSpace<VectorKind, C, 3>;

impl<C: Cmpt> Vector<C> {
    pub const X: usize = 0;
    pub const Y: usize = 1;
    pub const Z: usize = 2;

    /// Construct from components
    #[inline]
    pub const fn new(x: C, y: C, z: C) -> Self {
        Self::from_array([x, y, z])
    }

    #[inline]
    pub fn x(&self) -> C {
        self[0]
    }

    #[inline]
    pub fn y(&self) -> C {
        self[1]
    }

    #[inline]
    pub fn z(&self) -> C {
        self[2]
    }

    #[inline]
    pub fn x_mut(&mut self) -> &mut C {
        &mut self[0]
    }

    #[inline]
    pub fn y_mut(&mut self) -> &mut C {
        &mut self[1]
    }

    #[inline]
    pub fn z_mut(&mut self) -> &mut C {
        &mut self[2]
    }

    /// Inner product
    #[inline]
    pub fn dot(&self, other: &Self) -> C {
        self[0] * other[0] + self[1] * other[1] + self[2] * other[2]
    }

    /// Cross product
    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self[1] * other[2] - self[2] * other[1],
            self[2] * other[0] - self[0] * other[2],
            self[0] * other[1] - self[1] * other[0],
        )
    }

    /// Outer product `a b`, `T_ij = a_i b_j`
    pub fn outer(&self, other: &Self) -> Tensor<C> {
        let mut t = Tensor::ZERO;
        for i in 0..3 {
            for j in 0..3 {
                t[3 * i + j] = self[i] * other[j];
            }
        }
        t
    }
}

impl Vector<f64> {
    /// Unit vector in the same direction, or zero for a zero-length vector
    pub fn normalised(&self) -> Self {
        let m = self.mag();
        if m > crate::component::VSMALL {
            *self / m
        } else {
            Self::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_named_access() {
        let mut v = Vector::new(1.0, 2.0, 3.0);
        assert_eq!((v.x(), v.y(), v.z()), (1.0, 2.0, 3.0));
        *v.z_mut() = 7.0;
        assert_eq!(v[Vector::<f64>::Z], 7.0);
        assert_eq!(Vector::<f64>::component_names(), &["x", "y", "z"]);
    }

    #[test]
    fn test_dot_and_cross() {
        let ex = Vector::new(1.0, 0.0, 0.0);
        let ey = Vector::new(0.0, 1.0, 0.0);
        assert_eq!(ex.dot(&ey), 0.0);
        assert_eq!(ex.cross(&ey), Vector::new(0.0, 0.0, 1.0));

        let a = Vector::new(1.0, 2.0, 3.0);
        assert_relative_eq!(a.dot(&a), a.mag_sqr());
    }

    #[test]
    fn test_outer_product_trace_is_dot() {
        let a = Vector::new(1.0, 2.0, 3.0);
        let b = Vector::new(-1.0, 0.5, 2.0);
        let t = a.outer(&b);
        assert_relative_eq!(t.trace(), a.dot(&b));
        assert_eq!(t.xy(), 0.5);
        assert_eq!(t.yx(), -2.0);
    }

    #[test]
    fn test_normalised() {
        let v = Vector::new(3.0, 0.0, 4.0).normalised();
        assert_relative_eq!(v.mag(), 1.0);
        assert_eq!(Vector::<f64>::ZERO.normalised(), Vector::ZERO);
    }
}
