//! Nine-component second-rank tensor

use crate::component::Cmpt;
use crate::symm_tensor::SymmTensor;
use crate::vector::Vector;
use crate::vector_space::{VectorSpace, declare_kind};

declare_kind!(
    /// Marker for full 3x3 tensors stored row-major
    TensorKind,
    "tensor",
    ["xx", "xy", "xz", "yx", "yy", "yz", "zx", "zy", "zz"]
);

/// Second-rank tensor, row-major `(xx xy xz yx yy yz zx zy zz)`
pub type Tensor<C = f64> = VectorSpace<TensorKind, C, 9>;

macro_rules! tensor_accessors {
    ($($name:ident = $idx:expr),* $(,)?) => {$(
        #[inline]
        pub fn $name(&self) -> C {
            self[$idx]
        }
    )*};
}

impl<C: Cmpt> Tensor<C> {
    #[allow(clippy::too_many_arguments)]
    pub const fn new(xx: C, xy: C, xz: C, yx: C, yy: C, yz: C, zx: C, zy: C, zz: C) -> Self {
        Self::from_array([xx, xy, xz, yx, yy, yz, zx, zy, zz])
    }

    /// Identity tensor
    pub fn identity() -> Self {
        let (o, z) = (C::ONE, C::ZERO);
        Self::new(o, z, z, z, o, z, z, z, o)
    }

    /// Construct from three row vectors
    pub fn from_rows(x: Vector<C>, y: Vector<C>, z: Vector<C>) -> Self {
        Self::new(x[0], x[1], x[2], y[0], y[1], y[2], z[0], z[1], z[2])
    }

    tensor_accessors!(xx = 0, xy = 1, xz = 2, yx = 3, yy = 4, yz = 5, zx = 6, zy = 7, zz = 8);

    /// Row `i` as a vector
    pub fn row(&self, i: usize) -> Vector<C> {
        Vector::new(self[3 * i], self[3 * i + 1], self[3 * i + 2])
    }

    pub fn transpose(&self) -> Self {
        Self::new(
            self[0], self[3], self[6], self[1], self[4], self[7], self[2], self[5], self[8],
        )
    }

    pub fn trace(&self) -> C {
        self[0] + self[4] + self[8]
    }

    pub fn det(&self) -> C {
        self[0] * (self[4] * self[8] - self[5] * self[7])
            - self[1] * (self[3] * self[8] - self[5] * self[6])
            + self[2] * (self[3] * self[7] - self[4] * self[6])
    }

    /// Symmetric part `(T + T^T)/2`
    pub fn symm(&self) -> SymmTensor<C> {
        let two = C::ONE + C::ONE;
        SymmTensor::new(
            self[0],
            (self[1] + self[3]) / two,
            (self[2] + self[6]) / two,
            self[4],
            (self[5] + self[7]) / two,
            self[8],
        )
    }

    /// Skew-symmetric part `(T - T^T)/2`
    pub fn skew(&self) -> Self {
        let two = C::ONE + C::ONE;
        (*self - self.transpose()) / two
    }

    /// Tensor-vector inner product `T & v`
    pub fn dot_vector(&self, v: &Vector<C>) -> Vector<C> {
        Vector::new(self.row(0).dot(v), self.row(1).dot(v), self.row(2).dot(v))
    }

    /// Tensor-tensor inner product
    pub fn dot(&self, other: &Self) -> Self {
        let mut out = Self::ZERO;
        for i in 0..3 {
            for j in 0..3 {
                let mut s = C::ZERO;
                for k in 0..3 {
                    s += self[3 * i + k] * other[3 * k + j];
                }
                out[3 * i + j] = s;
            }
        }
        out
    }

    /// Double inner product `T && S`
    pub fn double_dot(&self, other: &Self) -> C {
        self.iter()
            .zip(other.iter())
            .fold(C::ZERO, |acc, (&a, &b)| acc + a * b)
    }
}

impl Tensor<f64> {
    /// Deviatoric part `T - tr(T)/3 I`
    pub fn dev(&self) -> Self {
        *self - Self::identity() * (self.trace() / 3.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> Tensor {
        Tensor::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 10.0)
    }

    #[test]
    fn test_transpose_and_parts() {
        let t = sample();
        assert_eq!(t.transpose().transpose(), t);
        assert_eq!(t.transpose().xy(), 4.0);

        let recombined = t.symm().to_tensor() + t.skew();
        for (a, b) in recombined.iter().zip(t.iter()) {
            assert_relative_eq!(*a, *b);
        }
    }

    #[test]
    fn test_det_and_trace() {
        let t = sample();
        assert_relative_eq!(t.det(), -3.0);
        assert_eq!(t.trace(), 16.0);
        assert_eq!(Tensor::<f64>::identity().det(), 1.0);
        assert_relative_eq!(t.dev().trace(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_dot_with_identity() {
        let t = sample();
        assert_eq!(t.dot(&Tensor::identity()), t);
        let v = Vector::new(1.0, 0.0, -1.0);
        assert_eq!(t.dot_vector(&v), Vector::new(-2.0, -2.0, -3.0));
    }
}
