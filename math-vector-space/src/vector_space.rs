//! Generic fixed-size numeric tuple
//!
//! [`VectorSpace<K, C, N>`] stores `N` components of type `C` contiguously. The
//! zero-sized kind marker `K` selects the interpretation (vector, tensor,
//! barycentric coordinate, ...) and therefore the named accessors that are
//! available. Arithmetic is component-wise and preserves `N`.
//!
//! There is deliberately no `PartialOrd`: tuples are compared component-wise
//! through [`VectorSpace::all_lt`] and friends.

use crate::component::Cmpt;
use crate::tags::Zero;
use num_traits::AsPrimitive;
use std::fmt;
use std::iter::Sum;
use std::marker::PhantomData;
use std::ops::{
    Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign,
};

/// Interpretation marker for a [`VectorSpace`].
///
/// A kind only carries names: the type name used in streams and diagnostics
/// and the component names, in internal storage order.
pub trait Kind: Copy + Default + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// Type name, e.g. `vector`
    const NAME: &'static str;
    /// Component names in storage order
    const COMPONENT_NAMES: &'static [&'static str];
}

/// Declare a zero-sized [`Kind`] marker.
macro_rules! declare_kind {
    ($(#[$meta:meta])* $kind:ident, $name:expr, [$($cmpt:expr),+ $(,)?]) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $kind;

        impl $crate::vector_space::Kind for $kind {
            const NAME: &'static str = $name;
            const COMPONENT_NAMES: &'static [&'static str] = &[$($cmpt),+];
        }
    };
}

pub(crate) use declare_kind;

/// Fixed-size aggregate of `N` homogeneous numeric components.
///
/// The layout is exactly `[C; N]`: the kind marker is zero-sized, so a slice of
/// tuples can be reinterpreted as a flat slice of components (see
/// [`VectorSpace::slice_as_cmpts`]).
#[repr(C)]
pub struct VectorSpace<K, C, const N: usize> {
    v: [C; N],
    kind: PhantomData<K>,
}

impl<K: Kind, C: Cmpt, const N: usize> VectorSpace<K, C, N> {
    /// Number of components
    pub const N_COMPONENTS: usize = N;

    /// All components zero
    pub const ZERO: Self = Self::from_array([C::ZERO; N]);
    /// All components one
    pub const ONE: Self = Self::from_array([C::ONE; N]);
    /// All components at the "unbounded" maximum
    pub const MAX: Self = Self::from_array([C::MAX; N]);
    /// All components at the "unbounded" minimum
    pub const MIN: Self = Self::from_array([C::MIN; N]);
    /// All components at the largest safely squarable value
    pub const ROOT_MAX: Self = Self::from_array([C::ROOT_MAX; N]);
    /// All components at the smallest safely squarable value
    pub const ROOT_MIN: Self = Self::from_array([C::ROOT_MIN; N]);

    /// Construct from explicit components in storage order
    #[inline]
    pub const fn from_array(v: [C; N]) -> Self {
        Self {
            v,
            kind: PhantomData,
        }
    }

    /// Construct with every component set to `c`
    #[inline]
    pub fn uniform(c: C) -> Self {
        Self::from_array([c; N])
    }

    /// All-zero tuple
    #[inline]
    pub fn zero() -> Self {
        Self::ZERO
    }

    /// Number of components
    #[inline]
    pub const fn size() -> usize {
        N
    }

    /// Type name of the kind
    pub fn type_name() -> &'static str {
        K::NAME
    }

    /// Component names in storage order
    pub fn component_names() -> &'static [&'static str] {
        K::COMPONENT_NAMES
    }

    /// Borrow the components as an array
    #[inline]
    pub fn as_array(&self) -> &[C; N] {
        &self.v
    }

    /// Mutably borrow the components as an array
    #[inline]
    pub fn as_mut_array(&mut self) -> &mut [C; N] {
        &mut self.v
    }

    /// Consume into the component array
    #[inline]
    pub fn into_array(self) -> [C; N] {
        self.v
    }

    /// Borrow the components as a slice
    #[inline]
    pub fn as_slice(&self) -> &[C] {
        &self.v
    }

    /// Mutably borrow the components as a slice
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [C] {
        &mut self.v
    }

    /// Component `d`
    #[inline]
    pub fn component(&self, d: usize) -> C {
        self[d]
    }

    /// Replace component `d`
    #[inline]
    pub fn replace(&mut self, d: usize, c: C) {
        self[d] = c;
    }

    /// Iterator over the components
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, C> {
        self.v.iter()
    }

    /// Mutable iterator over the components
    #[inline]
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, C> {
        self.v.iter_mut()
    }

    /// Explicit component-type conversion (narrowing or widening)
    pub fn cast<C2>(&self) -> VectorSpace<K, C2, N>
    where
        C2: Cmpt,
        C: AsPrimitive<C2>,
    {
        VectorSpace::from_array(self.v.map(AsPrimitive::<C2>::as_))
    }

    /// Apply `f` to every component
    #[inline]
    pub fn map<F: Fn(C) -> C>(&self, f: F) -> Self {
        Self::from_array(self.v.map(f))
    }

    /// Combine two tuples component by component
    #[inline]
    pub fn zip_map<F: Fn(C, C) -> C>(&self, other: &Self, f: F) -> Self {
        let mut out = *self;
        for (o, &b) in out.v.iter_mut().zip(other.v.iter()) {
            *o = f(*o, b);
        }
        out
    }

    /// Component-wise product
    #[inline]
    pub fn cmpt_multiply(&self, other: &Self) -> Self {
        self.zip_map(other, |a, b| a * b)
    }

    /// Component-wise quotient
    #[inline]
    pub fn cmpt_divide(&self, other: &Self) -> Self {
        self.zip_map(other, |a, b| a / b)
    }

    /// Component-wise magnitude
    #[inline]
    pub fn cmpt_mag(&self) -> Self {
        self.map(|c| c.cmpt_abs())
    }

    /// Largest component
    pub fn cmpt_max(&self) -> C {
        self.v.iter().copied().reduce(C::cmpt_max).unwrap_or(C::ZERO)
    }

    /// Smallest component
    pub fn cmpt_min(&self) -> C {
        self.v.iter().copied().reduce(C::cmpt_min).unwrap_or(C::ZERO)
    }

    /// Sum of the components
    pub fn cmpt_sum(&self) -> C {
        self.v.iter().copied().fold(C::ZERO, |acc, c| acc + c)
    }

    /// Average of the components
    pub fn cmpt_av(&self) -> C {
        let n: C = num_traits::cast(N).unwrap_or(C::ONE);
        self.cmpt_sum() / n
    }

    /// Sum of squared components
    pub fn mag_sqr(&self) -> C {
        self.v.iter().copied().fold(C::ZERO, |acc, c| acc + c * c)
    }

    /// Euclidean magnitude in double precision
    pub fn mag(&self) -> f64 {
        AsPrimitive::<f64>::as_(self.mag_sqr()).sqrt()
    }

    /// Component-wise maximum of two tuples
    pub fn max(&self, other: &Self) -> Self {
        self.zip_map(other, C::cmpt_max)
    }

    /// Component-wise minimum of two tuples
    pub fn min(&self, other: &Self) -> Self {
        self.zip_map(other, C::cmpt_min)
    }

    /// Every component strictly less than the corresponding one of `other`
    pub fn all_lt(&self, other: &Self) -> bool {
        self.v.iter().zip(other.v.iter()).all(|(a, b)| a < b)
    }

    /// Every component less than or equal to the corresponding one of `other`
    pub fn all_le(&self, other: &Self) -> bool {
        self.v.iter().zip(other.v.iter()).all(|(a, b)| a <= b)
    }

    /// Every component strictly greater than the corresponding one of `other`
    pub fn all_gt(&self, other: &Self) -> bool {
        self.v.iter().zip(other.v.iter()).all(|(a, b)| a > b)
    }

    /// Every component greater than or equal to the corresponding one of `other`
    pub fn all_ge(&self, other: &Self) -> bool {
        self.v.iter().zip(other.v.iter()).all(|(a, b)| a >= b)
    }

    /// At least one component strictly less than the corresponding one of `other`
    pub fn any_lt(&self, other: &Self) -> bool {
        self.v.iter().zip(other.v.iter()).any(|(a, b)| a < b)
    }

    /// At least one component strictly greater than the corresponding one of `other`
    pub fn any_gt(&self, other: &Self) -> bool {
        self.v.iter().zip(other.v.iter()).any(|(a, b)| a > b)
    }

    /// View the tuple as raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    /// View a slice of tuples as a flat slice of components
    pub fn slice_as_cmpts(values: &[Self]) -> &[C] {
        bytemuck::cast_slice(values)
    }

    /// View a slice of tuples as raw bytes
    pub fn slice_as_bytes(values: &[Self]) -> &[u8] {
        bytemuck::cast_slice(values)
    }
}

impl<K, C: Copy, const N: usize> Clone for VectorSpace<K, C, N> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, C: Copy, const N: usize> Copy for VectorSpace<K, C, N> {}

impl<K, C: PartialEq, const N: usize> PartialEq for VectorSpace<K, C, N> {
    fn eq(&self, other: &Self) -> bool {
        self.v == other.v
    }
}

impl<K: Kind, C: Cmpt, const N: usize> Default for VectorSpace<K, C, N> {
    fn default() -> Self {
        Self::ZERO
    }
}

// SAFETY: `#[repr(C)]` over `[C; N]` plus a zero-sized, align-1 marker, so the
// layout has no padding and every bit pattern valid for `C` is valid here.
unsafe impl<K: Kind, C: Cmpt, const N: usize> bytemuck::Zeroable for VectorSpace<K, C, N> {}
unsafe impl<K: Kind, C: Cmpt, const N: usize> bytemuck::Pod for VectorSpace<K, C, N> {}

impl<K: Kind, C: Cmpt, const N: usize> From<[C; N]> for VectorSpace<K, C, N> {
    fn from(v: [C; N]) -> Self {
        Self::from_array(v)
    }
}

impl<K: Kind, C: Cmpt, const N: usize> From<VectorSpace<K, C, N>> for [C; N] {
    fn from(v: VectorSpace<K, C, N>) -> Self {
        v.v
    }
}

impl<K: Kind, C: Cmpt, const N: usize> From<Zero> for VectorSpace<K, C, N> {
    fn from(_: Zero) -> Self {
        Self::ZERO
    }
}

impl<K: Kind, C: Cmpt, const N: usize> Index<usize> for VectorSpace<K, C, N> {
    type Output = C;

    #[inline]
    fn index(&self, d: usize) -> &C {
        debug_assert!(d < N, "{} component index {} out of range [0,{})", K::NAME, d, N);
        &self.v[d]
    }
}

impl<K: Kind, C: Cmpt, const N: usize> IndexMut<usize> for VectorSpace<K, C, N> {
    #[inline]
    fn index_mut(&mut self, d: usize) -> &mut C {
        debug_assert!(d < N, "{} component index {} out of range [0,{})", K::NAME, d, N);
        &mut self.v[d]
    }
}

impl<K, C, const N: usize> IntoIterator for VectorSpace<K, C, N> {
    type Item = C;
    type IntoIter = std::array::IntoIter<C, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.v.into_iter()
    }
}

impl<'a, K, C, const N: usize> IntoIterator for &'a VectorSpace<K, C, N> {
    type Item = &'a C;
    type IntoIter = std::slice::Iter<'a, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.v.iter()
    }
}

impl<'a, K, C, const N: usize> IntoIterator for &'a mut VectorSpace<K, C, N> {
    type Item = &'a mut C;
    type IntoIter = std::slice::IterMut<'a, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.v.iter_mut()
    }
}

impl<K: Kind, C: Cmpt, const N: usize> Add for VectorSpace<K, C, N> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        self.zip_map(&rhs, |a, b| a + b)
    }
}

impl<K: Kind, C: Cmpt, const N: usize> Sub for VectorSpace<K, C, N> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self.zip_map(&rhs, |a, b| a - b)
    }
}

impl<K: Kind, C: Cmpt, const N: usize> Neg for VectorSpace<K, C, N> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        self.map(|c| -c)
    }
}

impl<K: Kind, C: Cmpt, const N: usize> Mul<C> for VectorSpace<K, C, N> {
    type Output = Self;

    #[inline]
    fn mul(self, s: C) -> Self {
        self.map(|c| c * s)
    }
}

impl<K: Kind, C: Cmpt, const N: usize> Div<C> for VectorSpace<K, C, N> {
    type Output = Self;

    #[inline]
    fn div(self, s: C) -> Self {
        self.map(|c| c / s)
    }
}

impl<K: Kind, C: Cmpt, const N: usize> AddAssign for VectorSpace<K, C, N> {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        for (a, b) in self.v.iter_mut().zip(rhs.v) {
            *a += b;
        }
    }
}

impl<K: Kind, C: Cmpt, const N: usize> SubAssign for VectorSpace<K, C, N> {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        for (a, b) in self.v.iter_mut().zip(rhs.v) {
            *a -= b;
        }
    }
}

impl<K: Kind, C: Cmpt, const N: usize> MulAssign<C> for VectorSpace<K, C, N> {
    #[inline]
    fn mul_assign(&mut self, s: C) {
        for a in self.v.iter_mut() {
            *a *= s;
        }
    }
}

impl<K: Kind, C: Cmpt, const N: usize> DivAssign<C> for VectorSpace<K, C, N> {
    #[inline]
    fn div_assign(&mut self, s: C) {
        for a in self.v.iter_mut() {
            *a /= s;
        }
    }
}

impl<K: Kind, C: Cmpt, const N: usize> Sum for VectorSpace<K, C, N> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, v| acc + v)
    }
}

impl<'a, K: Kind, C: Cmpt, const N: usize> Sum<&'a VectorSpace<K, C, N>>
    for VectorSpace<K, C, N>
{
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, v| acc + *v)
    }
}

macro_rules! impl_scalar_lhs_mul {
    ($($t:ty),*) => {$(
        impl<K: Kind, const N: usize> Mul<VectorSpace<K, $t, N>> for $t {
            type Output = VectorSpace<K, $t, N>;

            #[inline]
            fn mul(self, v: VectorSpace<K, $t, N>) -> Self::Output {
                v * self
            }
        }
    )*};
}

impl_scalar_lhs_mul!(f64, f32, i32, i64);

impl<K: Kind, C: Cmpt, const N: usize> fmt::Debug for VectorSpace<K, C, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", K::NAME)?;
        f.debug_list().entries(self.v.iter()).finish()
    }
}

/// Text form `(c0 c1 ... cN-1)`, the format read back by
/// [`ReadStream`](crate::stream::ReadStream).
impl<K: Kind, C: Cmpt, const N: usize> fmt::Display for VectorSpace<K, C, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.v.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SymmTensor, Vector};
    use approx::assert_relative_eq;

    #[test]
    fn test_constants_are_uniform() {
        assert!(Vector::<f64>::ZERO.iter().all(|&c| c == 0.0));
        assert!(Vector::<f64>::ONE.iter().all(|&c| c == 1.0));
        assert_eq!(Vector::<f64>::ROOT_MAX[2], 1.0e150);
        assert_eq!(SymmTensor::<i32>::MIN[5], i32::MIN);
    }

    #[test]
    fn test_arithmetic_preserves_size() {
        let a = Vector::new(1.0, 2.0, 3.0);
        let b = Vector::new(0.5, -1.0, 2.0);

        assert_eq!(a + b, Vector::new(1.5, 1.0, 5.0));
        assert_eq!(a - b, Vector::new(0.5, 3.0, 1.0));
        assert_eq!(-a, Vector::new(-1.0, -2.0, -3.0));
        assert_eq!(a * 2.0, Vector::new(2.0, 4.0, 6.0));
        assert_eq!(2.0 * a, a * 2.0);

        let mut c = a;
        c /= 2.0;
        assert_eq!(c, Vector::new(0.5, 1.0, 1.5));
        c += b;
        c -= b;
        assert_eq!(c, Vector::new(0.5, 1.0, 1.5));
    }

    #[test]
    fn test_componentwise_comparison_is_not_ordering() {
        let a = Vector::new(1.0, 5.0, 3.0);
        let b = Vector::new(2.0, 4.0, 3.0);

        assert!(!a.all_lt(&b));
        assert!(!b.all_lt(&a));
        assert!(a.any_lt(&b));
        assert!(a.any_gt(&b));
        assert_eq!(a.max(&b), Vector::new(2.0, 5.0, 3.0));
        assert_eq!(a.min(&b), Vector::new(1.0, 4.0, 3.0));
    }

    #[test]
    fn test_component_reductions() {
        let a = Vector::new(-3.0, 4.0, 2.0);
        assert_eq!(a.cmpt_max(), 4.0);
        assert_eq!(a.cmpt_min(), -3.0);
        assert_eq!(a.cmpt_sum(), 3.0);
        assert_relative_eq!(a.cmpt_av(), 1.0);
        assert_eq!(a.cmpt_mag(), Vector::new(3.0, 4.0, 2.0));
        assert_relative_eq!(a.mag(), 29.0_f64.sqrt());
    }

    #[test]
    fn test_component_extrema_beyond_great() {
        let low = Vector::new(-1e305, -2e305, -3e305);
        assert_eq!(low.cmpt_max(), -1e305);
        let high = Vector::new(1e305, 2e305, 3e305);
        assert_eq!(high.cmpt_min(), 1e305);
    }

    #[test]
    fn test_iteration_mutates_in_place() {
        let mut a = Vector::new(1.0, 2.0, 3.0);
        for c in a.iter_mut() {
            *c *= 10.0;
        }
        assert_eq!(a.iter().copied().collect::<Vec<_>>(), vec![10.0, 20.0, 30.0]);

        // Restartable: a fresh iterator starts at the first component again
        assert_eq!(a.iter().next(), Some(&10.0));
        assert_eq!((&a).into_iter().count(), 3);
    }

    #[test]
    fn test_cast_between_component_types() {
        let a = Vector::new(1.75_f64, -2.25, 3.0);
        let narrowed: Vector<f32> = a.cast();
        assert_eq!(narrowed, Vector::new(1.75_f32, -2.25, 3.0));

        let truncated: Vector<i32> = a.cast();
        assert_eq!(truncated, Vector::new(1, -2, 3));

        let widened: Vector<f64> = truncated.cast();
        assert_eq!(widened, Vector::new(1.0, -2.0, 3.0));
    }

    #[test]
    fn test_contiguous_layout() {
        let values = vec![Vector::new(1.0, 2.0, 3.0), Vector::new(4.0, 5.0, 6.0)];
        let flat = Vector::slice_as_cmpts(&values);
        assert_eq!(flat, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(Vector::<f64>::slice_as_bytes(&values).len(), 6 * 8);
        assert_eq!(std::mem::size_of::<SymmTensor<f32>>(), 6 * 4);
    }

    #[test]
    fn test_zero_construction() {
        let z: Vector<f64> = Vector::from(Zero);
        assert_eq!(z, Vector::ZERO);
        assert_eq!(Vector::<f64>::default(), Vector::ZERO);
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_component_panics() {
        let a = Vector::new(1.0, 2.0, 3.0);
        let d = 3;
        let _ = a[d];
    }
}
