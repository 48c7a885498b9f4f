//! Value types storable in mesh fields and equation sources
//!
//! The finite-volume layer is generic over the per-cell value type. It solves
//! tuple-valued equations one component at a time, so it only needs component
//! access on `f64` components plus a handful of component-wise reductions.

use crate::vector_space::{Kind, VectorSpace};
use std::fmt::{Debug, Display};
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// A double-precision value type with a fixed number of components.
pub trait FieldType:
    Copy
    + Debug
    + Display
    + Default
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + Mul<f64, Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign<f64>
    + Send
    + Sync
    + 'static
{
    /// Number of components
    const N_COMPONENTS: usize;
    /// Type name
    const TYPE_NAME: &'static str;
    /// All components zero
    const ZERO: Self;
    /// All components one
    const ONE: Self;

    /// Component names in storage order
    fn component_names() -> &'static [&'static str];

    /// Component `d`
    fn component(&self, d: usize) -> f64;

    /// Replace component `d`
    fn set_component(&mut self, d: usize, value: f64);

    /// Every component set to `value`
    fn uniform(value: f64) -> Self;

    /// Component-wise product
    fn cmpt_multiply(&self, other: &Self) -> Self;

    /// Component-wise magnitude
    fn cmpt_mag(&self) -> Self;

    /// Component-wise maximum of two values
    fn cmpt_max_of(&self, other: &Self) -> Self;

    /// Component-wise minimum of two values
    fn cmpt_min_of(&self, other: &Self) -> Self;

    /// Largest component
    fn cmpt_max(&self) -> f64;

    /// Smallest component
    fn cmpt_min(&self) -> f64;

    /// Average of the components
    fn cmpt_av(&self) -> f64;

    /// Sum of squared components
    fn mag_sqr(&self) -> f64;

    fn mag(&self) -> f64 {
        self.mag_sqr().sqrt()
    }
}

impl FieldType for f64 {
    const N_COMPONENTS: usize = 1;
    const TYPE_NAME: &'static str = "scalar";
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;

    fn component_names() -> &'static [&'static str] {
        &[""]
    }

    #[inline]
    fn component(&self, _: usize) -> f64 {
        *self
    }

    #[inline]
    fn set_component(&mut self, _: usize, value: f64) {
        *self = value;
    }

    fn uniform(value: f64) -> Self {
        value
    }

    fn cmpt_multiply(&self, other: &Self) -> Self {
        self * other
    }

    fn cmpt_mag(&self) -> Self {
        self.abs()
    }

    fn cmpt_max_of(&self, other: &Self) -> Self {
        self.max(*other)
    }

    fn cmpt_min_of(&self, other: &Self) -> Self {
        self.min(*other)
    }

    fn cmpt_max(&self) -> f64 {
        *self
    }

    fn cmpt_min(&self) -> f64 {
        *self
    }

    fn cmpt_av(&self) -> f64 {
        *self
    }

    fn mag_sqr(&self) -> f64 {
        self * self
    }

    fn mag(&self) -> f64 {
        self.abs()
    }
}

impl<K: Kind, const N: usize> FieldType for VectorSpace<K, f64, N> {
    const N_COMPONENTS: usize = N;
    const TYPE_NAME: &'static str = K::NAME;
    const ZERO: Self = VectorSpace::<K, f64, N>::ZERO;
    const ONE: Self = VectorSpace::<K, f64, N>::ONE;

    fn component_names() -> &'static [&'static str] {
        K::COMPONENT_NAMES
    }

    #[inline]
    fn component(&self, d: usize) -> f64 {
        self[d]
    }

    #[inline]
    fn set_component(&mut self, d: usize, value: f64) {
        self[d] = value;
    }

    fn uniform(value: f64) -> Self {
        VectorSpace::uniform(value)
    }

    fn cmpt_multiply(&self, other: &Self) -> Self {
        VectorSpace::cmpt_multiply(self, other)
    }

    fn cmpt_mag(&self) -> Self {
        VectorSpace::cmpt_mag(self)
    }

    fn cmpt_max_of(&self, other: &Self) -> Self {
        VectorSpace::max(self, other)
    }

    fn cmpt_min_of(&self, other: &Self) -> Self {
        VectorSpace::min(self, other)
    }

    fn cmpt_max(&self) -> f64 {
        VectorSpace::cmpt_max(self)
    }

    fn cmpt_min(&self) -> f64 {
        VectorSpace::cmpt_min(self)
    }

    fn cmpt_av(&self) -> f64 {
        VectorSpace::cmpt_av(self)
    }

    fn mag_sqr(&self) -> f64 {
        VectorSpace::mag_sqr(self)
    }
}
