//! Component types for numeric tuples
//!
//! A [`Cmpt`] is the homogeneous element type stored in every
//! [`VectorSpace`](crate::VectorSpace). Each implementation carries the shared
//! limit constants used for clamping squared quantities without overflow.

use num_traits::{AsPrimitive, Bounded, Num, NumAssign, NumCast};
use std::fmt::{Debug, Display};
use std::ops::Neg;
use std::str::FromStr;

/// Homogeneous component type of a numeric tuple.
///
/// Implemented for `f32`, `f64`, `i32` and `i64`.
pub trait Cmpt:
    Copy
    + Num
    + NumAssign
    + NumCast
    + Bounded
    + PartialOrd
    + Neg<Output = Self>
    + Debug
    + Display
    + FromStr
    + AsPrimitive<f64>
    + Send
    + Sync
    + bytemuck::Pod
    + 'static
{
    /// Additive identity
    const ZERO: Self;
    /// Multiplicative identity
    const ONE: Self;
    /// Largest value used as "unbounded" in the finite-volume layer
    const MAX: Self;
    /// Smallest value used as "unbounded" in the finite-volume layer
    const MIN: Self;
    /// Largest value whose square does not overflow
    const ROOT_MAX: Self;
    /// Smallest value whose square does not overflow
    const ROOT_MIN: Self;
    /// Short type name used in stream headers
    const TYPE_NAME: &'static str;

    /// Magnitude of a single component
    fn cmpt_abs(self) -> Self;

    /// Larger of two components
    #[inline]
    fn cmpt_max(self, other: Self) -> Self {
        if other > self { other } else { self }
    }

    /// Smaller of two components
    #[inline]
    fn cmpt_min(self, other: Self) -> Self {
        if other < self { other } else { self }
    }
}

macro_rules! impl_cmpt_float {
    ($t:ty, $great:expr, $root_great:expr, $name:expr) => {
        impl Cmpt for $t {
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;
            const MAX: Self = $great;
            const MIN: Self = -$great;
            const ROOT_MAX: Self = $root_great;
            const ROOT_MIN: Self = -$root_great;
            const TYPE_NAME: &'static str = $name;

            #[inline]
            fn cmpt_abs(self) -> Self {
                self.abs()
            }
        }
    };
}

macro_rules! impl_cmpt_int {
    ($t:ty, $root:expr, $name:expr) => {
        impl Cmpt for $t {
            const ZERO: Self = 0;
            const ONE: Self = 1;
            const MAX: Self = <$t>::MAX;
            const MIN: Self = <$t>::MIN;
            const ROOT_MAX: Self = $root;
            const ROOT_MIN: Self = -$root;
            const TYPE_NAME: &'static str = $name;

            #[inline]
            fn cmpt_abs(self) -> Self {
                self.abs()
            }
        }
    };
}

impl_cmpt_float!(f64, 1.0e300, 1.0e150, "doubleScalar");
impl_cmpt_float!(f32, 1.0e37, 1.0e18, "floatScalar");
impl_cmpt_int!(i32, 46_340, "int32");
impl_cmpt_int!(i64, 3_037_000_499, "int64");

/// Small value used to guard divisions in double precision
pub const SMALL: f64 = 1.0e-15;

/// Very small value used to guard divisions in double precision
pub const VSMALL: f64 = 1.0e-300;

/// Very great value in double precision
pub const VGREAT: f64 = 1.0e300;
