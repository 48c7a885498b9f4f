//! Stateless identity tags
//!
//! [`Zero`] and [`One`] stand for the values 0 and 1 wherever a number, a
//! numeric tuple or a field is expected. [`ZeroField`] stands for a field whose
//! every value is [`Zero`]. All three are zero-sized: operator overloads that
//! accept them are selected at compile time and do no work.
//!
//! # Features
//!
//! - Conversion into every primitive numeric type and every [`VectorSpace`]
//! - Indexing returns another tag, so a tag can masquerade as a field
//! - Arithmetic short-circuits: `x + Zero == x`, `x * One == x`, `x * Zero == Zero`

use crate::component::Cmpt;
use crate::vector_space::{Kind, VectorSpace};
use std::fmt;
use std::ops::{Add, Index, Mul, Neg, Sub};

/// The value zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Zero;

/// The value one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct One;

/// A field of [`Zero`] values, occupying no storage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ZeroField;

impl Zero {
    /// A tag indexes and views as itself
    pub fn field(&self) -> Zero {
        Zero
    }
}

impl One {
    pub fn field(&self) -> One {
        One
    }
}

impl ZeroField {
    pub fn field(&self) -> ZeroField {
        ZeroField
    }

    /// Number of stored values, always zero
    pub fn len(&self) -> usize {
        0
    }

    pub fn is_empty(&self) -> bool {
        true
    }
}

static ZERO: Zero = Zero;
static ONE: One = One;

impl Index<usize> for Zero {
    type Output = Zero;

    fn index(&self, _: usize) -> &Zero {
        &ZERO
    }
}

impl Index<usize> for One {
    type Output = One;

    fn index(&self, _: usize) -> &One {
        &ONE
    }
}

impl Index<usize> for ZeroField {
    type Output = Zero;

    fn index(&self, _: usize) -> &Zero {
        &ZERO
    }
}

macro_rules! impl_tag_conversions {
    ($($t:ty),*) => {$(
        impl From<Zero> for $t {
            #[inline]
            fn from(_: Zero) -> $t {
                0 as $t
            }
        }

        impl From<One> for $t {
            #[inline]
            fn from(_: One) -> $t {
                1 as $t
            }
        }

        impl Add<Zero> for $t {
            type Output = $t;

            #[inline]
            fn add(self, _: Zero) -> $t {
                self
            }
        }

        impl Sub<Zero> for $t {
            type Output = $t;

            #[inline]
            fn sub(self, _: Zero) -> $t {
                self
            }
        }

        impl Mul<Zero> for $t {
            type Output = Zero;

            #[inline]
            fn mul(self, _: Zero) -> Zero {
                Zero
            }
        }

        impl Mul<One> for $t {
            type Output = $t;

            #[inline]
            fn mul(self, _: One) -> $t {
                self
            }
        }
    )*};
}

impl_tag_conversions!(f32, f64, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl<K: Kind, C: Cmpt, const N: usize> Add<Zero> for VectorSpace<K, C, N> {
    type Output = Self;

    #[inline]
    fn add(self, _: Zero) -> Self {
        self
    }
}

impl<K: Kind, C: Cmpt, const N: usize> Sub<Zero> for VectorSpace<K, C, N> {
    type Output = Self;

    #[inline]
    fn sub(self, _: Zero) -> Self {
        self
    }
}

impl<K: Kind, C: Cmpt, const N: usize> Mul<Zero> for VectorSpace<K, C, N> {
    type Output = Zero;

    #[inline]
    fn mul(self, _: Zero) -> Zero {
        Zero
    }
}

impl<K: Kind, C: Cmpt, const N: usize> Mul<One> for VectorSpace<K, C, N> {
    type Output = Self;

    #[inline]
    fn mul(self, _: One) -> Self {
        self
    }
}

impl Add for Zero {
    type Output = Zero;

    fn add(self, _: Zero) -> Zero {
        Zero
    }
}

impl Sub for Zero {
    type Output = Zero;

    fn sub(self, _: Zero) -> Zero {
        Zero
    }
}

impl Neg for Zero {
    type Output = Zero;

    fn neg(self) -> Zero {
        Zero
    }
}

impl Mul for Zero {
    type Output = Zero;

    fn mul(self, _: Zero) -> Zero {
        Zero
    }
}

impl Mul<One> for Zero {
    type Output = Zero;

    fn mul(self, _: One) -> Zero {
        Zero
    }
}

impl Mul for One {
    type Output = One;

    fn mul(self, _: One) -> One {
        One
    }
}

impl Mul<Zero> for One {
    type Output = Zero;

    fn mul(self, _: Zero) -> Zero {
        Zero
    }
}

impl Add for ZeroField {
    type Output = ZeroField;

    fn add(self, _: ZeroField) -> ZeroField {
        ZeroField
    }
}

impl Neg for ZeroField {
    type Output = ZeroField;

    fn neg(self) -> ZeroField {
        ZeroField
    }
}

impl fmt::Display for Zero {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0")
    }
}

impl fmt::Display for One {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "1")
    }
}
