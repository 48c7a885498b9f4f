//! Physical dimension tags
//!
//! A [`DimensionSet`] holds one rational exponent per SI base quantity. Fields,
//! matrices and coefficients carry one; combining two quantities whose sets
//! differ is an error, never a silent conversion. Scale factors are not
//! represented, only dimensions.

use std::fmt;
use std::ops::{Div, Mul};
use std::str::FromStr;
use thiserror::Error;

/// Dimension errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DimensionError {
    #[error("dimensions of {context} differ: [{lhs}] vs [{rhs}]")]
    Mismatch {
        context: String,
        lhs: DimensionSet,
        rhs: DimensionSet,
    },

    #[error("cannot parse dimension set '{0}'")]
    Parse(String),
}

/// Rational exponent, always stored in lowest terms with a positive
/// denominator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Exponent {
    num: i32,
    den: i32,
}

const fn gcd(mut a: i32, mut b: i32) -> i32 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    if a < 0 { -a } else { a }
}

impl Exponent {
    pub const ZERO: Self = Self { num: 0, den: 1 };

    pub const fn integer(n: i32) -> Self {
        Self { num: n, den: 1 }
    }

    pub const fn ratio(num: i32, den: i32) -> Self {
        assert!(den != 0, "dimension exponent with zero denominator");
        if num == 0 {
            return Self::ZERO;
        }
        let sign = if den < 0 { -1 } else { 1 };
        let g = gcd(num, den);
        Self {
            num: sign * num / g,
            den: sign * den / g,
        }
    }

    pub const fn numerator(self) -> i32 {
        self.num
    }

    pub const fn denominator(self) -> i32 {
        self.den
    }

    pub const fn is_zero(self) -> bool {
        self.num == 0
    }

    const fn add(self, rhs: Self) -> Self {
        Self::ratio(self.num * rhs.den + rhs.num * self.den, self.den * rhs.den)
    }

    const fn sub(self, rhs: Self) -> Self {
        Self::ratio(self.num * rhs.den - rhs.num * self.den, self.den * rhs.den)
    }

    const fn scale(self, rhs: Self) -> Self {
        Self::ratio(self.num * rhs.num, self.den * rhs.den)
    }
}

impl fmt::Display for Exponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl FromStr for Exponent {
    type Err = DimensionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || DimensionError::Parse(s.to_string());
        match s.split_once('/') {
            Some((n, d)) => {
                let num = n.trim().parse().map_err(|_| err())?;
                let den: i32 = d.trim().parse().map_err(|_| err())?;
                if den == 0 {
                    return Err(err());
                }
                Ok(Self::ratio(num, den))
            }
            None => Ok(Self::integer(s.trim().parse().map_err(|_| err())?)),
        }
    }
}

/// SI base quantities, in storage order
pub const BASE_NAMES: [&str; 7] = [
    "mass",
    "length",
    "time",
    "temperature",
    "moles",
    "current",
    "luminousIntensity",
];

/// SI base unit symbols, in storage order
pub const BASE_SYMBOLS: [&str; 7] = ["kg", "m", "s", "K", "mol", "A", "cd"];

/// Exponents of the seven SI base quantities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DimensionSet {
    exponents: [Exponent; 7],
}

impl DimensionSet {
    pub const MASS: usize = 0;
    pub const LENGTH: usize = 1;
    pub const TIME: usize = 2;
    pub const TEMPERATURE: usize = 3;
    pub const MOLES: usize = 4;
    pub const CURRENT: usize = 5;
    pub const LUMINOUS_INTENSITY: usize = 6;

    /// Integer exponents for mass, length, time, temperature, moles, current
    /// and luminous intensity
    pub const fn new(
        mass: i32,
        length: i32,
        time: i32,
        temperature: i32,
        moles: i32,
        current: i32,
        luminous: i32,
    ) -> Self {
        Self {
            exponents: [
                Exponent::integer(mass),
                Exponent::integer(length),
                Exponent::integer(time),
                Exponent::integer(temperature),
                Exponent::integer(moles),
                Exponent::integer(current),
                Exponent::integer(luminous),
            ],
        }
    }

    pub const fn dimensionless() -> Self {
        Self {
            exponents: [Exponent::ZERO; 7],
        }
    }

    pub const fn is_dimensionless(&self) -> bool {
        let mut i = 0;
        while i < 7 {
            if !self.exponents[i].is_zero() {
                return false;
            }
            i += 1;
        }
        true
    }

    /// Exponent of base quantity `i`
    pub const fn exponent(&self, i: usize) -> Exponent {
        self.exponents[i]
    }

    pub const fn mul_dims(self, rhs: Self) -> Self {
        let mut out = self;
        let mut i = 0;
        while i < 7 {
            out.exponents[i] = self.exponents[i].add(rhs.exponents[i]);
            i += 1;
        }
        out
    }

    pub const fn div_dims(self, rhs: Self) -> Self {
        let mut out = self;
        let mut i = 0;
        while i < 7 {
            out.exponents[i] = self.exponents[i].sub(rhs.exponents[i]);
            i += 1;
        }
        out
    }

    /// Raise to the rational power `num/den`
    pub const fn pow_ratio(self, num: i32, den: i32) -> Self {
        let p = Exponent::ratio(num, den);
        let mut out = self;
        let mut i = 0;
        while i < 7 {
            out.exponents[i] = self.exponents[i].scale(p);
            i += 1;
        }
        out
    }

    pub const fn powi(self, n: i32) -> Self {
        self.pow_ratio(n, 1)
    }

    pub const fn sqrt(self) -> Self {
        self.pow_ratio(1, 2)
    }

    pub const fn inv(self) -> Self {
        Self::dimensionless().div_dims(self)
    }

    /// Require `self == other`
    pub fn check_equal(&self, other: &Self, context: &str) -> Result<(), DimensionError> {
        if self == other {
            Ok(())
        } else {
            Err(DimensionError::Mismatch {
                context: context.to_string(),
                lhs: *self,
                rhs: *other,
            })
        }
    }

    /// Bracketed exponent list `[0 2 -1 0 0 0 0]`
    pub fn exponent_list(&self) -> String {
        let parts: Vec<String> = self.exponents.iter().map(|e| e.to_string()).collect();
        format!("[{}]", parts.join(" "))
    }
}

impl Default for DimensionSet {
    fn default() -> Self {
        Self::dimensionless()
    }
}

impl Mul for DimensionSet {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.mul_dims(rhs)
    }
}

impl Div for DimensionSet {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        self.div_dims(rhs)
    }
}

/// SI symbols, e.g. `kg m^-3`; `-` for a dimensionless set
impl fmt::Display for DimensionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "-");
        }
        let mut first = true;
        for (e, symbol) in self.exponents.iter().zip(BASE_SYMBOLS) {
            if e.is_zero() {
                continue;
            }
            if !first {
                write!(f, " ")?;
            }
            first = false;
            match (e.num, e.den) {
                (1, 1) => write!(f, "{symbol}")?,
                (_, 1) => write!(f, "{symbol}^{}", e.num)?,
                _ => write!(f, "{symbol}^({e})")?,
            }
        }
        Ok(())
    }
}

/// Parses the bracketed exponent list written by
/// [`DimensionSet::exponent_list`]. Trailing exponents may be omitted.
impl FromStr for DimensionSet {
    type Err = DimensionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .trim()
            .strip_prefix('[')
            .and_then(|r| r.strip_suffix(']'))
            .ok_or_else(|| DimensionError::Parse(s.to_string()))?;
        let mut out = Self::dimensionless();
        let tokens: Vec<&str> = inner.split_whitespace().collect();
        if tokens.len() > 7 {
            return Err(DimensionError::Parse(s.to_string()));
        }
        for (i, token) in tokens.iter().enumerate() {
            out.exponents[i] = token.parse()?;
        }
        Ok(out)
    }
}

/// Named dimension sets
pub mod si {
    use super::DimensionSet;

    pub const DIMLESS: DimensionSet = DimensionSet::dimensionless();
    pub const MASS: DimensionSet = DimensionSet::new(1, 0, 0, 0, 0, 0, 0);
    pub const LENGTH: DimensionSet = DimensionSet::new(0, 1, 0, 0, 0, 0, 0);
    pub const TIME: DimensionSet = DimensionSet::new(0, 0, 1, 0, 0, 0, 0);
    pub const TEMPERATURE: DimensionSet = DimensionSet::new(0, 0, 0, 1, 0, 0, 0);
    pub const MOLES: DimensionSet = DimensionSet::new(0, 0, 0, 0, 1, 0, 0);
    pub const CURRENT: DimensionSet = DimensionSet::new(0, 0, 0, 0, 0, 1, 0);
    pub const LUMINOUS_INTENSITY: DimensionSet = DimensionSet::new(0, 0, 0, 0, 0, 0, 1);

    pub const AREA: DimensionSet = LENGTH.powi(2);
    pub const VOLUME: DimensionSet = LENGTH.powi(3);
    pub const INV_TIME: DimensionSet = TIME.inv();
    pub const VELOCITY: DimensionSet = LENGTH.div_dims(TIME);
    pub const ACCELERATION: DimensionSet = VELOCITY.div_dims(TIME);
    pub const DENSITY: DimensionSet = MASS.div_dims(VOLUME);
    pub const FORCE: DimensionSet = MASS.mul_dims(ACCELERATION);
    pub const PRESSURE: DimensionSet = FORCE.div_dims(AREA);
    pub const ENERGY: DimensionSet = FORCE.mul_dims(LENGTH);
    pub const POWER: DimensionSet = ENERGY.div_dims(TIME);

    /// Kinematic viscosity and other diffusivities, m^2/s
    pub const DIFFUSIVITY: DimensionSet = AREA.div_dims(TIME);
    pub const DYNAMIC_VISCOSITY: DimensionSet = PRESSURE.mul_dims(TIME);
    /// Volumetric face flux, m^3/s
    pub const VOLUMETRIC_FLUX: DimensionSet = VOLUME.div_dims(TIME);
    /// Mass face flux, kg/s
    pub const MASS_FLUX: DimensionSet = MASS.div_dims(TIME);
}

/// A value with a name and a dimension set
#[derive(Debug, Clone, PartialEq)]
pub struct Dimensioned<T> {
    pub name: String,
    pub dimensions: DimensionSet,
    pub value: T,
}

impl<T> Dimensioned<T> {
    pub fn new(name: impl Into<String>, dimensions: DimensionSet, value: T) -> Self {
        Self {
            name: name.into(),
            dimensions,
            value,
        }
    }
}

impl<T: Copy + Mul<f64, Output = T>> Dimensioned<T> {
    /// Scale by a dimensioned scalar, combining names and dimensions
    pub fn scaled(&self, s: &Dimensioned<f64>) -> Self {
        Self {
            name: format!("{}*{}", s.name, self.name),
            dimensions: self.dimensions * s.dimensions,
            value: self.value * s.value,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Dimensioned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.dimensions.exponent_list(), self.value)
    }
}
