//! Fixed-size numeric tuples for finite-volume fields
//!
//! This crate provides the value types stored in every mesh field: a generic,
//! compile-time-sized tuple of homogeneous components with uniform arithmetic,
//! iteration and serialization, plus the identity tags and physical dimension
//! sets used by the equation layer.
//!
//! # Features
//!
//! - **Numeric tuples**: [`Vector`], [`Tensor`], [`SymmTensor`],
//!   [`SphericalTensor`], [`Barycentric`], [`Barycentric2D`], all instances of
//!   [`VectorSpace`]
//! - **Identity tags**: [`Zero`], [`One`], [`ZeroField`] for compile-time no-ops
//! - **Dimensions**: [`DimensionSet`] with rational SI exponents
//! - **Streams**: text form `(c0 c1 ...)`, native binary form and `serde`
//!
//! # Example
//!
//! ```
//! use math_cfd_vector_space::{Vector, Zero};
//!
//! let u = Vector::new(1.0, 2.0, 2.0);
//! assert_eq!(u.mag(), 3.0);
//! assert_eq!(u + Zero, u);
//!
//! let parsed: Vector = "(1 2 2)".parse().unwrap();
//! assert_eq!(parsed, u);
//! ```

pub mod barycentric;
pub mod component;
pub mod dimensions;
pub mod field_type;
pub mod spherical_tensor;
pub mod stream;
pub mod symm_tensor;
pub mod tags;
pub mod tensor;
pub mod vector;
pub mod vector_space;

pub use barycentric::{Barycentric, Barycentric2D};
pub use component::{Cmpt, SMALL, VGREAT, VSMALL};
pub use dimensions::{DimensionError, DimensionSet, Dimensioned, si};
pub use field_type::FieldType;
pub use spherical_tensor::SphericalTensor;
pub use stream::{ReadStream, StreamError, TokenStream, WriteStream};
pub use symm_tensor::SymmTensor;
pub use tags::{One, Zero, ZeroField};
pub use tensor::Tensor;
pub use vector::Vector;
pub use vector_space::{Kind, VectorSpace};

/// Double-precision scalar
pub type Scalar = f64;

/// Crate version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
