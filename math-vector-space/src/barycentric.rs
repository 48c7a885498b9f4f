//! Barycentric coordinates for tetrahedra and triangles

use crate::component::Cmpt;
use crate::vector_space::{VectorSpace, declare_kind};

declare_kind!(
    /// Marker for tetrahedral barycentric coordinates
    BarycentricKind,
    "barycentric",
    ["a", "b", "c", "d"]
);

declare_kind!(
    /// Marker for triangular barycentric coordinates
    Barycentric2DKind,
    "barycentric2D",
    ["a", "b", "c"]
);

/// Tetrahedral barycentric coordinate `(a b c d)`
pub type Barycentric<C = f64> = VectorSpace<BarycentricKind, C, 4>;

/// Triangular barycentric coordinate `(a b c)`
pub type Barycentric2D<C = f64> = VectorSpace<Barycentric2DKind, C, 3>;

impl<C: Cmpt> Barycentric<C> {
    pub const fn new(a: C, b: C, c: C, d: C) -> Self {
        Self::from_array([a, b, c, d])
    }

    pub fn a(&self) -> C {
        self[0]
    }
    pub fn b(&self) -> C {
        self[1]
    }
    pub fn c(&self) -> C {
        self[2]
    }
    pub fn d(&self) -> C {
        self[3]
    }

    /// True if every coordinate is non-negative, i.e. the point lies inside
    /// or on the tetrahedron
    pub fn is_inside(&self) -> bool {
        self.iter().all(|&c| c >= C::ZERO)
    }
}

impl<C: Cmpt> Barycentric2D<C> {
    pub const fn new(a: C, b: C, c: C) -> Self {
        Self::from_array([a, b, c])
    }

    pub fn a(&self) -> C {
        self[0]
    }
    pub fn b(&self) -> C {
        self[1]
    }
    pub fn c(&self) -> C {
        self[2]
    }

    pub fn is_inside(&self) -> bool {
        self.iter().all(|&c| c >= C::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vector;
    use approx::assert_relative_eq;

    #[test]
    fn test_barycentric_is_distinct_kind() {
        // Same size as a vector, different kind
        let b = Barycentric2D::new(0.2, 0.3, 0.5);
        assert_eq!(Barycentric2D::<f64>::type_name(), "barycentric2D");
        assert_eq!(Vector::<f64>::type_name(), "vector");
        assert_relative_eq!(b.cmpt_sum(), 1.0);
        assert!(b.is_inside());
    }

    #[test]
    fn test_outside_point() {
        let b = Barycentric::new(0.5, 0.6, -0.2, 0.1);
        assert!(!b.is_inside());
        assert_eq!(b.c(), -0.2);
    }
}
