//! Preconditioners for iterative solvers
//!
//! Preconditioners approximate A^(-1) to accelerate convergence of iterative methods.
//!
//! # Available Preconditioners
//!
//! - **DicPreconditioner**: diagonal incomplete Cholesky, symmetric matrices
//! - **DiluPreconditioner**: diagonal incomplete LU, asymmetric matrices
//! - **DiagonalPreconditioner** (Jacobi): simple diagonal scaling, fully parallel
//! - **IdentityPreconditioner**: no preconditioning

mod diagonal;
mod dic;
mod dilu;

pub use diagonal::DiagonalPreconditioner;
pub use dic::DicPreconditioner;
pub use dilu::DiluPreconditioner;

// Re-export IdentityPreconditioner from traits
pub use crate::traits::IdentityPreconditioner;

use crate::error::SolverError;
use crate::sparse::LduMatrix;
use crate::traits::{Preconditioner, RealField};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Preconditioner selection, named as in solver control dictionaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PreconditionerType {
    #[serde(rename = "DIC")]
    Dic,
    #[serde(rename = "DILU")]
    Dilu,
    #[serde(rename = "diagonal")]
    Diagonal,
    #[default]
    #[serde(rename = "none")]
    None,
}

impl PreconditionerType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dic => "DIC",
            Self::Dilu => "DILU",
            Self::Diagonal => "diagonal",
            Self::None => "none",
        }
    }

    /// Build the preconditioner for `matrix`
    pub fn build<'a, T: RealField>(
        &self,
        matrix: &'a LduMatrix<T>,
    ) -> Result<Box<dyn Preconditioner<T> + 'a>, SolverError> {
        Ok(match self {
            Self::Dic => Box::new(DicPreconditioner::new(matrix)?),
            Self::Dilu => Box::new(DiluPreconditioner::new(matrix)),
            Self::Diagonal => Box::new(DiagonalPreconditioner::from_ldu(matrix)),
            Self::None => Box::new(IdentityPreconditioner),
        })
    }
}

impl fmt::Display for PreconditionerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PreconditionerType {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DIC" => Ok(Self::Dic),
            "DILU" => Ok(Self::Dilu),
            "diagonal" => Ok(Self::Diagonal),
            "none" => Ok(Self::None),
            other => Err(SolverError::UnknownPreconditioner(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preconditioner_names() {
        for kind in [
            PreconditionerType::Dic,
            PreconditionerType::Dilu,
            PreconditionerType::Diagonal,
            PreconditionerType::None,
        ] {
            assert_eq!(kind.name().parse::<PreconditionerType>().unwrap(), kind);
        }
        assert!("FDIC".parse::<PreconditionerType>().is_err());
    }

    #[test]
    fn test_preconditioner_serde_names() {
        let kind: PreconditionerType = serde_json::from_str("\"DILU\"").unwrap();
        assert_eq!(kind, PreconditionerType::Dilu);
        assert_eq!(serde_json::to_string(&PreconditionerType::None).unwrap(), "\"none\"");
    }
}
