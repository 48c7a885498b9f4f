//! Sparse matrix structures (LDU and CSR formats)
//!
//! LDU is the face-addressed format finite-volume matrices are assembled in;
//! CSR is the general format for inspection and cross-checking.

mod csr;
mod ldu;

pub use csr::CsrMatrix;
pub use ldu::{LduAddressing, LduMatrix};
