//! Mesh interface and a concrete polyhedral mesh
//!
//! The equation layer only sees meshes through [`FvMesh`]: cell volumes and
//! centres, owner/neighbour addressing of internal faces, face area vectors,
//! interpolation weights, delta coefficients and boundary patches.
//! [`PolyMesh`] is a ready-made implementation built from explicit cells and
//! faces; [`line_mesh`] and [`box_mesh`] generate structured ones.

mod generators;
mod types;

pub use generators::*;
pub use types::*;
