//! Mesh types

use crate::error::FvmError;
use crate::parallel::{Communicator, SerialCommunicator, g_sum};
use solvers::LduAddressing;
use std::fmt::Debug;
use std::sync::Arc;
use vector_space::Vector;

/// Lower bound on `n·d / |d|` when forming non-orthogonal delta coefficients
const NON_ORTH_LIMIT: f64 = 0.05;

/// Shared handle to a mesh
pub type MeshRef = Arc<dyn FvMesh>;

/// Geometry and addressing consumed by the discretisation
///
/// Internal faces are numbered in upper-triangular order: `owner[f] <
/// neighbour[f]` and owners non-decreasing. Face area vectors point from the
/// owner into the neighbour, and out of the domain on boundary patches.
pub trait FvMesh: Send + Sync + Debug {
    fn n_cells(&self) -> usize;

    fn n_internal_faces(&self) -> usize;

    fn owner(&self) -> &[usize];

    fn neighbour(&self) -> &[usize];

    fn cell_volumes(&self) -> &[f64];

    fn cell_centres(&self) -> &[Vector];

    /// Internal face area vectors `Sf`
    fn face_areas(&self) -> &[Vector];

    /// Internal face area magnitudes `|Sf|`
    fn face_mag_areas(&self) -> &[f64];

    fn face_centres(&self) -> &[Vector];

    /// Owner-side linear interpolation weight per internal face
    fn weights(&self) -> &[f64];

    /// `1/|d|` with `d` the owner-to-neighbour centre vector
    fn delta_coeffs(&self) -> &[f64];

    /// `1/(n·d)`, limited for strongly non-orthogonal faces
    fn non_orth_delta_coeffs(&self) -> &[f64];

    /// `n - d/(n·d)`, the part of the face normal not covered by `d`
    fn non_orth_correction_vectors(&self) -> &[Vector];

    fn patches(&self) -> &[Patch];

    /// Addressing shared by every matrix assembled on this mesh
    fn ldu_addressing(&self) -> &Arc<LduAddressing>;

    fn communicator(&self) -> &dyn Communicator {
        &SerialCommunicator
    }

    fn patch_index(&self, name: &str) -> Result<usize, FvmError> {
        self.patches()
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| FvmError::UnknownPatch(name.to_string()))
    }

    /// Global domain volume
    fn total_volume(&self) -> f64 {
        g_sum(self.communicator(), self.cell_volumes())
    }
}

/// Whether two handles refer to the same mesh object
pub fn same_mesh(a: &MeshRef, b: &MeshRef) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

/// An internal face given by its two cells and geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InternalFace {
    pub owner: usize,
    pub neighbour: usize,
    /// Area vector pointing from `owner` into `neighbour`
    pub area: Vector,
    pub centre: Vector,
}

/// A boundary face given by its cell and outward geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryFace {
    pub cell: usize,
    pub area: Vector,
    pub centre: Vector,
}

/// A named group of boundary faces
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub name: String,
    pub face_cells: Vec<usize>,
    pub face_areas: Vec<Vector>,
    pub face_mag_areas: Vec<f64>,
    pub face_centres: Vec<Vector>,
    /// `1/(n·(Cf - Co))` per face
    pub delta_coeffs: Vec<f64>,
}

impl Patch {
    /// Build a patch from its faces and the cell centres of the mesh
    pub fn new(
        name: impl Into<String>,
        faces: &[BoundaryFace],
        cell_centres: &[Vector],
    ) -> Result<Self, FvmError> {
        let name = name.into();
        let mut patch = Self {
            name,
            face_cells: Vec::with_capacity(faces.len()),
            face_areas: Vec::with_capacity(faces.len()),
            face_mag_areas: Vec::with_capacity(faces.len()),
            face_centres: Vec::with_capacity(faces.len()),
            delta_coeffs: Vec::with_capacity(faces.len()),
        };

        for face in faces {
            let centre = cell_centres.get(face.cell).ok_or_else(|| {
                FvmError::InvalidMesh(format!(
                    "patch {} references cell {} of {}",
                    patch.name,
                    face.cell,
                    cell_centres.len()
                ))
            })?;
            let mag = face.area.mag();
            if mag <= 0.0 {
                return Err(FvmError::InvalidMesh(format!(
                    "patch {} has a face with zero area",
                    patch.name
                )));
            }
            let d = face.centre - *centre;
            let n = face.area / mag;

            patch.face_cells.push(face.cell);
            patch.face_areas.push(face.area);
            patch.face_mag_areas.push(mag);
            patch.face_centres.push(face.centre);
            patch
                .delta_coeffs
                .push(1.0 / n.dot(&d).max(NON_ORTH_LIMIT * d.mag()));
        }

        Ok(patch)
    }

    pub fn size(&self) -> usize {
        self.face_cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.face_cells.is_empty()
    }
}

/// Polyhedral mesh stored as explicit cell and face arrays
#[derive(Debug, Clone)]
pub struct PolyMesh {
    cell_volumes: Vec<f64>,
    cell_centres: Vec<Vector>,
    owner: Vec<usize>,
    neighbour: Vec<usize>,
    face_areas: Vec<Vector>,
    face_mag_areas: Vec<f64>,
    face_centres: Vec<Vector>,
    weights: Vec<f64>,
    delta_coeffs: Vec<f64>,
    non_orth_delta_coeffs: Vec<f64>,
    non_orth_correction_vectors: Vec<Vector>,
    patches: Vec<Patch>,
    addressing: Arc<LduAddressing>,
}

impl PolyMesh {
    /// Build a mesh from cells, internal faces and boundary patches
    ///
    /// Faces may be given in any order and orientation; they are flipped so
    /// that the owner is the lower-numbered cell and sorted into
    /// upper-triangular order.
    pub fn new(
        cell_centres: Vec<Vector>,
        cell_volumes: Vec<f64>,
        faces: Vec<InternalFace>,
        boundary: Vec<(String, Vec<BoundaryFace>)>,
    ) -> Result<Self, FvmError> {
        let n_cells = cell_volumes.len();
        if cell_centres.len() != n_cells {
            return Err(FvmError::InvalidMesh(format!(
                "{} cell centres for {} cells",
                cell_centres.len(),
                n_cells
            )));
        }
        if let Some(c) = cell_volumes.iter().position(|&v| v <= 0.0) {
            return Err(FvmError::InvalidMesh(format!(
                "cell {c} has non-positive volume"
            )));
        }

        let mut faces: Vec<InternalFace> = faces
            .into_iter()
            .map(|f| {
                if f.owner > f.neighbour {
                    InternalFace {
                        owner: f.neighbour,
                        neighbour: f.owner,
                        area: -f.area,
                        centre: f.centre,
                    }
                } else {
                    f
                }
            })
            .collect();
        faces.sort_by_key(|f| (f.owner, f.neighbour));

        let n_faces = faces.len();
        let mut mesh = Self {
            cell_volumes,
            cell_centres,
            owner: Vec::with_capacity(n_faces),
            neighbour: Vec::with_capacity(n_faces),
            face_areas: Vec::with_capacity(n_faces),
            face_mag_areas: Vec::with_capacity(n_faces),
            face_centres: Vec::with_capacity(n_faces),
            weights: Vec::with_capacity(n_faces),
            delta_coeffs: Vec::with_capacity(n_faces),
            non_orth_delta_coeffs: Vec::with_capacity(n_faces),
            non_orth_correction_vectors: Vec::with_capacity(n_faces),
            patches: Vec::with_capacity(boundary.len()),
            addressing: Arc::new(LduAddressing::new(0, vec![], vec![], vec![])?),
        };

        for face in &faces {
            if face.neighbour >= n_cells || face.owner == face.neighbour {
                return Err(FvmError::InvalidMesh(format!(
                    "face between cells {} and {} with {} cells",
                    face.owner, face.neighbour, n_cells
                )));
            }
            mesh.push_internal_face(face)?;
        }

        for (name, patch_faces) in boundary {
            let patch = Patch::new(name, &patch_faces, &mesh.cell_centres)?;
            mesh.patches.push(patch);
        }

        let patch_addr = mesh.patches.iter().map(|p| p.face_cells.clone()).collect();
        mesh.addressing = Arc::new(LduAddressing::new(
            n_cells,
            mesh.owner.clone(),
            mesh.neighbour.clone(),
            patch_addr,
        )?);

        log::debug!(
            "PolyMesh: {} cells, {} internal faces, {} patches",
            n_cells,
            n_faces,
            mesh.patches.len()
        );

        Ok(mesh)
    }

    fn push_internal_face(&mut self, face: &InternalFace) -> Result<(), FvmError> {
        let co = self.cell_centres[face.owner];
        let cn = self.cell_centres[face.neighbour];
        let mag = face.area.mag();
        if mag <= 0.0 {
            return Err(FvmError::InvalidMesh(format!(
                "face between cells {} and {} has zero area",
                face.owner, face.neighbour
            )));
        }
        let n = face.area / mag;
        let d = cn - co;

        let sfd_own = face.area.dot(&(face.centre - co)).abs();
        let sfd_nei = face.area.dot(&(cn - face.centre)).abs();
        let weight = if sfd_own + sfd_nei > 0.0 {
            sfd_nei / (sfd_own + sfd_nei)
        } else {
            0.5
        };

        let non_orth_delta = 1.0 / n.dot(&d).max(NON_ORTH_LIMIT * d.mag());

        self.owner.push(face.owner);
        self.neighbour.push(face.neighbour);
        self.face_areas.push(face.area);
        self.face_mag_areas.push(mag);
        self.face_centres.push(face.centre);
        self.weights.push(weight);
        self.delta_coeffs.push(1.0 / d.mag());
        self.non_orth_delta_coeffs.push(non_orth_delta);
        self.non_orth_correction_vectors.push(n - d * non_orth_delta);
        Ok(())
    }
}

impl FvMesh for PolyMesh {
    fn n_cells(&self) -> usize {
        self.cell_volumes.len()
    }

    fn n_internal_faces(&self) -> usize {
        self.owner.len()
    }

    fn owner(&self) -> &[usize] {
        &self.owner
    }

    fn neighbour(&self) -> &[usize] {
        &self.neighbour
    }

    fn cell_volumes(&self) -> &[f64] {
        &self.cell_volumes
    }

    fn cell_centres(&self) -> &[Vector] {
        &self.cell_centres
    }

    fn face_areas(&self) -> &[Vector] {
        &self.face_areas
    }

    fn face_mag_areas(&self) -> &[f64] {
        &self.face_mag_areas
    }

    fn face_centres(&self) -> &[Vector] {
        &self.face_centres
    }

    fn weights(&self) -> &[f64] {
        &self.weights
    }

    fn delta_coeffs(&self) -> &[f64] {
        &self.delta_coeffs
    }

    fn non_orth_delta_coeffs(&self) -> &[f64] {
        &self.non_orth_delta_coeffs
    }

    fn non_orth_correction_vectors(&self) -> &[Vector] {
        &self.non_orth_correction_vectors
    }

    fn patches(&self) -> &[Patch] {
        &self.patches
    }

    fn ldu_addressing(&self) -> &Arc<LduAddressing> {
        &self.addressing
    }
}
