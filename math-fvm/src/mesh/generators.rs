//! Structured mesh generators
//!
//! Both generators produce hexahedral cells on an axis-aligned box, so every
//! face is orthogonal and the linear weights are exactly one half.

use super::types::{BoundaryFace, InternalFace, PolyMesh};
use crate::error::FvmError;
use vector_space::Vector;

/// 1-D chain of `n` cells along x, with unit cross-section area
///
/// Patches: `left` (x = 0) and `right` (x = `length`).
pub fn line_mesh(n: usize, length: f64) -> Result<PolyMesh, FvmError> {
    box_mesh([n, 1, 1], [length, 1.0, 1.0]).and_then(|mesh| {
        // Collapse the four lateral patches; they carry no flux in 1-D
        keep_patches(mesh, &[("xMin", "left"), ("xMax", "right")])
    })
}

/// `nx × ny × nz` hexahedra covering `[0, lx] × [0, ly] × [0, lz]`
///
/// Cells are numbered x-fastest. Patches: `xMin`, `xMax`, `yMin`, `yMax`,
/// `zMin`, `zMax`.
pub fn box_mesh(divisions: [usize; 3], lengths: [f64; 3]) -> Result<PolyMesh, FvmError> {
    let [nx, ny, nz] = divisions;
    if nx == 0 || ny == 0 || nz == 0 {
        return Err(FvmError::InvalidMesh(format!(
            "box mesh needs at least one cell per direction, got {nx}x{ny}x{nz}"
        )));
    }
    if lengths.iter().any(|&l| l <= 0.0) {
        return Err(FvmError::InvalidMesh(format!(
            "box mesh lengths must be positive, got {lengths:?}"
        )));
    }

    let h = [
        lengths[0] / nx as f64,
        lengths[1] / ny as f64,
        lengths[2] / nz as f64,
    ];
    let face_area = [h[1] * h[2], h[0] * h[2], h[0] * h[1]];
    let cell = |i: usize, j: usize, k: usize| i + nx * (j + ny * k);
    let centre = |i: usize, j: usize, k: usize| {
        Vector::new(
            (i as f64 + 0.5) * h[0],
            (j as f64 + 0.5) * h[1],
            (k as f64 + 0.5) * h[2],
        )
    };

    let n_cells = nx * ny * nz;
    let mut centres = vec![Vector::ZERO; n_cells];
    let mut faces = Vec::new();
    let mut boundary: Vec<(String, Vec<BoundaryFace>)> =
        ["xMin", "xMax", "yMin", "yMax", "zMin", "zMax"]
            .iter()
            .map(|name| (name.to_string(), Vec::new()))
            .collect();

    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let c = cell(i, j, k);
                let cc = centre(i, j, k);
                centres[c] = cc;

                let ijk = [i, j, k];
                for dir in 0..3 {
                    let mut unit = Vector::ZERO;
                    unit[dir] = 1.0;
                    let area = unit * face_area[dir];
                    let offset = unit * (0.5 * h[dir]);

                    if ijk[dir] + 1 < divisions[dir] {
                        let mut next = ijk;
                        next[dir] += 1;
                        faces.push(InternalFace {
                            owner: c,
                            neighbour: cell(next[0], next[1], next[2]),
                            area,
                            centre: cc + offset,
                        });
                    } else {
                        boundary[2 * dir + 1].1.push(BoundaryFace {
                            cell: c,
                            area,
                            centre: cc + offset,
                        });
                    }

                    if ijk[dir] == 0 {
                        boundary[2 * dir].1.push(BoundaryFace {
                            cell: c,
                            area: -area,
                            centre: cc - offset,
                        });
                    }
                }
            }
        }
    }

    let volume = h[0] * h[1] * h[2];
    PolyMesh::new(centres, vec![volume; n_cells], faces, boundary)
}

fn keep_patches(mesh: PolyMesh, renames: &[(&str, &str)]) -> Result<PolyMesh, FvmError> {
    use super::types::FvMesh;

    let mut boundary = Vec::with_capacity(renames.len());
    for &(from, to) in renames {
        let patch = &mesh.patches()[mesh.patch_index(from)?];
        let faces = (0..patch.size())
            .map(|f| BoundaryFace {
                cell: patch.face_cells[f],
                area: patch.face_areas[f],
                centre: patch.face_centres[f],
            })
            .collect();
        boundary.push((to.to_string(), faces));
    }

    let faces = (0..mesh.n_internal_faces())
        .map(|f| InternalFace {
            owner: mesh.owner()[f],
            neighbour: mesh.neighbour()[f],
            area: mesh.face_areas()[f],
            centre: mesh.face_centres()[f],
        })
        .collect();

    PolyMesh::new(
        mesh.cell_centres().to_vec(),
        mesh.cell_volumes().to_vec(),
        faces,
        boundary,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::FvMesh;
    use approx::assert_relative_eq;

    #[test]
    fn test_line_mesh() {
        let mesh = line_mesh(4, 2.0).unwrap();
        assert_eq!(mesh.n_cells(), 4);
        assert_eq!(mesh.n_internal_faces(), 3);
        assert_eq!(mesh.patches().len(), 2);
        assert_eq!(mesh.patches()[0].name, "left");
        assert_eq!(mesh.patches()[0].face_cells, vec![0]);
        assert_eq!(mesh.patches()[1].face_cells, vec![3]);
        assert_relative_eq!(mesh.patches()[0].face_areas[0].x(), -1.0);
        assert_relative_eq!(mesh.delta_coeffs()[0], 2.0);
        assert_relative_eq!(mesh.patches()[1].delta_coeffs[0], 4.0);
        assert_relative_eq!(mesh.total_volume(), 2.0);
    }

    #[test]
    fn test_box_mesh_counts_and_closure() {
        let mesh = box_mesh([3, 2, 2], [3.0, 1.0, 1.0]).unwrap();
        assert_eq!(mesh.n_cells(), 12);
        // (nx-1) ny nz + nx (ny-1) nz + nx ny (nz-1)
        assert_eq!(mesh.n_internal_faces(), 8 + 6 + 6);
        assert_eq!(mesh.patches().len(), 6);
        assert_eq!(mesh.patches()[mesh.patch_index("xMax").unwrap()].size(), 4);

        // Every cell is closed: face area vectors sum to zero
        let mut sum = vec![Vector::ZERO; mesh.n_cells()];
        for f in 0..mesh.n_internal_faces() {
            sum[mesh.owner()[f]] += mesh.face_areas()[f];
            sum[mesh.neighbour()[f]] -= mesh.face_areas()[f];
        }
        for patch in mesh.patches() {
            for (c, sf) in patch.face_cells.iter().zip(&patch.face_areas) {
                sum[*c] += *sf;
            }
        }
        for s in sum {
            assert_relative_eq!(s.mag(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_box_mesh_rejects_empty() {
        assert!(box_mesh([0, 1, 1], [1.0, 1.0, 1.0]).is_err());
        assert!(line_mesh(2, -1.0).is_err());
    }
}
