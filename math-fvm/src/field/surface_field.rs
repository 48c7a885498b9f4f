//! Face-centred fields

use crate::error::{FvmError, check_size};
use crate::mesh::MeshRef;
use vector_space::{DimensionSet, FieldType};

/// One value per internal face plus one value per boundary face
#[derive(Debug, Clone)]
pub struct SurfaceField<T: FieldType> {
    name: String,
    dimensions: DimensionSet,
    mesh: MeshRef,
    internal: Vec<T>,
    boundary: Vec<Vec<T>>,
}

impl<T: FieldType> SurfaceField<T> {
    pub fn new(
        name: impl Into<String>,
        mesh: MeshRef,
        dimensions: DimensionSet,
        internal: Vec<T>,
        boundary: Vec<Vec<T>>,
    ) -> Result<Self, FvmError> {
        let name = name.into();
        check_size(&format!("{name} faces"), mesh.n_internal_faces(), internal.len())?;
        check_size(&format!("{name} patches"), mesh.patches().len(), boundary.len())?;
        for (patch, values) in mesh.patches().iter().zip(&boundary) {
            check_size(&format!("{name} patch {}", patch.name), patch.size(), values.len())?;
        }
        Ok(Self {
            name,
            dimensions,
            mesh,
            internal,
            boundary,
        })
    }

    /// Field from values already sized to the mesh
    pub(crate) fn from_parts(
        name: impl Into<String>,
        mesh: MeshRef,
        dimensions: DimensionSet,
        internal: Vec<T>,
        boundary: Vec<Vec<T>>,
    ) -> Self {
        debug_assert_eq!(internal.len(), mesh.n_internal_faces());
        Self {
            name: name.into(),
            dimensions,
            mesh,
            internal,
            boundary,
        }
    }

    pub fn uniform(
        name: impl Into<String>,
        mesh: MeshRef,
        dimensions: DimensionSet,
        value: T,
    ) -> Self {
        let boundary = mesh
            .patches()
            .iter()
            .map(|p| vec![value; p.size()])
            .collect();
        Self {
            name: name.into(),
            dimensions,
            internal: vec![value; mesh.n_internal_faces()],
            mesh,
            boundary,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimensions(&self) -> DimensionSet {
        self.dimensions
    }

    pub fn mesh(&self) -> &MeshRef {
        &self.mesh
    }

    pub fn internal(&self) -> &[T] {
        &self.internal
    }

    pub fn internal_mut(&mut self) -> &mut [T] {
        &mut self.internal
    }

    pub fn boundary(&self) -> &[Vec<T>] {
        &self.boundary
    }

    pub fn boundary_mut(&mut self) -> &mut [Vec<T>] {
        &mut self.boundary
    }

    /// Face-wise `self += other`
    pub fn add_assign(&mut self, other: &SurfaceField<T>) -> Result<(), FvmError> {
        self.dimensions
            .check_equal(&other.dimensions, &format!("{} + {}", self.name, other.name))?;
        for (a, &b) in self.internal.iter_mut().zip(&other.internal) {
            *a += b;
        }
        for (pa, pb) in self.boundary.iter_mut().zip(&other.boundary) {
            for (a, &b) in pa.iter_mut().zip(pb) {
                *a += b;
            }
        }
        Ok(())
    }

    /// Face-wise product with a scalar surface field
    pub fn scaled_by(&self, s: &SurfaceField<f64>) -> SurfaceField<T> {
        SurfaceField {
            name: format!("{}*{}", s.name, self.name),
            dimensions: self.dimensions * s.dimensions,
            mesh: self.mesh.clone(),
            internal: self
                .internal
                .iter()
                .zip(&s.internal)
                .map(|(&v, &c)| v * c)
                .collect(),
            boundary: self
                .boundary
                .iter()
                .zip(&s.boundary)
                .map(|(pv, pc)| pv.iter().zip(pc).map(|(&v, &c)| v * c).collect())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::line_mesh;
    use approx::assert_relative_eq;
    use std::sync::Arc;
    use vector_space::si;

    #[test]
    fn test_add_and_scale() {
        let mesh: MeshRef = Arc::new(line_mesh(3, 3.0).unwrap());
        let mut phi = SurfaceField::uniform("phi", mesh.clone(), si::VOLUMETRIC_FLUX, 1.0);
        let other = SurfaceField::uniform("phi0", mesh.clone(), si::VOLUMETRIC_FLUX, 2.0);
        phi.add_assign(&other).unwrap();
        assert_relative_eq!(phi.internal()[1], 3.0);
        assert_relative_eq!(phi.boundary()[1][0], 3.0);

        let gamma = SurfaceField::uniform("gamma", mesh.clone(), si::DIMLESS, 0.5);
        let scaled = phi.scaled_by(&gamma);
        assert_relative_eq!(scaled.internal()[0], 1.5);
        assert_eq!(scaled.name(), "gamma*phi");

        let wrong = SurfaceField::uniform("U", mesh.clone(), si::VELOCITY, 1.0);
        assert!(phi.add_assign(&wrong).is_err());

        let bad = SurfaceField::<f64>::new("phi", mesh, si::DIMLESS, vec![0.0], vec![]);
        assert!(matches!(bad, Err(FvmError::SizeMismatch { .. })));
    }
}
