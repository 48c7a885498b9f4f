//! Cell-centred fields

use super::patch::PatchField;
use crate::error::{FvmError, check_size};
use crate::mesh::{MeshRef, same_mesh};
use vector_space::{DimensionSet, FieldType};

/// One value per cell plus one patch field per boundary patch
///
/// A field optionally keeps the values of the two previous time levels (for
/// time derivatives) and of the previous outer iteration (for relaxation).
#[derive(Debug, Clone)]
pub struct VolField<T: FieldType> {
    name: String,
    dimensions: DimensionSet,
    mesh: MeshRef,
    internal: Vec<T>,
    boundary: Vec<PatchField<T>>,
    old_time: Option<Box<VolField<T>>>,
    prev_iter: Option<Vec<T>>,
}

impl<T: FieldType> VolField<T> {
    /// Field from explicit cell values and patch fields, evaluated once
    pub fn new(
        name: impl Into<String>,
        mesh: MeshRef,
        dimensions: DimensionSet,
        internal: Vec<T>,
        boundary: Vec<PatchField<T>>,
    ) -> Result<Self, FvmError> {
        let name = name.into();
        check_size(&format!("{name} cells"), mesh.n_cells(), internal.len())?;
        check_size(&format!("{name} patches"), mesh.patches().len(), boundary.len())?;
        for (patch, field) in mesh.patches().iter().zip(&boundary) {
            check_size(&format!("{name} patch {}", patch.name), patch.size(), field.size())?;
        }

        let mut field = Self {
            name,
            dimensions,
            mesh,
            internal,
            boundary,
            old_time: None,
            prev_iter: None,
        };
        field.correct_boundary_conditions();
        Ok(field)
    }

    /// Uniform field with zero-gradient patches
    pub fn uniform(
        name: impl Into<String>,
        mesh: MeshRef,
        dimensions: DimensionSet,
        value: T,
    ) -> Self {
        let n_cells = mesh.n_cells();
        Self::extrapolated(name, mesh, dimensions, vec![value; n_cells])
    }

    /// Derived field with extrapolated (zero-gradient) patches; `internal`
    /// must have one value per cell
    pub(crate) fn extrapolated(
        name: impl Into<String>,
        mesh: MeshRef,
        dimensions: DimensionSet,
        internal: Vec<T>,
    ) -> Self {
        debug_assert_eq!(internal.len(), mesh.n_cells());
        let boundary = mesh
            .patches()
            .iter()
            .map(|p| PatchField::zero_gradient(p.size()))
            .collect();
        let mut field = Self {
            name: name.into(),
            dimensions,
            mesh,
            internal,
            boundary,
            old_time: None,
            prev_iter: None,
        };
        field.correct_boundary_conditions();
        field
    }

    /// Builder form of [`Self::set_patch_field`]
    pub fn with_patch(mut self, patch: &str, field: PatchField<T>) -> Result<Self, FvmError> {
        self.set_patch_field(patch, field)?;
        Ok(self)
    }

    /// Replace the condition on a named patch
    pub fn set_patch_field(&mut self, patch: &str, field: PatchField<T>) -> Result<(), FvmError> {
        let index = self.mesh.patch_index(patch)?;
        check_size(
            &format!("{} patch {patch}", self.name),
            self.mesh.patches()[index].size(),
            field.size(),
        )?;
        self.boundary[index] = field;
        self.evaluate_patch(index);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
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

    pub fn boundary(&self) -> &[PatchField<T>] {
        &self.boundary
    }

    pub fn boundary_mut(&mut self) -> &mut [PatchField<T>] {
        &mut self.boundary
    }

    pub fn size(&self) -> usize {
        self.internal.len()
    }

    /// Whether both fields live on the same mesh and carry the same name
    pub fn same_field(&self, other: &VolField<T>) -> bool {
        self.name == other.name && same_mesh(&self.mesh, &other.mesh)
    }

    /// Values of the cells adjacent to a patch
    pub fn patch_internal_values(&self, patch: usize) -> Vec<T> {
        self.mesh.patches()[patch]
            .face_cells
            .iter()
            .map(|&c| self.internal[c])
            .collect()
    }

    fn evaluate_patch(&mut self, patch: usize) {
        let internal = self.patch_internal_values(patch);
        let delta = &self.mesh.patches()[patch].delta_coeffs;
        self.boundary[patch].evaluate(&internal, delta);
    }

    /// Re-evaluate every patch from the current cell values
    pub fn correct_boundary_conditions(&mut self) {
        for patch in 0..self.boundary.len() {
            self.evaluate_patch(patch);
        }
    }

    /// Single component of every cell value
    pub fn component(&self, d: usize) -> Vec<f64> {
        self.internal.iter().map(|v| v.component(d)).collect()
    }

    /// Overwrite a single component of every cell value
    pub fn replace_component(&mut self, d: usize, values: &[f64]) -> Result<(), FvmError> {
        check_size(&format!("{} component", self.name), self.size(), values.len())?;
        for (v, &c) in self.internal.iter_mut().zip(values) {
            v.set_component(d, c);
        }
        Ok(())
    }

    fn current_level(&self) -> Self {
        Self {
            name: self.name.clone(),
            dimensions: self.dimensions,
            mesh: self.mesh.clone(),
            internal: self.internal.clone(),
            boundary: self.boundary.clone(),
            old_time: None,
            prev_iter: None,
        }
    }

    /// Shift the stored time levels: old-old ← old, old ← current
    ///
    /// Call once at the start of every time step.
    pub fn store_old_time(&mut self) {
        let previous = self.old_time.take().map(|mut old| {
            old.old_time = None;
            old
        });
        let mut old = self.current_level();
        old.old_time = previous;
        self.old_time = Some(Box::new(old));
    }

    pub fn old_time(&self) -> Result<&VolField<T>, FvmError> {
        self.old_time
            .as_deref()
            .ok_or_else(|| FvmError::MissingOldTime(self.name.clone()))
    }

    pub fn old_old_time(&self) -> Option<&VolField<T>> {
        self.old_time.as_deref().and_then(|old| old.old_time.as_deref())
    }

    /// Number of stored previous time levels (0, 1 or 2)
    pub fn n_old_times(&self) -> usize {
        match self.old_time.as_deref() {
            None => 0,
            Some(old) if old.old_time.is_some() => 2,
            Some(_) => 1,
        }
    }

    /// Remember the current values for a later [`Self::relax`]
    pub fn store_prev_iter(&mut self) {
        self.prev_iter = Some(self.internal.clone());
    }

    pub fn prev_iter(&self) -> Result<&[T], FvmError> {
        self.prev_iter
            .as_deref()
            .ok_or_else(|| FvmError::MissingPrevIter(self.name.clone()))
    }

    /// Explicit under-relaxation `ψ = ψ_prev + α (ψ - ψ_prev)`
    pub fn relax(&mut self, alpha: f64) -> Result<(), FvmError> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(FvmError::InvalidRelaxationFactor {
                field: self.name.clone(),
                factor: alpha,
            });
        }
        let prev = self
            .prev_iter
            .as_ref()
            .ok_or_else(|| FvmError::MissingPrevIter(self.name.clone()))?;
        for (v, &p) in self.internal.iter_mut().zip(prev) {
            *v = p + (*v - p) * alpha;
        }
        self.correct_boundary_conditions();
        Ok(())
    }

    /// Whether the level of an elliptic equation for this field is free,
    /// i.e. no patch on any partition fixes a value
    pub fn needs_reference(&self) -> bool {
        let fixes = self.boundary.iter().any(PatchField::fixes_value);
        !self.mesh.communicator().any(fixes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::line_mesh;
    use approx::assert_relative_eq;
    use std::sync::Arc;
    use vector_space::{Vector, si};

    fn mesh() -> MeshRef {
        Arc::new(line_mesh(3, 3.0).unwrap())
    }

    #[test]
    fn test_uniform_and_patch_update() {
        let t = VolField::uniform("T", mesh(), si::TEMPERATURE, 1.0)
            .with_patch("right", PatchField::fixed_value(vec![4.0]))
            .unwrap();
        assert_eq!(t.boundary()[0].type_name(), "zeroGradient");
        assert_relative_eq!(t.boundary()[0].values()[0], 1.0);
        assert_relative_eq!(t.boundary()[1].values()[0], 4.0);
        assert!(!t.needs_reference());

        let p = VolField::uniform("p", mesh(), si::PRESSURE, 0.0);
        assert!(p.needs_reference());
    }

    #[test]
    fn test_size_checks() {
        let m = mesh();
        let bad = VolField::<f64>::new("T", m.clone(), si::DIMLESS, vec![0.0; 2], vec![]);
        assert!(matches!(bad, Err(FvmError::SizeMismatch { .. })));

        let mut t = VolField::uniform("T", m, si::DIMLESS, 0.0);
        assert!(t.set_patch_field("left", PatchField::fixed_value(vec![1.0, 2.0])).is_err());
        assert!(matches!(
            t.set_patch_field("inlet", PatchField::fixed_value(vec![1.0])),
            Err(FvmError::UnknownPatch(_))
        ));
    }

    #[test]
    fn test_old_time_levels() {
        let mut t = VolField::uniform("T", mesh(), si::DIMLESS, 1.0);
        assert!(matches!(t.old_time(), Err(FvmError::MissingOldTime(_))));

        t.store_old_time();
        t.internal_mut()[0] = 2.0;
        t.store_old_time();
        t.internal_mut()[0] = 3.0;
        t.store_old_time();

        assert_eq!(t.n_old_times(), 2);
        assert_relative_eq!(t.old_time().unwrap().internal()[0], 3.0);
        assert_relative_eq!(t.old_old_time().unwrap().internal()[0], 2.0);
        assert!(t.old_old_time().unwrap().old_old_time().is_none());
    }

    #[test]
    fn test_relax() {
        let mut u = VolField::uniform("U", mesh(), si::VELOCITY, Vector::new(1.0, 0.0, 0.0));
        assert!(matches!(u.relax(0.5), Err(FvmError::MissingPrevIter(_))));

        u.store_prev_iter();
        u.internal_mut()[1] = Vector::new(3.0, 2.0, 0.0);
        u.relax(0.5).unwrap();
        assert_relative_eq!(u.internal()[1].x(), 2.0);
        assert_relative_eq!(u.internal()[1].y(), 1.0);

        assert!(matches!(
            u.relax(1.5),
            Err(FvmError::InvalidRelaxationFactor { .. })
        ));
    }

    #[test]
    fn test_component_access() {
        let mut u = VolField::uniform("U", mesh(), si::VELOCITY, Vector::new(1.0, 2.0, 3.0));
        assert_eq!(u.component(1), vec![2.0; 3]);
        u.replace_component(2, &[0.0, 1.0, 2.0]).unwrap();
        assert_relative_eq!(u.internal()[2].z(), 2.0);
    }
}
