//! Combination, scaling, relaxation and reference pinning

use super::{FvMatrix, MatrixState};
use crate::error::{FvmError, check_size};
use crate::field::VolField;
use log::warn;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use vector_space::{DimensionSet, Dimensioned, FieldType, ZeroField, si};

impl<T: FieldType> FvMatrix<T> {
    fn check_combinable(&self, other: &FvMatrix<T>, op: &str) -> Result<(), FvmError> {
        if self.field != other.field || !crate::mesh::same_mesh(&self.mesh, &other.mesh) {
            return Err(FvmError::FieldMismatch {
                lhs: self.field.clone(),
                rhs: other.field.clone(),
            });
        }
        self.dimensions.check_equal(
            &other.dimensions,
            &format!("fvMatrix<{}> {op} for {}", T::TYPE_NAME, self.field),
        )?;
        for matrix in [self, other] {
            if !matches!(matrix.state, MatrixState::Empty | MatrixState::Assembling) {
                return Err(matrix.invalid_transition("combine"));
            }
        }
        Ok(())
    }

    fn combine(&mut self, other: &FvMatrix<T>, sign: f64) -> Result<(), FvmError> {
        if sign > 0.0 {
            self.ldu.add_matrix(&other.ldu)?;
        } else {
            self.ldu.sub_matrix(&other.ldu)?;
        }
        for (s, &o) in self.source.iter_mut().zip(&other.source) {
            *s += o * sign;
        }
        for (mine, theirs) in self.internal_coeffs.iter_mut().zip(&other.internal_coeffs) {
            for (a, &b) in mine.iter_mut().zip(theirs) {
                *a += sign * b;
            }
        }
        for (mine, theirs) in self.boundary_coeffs.iter_mut().zip(&other.boundary_coeffs) {
            for (a, &b) in mine.iter_mut().zip(theirs) {
                *a += b * sign;
            }
        }
        if let Some(correction) = &other.face_flux_correction {
            let mut correction = correction.clone();
            if sign < 0.0 {
                correction.internal_mut().iter_mut().for_each(|v| *v = -*v);
                for patch in correction.boundary_mut() {
                    patch.iter_mut().for_each(|v| *v = -*v);
                }
            }
            match &mut self.face_flux_correction {
                Some(mine) => mine.add_assign(&correction)?,
                None => self.face_flux_correction = Some(correction),
            }
        }
        self.state = MatrixState::Assembling;
        Ok(())
    }

    /// `self += other`; both must be for the same field with equal dimensions
    pub fn try_add(&mut self, other: &FvMatrix<T>) -> Result<(), FvmError> {
        self.check_combinable(other, "+=")?;
        self.combine(other, 1.0)
    }

    /// `self -= other`
    pub fn try_sub(&mut self, other: &FvMatrix<T>) -> Result<(), FvmError> {
        self.check_combinable(other, "-=")?;
        self.combine(other, -1.0)
    }

    fn check_source_dims(
        &self,
        dimensions: &DimensionSet,
        name: &str,
        op: &str,
    ) -> Result<(), FvmError> {
        (*dimensions * si::VOLUME).check_equal(
            &self.dimensions,
            &format!("fvMatrix<{}> {op} {name} for {}", T::TYPE_NAME, self.field),
        )?;
        if self.state == MatrixState::Solved {
            return Err(self.invalid_transition("add a source to"));
        }
        Ok(())
    }

    fn add_cell_source(&mut self, values: &[T], sign: f64) {
        let volumes = self.mesh.cell_volumes();
        for ((s, &v), &vol) in self.source.iter_mut().zip(values).zip(volumes) {
            *s -= v * (sign * vol);
        }
        if self.state == MatrixState::Empty {
            self.state = MatrixState::Assembling;
        }
    }

    /// Add the explicit term `su`: `source -= V su`
    ///
    /// Explicit sources may still be added after relaxation.
    pub fn try_add_field(&mut self, su: &VolField<T>) -> Result<(), FvmError> {
        check_size(&format!("source {}", su.name()), self.source.len(), su.size())?;
        self.check_source_dims(&su.dimensions(), su.name(), "+")?;
        self.add_cell_source(su.internal(), 1.0);
        Ok(())
    }

    /// Subtract the explicit term `su`; `A - su` is the equation `A == su`
    pub fn try_sub_field(&mut self, su: &VolField<T>) -> Result<(), FvmError> {
        check_size(&format!("source {}", su.name()), self.source.len(), su.size())?;
        self.check_source_dims(&su.dimensions(), su.name(), "-")?;
        self.add_cell_source(su.internal(), -1.0);
        Ok(())
    }

    /// Add a uniform dimensioned source term
    pub fn try_add_dimensioned(&mut self, su: &Dimensioned<T>) -> Result<(), FvmError> {
        self.check_source_dims(&su.dimensions, &su.name, "+")?;
        let values = vec![su.value; self.source.len()];
        self.add_cell_source(&values, 1.0);
        Ok(())
    }

    /// Subtract a uniform dimensioned source term
    pub fn try_sub_dimensioned(&mut self, su: &Dimensioned<T>) -> Result<(), FvmError> {
        self.check_source_dims(&su.dimensions, &su.name, "-")?;
        let values = vec![su.value; self.source.len()];
        self.add_cell_source(&values, -1.0);
        Ok(())
    }

    /// Flip the sign of every coefficient
    pub fn negate(&mut self) {
        self.scale_coefficients(-1.0);
    }

    fn scale_coefficients(&mut self, s: f64) {
        self.ldu.scale(s);
        self.source.iter_mut().for_each(|v| *v *= s);
        for coeffs in &mut self.internal_coeffs {
            coeffs.iter_mut().for_each(|c| *c *= s);
        }
        for coeffs in &mut self.boundary_coeffs {
            coeffs.iter_mut().for_each(|c| *c *= s);
        }
        if let Some(correction) = &mut self.face_flux_correction {
            correction.internal_mut().iter_mut().for_each(|v| *v *= s);
            for patch in correction.boundary_mut() {
                patch.iter_mut().for_each(|v| *v *= s);
            }
        }
    }

    /// Multiply the whole equation by a dimensioned constant
    pub fn scale(&mut self, s: &Dimensioned<f64>) -> Result<(), FvmError> {
        if !matches!(self.state, MatrixState::Empty | MatrixState::Assembling) {
            return Err(self.invalid_transition("scale"));
        }
        self.scale_coefficients(s.value);
        self.dimensions = self.dimensions * s.dimensions;
        Ok(())
    }

    /// Multiply each row by the value of a scalar cell field
    ///
    /// Not available once a face-flux correction is stored, since a face
    /// flux has no single row to take the factor from.
    pub fn scale_by_field(&mut self, s: &VolField<f64>) -> Result<(), FvmError> {
        if !matches!(self.state, MatrixState::Empty | MatrixState::Assembling) {
            return Err(self.invalid_transition("scale"));
        }
        if self.face_flux_correction.is_some() {
            return Err(self.invalid_transition("row-scale a flux-corrected"));
        }
        check_size(&format!("scale {}", s.name()), self.source.len(), s.size())?;

        let factors = s.internal();
        self.ldu.scale_rows(factors)?;
        for (v, &f) in self.source.iter_mut().zip(factors) {
            *v *= f;
        }
        let mesh = self.mesh.clone();
        for (p, patch) in mesh.patches().iter().enumerate() {
            for (face, &c) in patch.face_cells.iter().enumerate() {
                self.internal_coeffs[p][face] *= factors[c];
                self.boundary_coeffs[p][face] *= factors[c];
            }
        }
        self.dimensions = self.dimensions * s.dimensions();
        Ok(())
    }

    /// Implicit under-relaxation with factor `alpha` in `(0, 1]`
    ///
    /// The diagonal (including boundary contributions) is first made at least
    /// diagonally dominant, then divided by `alpha`; the change in diagonal
    /// times the current `psi` is added to the source. A converged `psi`
    /// therefore still satisfies the relaxed equation. Intended for equations
    /// with a positive diagonal.
    pub fn relax(&mut self, psi: &VolField<T>, alpha: f64) -> Result<(), FvmError> {
        self.check_field(psi)?;
        match self.state {
            MatrixState::Assembling => {}
            MatrixState::Relaxed => {
                warn!(
                    "Relaxing the equation for {} a second time; damping compounds",
                    self.field
                );
            }
            _ => return Err(self.invalid_transition("relax")),
        }
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(FvmError::InvalidRelaxationFactor {
                field: self.field.clone(),
                factor: alpha,
            });
        }

        let d0 = self.ldu.diag().to_vec();
        let sum_off = self.ldu.sum_mag_off_diag();
        let mesh = self.mesh.clone();

        let diag = self.ldu.diag_mut();
        for (patch, coeffs) in mesh.patches().iter().zip(&self.internal_coeffs) {
            for (&c, &ic) in patch.face_cells.iter().zip(coeffs) {
                diag[c] += ic.abs();
            }
        }
        for (d, &off) in diag.iter_mut().zip(&sum_off) {
            *d = d.abs().max(off) / alpha;
        }
        for (patch, coeffs) in mesh.patches().iter().zip(&self.internal_coeffs) {
            for (&c, &ic) in patch.face_cells.iter().zip(coeffs) {
                diag[c] -= ic;
            }
        }

        for (c, s) in self.source.iter_mut().enumerate() {
            *s += psi.internal()[c] * (diag[c] - d0[c]);
        }

        self.relaxed = true;
        self.state = MatrixState::Relaxed;
        Ok(())
    }

    /// Pin the value of `psi` in `cell` for an equation whose solution is
    /// otherwise only defined up to a constant
    ///
    /// The pin doubles the cell's diagonal and adds `diag * value` to its
    /// source. It is skipped, with a warning, when some boundary already fixes
    /// the level of `psi`, and can be applied at most once per matrix.
    pub fn set_reference(
        &mut self,
        psi: &VolField<T>,
        cell: usize,
        value: T,
    ) -> Result<(), FvmError> {
        self.check_field(psi)?;
        if let Some(previous) = self.reference_cell {
            return Err(FvmError::ReferenceAlreadySet {
                field: self.field.clone(),
                cell: previous,
            });
        }
        if !matches!(self.state, MatrixState::Assembling | MatrixState::Relaxed) {
            return Err(self.invalid_transition("set the reference of"));
        }
        let n_cells = self.source.len();
        if cell >= n_cells {
            return Err(FvmError::InvalidCell { cell, n_cells });
        }
        if !psi.needs_reference() {
            warn!(
                "{} does not need a reference level; ignoring reference cell {}",
                self.field, cell
            );
            return Ok(());
        }

        let diag = self.ldu.diag()[cell];
        self.source[cell] += value * diag;
        self.ldu.diag_mut()[cell] += diag;
        self.reference_cell = Some(cell);
        self.state = MatrixState::ReferenceConstrained;
        Ok(())
    }

    /// Return a solved matrix to the state it had before solving
    pub fn reset_state(&mut self) {
        if self.state == MatrixState::Solved {
            self.state = if self.reference_cell.is_some() {
                MatrixState::ReferenceConstrained
            } else if self.relaxed {
                MatrixState::Relaxed
            } else {
                MatrixState::Assembling
            };
        }
    }
}

impl<T: FieldType> AddAssign for FvMatrix<T> {
    fn add_assign(&mut self, rhs: FvMatrix<T>) {
        if let Err(e) = self.try_add(&rhs) {
            panic!("{e}");
        }
    }
}

impl<T: FieldType> SubAssign for FvMatrix<T> {
    fn sub_assign(&mut self, rhs: FvMatrix<T>) {
        if let Err(e) = self.try_sub(&rhs) {
            panic!("{e}");
        }
    }
}

impl<T: FieldType> Add for FvMatrix<T> {
    type Output = FvMatrix<T>;

    fn add(mut self, rhs: FvMatrix<T>) -> FvMatrix<T> {
        self += rhs;
        self
    }
}

impl<T: FieldType> Sub for FvMatrix<T> {
    type Output = FvMatrix<T>;

    fn sub(mut self, rhs: FvMatrix<T>) -> FvMatrix<T> {
        self -= rhs;
        self
    }
}

impl<T: FieldType> Neg for FvMatrix<T> {
    type Output = FvMatrix<T>;

    fn neg(mut self) -> FvMatrix<T> {
        self.negate();
        self
    }
}

impl<T: FieldType> Add<&VolField<T>> for FvMatrix<T> {
    type Output = FvMatrix<T>;

    fn add(mut self, su: &VolField<T>) -> FvMatrix<T> {
        if let Err(e) = self.try_add_field(su) {
            panic!("{e}");
        }
        self
    }
}

impl<T: FieldType> Sub<&VolField<T>> for FvMatrix<T> {
    type Output = FvMatrix<T>;

    fn sub(mut self, su: &VolField<T>) -> FvMatrix<T> {
        if let Err(e) = self.try_sub_field(su) {
            panic!("{e}");
        }
        self
    }
}

impl<T: FieldType> Add<ZeroField> for FvMatrix<T> {
    type Output = FvMatrix<T>;

    fn add(self, _: ZeroField) -> FvMatrix<T> {
        self
    }
}

impl<T: FieldType> Sub<ZeroField> for FvMatrix<T> {
    type Output = FvMatrix<T>;

    fn sub(self, _: ZeroField) -> FvMatrix<T> {
        self
    }
}

impl<T: FieldType> AddAssign<ZeroField> for FvMatrix<T> {
    fn add_assign(&mut self, _: ZeroField) {}
}

impl<T: FieldType> SubAssign<ZeroField> for FvMatrix<T> {
    fn sub_assign(&mut self, _: ZeroField) {}
}
