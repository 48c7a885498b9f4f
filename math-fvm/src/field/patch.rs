//! Boundary patch fields
//!
//! Each patch field kind supplies two coefficient pairs in terms of the value
//! `ψ_P` of the adjacent cell:
//!
//! - value: `ψ_b = a_v ψ_P + b_v`
//! - normal gradient: `∂ψ/∂n = a_g ψ_P + b_g`
//!
//! Convection uses the value pair, diffusion the gradient pair.

use crate::error::{FvmError, check_size};
use vector_space::FieldType;

/// Boundary condition kinds
#[derive(Debug, Clone, PartialEq)]
pub enum PatchKind<T> {
    /// Dirichlet: the boundary value is prescribed
    FixedValue,
    /// Neumann with zero normal gradient
    ZeroGradient,
    /// Neumann with a prescribed normal gradient per face
    FixedGradient(Vec<T>),
    /// Robin: a blend of a reference value and a reference gradient
    Mixed {
        ref_value: Vec<T>,
        ref_gradient: Vec<T>,
        /// 1 selects the reference value, 0 the reference gradient
        value_fraction: Vec<f64>,
    },
    /// Values set by the caller; treated as fixed during assembly
    Calculated,
}

/// Boundary values on one patch together with their condition
#[derive(Debug, Clone, PartialEq)]
pub struct PatchField<T> {
    kind: PatchKind<T>,
    values: Vec<T>,
}

impl<T: FieldType> PatchField<T> {
    pub fn fixed_value(values: Vec<T>) -> Self {
        Self {
            kind: PatchKind::FixedValue,
            values,
        }
    }

    pub fn zero_gradient(size: usize) -> Self {
        Self {
            kind: PatchKind::ZeroGradient,
            values: vec![T::ZERO; size],
        }
    }

    pub fn fixed_gradient(gradient: Vec<T>) -> Self {
        let size = gradient.len();
        Self {
            kind: PatchKind::FixedGradient(gradient),
            values: vec![T::ZERO; size],
        }
    }

    pub fn mixed(
        ref_value: Vec<T>,
        ref_gradient: Vec<T>,
        value_fraction: Vec<f64>,
    ) -> Result<Self, FvmError> {
        let size = ref_value.len();
        check_size("mixed reference gradient", size, ref_gradient.len())?;
        check_size("mixed value fraction", size, value_fraction.len())?;
        if let Some(f) = value_fraction.iter().find(|f| !(0.0..=1.0).contains(*f)) {
            return Err(FvmError::Config(format!(
                "mixed value fraction {f} outside [0, 1]"
            )));
        }
        Ok(Self {
            values: ref_value.clone(),
            kind: PatchKind::Mixed {
                ref_value,
                ref_gradient,
                value_fraction,
            },
        })
    }

    pub fn calculated(values: Vec<T>) -> Self {
        Self {
            kind: PatchKind::Calculated,
            values,
        }
    }

    pub fn kind(&self) -> &PatchKind<T> {
        &self.kind
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind {
            PatchKind::FixedValue => "fixedValue",
            PatchKind::ZeroGradient => "zeroGradient",
            PatchKind::FixedGradient(_) => "fixedGradient",
            PatchKind::Mixed { .. } => "mixed",
            PatchKind::Calculated => "calculated",
        }
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// Replace the boundary values; for fixed-value patches this changes the
    /// prescribed value
    pub fn set_values(&mut self, values: Vec<T>) -> Result<(), FvmError> {
        check_size("patch values", self.values.len(), values.len())?;
        self.values = values;
        Ok(())
    }

    /// Whether this patch pins the solution level of an elliptic equation
    pub fn fixes_value(&self) -> bool {
        match &self.kind {
            PatchKind::FixedValue => !self.values.is_empty(),
            PatchKind::Mixed { value_fraction, .. } => value_fraction.iter().any(|&f| f > 0.0),
            _ => false,
        }
    }

    /// Internal coefficient of the value pair, per face
    pub fn value_internal_coeffs(&self) -> Vec<f64> {
        match &self.kind {
            PatchKind::FixedValue | PatchKind::Calculated => vec![0.0; self.size()],
            PatchKind::ZeroGradient | PatchKind::FixedGradient(_) => vec![1.0; self.size()],
            PatchKind::Mixed { value_fraction, .. } => {
                value_fraction.iter().map(|f| 1.0 - f).collect()
            }
        }
    }

    /// Boundary coefficient of the value pair, per face
    pub fn value_boundary_coeffs(&self, delta_coeffs: &[f64]) -> Vec<T> {
        match &self.kind {
            PatchKind::FixedValue | PatchKind::Calculated => self.values.clone(),
            PatchKind::ZeroGradient => vec![T::ZERO; self.size()],
            PatchKind::FixedGradient(gradient) => gradient
                .iter()
                .zip(delta_coeffs)
                .map(|(&g, &d)| g * (1.0 / d))
                .collect(),
            PatchKind::Mixed {
                ref_value,
                ref_gradient,
                value_fraction,
            } => (0..self.size())
                .map(|i| {
                    let f = value_fraction[i];
                    ref_value[i] * f + ref_gradient[i] * ((1.0 - f) / delta_coeffs[i])
                })
                .collect(),
        }
    }

    /// Internal coefficient of the gradient pair, per face
    pub fn gradient_internal_coeffs(&self, delta_coeffs: &[f64]) -> Vec<f64> {
        match &self.kind {
            PatchKind::FixedValue | PatchKind::Calculated => {
                delta_coeffs.iter().map(|d| -d).collect()
            }
            PatchKind::ZeroGradient | PatchKind::FixedGradient(_) => vec![0.0; self.size()],
            PatchKind::Mixed { value_fraction, .. } => value_fraction
                .iter()
                .zip(delta_coeffs)
                .map(|(f, d)| -f * d)
                .collect(),
        }
    }

    /// Boundary coefficient of the gradient pair, per face
    pub fn gradient_boundary_coeffs(&self, delta_coeffs: &[f64]) -> Vec<T> {
        match &self.kind {
            PatchKind::FixedValue | PatchKind::Calculated => self
                .values
                .iter()
                .zip(delta_coeffs)
                .map(|(&v, &d)| v * d)
                .collect(),
            PatchKind::ZeroGradient => vec![T::ZERO; self.size()],
            PatchKind::FixedGradient(gradient) => gradient.clone(),
            PatchKind::Mixed {
                ref_value,
                ref_gradient,
                value_fraction,
            } => (0..self.size())
                .map(|i| {
                    let f = value_fraction[i];
                    ref_value[i] * (f * delta_coeffs[i]) + ref_gradient[i] * (1.0 - f)
                })
                .collect(),
        }
    }

    /// Update the boundary values from the adjacent cell values
    pub fn evaluate(&mut self, internal: &[T], delta_coeffs: &[f64]) {
        match &self.kind {
            PatchKind::FixedValue | PatchKind::Calculated => {}
            PatchKind::ZeroGradient => self.values.copy_from_slice(internal),
            PatchKind::FixedGradient(gradient) => {
                for (i, v) in self.values.iter_mut().enumerate() {
                    *v = internal[i] + gradient[i] * (1.0 / delta_coeffs[i]);
                }
            }
            PatchKind::Mixed {
                ref_value,
                ref_gradient,
                value_fraction,
            } => {
                for (i, v) in self.values.iter_mut().enumerate() {
                    let f = value_fraction[i];
                    let extrapolated = internal[i] + ref_gradient[i] * (1.0 / delta_coeffs[i]);
                    *v = ref_value[i] * f + extrapolated * (1.0 - f);
                }
            }
        }
    }

    /// Face-normal gradient given the adjacent cell values
    pub fn sn_grad(&self, internal: &[T], delta_coeffs: &[f64]) -> Vec<T> {
        match &self.kind {
            PatchKind::FixedGradient(gradient) => gradient.clone(),
            PatchKind::ZeroGradient => vec![T::ZERO; self.size()],
            _ => self
                .values
                .iter()
                .zip(internal)
                .zip(delta_coeffs)
                .map(|((&b, &p), &d)| (b - p) * d)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Both coefficient pairs must reproduce the evaluated value and gradient
    fn check_consistent(patch: &mut PatchField<f64>, internal: f64, delta: f64) {
        patch.evaluate(&[internal], &[delta]);
        let value = patch.value_internal_coeffs()[0] * internal
            + patch.value_boundary_coeffs(&[delta])[0];
        let grad = patch.gradient_internal_coeffs(&[delta])[0] * internal
            + patch.gradient_boundary_coeffs(&[delta])[0];

        assert_relative_eq!(value, patch.values()[0], epsilon = 1e-12);
        assert_relative_eq!(grad, patch.sn_grad(&[internal], &[delta])[0], epsilon = 1e-12);
    }

    #[test]
    fn test_coefficient_pairs_match_evaluation() {
        check_consistent(&mut PatchField::fixed_value(vec![3.0]), 1.0, 2.0);
        check_consistent(&mut PatchField::zero_gradient(1), 1.5, 2.0);
        check_consistent(&mut PatchField::fixed_gradient(vec![4.0]), 1.0, 2.0);
        check_consistent(
            &mut PatchField::mixed(vec![3.0], vec![4.0], vec![0.25]).unwrap(),
            1.0,
            2.0,
        );
    }

    #[test]
    fn test_fixed_gradient_evaluation() {
        let mut patch = PatchField::fixed_gradient(vec![4.0]);
        patch.evaluate(&[1.0], &[2.0]);
        assert_relative_eq!(patch.values()[0], 3.0);
    }

    #[test]
    fn test_fixes_value() {
        assert!(PatchField::fixed_value(vec![0.0]).fixes_value());
        assert!(!PatchField::<f64>::zero_gradient(2).fixes_value());
        assert!(!PatchField::mixed(vec![0.0], vec![1.0], vec![0.0]).unwrap().fixes_value());
        assert!(PatchField::mixed(vec![0.0], vec![1.0], vec![0.5]).unwrap().fixes_value());
    }

    #[test]
    fn test_mixed_rejects_bad_fraction() {
        assert!(PatchField::mixed(vec![0.0], vec![0.0], vec![1.5]).is_err());
        assert!(PatchField::mixed(vec![0.0], vec![0.0, 1.0], vec![0.5]).is_err());
    }
}
