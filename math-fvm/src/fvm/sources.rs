//! Source terms
//!
//! The coefficient argument selects the implementation at compile time: a
//! cell field or a uniform dimensioned value builds a matrix, while the
//! [`Zero`] and [`ZeroField`] tags return [`ZeroField`] without touching the
//! mesh.

use crate::error::FvmError;
use crate::field::VolField;
use crate::fvc;
use crate::matrix::FvMatrix;
use vector_space::{DimensionSet, Dimensioned, FieldType, Zero, ZeroField, si};

/// Coefficients accepted by [`su`]
pub trait ExplicitSource<T: FieldType> {
    type Output;

    /// Explicit source: `source -= V su`
    fn su(self, psi: &VolField<T>) -> Self::Output;
}

/// Coefficients accepted by [`sp`] and [`susp`]
pub trait ImplicitSource<T: FieldType> {
    type Output;

    /// Implicit source: `diag += V sp`
    fn sp(self, psi: &VolField<T>) -> Self::Output;

    /// Implicit where the coefficient is positive, explicit where it is
    /// negative
    fn susp(self, psi: &VolField<T>) -> Self::Output;
}

/// Explicit source term `su`
pub fn su<T: FieldType, S: ExplicitSource<T>>(coeff: S, psi: &VolField<T>) -> S::Output {
    coeff.su(psi)
}

/// Implicit linearised source term `sp ψ`
pub fn sp<T: FieldType, S: ImplicitSource<T>>(coeff: S, psi: &VolField<T>) -> S::Output {
    coeff.sp(psi)
}

/// Source term `c ψ` split by the sign of `c`
///
/// Positive coefficients go to the diagonal, which keeps it dominant.
/// Negative ones are lagged into the source using the current `ψ`.
pub fn susp<T: FieldType, S: ImplicitSource<T>>(coeff: S, psi: &VolField<T>) -> S::Output {
    coeff.susp(psi)
}

fn check_coeff<T: FieldType>(coeff: &VolField<f64>, psi: &VolField<T>) -> Result<(), FvmError> {
    fvc::check_mesh(psi.mesh(), coeff.mesh(), psi.name(), coeff.name())
}

fn implicit<T: FieldType>(
    coeffs: &[f64],
    dimensions: DimensionSet,
    psi: &VolField<T>,
    split: bool,
) -> FvMatrix<T> {
    let mut matrix = FvMatrix::assembling(psi, dimensions * psi.dimensions() * si::VOLUME);
    let volumes = psi.mesh().cell_volumes();

    let diag = matrix.ldu_mut().diag_mut();
    for ((d, &c), &v) in diag.iter_mut().zip(coeffs).zip(volumes) {
        *d += v * if split { c.max(0.0) } else { c };
    }
    if split {
        let source = matrix.source_mut();
        for (((s, &c), &v), &p) in source.iter_mut().zip(coeffs).zip(volumes).zip(psi.internal()) {
            *s -= p * (v * c.min(0.0));
        }
    }
    matrix
}

impl<T: FieldType> ExplicitSource<T> for &VolField<T> {
    type Output = Result<FvMatrix<T>, FvmError>;

    fn su(self, psi: &VolField<T>) -> Self::Output {
        fvc::check_mesh(psi.mesh(), self.mesh(), psi.name(), self.name())?;
        let mut matrix = FvMatrix::assembling(psi, self.dimensions() * si::VOLUME);
        matrix.try_add_field(self)?;
        Ok(matrix)
    }
}

impl<T: FieldType> ExplicitSource<T> for &Dimensioned<T> {
    type Output = Result<FvMatrix<T>, FvmError>;

    fn su(self, psi: &VolField<T>) -> Self::Output {
        let mut matrix = FvMatrix::assembling(psi, self.dimensions * si::VOLUME);
        matrix.try_add_dimensioned(self)?;
        Ok(matrix)
    }
}

impl<T: FieldType> ExplicitSource<T> for Zero {
    type Output = ZeroField;

    fn su(self, _: &VolField<T>) -> ZeroField {
        ZeroField
    }
}

impl<T: FieldType> ExplicitSource<T> for ZeroField {
    type Output = ZeroField;

    fn su(self, _: &VolField<T>) -> ZeroField {
        ZeroField
    }
}

impl<T: FieldType> ImplicitSource<T> for &VolField<f64> {
    type Output = Result<FvMatrix<T>, FvmError>;

    fn sp(self, psi: &VolField<T>) -> Self::Output {
        check_coeff(self, psi)?;
        Ok(implicit(self.internal(), self.dimensions(), psi, false))
    }

    fn susp(self, psi: &VolField<T>) -> Self::Output {
        check_coeff(self, psi)?;
        Ok(implicit(self.internal(), self.dimensions(), psi, true))
    }
}

impl<T: FieldType> ImplicitSource<T> for &Dimensioned<f64> {
    type Output = Result<FvMatrix<T>, FvmError>;

    fn sp(self, psi: &VolField<T>) -> Self::Output {
        let coeffs = vec![self.value; psi.size()];
        Ok(implicit(&coeffs, self.dimensions, psi, false))
    }

    fn susp(self, psi: &VolField<T>) -> Self::Output {
        let coeffs = vec![self.value; psi.size()];
        Ok(implicit(&coeffs, self.dimensions, psi, true))
    }
}

impl<T: FieldType> ImplicitSource<T> for Zero {
    type Output = ZeroField;

    fn sp(self, _: &VolField<T>) -> ZeroField {
        ZeroField
    }

    fn susp(self, _: &VolField<T>) -> ZeroField {
        ZeroField
    }
}

impl<T: FieldType> ImplicitSource<T> for ZeroField {
    type Output = ZeroField;

    fn sp(self, _: &VolField<T>) -> ZeroField {
        ZeroField
    }

    fn susp(self, _: &VolField<T>) -> ZeroField {
        ZeroField
    }
}
