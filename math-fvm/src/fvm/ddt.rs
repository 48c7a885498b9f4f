//! Time derivative

use crate::error::FvmError;
use crate::field::VolField;
use crate::matrix::FvMatrix;
use crate::time::TimeState;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use vector_space::{DimensionSet, FieldType, si};

/// Time discretisation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DdtScheme {
    /// First-order implicit
    #[default]
    Euler,
    /// Second-order three-level backward differencing
    #[serde(rename = "backward")]
    Backward,
    /// No time derivative
    #[serde(rename = "steadyState")]
    SteadyState,
}

impl DdtScheme {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Euler => "Euler",
            Self::Backward => "backward",
            Self::SteadyState => "steadyState",
        }
    }
}

impl fmt::Display for DdtScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DdtScheme {
    type Err = FvmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Euler" => Ok(Self::Euler),
            "backward" => Ok(Self::Backward),
            "steadyState" => Ok(Self::SteadyState),
            _ => Err(FvmError::UnknownScheme(s.to_string())),
        }
    }
}

/// Weights of the current, old and old-old levels, divided by Δt
///
/// `dψ/dt ≈ current ψ - old ψ⁰ + old_old ψ⁰⁰`
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DdtCoefficients {
    pub current: f64,
    pub old: f64,
    pub old_old: f64,
}

pub(crate) fn ddt_coefficients<T: FieldType>(
    psi: &VolField<T>,
    time: &TimeState,
    scheme: DdtScheme,
) -> Result<DdtCoefficients, FvmError> {
    if scheme == DdtScheme::SteadyState {
        return Ok(DdtCoefficients {
            current: 0.0,
            old: 0.0,
            old_old: 0.0,
        });
    }
    if !(time.delta_t > 0.0) {
        return Err(FvmError::Config(format!(
            "time step must be positive, got {}",
            time.delta_t
        )));
    }
    psi.old_time()?;

    let rdt = 1.0 / time.delta_t;
    let euler = DdtCoefficients {
        current: rdt,
        old: rdt,
        old_old: 0.0,
    };
    if scheme == DdtScheme::Euler {
        return Ok(euler);
    }
    if psi.old_old_time().is_none() || !(time.delta_t0 > 0.0) {
        debug!("backward ddt of {}: no old-old level, using Euler", psi.name());
        return Ok(euler);
    }

    let (dt, dt0) = (time.delta_t, time.delta_t0);
    let coefft = 1.0 + dt / (dt + dt0);
    let coefft00 = dt * dt / (dt0 * (dt + dt0));
    let coefft0 = coefft + coefft00;
    Ok(DdtCoefficients {
        current: coefft * rdt,
        old: coefft0 * rdt,
        old_old: coefft00 * rdt,
    })
}

/// Implicit time derivative `∂ψ/∂t`
///
/// Fails with [`FvmError::MissingOldTime`] unless `psi` has a stored old-time
/// level (steady state excepted).
pub fn ddt<T: FieldType>(
    psi: &VolField<T>,
    time: &TimeState,
    scheme: DdtScheme,
) -> Result<FvMatrix<T>, FvmError> {
    ddt_weighted(None, psi, time, scheme)
}

/// Implicit time derivative weighted by a density-like coefficient,
/// `∂(ρψ)/∂t`
///
/// Old levels of `rho` that are not stored fall back to its current value.
pub fn ddt_coeff<T: FieldType>(
    rho: &VolField<f64>,
    psi: &VolField<T>,
    time: &TimeState,
    scheme: DdtScheme,
) -> Result<FvMatrix<T>, FvmError> {
    if !crate::mesh::same_mesh(rho.mesh(), psi.mesh()) {
        return Err(FvmError::FieldMismatch {
            lhs: psi.name().to_string(),
            rhs: rho.name().to_string(),
        });
    }
    ddt_weighted(Some(rho), psi, time, scheme)
}

fn ddt_weighted<T: FieldType>(
    rho: Option<&VolField<f64>>,
    psi: &VolField<T>,
    time: &TimeState,
    scheme: DdtScheme,
) -> Result<FvMatrix<T>, FvmError> {
    let rho_dims = rho.map_or(si::DIMLESS, VolField::dimensions);
    let dimensions: DimensionSet = rho_dims * psi.dimensions() * si::VOLUME / si::TIME;
    let mut matrix = FvMatrix::assembling(psi, dimensions);
    if scheme == DdtScheme::SteadyState {
        return Ok(matrix);
    }

    let coeffs = ddt_coefficients(psi, time, scheme)?;
    let old = psi.old_time()?;
    let old_old = psi.old_old_time().filter(|_| coeffs.old_old != 0.0);

    let n_cells = psi.size();
    let rho_at = |level: Option<&VolField<f64>>, c: usize| level.map_or(1.0, |r| r.internal()[c]);
    let rho_now = rho;
    let rho_old = rho.map(|r| r.old_time().unwrap_or(r));
    let rho_old_old = rho.map(|r| r.old_old_time().or(rho_old).unwrap_or(r));

    let volumes = psi.mesh().cell_volumes().to_vec();
    for c in 0..n_cells {
        matrix.ldu_mut().diag_mut()[c] = coeffs.current * rho_at(rho_now, c) * volumes[c];
    }
    let source = matrix.source_mut();
    for c in 0..n_cells {
        let mut s = old.internal()[c] * (coeffs.old * rho_at(rho_old, c));
        if let Some(old_old) = old_old {
            s -= old_old.internal()[c] * (coeffs.old_old * rho_at(rho_old_old, c));
        }
        source[c] = s * volumes[c];
    }
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{MeshRef, line_mesh};
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn temperature() -> VolField<f64> {
        let mesh: MeshRef = Arc::new(line_mesh(3, 3.0).unwrap());
        VolField::uniform("T", mesh, si::TEMPERATURE, 1.0)
    }

    #[test]
    fn test_scheme_names() {
        assert_eq!("backward".parse::<DdtScheme>().unwrap(), DdtScheme::Backward);
        assert_eq!(DdtScheme::default().to_string(), "Euler");
        assert!("CrankNicolson".parse::<DdtScheme>().is_err());
        let parsed: DdtScheme = serde_json::from_str("\"steadyState\"").unwrap();
        assert_eq!(parsed, DdtScheme::SteadyState);
    }

    #[test]
    fn test_euler_requires_old_time() {
        let t = temperature();
        let time = TimeState::new(0.0, 0.1);
        assert!(matches!(
            ddt(&t, &time, DdtScheme::Euler),
            Err(FvmError::MissingOldTime(_))
        ));
        // Steady state never looks at old levels
        let steady = ddt(&t, &time, DdtScheme::SteadyState).unwrap();
        assert!(steady.diag().iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_euler_coefficients() {
        let mut t = temperature();
        t.store_old_time();
        t.internal_mut()[1] = 3.0;
        let time = TimeState::new(0.0, 0.5);

        let m = ddt(&t, &time, DdtScheme::Euler).unwrap();
        assert_eq!(m.dimensions(), si::TEMPERATURE * si::VOLUME / si::TIME);
        for c in 0..3 {
            assert_relative_eq!(m.diag()[c], 2.0);
            assert_relative_eq!(m.source()[c], 2.0);
        }
        assert!(m.upper().iter().all(|&u| u == 0.0));

        // A ψ - source reproduces V (ψ - ψ⁰)/Δt
        let r = m.ldu().amul(t.internal());
        assert_relative_eq!(r[1] - m.source()[1], 4.0);
    }

    #[test]
    fn test_backward_coefficients() {
        let mut t = temperature();
        t.store_old_time();
        let time = TimeState::new(0.0, 0.1);
        // One stored level: first-order start-up
        let m = ddt(&t, &time, DdtScheme::Backward).unwrap();
        assert_relative_eq!(m.diag()[0], 10.0, epsilon = 1e-12);

        t.store_old_time();
        let m = ddt(&t, &time, DdtScheme::Backward).unwrap();
        assert_relative_eq!(m.diag()[0], 15.0, epsilon = 1e-12);
        // (2 ψ⁰ - ½ ψ⁰⁰)/Δt with ψ = 1
        assert_relative_eq!(m.source()[0], 15.0, epsilon = 1e-12);
    }

    #[test]
    fn test_density_weighted() {
        let mut t = temperature();
        t.store_old_time();
        let rho = VolField::uniform("rho", t.mesh().clone(), si::DENSITY, 2.0);
        let time = TimeState::new(0.0, 1.0);

        let m = ddt_coeff(&rho, &t, &time, DdtScheme::Euler).unwrap();
        assert_eq!(m.dimensions(), si::DENSITY * si::TEMPERATURE * si::VOLUME / si::TIME);
        assert_relative_eq!(m.diag()[2], 2.0);
        assert_relative_eq!(m.source()[2], 2.0);

        let bad_time = TimeState::new(0.0, 0.0);
        assert!(matches!(
            ddt(&t, &bad_time, DdtScheme::Euler),
            Err(FvmError::Config(_))
        ));
    }
}
