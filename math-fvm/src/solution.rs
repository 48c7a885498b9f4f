//! Solution controls
//!
//! [`FvSolution`] is the run-time configuration read by the equation layer:
//! linear-solver controls per field, relaxation factors and the settings of
//! the outer pressure-velocity loop. It is read from JSON with the classic
//! key names:
//!
//! ```json
//! {
//!   "solvers": {
//!     "p": { "solver": "PCG", "preconditioner": "DIC", "tolerance": 1e-6, "relTol": 0.05 },
//!     "pFinal": { "solver": "PCG", "preconditioner": "DIC", "tolerance": 1e-6 },
//!     "(U|k|epsilon)": { "solver": "smoothSolver", "smoother": "symGaussSeidel" }
//!   },
//!   "relaxationFactors": {
//!     "fields": { "p": 0.3 },
//!     "equations": { "U": 0.7, "default": 0.5 }
//!   },
//!   "SIMPLE": {
//!     "nNonOrthogonalCorrectors": 0,
//!     "pRefCell": 0,
//!     "pRefValue": 0,
//!     "residualControl": { "p": 1e-2, "U": 1e-3 }
//!   }
//! }
//! ```
//!
//! Keys may be patterns made of alternation groups `(a|b)` and `.*`
//! wildcards; an exact key always wins over a pattern.

use crate::error::FvmError;
use crate::field::VolField;
use serde::{Deserialize, Serialize};
use solvers::{SolverControls, SolverPerformance};
use std::collections::BTreeMap;
use std::path::Path;

/// Relaxation factors for fields (explicit) and equations (implicit)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaxationFactors {
    pub fields: BTreeMap<String, f64>,
    pub equations: BTreeMap<String, f64>,
}

/// Outer-loop settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimpleControls {
    pub n_non_orthogonal_correctors: usize,
    /// Initial-residual thresholds below which the outer loop has converged
    pub residual_control: BTreeMap<String, f64>,
    /// Remaining entries, such as `pRefCell` and `pRefValue`
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Complete solution-control dictionary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FvSolution {
    pub solvers: BTreeMap<String, SolverControls>,
    pub relaxation_factors: RelaxationFactors,
    #[serde(rename = "SIMPLE")]
    pub simple: SimpleControls,
}

impl FvSolution {
    pub fn from_json_str(json: &str) -> Result<Self, FvmError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FvmError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Add or replace the controls for `name` (which may be a pattern)
    pub fn with_solver(mut self, name: impl Into<String>, controls: SolverControls) -> Self {
        self.solvers.insert(name.into(), controls);
        self
    }

    /// Linear-solver controls for a field
    pub fn solver_controls(&self, field: &str) -> Result<&SolverControls, FvmError> {
        lookup(&self.solvers, field).ok_or_else(|| FvmError::MissingSolverControls(field.to_string()))
    }

    /// Controls for the final outer iteration: `<field>Final` if present,
    /// otherwise the regular controls with the relative tolerance disabled
    pub fn final_solver_controls(&self, field: &str) -> Result<SolverControls, FvmError> {
        if let Some(controls) = lookup(&self.solvers, &format!("{field}Final")) {
            return Ok(controls.clone());
        }
        log::debug!("No {field}Final solver controls, using {field} with relTol 0");
        let mut controls = self.solver_controls(field)?.clone();
        controls.rel_tol = 0.0;
        Ok(controls)
    }

    /// Explicit relaxation factor for a field, falling back to `default`
    pub fn field_relaxation_factor(&self, field: &str) -> Option<f64> {
        lookup(&self.relaxation_factors.fields, field)
            .or_else(|| self.relaxation_factors.fields.get("default"))
            .copied()
    }

    /// Implicit relaxation factor for an equation, falling back to `default`
    pub fn equation_relaxation_factor(&self, field: &str) -> Option<f64> {
        lookup(&self.relaxation_factors.equations, field)
            .or_else(|| self.relaxation_factors.equations.get("default"))
            .copied()
    }

    /// Whether every field named in `residualControl` that was solved has an
    /// initial residual below its threshold
    pub fn residual_criteria_satisfied(&self, performances: &[SolverPerformance]) -> bool {
        let mut checked = false;
        for perf in performances {
            if let Some(&tol) = lookup(&self.simple.residual_control, &perf.field) {
                checked = true;
                if perf.initial_residual >= tol {
                    return false;
                }
            }
        }
        checked
    }

    /// Reference cell and value for a field whose level is otherwise free
    ///
    /// Returns `None` when a boundary already fixes the level. Otherwise reads
    /// `<field>RefCell` (required) and `<field>RefValue` (default 0) from the
    /// `SIMPLE` settings.
    pub fn set_ref_cell(&self, field: &VolField<f64>) -> Result<Option<(usize, f64)>, FvmError> {
        if !field.needs_reference() {
            return Ok(None);
        }
        let name = field.name();
        let cell = self
            .simple
            .extra
            .get(&format!("{name}RefCell"))
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| {
                FvmError::Config(format!(
                    "unable to set reference cell for field {name}: please supply {name}RefCell"
                ))
            })? as usize;
        let n_cells = field.size();
        if cell >= n_cells {
            return Err(FvmError::InvalidCell { cell, n_cells });
        }
        let value = match self.simple.extra.get(&format!("{name}RefValue")) {
            Some(v) => v.as_f64().ok_or_else(|| {
                FvmError::Config(format!("{name}RefValue must be a number, got {v}"))
            })?,
            None => 0.0,
        };
        Ok(Some((cell, value)))
    }
}

/// Exact key first, then the first matching pattern key
fn lookup<'a, V>(map: &'a BTreeMap<String, V>, name: &str) -> Option<&'a V> {
    map.get(name).or_else(|| {
        map.iter()
            .filter(|(key, _)| is_pattern(key))
            .find(|(key, _)| pattern_matches(key, name))
            .map(|(_, v)| v)
    })
}

fn is_pattern(key: &str) -> bool {
    key.contains('(') || key.contains(".*")
}

/// Match `name` against a pattern of literals, `(a|b)` groups and `.*`
fn pattern_matches(pattern: &str, name: &str) -> bool {
    if pattern.is_empty() {
        return name.is_empty();
    }
    if let Some(rest) = pattern.strip_prefix(".*") {
        return (0..=name.len())
            .filter(|&i| name.is_char_boundary(i))
            .any(|i| pattern_matches(rest, &name[i..]));
    }
    if let Some(group) = pattern.strip_prefix('(') {
        let Some(close) = group.find(')') else {
            return false;
        };
        let rest = &group[close + 1..];
        return group[..close].split('|').any(|alt| {
            name.strip_prefix(alt)
                .is_some_and(|tail| pattern_matches(rest, tail))
        });
    }
    let mut chars = pattern.chars();
    match (chars.next(), name.chars().next()) {
        (Some(p), Some(n)) if p == n => {
            pattern_matches(chars.as_str(), &name[n.len_utf8()..])
        }
        _ => false,
    }
}
