//! Global reductions
//!
//! Assembly is local to one mesh partition. Quantities that must agree across
//! partitions (domain integrals, reference-cell decisions) go through a
//! [`Communicator`]; the serial implementation is the identity.

/// Collective reductions over all partitions of a decomposed mesh
pub trait Communicator: Send + Sync {
    /// Sum of `value` over all partitions
    fn sum(&self, value: f64) -> f64;

    /// Maximum of `value` over all partitions
    fn max(&self, value: f64) -> f64;

    /// Minimum of `value` over all partitions
    fn min(&self, value: f64) -> f64;

    /// Number of partitions
    fn n_procs(&self) -> usize {
        1
    }

    /// Index of this partition
    fn rank(&self) -> usize {
        0
    }

    /// Whether any partition reports `flag`
    fn any(&self, flag: bool) -> bool {
        self.max(if flag { 1.0 } else { 0.0 }) > 0.5
    }
}

/// Single-partition communicator
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialCommunicator;

impl Communicator for SerialCommunicator {
    fn sum(&self, value: f64) -> f64 {
        value
    }

    fn max(&self, value: f64) -> f64 {
        value
    }

    fn min(&self, value: f64) -> f64 {
        value
    }
}

/// Global sum of a local array
pub fn g_sum(comm: &dyn Communicator, values: &[f64]) -> f64 {
    comm.sum(values.iter().sum())
}

/// Global maximum of a local array, `-f64::MAX` when empty everywhere
pub fn g_max(comm: &dyn Communicator, values: &[f64]) -> f64 {
    comm.max(values.iter().copied().fold(-f64::MAX, f64::max))
}

/// Global minimum of a local array, `f64::MAX` when empty everywhere
pub fn g_min(comm: &dyn Communicator, values: &[f64]) -> f64 {
    comm.min(values.iter().copied().fold(f64::MAX, f64::min))
}

/// Global average of a local array, zero when empty everywhere
pub fn g_average(comm: &dyn Communicator, values: &[f64]) -> f64 {
    let count = comm.sum(values.len() as f64);
    if count > 0.0 {
        g_sum(comm, values) / count
    } else {
        log::warn!("g_average of an empty field, returning zero");
        0.0
    }
}
