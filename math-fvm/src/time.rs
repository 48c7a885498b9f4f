//! Time level bookkeeping for transient terms

use serde::{Deserialize, Serialize};

/// Current time, step sizes and step counter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeState {
    pub value: f64,
    pub delta_t: f64,
    /// Step size of the previous step, used by second-order schemes
    pub delta_t0: f64,
    pub time_index: usize,
}

impl TimeState {
    pub fn new(start: f64, delta_t: f64) -> Self {
        Self {
            value: start,
            delta_t,
            delta_t0: delta_t,
            time_index: 0,
        }
    }

    /// Advance by the current step
    pub fn advance(&mut self) {
        self.value += self.delta_t;
        self.time_index += 1;
    }

    /// Change the step size for the next step
    pub fn set_delta_t(&mut self, delta_t: f64) {
        self.delta_t0 = self.delta_t;
        self.delta_t = delta_t;
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}
