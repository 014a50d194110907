//! Worker server model.
//!
//! A [`Server`] is the unit every policy assigns work to. It carries a stable
//! id, a capability weight used to normalise throughput, and the load that has
//! been accumulated on it during the current run.

use serde::{Deserialize, Serialize};

/// A worker in the simulated pool.
///
/// Load is a locally accumulated counter. There is no upper bound: an
/// overloaded server is representable, it is simply a larger number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    id: u32,
    capability: u32,
    load: f64,
}

impl Server {
    /// Create an idle server with the given capability.
    pub fn new(id: u32, capability: u32) -> Self {
        Self {
            id,
            capability,
            load: 0.0,
        }
    }

    /// Create an idle server with the default capability of 1.
    pub fn uncapacitated(id: u32) -> Self {
        Self::new(id, 1)
    }

    /// Add `amount` to the accumulated load.
    pub fn add_load(&mut self, amount: f64) {
        debug_assert!(
            amount >= 0.0,
            "Server {} cannot take negative load: {}",
            self.id,
            amount
        );
        self.load += amount;
    }

    /// Zero the accumulated load.
    pub fn reset(&mut self) {
        self.load = 0.0;
    }

    pub fn load(&self) -> f64 {
        self.load
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn capability(&self) -> u32 {
        self.capability
    }
}
