//! Weighted round-robin (least-loaded cursor).
//!
//! Keeps a cursor like [`RoundRobin`](crate::RoundRobin), but after every
//! assignment moves it to the least-loaded server in the pool. Capability is
//! not consulted: ties go to the lowest id.

use crate::server::Server;
use crate::traits::*;

/// Weighted round-robin policy.
pub struct WeightedRoundRobin {
    servers: Vec<Server>,
    current_server: usize,
}

impl WeightedRoundRobin {
    pub fn new(servers: Vec<Server>) -> Self {
        Self {
            servers,
            current_server: 0,
        }
    }

    pub fn cursor(&self) -> usize {
        self.current_server
    }

    fn update_current_server(&mut self) {
        if let Some(pos) = least_loaded_position(&self.servers) {
            self.current_server = pos;
        }
    }
}

impl BalancingPolicy for WeightedRoundRobin {
    fn balance_load(&mut self, task_loads: &[f64]) -> Result<(), PolicyError> {
        validate_inputs(&self.servers, task_loads)?;

        for &weight in task_loads {
            self.servers[self.current_server].add_load(weight);
            self.update_current_server();
        }
        Ok(())
    }

    fn servers(&self) -> &[Server] {
        &self.servers
    }

    fn name(&self) -> &str {
        "weighted_round_robin"
    }
}
