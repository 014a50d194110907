//! Active clustering (stateless least-loaded selection).
//!
//! Every task scans the whole pool and goes to the server with the smallest
//! accumulated load at that moment. Nothing is remembered between tasks.

use crate::server::Server;
use crate::traits::*;

/// Active clustering policy.
pub struct ActiveClustering {
    servers: Vec<Server>,
}

impl ActiveClustering {
    pub fn new(servers: Vec<Server>) -> Self {
        Self { servers }
    }
}

impl BalancingPolicy for ActiveClustering {
    fn balance_load(&mut self, task_loads: &[f64]) -> Result<(), PolicyError> {
        validate_inputs(&self.servers, task_loads)?;

        for &weight in task_loads {
            let pos = least_loaded_position(&self.servers).ok_or(PolicyError::EmptyServerPool)?;
            self.servers[pos].add_load(weight);
        }
        Ok(())
    }

    fn servers(&self) -> &[Server] {
        &self.servers
    }

    fn name(&self) -> &str {
        "active_clustering"
    }
}
