//! Round-robin assignment.
//!
//! The simplest policy: tasks are dealt to servers in a fixed circular order.
//! Good fairness in task count, but blind to task weight and server load.

use crate::server::Server;
use crate::traits::*;

/// Round-robin policy.
///
/// The cursor survives across `balance_load` calls on the same instance, so
/// feeding one task per call yields the same sequence as one large batch.
pub struct RoundRobin {
    servers: Vec<Server>,
    /// Position of the server that receives the next task.
    current_server: usize,
}

impl RoundRobin {
    pub fn new(servers: Vec<Server>) -> Self {
        Self {
            servers,
            current_server: 0,
        }
    }

    /// Position the next task will be assigned to.
    pub fn cursor(&self) -> usize {
        self.current_server
    }
}

impl BalancingPolicy for RoundRobin {
    fn balance_load(&mut self, task_loads: &[f64]) -> Result<(), PolicyError> {
        validate_inputs(&self.servers, task_loads)?;

        for &weight in task_loads {
            self.servers[self.current_server].add_load(weight);
            self.current_server = (self.current_server + 1) % self.servers.len();
        }
        Ok(())
    }

    fn servers(&self) -> &[Server] {
        &self.servers
    }

    fn name(&self) -> &str {
        "round_robin"
    }
}
