//! Uniform random assignment.
//!
//! Each task goes to a server drawn uniformly from the pool. No state is
//! carried between tasks apart from the random source itself.

use crate::server::Server;
use crate::traits::*;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Random assignment policy.
///
/// Generic over the random source so tests can inject a deterministic one.
pub struct RandomAssignment<R = ChaCha8Rng> {
    servers: Vec<Server>,
    rng: R,
}

impl RandomAssignment<ChaCha8Rng> {
    /// Bind to `servers` with a source seeded from `seed`.
    pub fn new(servers: Vec<Server>, seed: u64) -> Self {
        Self::with_rng(servers, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: RngCore + Send> RandomAssignment<R> {
    pub fn with_rng(servers: Vec<Server>, rng: R) -> Self {
        Self { servers, rng }
    }
}

impl<R: RngCore + Send> BalancingPolicy for RandomAssignment<R> {
    fn balance_load(&mut self, task_loads: &[f64]) -> Result<(), PolicyError> {
        validate_inputs(&self.servers, task_loads)?;

        let n = self.servers.len();
        for &weight in task_loads {
            let pos = self.rng.gen_range(0..n);
            self.servers[pos].add_load(weight);
        }
        Ok(())
    }

    fn servers(&self) -> &[Server] {
        &self.servers
    }

    fn name(&self) -> &str {
        "random"
    }
}
