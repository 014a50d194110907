//! Ant colony optimization.
//!
//! Each task is an ant that picks a server by roulette-wheel selection over
//! `pheromone^alpha * (load + weight)^-beta`. After every ant has moved, all
//! pheromone trails evaporate by `(1 - rho)` and every (task, server) pair is
//! reinforced by `q / (load + weight)`, evaluated against the loads the
//! iteration produced.
//!
//! The deposit is applied to every pair, not only the pairs that were
//! actually chosen. Pheromone therefore tracks how attractive a server looks
//! after the iteration, independent of which ant went where.
//!
//! Each iteration starts from the loads the pool had when `balance_load` was
//! entered. The assignment made by the final iteration is kept, so the total
//! load grows by exactly the batch weight, as it does for the other policies.

use crate::server::Server;
use crate::traits::*;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Tunable ACO parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AntColonyParams {
    /// Pheromone importance.
    pub alpha: f64,
    /// Heuristic importance.
    pub beta: f64,
    /// Evaporation rate in `[0, 1)`.
    pub rho: f64,
    /// Deposit constant.
    pub q: f64,
    /// Optimization rounds per `balance_load` call.
    pub iterations: u32,
}

impl AntColonyParams {
    /// Check that every parameter keeps the roulette wheel well defined.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if !self.alpha.is_finite() {
            return Err(PolicyError::InvalidParameter(format!(
                "alpha must be finite, got {}",
                self.alpha
            )));
        }
        if !self.beta.is_finite() {
            return Err(PolicyError::InvalidParameter(format!(
                "beta must be finite, got {}",
                self.beta
            )));
        }
        if !(0.0..1.0).contains(&self.rho) {
            return Err(PolicyError::InvalidParameter(format!(
                "rho must be in [0, 1), got {}",
                self.rho
            )));
        }
        if !(self.q.is_finite() && self.q > 0.0) {
            return Err(PolicyError::InvalidParameter(format!(
                "q must be finite and > 0, got {}",
                self.q
            )));
        }
        if self.iterations == 0 {
            return Err(PolicyError::InvalidParameter(
                "iterations must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for AntColonyParams {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            beta: 2.0,
            rho: 0.5,
            q: 1.0,
            iterations: 100,
        }
    }
}

/// Desirability weight for every (task, server) pair, stored row-major.
///
/// Entries start at a positive value and stay strictly positive: evaporation
/// multiplies by `1 - rho > 0` and deposits only add.
#[derive(Debug, Clone, PartialEq)]
pub struct PheromoneMatrix {
    num_servers: usize,
    values: Vec<f64>,
}

impl PheromoneMatrix {
    pub fn new(num_tasks: usize, num_servers: usize, initial: f64) -> Self {
        Self {
            num_servers,
            values: vec![initial; num_tasks * num_servers],
        }
    }

    pub fn get(&self, task: usize, server: usize) -> f64 {
        self.values[task * self.num_servers + server]
    }

    pub fn deposit(&mut self, task: usize, server: usize, amount: f64) {
        self.values[task * self.num_servers + server] += amount;
    }

    /// Multiply every entry by `1 - rho`.
    pub fn evaporate(&mut self, rho: f64) {
        let keep = 1.0 - rho;
        for v in &mut self.values {
            *v *= keep;
        }
    }

    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    pub fn min(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }
}

/// Ant colony optimization policy.
pub struct AntColony<R = ChaCha8Rng> {
    servers: Vec<Server>,
    rng: R,
    params: AntColonyParams,
    /// Trails left by the most recent call, kept for reporting.
    pheromones: Option<PheromoneMatrix>,
    iterations_run: u64,
}

impl AntColony<ChaCha8Rng> {
    pub fn new(servers: Vec<Server>, seed: u64) -> Self {
        Self::bind(servers, ChaCha8Rng::seed_from_u64(seed), AntColonyParams::default())
    }
}

impl<R: RngCore + Send> AntColony<R> {
    /// Bind to `servers` with an explicit random source and parameters.
    ///
    /// Fails with [`PolicyError::InvalidParameter`] if `params` does not pass
    /// [`AntColonyParams::validate`].
    pub fn with_params(
        servers: Vec<Server>,
        rng: R,
        params: AntColonyParams,
    ) -> Result<Self, PolicyError> {
        params.validate()?;
        Ok(Self::bind(servers, rng, params))
    }

    fn bind(servers: Vec<Server>, rng: R, params: AntColonyParams) -> Self {
        Self {
            servers,
            rng,
            params,
            pheromones: None,
            iterations_run: 0,
        }
    }

    pub fn params(&self) -> &AntColonyParams {
        &self.params
    }

    /// Pheromone trails from the last non-empty `balance_load` call.
    pub fn pheromones(&self) -> Option<&PheromoneMatrix> {
        self.pheromones.as_ref()
    }

    /// Roulette-wheel choice of a server for `task`.
    fn select_server(
        &mut self,
        task: usize,
        weight: f64,
        pheromones: &PheromoneMatrix,
        probabilities: &mut [f64],
    ) -> usize {
        let mut total = 0.0;
        for (pos, server) in self.servers.iter().enumerate() {
            let desirability = pheromones.get(task, pos).powf(self.params.alpha)
                * (server.load() + weight).powf(-self.params.beta);
            probabilities[pos] = desirability;
            total += desirability;
        }

        let draw = self.rng.gen::<f64>() * total;
        let mut cumulative = 0.0;
        for (pos, p) in probabilities.iter().enumerate() {
            cumulative += p;
            if cumulative >= draw {
                return pos;
            }
        }
        // Rounding left the draw above the last cumulative sum.
        probabilities.len() - 1
    }

    fn update_pheromones(&self, pheromones: &mut PheromoneMatrix, task_loads: &[f64]) {
        pheromones.evaporate(self.params.rho);
        for (task, &weight) in task_loads.iter().enumerate() {
            for (pos, server) in self.servers.iter().enumerate() {
                pheromones.deposit(task, pos, self.params.q / (server.load() + weight));
            }
        }
    }

    fn restore_loads(&mut self, baseline: &[f64]) {
        for (server, &load) in self.servers.iter_mut().zip(baseline) {
            server.reset();
            server.add_load(load);
        }
    }
}

impl<R: RngCore + Send> BalancingPolicy for AntColony<R> {
    fn balance_load(&mut self, task_loads: &[f64]) -> Result<(), PolicyError> {
        validate_inputs(&self.servers, task_loads)?;
        if task_loads.is_empty() {
            return Ok(());
        }

        let baseline: Vec<f64> = self.servers.iter().map(Server::load).collect();
        let mut pheromones = PheromoneMatrix::new(task_loads.len(), self.servers.len(), 1.0);
        let mut probabilities = vec![0.0; self.servers.len()];

        for iteration in 0..self.params.iterations {
            self.restore_loads(&baseline);

            for (task, &weight) in task_loads.iter().enumerate() {
                let pos = self.select_server(task, weight, &pheromones, &mut probabilities);
                self.servers[pos].add_load(weight);
            }

            self.update_pheromones(&mut pheromones, task_loads);
            self.iterations_run += 1;

            debug!(
                iteration,
                tasks = task_loads.len(),
                mean_pheromone = pheromones.mean(),
                "ant colony iteration complete"
            );
        }

        self.pheromones = Some(pheromones);
        Ok(())
    }

    fn servers(&self) -> &[Server] {
        &self.servers
    }

    fn name(&self) -> &str {
        "ant_colony"
    }

    fn custom_metrics(&self) -> HashMap<String, f64> {
        let mut m = HashMap::new();
        m.insert("aco_iterations_run".to_string(), self.iterations_run as f64);
        if let Some(p) = &self.pheromones {
            m.insert("aco_mean_pheromone".to_string(), p.mean());
            m.insert("aco_min_pheromone".to_string(), p.min());
        }
        m
    }
}
