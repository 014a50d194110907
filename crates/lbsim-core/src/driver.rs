//! Simulation driver.
//!
//! The driver owns a reference server pool and never mutates it. For every
//! measured run it hands a fresh policy instance its own copy of the pool,
//! times the assignment in the configured [`TimingMode`], and reads the
//! results back from the policy's copy.

use crate::clock::{SimClock, TimingMode};
use crate::config::ConfigError;
use crate::metrics::{ComparisonReport, MetricsError, PolicyRow, RunMetrics};
use crate::workload::WorkloadError;
use lbsim_policies::{AntColonyParams, BalancingPolicy, PolicyError, PolicyKind, Server};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error(transparent)]
    Metrics(#[from] MetricsError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Workload(#[from] WorkloadError),
    #[error("unknown policy '{0}'")]
    UnknownPolicy(String),
}

/// Build a pool with ids `0..n` in order, one server per capability.
pub fn build_pool(capabilities: &[u32]) -> Vec<Server> {
    capabilities
        .iter()
        .enumerate()
        .map(|(id, &cap)| Server::new(id as u32, cap))
        .collect()
}

/// Build a pool of `n` servers with capability 1.
pub fn build_uniform_pool(n: u32) -> Vec<Server> {
    (0..n).map(Server::uncapacitated).collect()
}

/// Timing of one measured run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub elapsed_us: f64,
    pub measured_secs: f64,
}

/// Runs policies against task batches and collects measurements.
pub struct SimulationDriver {
    servers: Vec<Server>,
    timing: TimingMode,
    seed: u64,
    ant_colony: AntColonyParams,
}

impl SimulationDriver {
    pub fn new(servers: Vec<Server>, timing: TimingMode) -> Self {
        Self {
            servers,
            timing,
            seed: 42,
            ant_colony: AntColonyParams::default(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Parameters for ant colony runs. They are checked when a run builds
    /// the policy, so a bad set surfaces as an error from [`run`](Self::run).
    pub fn with_ant_colony_params(mut self, params: AntColonyParams) -> Self {
        self.ant_colony = params;
        self
    }

    /// The reference pool. Untouched by runs.
    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    pub fn timing(&self) -> TimingMode {
        self.timing
    }

    /// Seed handed to `kind` for batch `batch_index`.
    ///
    /// Distinct per (policy, batch) so no two runs share a random stream.
    pub fn policy_seed(&self, kind: PolicyKind, batch_index: usize) -> u64 {
        self.seed
            .wrapping_add((kind.index() as u64) << 32)
            .wrapping_add(batch_index as u64)
    }

    /// Run a built-in policy on a fresh copy of the pool.
    pub fn run(&self, kind: PolicyKind, task_loads: &[f64]) -> Result<RunMetrics, SimulationError> {
        self.run_seeded(kind, task_loads, self.policy_seed(kind, 0))
    }

    fn run_seeded(
        &self,
        kind: PolicyKind,
        task_loads: &[f64],
        seed: u64,
    ) -> Result<RunMetrics, SimulationError> {
        let mut policy = kind.build(self.servers.clone(), seed, self.ant_colony)?;
        self.run_policy(kind, policy.as_mut(), task_loads)
    }

    /// Run an already-built policy.
    ///
    /// The policy should be bound to a copy of [`servers`](Self::servers);
    /// this is the entry point for policies with an injected random source.
    pub fn run_policy(
        &self,
        kind: PolicyKind,
        policy: &mut dyn BalancingPolicy,
        task_loads: &[f64],
    ) -> Result<RunMetrics, SimulationError> {
        info!(
            policy = %kind,
            tasks = task_loads.len(),
            timing = %self.timing,
            "starting run"
        );

        let measurement = self.measure(policy, task_loads)?;
        let metrics = RunMetrics::from_pool(
            kind,
            self.timing,
            task_loads,
            measurement.elapsed_us,
            measurement.measured_secs,
            policy.servers(),
            policy.custom_metrics(),
        );

        if metrics.throughput.is_none() {
            warn!(
                policy = %kind,
                tasks = task_loads.len(),
                "run took no measurable time; throughput undefined"
            );
        }
        info!(
            policy = %kind,
            elapsed_us = metrics.elapsed_us,
            total_load = metrics.total_load,
            "run complete"
        );
        Ok(metrics)
    }

    /// Feed `task_loads` to `policy` and time it.
    pub fn measure(
        &self,
        policy: &mut dyn BalancingPolicy,
        task_loads: &[f64],
    ) -> Result<Measurement, PolicyError> {
        if policy.servers().is_empty() {
            return Err(PolicyError::EmptyServerPool);
        }
        match self.timing {
            TimingMode::WallClock => {
                let start = Instant::now();
                policy.balance_load(task_loads)?;
                let elapsed = start.elapsed();
                Ok(Measurement {
                    elapsed_us: elapsed.as_secs_f64() * 1e6,
                    measured_secs: elapsed.as_secs_f64(),
                })
            }
            TimingMode::Simulated => {
                let mut clock = SimClock::new();
                for weight in task_loads {
                    policy.balance_load(std::slice::from_ref(weight))?;
                    clock.advance_by_secs(1);
                }
                Ok(Measurement {
                    elapsed_us: clock.now_us() as f64,
                    measured_secs: clock.now_secs(),
                })
            }
        }
    }

    /// Run every policy in `kinds` against every batch, in order.
    pub fn compare(
        &self,
        name: &str,
        kinds: &[PolicyKind],
        batches: &[Vec<f64>],
    ) -> Result<ComparisonReport, SimulationError> {
        let mut rows = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            let mut runs = Vec::with_capacity(batches.len());
            for (batch_index, batch) in batches.iter().enumerate() {
                let seed = self.policy_seed(kind, batch_index);
                debug!(policy = %kind, batch_index, seed, "running batch");
                runs.push(self.run_seeded(kind, batch, seed)?);
            }
            rows.push(PolicyRow { policy: kind, runs });
        }

        Ok(ComparisonReport {
            name: name.to_string(),
            timing: self.timing,
            batch_sizes: batches.iter().map(Vec::len).collect(),
            rows,
        })
    }
}
