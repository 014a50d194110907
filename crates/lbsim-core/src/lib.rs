//! lbsim: simulator for comparing load-distribution policies.
//!
//! This crate drives the policies from `lbsim-policies` against batches of
//! task weights and measures execution time, assigned load and throughput
//! per policy.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐     ┌───────────┐     ┌──────────────┐
//! │ Workload │────▶│  Driver   │────▶│   Metrics    │
//! │ (batches)│     │ (timing)  │     │  & Reports   │
//! └──────────┘     └─────┬─────┘     └──────────────┘
//!                        │ fresh copy of the pool per run
//!                ┌───────┴───────┐
//!                │    Policy     │
//!                └───────┬───────┘
//!          ┌─────────────┼─────────────┐
//!          ▼             ▼             ▼
//!    ┌──────────┐  ┌──────────┐  ┌──────────┐
//!    │ Server 0 │  │ Server 1 │  │ Server N │
//!    └──────────┘  └──────────┘  └──────────┘
//! ```

pub mod clock;
pub mod config;
pub mod driver;
pub mod metrics;
pub mod workload;

// Re-export key types for convenience.
pub use clock::{SimClock, TimingMode};
pub use config::{CapabilityMode, SimConfig};
pub use driver::{build_pool, build_uniform_pool, SimulationDriver, SimulationError};
pub use metrics::{ComparisonReport, RunMetrics};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::Path;

/// Build the driver described by `config`.
///
/// Capabilities are drawn from a stream seeded by the configured seed, so the
/// same config always yields the same pool.
pub fn build_driver(config: &SimConfig) -> Result<SimulationDriver, SimulationError> {
    config.validate()?;
    let servers = match config.cluster.capabilities {
        CapabilityMode::Uniform => build_uniform_pool(config.cluster.num_servers),
        CapabilityMode::Random => {
            let mut rng = ChaCha8Rng::seed_from_u64(config.simulation.seed);
            let caps = workload::generate_capabilities(
                &mut rng,
                config.cluster.num_servers as usize,
                config.cluster.min_capability,
                config.cluster.max_capability,
            )?;
            build_pool(&caps)
        }
    };

    Ok(SimulationDriver::new(servers, config.simulation.timing)
        .with_seed(config.simulation.seed)
        .with_ant_colony_params(config.ant_colony_params()))
}

/// Task batches described by `config`: the workload file if one is set,
/// otherwise one synthetic batch per configured size.
pub fn build_batches(config: &SimConfig) -> Result<Vec<Vec<f64>>, SimulationError> {
    if let Some(path) = &config.workload.path {
        return Ok(vec![workload::load_task_loads(Path::new(path))?]);
    }

    // Offset from the capability stream so task weights are independent of it.
    let mut rng = ChaCha8Rng::seed_from_u64(config.simulation.seed.wrapping_add(1));
    config
        .workload
        .batch_sizes
        .iter()
        .map(|&size| {
            workload::generate_task_loads(
                &mut rng,
                size,
                config.workload.min_task_load,
                config.workload.max_task_load,
            )
            .map_err(SimulationError::from)
        })
        .collect()
}

/// Run a single policy against `task_loads` with the pool `config` describes.
pub fn run_policy(
    config: &SimConfig,
    policy_name: &str,
    task_loads: &[f64],
) -> Result<RunMetrics, SimulationError> {
    let kind = lbsim_policies::PolicyKind::from_name(policy_name)
        .ok_or_else(|| SimulationError::UnknownPolicy(policy_name.to_string()))?;
    build_driver(config)?.run(kind, task_loads)
}

/// Run the full comparison `config` describes.
pub fn run_comparison(config: &SimConfig) -> Result<ComparisonReport, SimulationError> {
    let driver = build_driver(config)?;
    let batches = build_batches(config)?;
    driver.compare(&config.simulation.name, &config.policy_kinds(), &batches)
}
