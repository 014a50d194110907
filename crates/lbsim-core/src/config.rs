//! TOML configuration parsing for lbsim.
//!
//! Defines the configuration schema for comparison runs: server pool shape,
//! workload batches, which policies to run, timing mode and ACO parameters.
//! Every section is optional; [`SimConfig::default`] reproduces the stock
//! comparison of 20 servers against batches of 100, 1000 and 10000 tasks.

use crate::clock::TimingMode;
use lbsim_policies::{AntColonyParams, PolicyKind};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub simulation: SimulationSection,
    #[serde(default)]
    pub cluster: ClusterSection,
    #[serde(default)]
    pub workload: WorkloadSection,
    #[serde(default)]
    pub policies: PoliciesSection,
    #[serde(default)]
    pub ant_colony: AntColonySection,
}

/// General simulation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSection {
    /// Human-readable name for this simulation.
    #[serde(default = "default_sim_name")]
    pub name: String,
    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// How execution time is measured.
    #[serde(default)]
    pub timing: TimingMode,
}

fn default_sim_name() -> String {
    "simulation".to_string()
}

fn default_seed() -> u64 {
    42
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            name: default_sim_name(),
            seed: default_seed(),
            timing: TimingMode::default(),
        }
    }
}

/// How server capabilities are assigned when the pool is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityMode {
    /// Every server has capability 1.
    Uniform,
    /// Capabilities drawn uniformly from `[min_capability, max_capability]`.
    #[default]
    Random,
}

/// Server pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSection {
    /// Number of servers.
    #[serde(default = "default_num_servers")]
    pub num_servers: u32,
    #[serde(default)]
    pub capabilities: CapabilityMode,
    #[serde(default = "default_min_capability")]
    pub min_capability: u32,
    #[serde(default = "default_max_capability")]
    pub max_capability: u32,
}

fn default_num_servers() -> u32 {
    20
}
fn default_min_capability() -> u32 {
    1
}
fn default_max_capability() -> u32 {
    100
}

impl Default for ClusterSection {
    fn default() -> Self {
        Self {
            num_servers: default_num_servers(),
            capabilities: CapabilityMode::default(),
            min_capability: default_min_capability(),
            max_capability: default_max_capability(),
        }
    }
}

/// Workload source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadSection {
    /// Task count for each synthetic batch.
    #[serde(default = "default_batch_sizes")]
    pub batch_sizes: Vec<usize>,
    /// Lower bound for synthetic task weights.
    #[serde(default = "default_min_task_load")]
    pub min_task_load: f64,
    /// Upper bound for synthetic task weights.
    #[serde(default = "default_max_task_load")]
    pub max_task_load: f64,
    /// Workload file (JSONL, one weight per line). Replaces synthetic batches.
    pub path: Option<String>,
}

fn default_batch_sizes() -> Vec<usize> {
    vec![100, 1000, 10000]
}
fn default_min_task_load() -> f64 {
    1.0
}
fn default_max_task_load() -> f64 {
    10.0
}

impl Default for WorkloadSection {
    fn default() -> Self {
        Self {
            batch_sizes: default_batch_sizes(),
            min_task_load: default_min_task_load(),
            max_task_load: default_max_task_load(),
            path: None,
        }
    }
}

/// Which policies to compare, in report order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoliciesSection {
    #[serde(default = "default_policy_names")]
    pub names: Vec<String>,
}

fn default_policy_names() -> Vec<String> {
    PolicyKind::ALL.iter().map(|k| k.as_str().to_string()).collect()
}

impl Default for PoliciesSection {
    fn default() -> Self {
        Self {
            names: default_policy_names(),
        }
    }
}

/// Ant colony parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AntColonySection {
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_beta")]
    pub beta: f64,
    #[serde(default = "default_rho")]
    pub rho: f64,
    #[serde(default = "default_q")]
    pub q: f64,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
}

fn default_alpha() -> f64 {
    1.0
}
fn default_beta() -> f64 {
    2.0
}
fn default_rho() -> f64 {
    0.5
}
fn default_q() -> f64 {
    1.0
}
fn default_iterations() -> u32 {
    100
}

impl Default for AntColonySection {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            beta: default_beta(),
            rho: default_rho(),
            q: default_q(),
            iterations: default_iterations(),
        }
    }
}

impl From<AntColonySection> for AntColonyParams {
    fn from(s: AntColonySection) -> Self {
        AntColonyParams {
            alpha: s.alpha,
            beta: s.beta,
            rho: s.rho,
            q: s.q,
            iterations: s.iterations,
        }
    }
}

impl SimConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cluster.num_servers == 0 {
            return Err(ConfigError::Validation(
                "num_servers must be > 0".to_string(),
            ));
        }
        if self.cluster.min_capability == 0 {
            return Err(ConfigError::Validation(
                "min_capability must be > 0".to_string(),
            ));
        }
        if self.cluster.min_capability > self.cluster.max_capability {
            return Err(ConfigError::Validation(format!(
                "min_capability ({}) must be <= max_capability ({})",
                self.cluster.min_capability, self.cluster.max_capability,
            )));
        }
        if self.workload.path.is_none() {
            if self.workload.batch_sizes.is_empty() {
                return Err(ConfigError::Validation(
                    "batch_sizes must not be empty".to_string(),
                ));
            }
            if self.workload.batch_sizes.contains(&0) {
                return Err(ConfigError::Validation(
                    "every batch size must be > 0".to_string(),
                ));
            }
        }
        if !(self.workload.min_task_load > 0.0
            && self.workload.min_task_load <= self.workload.max_task_load
            && self.workload.max_task_load.is_finite())
        {
            return Err(ConfigError::Validation(format!(
                "task load range must satisfy 0 < min ({}) <= max ({})",
                self.workload.min_task_load, self.workload.max_task_load,
            )));
        }
        if self.policies.names.is_empty() {
            return Err(ConfigError::Validation(
                "at least one policy must be listed".to_string(),
            ));
        }
        if let Some(unknown) = self
            .policies
            .names
            .iter()
            .find(|n| PolicyKind::from_name(n).is_none())
        {
            return Err(ConfigError::Validation(format!(
                "unknown policy '{}'",
                unknown
            )));
        }
        self.ant_colony_params()
            .validate()
            .map_err(|e| ConfigError::Validation(format!("ant_colony: {}", e)))?;
        Ok(())
    }

    /// Resolved policy list, in configured order.
    pub fn policy_kinds(&self) -> Vec<PolicyKind> {
        self.policies
            .names
            .iter()
            .filter_map(|n| PolicyKind::from_name(n))
            .collect()
    }

    /// Convert the ant colony section to the policy's parameters.
    pub fn ant_colony_params(&self) -> AntColonyParams {
        self.ant_colony.clone().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CONFIG: &str = r#"
[simulation]
name = "test-sim"
seed = 123
timing = "simulated"

[cluster]
num_servers = 8
capabilities = "uniform"

[workload]
batch_sizes = [10, 50]
min_task_load = 2.0
max_task_load = 4.0

[policies]
names = ["round_robin", "ant_colony"]

[ant_colony]
iterations = 10
rho = 0.25
"#;

    #[test]
    fn test_parse_config() {
        let config = SimConfig::from_str(SAMPLE_CONFIG).unwrap();
        assert_eq!(config.simulation.name, "test-sim");
        assert_eq!(config.simulation.seed, 123);
        assert_eq!(config.simulation.timing, TimingMode::Simulated);
        assert_eq!(config.cluster.num_servers, 8);
        assert_eq!(config.cluster.capabilities, CapabilityMode::Uniform);
        assert_eq!(config.workload.batch_sizes, vec![10, 50]);
        assert_eq!(
            config.policy_kinds(),
            vec![PolicyKind::RoundRobin, PolicyKind::AntColony]
        );

        let aco = config.ant_colony_params();
        assert_eq!(aco.iterations, 10);
        assert_eq!(aco.rho, 0.25);
        assert_eq!(aco.beta, 2.0);
    }

    #[test]
    fn test_defaults_match_stock_comparison() {
        let config = SimConfig::from_str("").unwrap();
        assert_eq!(config.simulation.seed, 42);
        assert_eq!(config.simulation.timing, TimingMode::WallClock);
        assert_eq!(config.cluster.num_servers, 20);
        assert_eq!(config.cluster.min_capability, 1);
        assert_eq!(config.cluster.max_capability, 100);
        assert_eq!(config.workload.batch_sizes, vec![100, 1000, 10000]);
        assert_eq!(config.policy_kinds(), PolicyKind::ALL.to_vec());
        assert_eq!(config.ant_colony_params(), AntColonyParams::default());
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_zero_servers() {
        let toml = r#"
[cluster]
num_servers = 0
"#;
        assert!(SimConfig::from_str(toml).is_err());
    }

    #[test]
    fn test_validation_capability_range() {
        let toml = r#"
[cluster]
min_capability = 50
max_capability = 10
"#;
        assert!(SimConfig::from_str(toml).is_err());

        let toml = r#"
[cluster]
min_capability = 0
"#;
        assert!(SimConfig::from_str(toml).is_err());
    }

    #[test]
    fn test_validation_ant_colony() {
        assert!(SimConfig::from_str("[ant_colony]\nrho = 1.0\n").is_err());
        assert!(SimConfig::from_str("[ant_colony]\nq = 0.0\n").is_err());
        assert!(SimConfig::from_str("[ant_colony]\niterations = 0\n").is_err());
        match SimConfig::from_str("[ant_colony]\nalpha = nan\n") {
            Err(ConfigError::Validation(msg)) => assert!(msg.contains("alpha"), "{}", msg),
            other => panic!("Expected validation error, got {:?}", other),
        }
        assert!(SimConfig::from_str("[ant_colony]\nbeta = inf\n").is_err());
    }

    #[test]
    fn test_validation_batches() {
        assert!(SimConfig::from_str("[workload]\nbatch_sizes = []\n").is_err());
        assert!(SimConfig::from_str("[workload]\nbatch_sizes = [10, 0]\n").is_err());
        // A workload file replaces the synthetic batches.
        assert!(
            SimConfig::from_str("[workload]\nbatch_sizes = []\npath = \"tasks.jsonl\"\n").is_ok()
        );
    }

    #[test]
    fn test_validation_task_load_range() {
        assert!(SimConfig::from_str("[workload]\nmin_task_load = 0.0\n").is_err());
        assert!(
            SimConfig::from_str("[workload]\nmin_task_load = 5.0\nmax_task_load = 1.0\n").is_err()
        );
    }

    #[test]
    fn test_validation_unknown_policy() {
        let toml = r#"
[policies]
names = ["round_robin", "telepathy"]
"#;
        match SimConfig::from_str(toml) {
            Err(ConfigError::Validation(msg)) => assert!(msg.contains("telepathy")),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_timing_mode_is_parse_error() {
        match SimConfig::from_str("[simulation]\ntiming = \"sundial\"\n") {
            Err(ConfigError::Parse(_)) => {}
            other => panic!("Expected parse error, got {:?}", other),
        }
    }
}
