//! Load-balancing policy trait definitions.
//!
//! Every policy implements [`BalancingPolicy`]. A policy instance is bound to
//! its own copy of the server pool at construction and mutates only that copy.

use crate::server::Server;
use std::collections::HashMap;
use thiserror::Error;

/// Errors a policy reports instead of indexing out of range or assigning
/// nonsensical work.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolicyError {
    #[error("server pool is empty")]
    EmptyServerPool,
    #[error("task {index} has invalid weight {weight} (must be finite and > 0)")]
    InvalidTaskWeight { index: usize, weight: f64 },
    #[error("invalid policy parameter: {0}")]
    InvalidParameter(String),
}

/// The core load-balancing policy trait.
///
/// The driver calls [`balance_load`](BalancingPolicy::balance_load) with a
/// batch of task weights. The policy assigns each weight to one of its bound
/// servers, in input order.
pub trait BalancingPolicy: Send {
    /// Assign every task in `task_loads` to a server.
    ///
    /// An empty batch is a no-op. Loads already on the servers (from an
    /// earlier call on the same instance) are kept.
    fn balance_load(&mut self, task_loads: &[f64]) -> Result<(), PolicyError>;

    /// The policy's private server pool, in id order.
    fn servers(&self) -> &[Server];

    /// Stable machine-readable name.
    fn name(&self) -> &str;

    /// Optional: policy-specific metrics to include in output.
    fn custom_metrics(&self) -> HashMap<String, f64> {
        HashMap::new()
    }
}

/// Check the pool and batch before any assignment is made.
///
/// The pool is checked first, so an empty pool is an error even when the
/// batch is empty too.
pub fn validate_inputs(servers: &[Server], task_loads: &[f64]) -> Result<(), PolicyError> {
    if servers.is_empty() {
        return Err(PolicyError::EmptyServerPool);
    }
    if let Some((index, &weight)) = task_loads
        .iter()
        .enumerate()
        .find(|(_, w)| !(w.is_finite() && **w > 0.0))
    {
        return Err(PolicyError::InvalidTaskWeight { index, weight });
    }
    Ok(())
}

/// Position of the least-loaded server.
///
/// Scans in pool order and keeps the first strict minimum, so ties go to the
/// lowest id. Returns `None` for an empty pool.
pub fn least_loaded_position(servers: &[Server]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (pos, server) in servers.iter().enumerate() {
        match best {
            Some((_, min)) if server.load() >= min => {}
            _ => best = Some((pos, server.load())),
        }
    }
    best.map(|(pos, _)| pos)
}

/// Sum of accumulated load across a pool.
pub fn total_load(servers: &[Server]) -> f64 {
    servers.iter().map(Server::load).sum()
}

/// Sum of capabilities across a pool.
pub fn total_capability(servers: &[Server]) -> f64 {
    servers.iter().map(|s| s.capability() as f64).sum()
}
