//! Built-in load-distribution policies for lbsim.
//!
//! This crate provides the [`BalancingPolicy`] trait, the [`Server`] model and
//! five interchangeable policies:
//!
//! | Policy | Strategy | Uses randomness |
//! |--------|----------|-----------------|
//! | [`RandomAssignment`] | Uniform draw per task | yes |
//! | [`RoundRobin`] | Fixed circular order | no |
//! | [`WeightedRoundRobin`] | Cursor jumps to least-loaded after each task | no |
//! | [`ActiveClustering`] | Fresh least-loaded scan per task | no |
//! | [`AntColony`] | Pheromone-guided roulette selection | yes |

pub mod active_clustering;
pub mod ant_colony;
pub mod random;
pub mod round_robin;
pub mod server;
pub mod traits;
pub mod weighted_round_robin;

pub use active_clustering::ActiveClustering;
pub use ant_colony::{AntColony, AntColonyParams, PheromoneMatrix};
pub use random::RandomAssignment;
pub use round_robin::RoundRobin;
pub use server::Server;
pub use traits::*;
pub use weighted_round_robin::WeightedRoundRobin;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The built-in policies, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    Random,
    RoundRobin,
    WeightedRoundRobin,
    ActiveClustering,
    AntColony,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 5] = [
        PolicyKind::Random,
        PolicyKind::RoundRobin,
        PolicyKind::WeightedRoundRobin,
        PolicyKind::ActiveClustering,
        PolicyKind::AntColony,
    ];

    /// Machine-readable name, as accepted by [`policy_by_name`].
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::Random => "random",
            PolicyKind::RoundRobin => "round_robin",
            PolicyKind::WeightedRoundRobin => "weighted_round_robin",
            PolicyKind::ActiveClustering => "active_clustering",
            PolicyKind::AntColony => "ant_colony",
        }
    }

    /// Name used in report tables.
    pub fn display_name(&self) -> &'static str {
        match self {
            PolicyKind::Random => "Random",
            PolicyKind::RoundRobin => "Round-Robin",
            PolicyKind::WeightedRoundRobin => "Weighted Round-Robin",
            PolicyKind::ActiveClustering => "Active Clustering",
            PolicyKind::AntColony => "Ant Colony Optimization",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        PolicyKind::ALL.into_iter().find(|k| k.as_str() == name)
    }

    /// Position in [`PolicyKind::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Whether the policy draws from its random source.
    pub fn is_stochastic(&self) -> bool {
        matches!(self, PolicyKind::Random | PolicyKind::AntColony)
    }

    /// Build a fresh instance bound to `servers`.
    ///
    /// `seed` feeds the policy's own random source; deterministic policies
    /// ignore it. `ant_colony` is only checked when building the ant colony.
    pub fn build(
        &self,
        servers: Vec<Server>,
        seed: u64,
        ant_colony: AntColonyParams,
    ) -> Result<Box<dyn BalancingPolicy>, PolicyError> {
        Ok(match self {
            PolicyKind::Random => Box::new(RandomAssignment::new(servers, seed)),
            PolicyKind::RoundRobin => Box::new(RoundRobin::new(servers)),
            PolicyKind::WeightedRoundRobin => Box::new(WeightedRoundRobin::new(servers)),
            PolicyKind::ActiveClustering => Box::new(ActiveClustering::new(servers)),
            PolicyKind::AntColony => Box::new(AntColony::with_params(
                servers,
                ChaCha8Rng::seed_from_u64(seed),
                ant_colony,
            )?),
        })
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Create a policy by name with default parameters.
pub fn policy_by_name(
    name: &str,
    servers: Vec<Server>,
    seed: u64,
) -> Option<Box<dyn BalancingPolicy>> {
    let kind = PolicyKind::from_name(name)?;
    kind.build(servers, seed, AntColonyParams::default()).ok()
}

/// List all available built-in policy names.
pub fn available_policies() -> Vec<&'static str> {
    PolicyKind::ALL.iter().map(PolicyKind::as_str).collect()
}
