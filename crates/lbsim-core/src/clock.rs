//! Timing for measured runs.
//!
//! A run is timed either against the wall clock or against a [`SimClock`]
//! that advances one simulated second per task, independent of how fast the
//! host machine is.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a run's execution time is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingMode {
    /// Real elapsed time around a single `balance_load` over the batch.
    #[default]
    WallClock,
    /// One task per `balance_load` call, one simulated second per task.
    Simulated,
}

impl TimingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimingMode::WallClock => "wall_clock",
            TimingMode::Simulated => "simulated",
        }
    }
}

impl fmt::Display for TimingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wall_clock" | "wall-clock" | "wallclock" => Ok(TimingMode::WallClock),
            "simulated" | "sim" => Ok(TimingMode::Simulated),
            other => Err(format!(
                "unknown timing mode '{}' (expected wall_clock or simulated)",
                other
            )),
        }
    }
}

/// Virtual simulation clock.
///
/// Time is tracked in microseconds so simulated and wall-clock runs report in
/// the same unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimClock {
    current_us: u64,
}

impl SimClock {
    /// Create a new clock starting at time zero.
    pub fn new() -> Self {
        Self { current_us: 0 }
    }

    /// Current time in microseconds.
    pub fn now_us(&self) -> u64 {
        self.current_us
    }

    /// Current time in (fractional) seconds.
    pub fn now_secs(&self) -> f64 {
        self.current_us as f64 / 1_000_000.0
    }

    /// Advance the clock by whole simulated seconds.
    pub fn advance_by_secs(&mut self, secs: u64) {
        self.current_us += secs * 1_000_000;
    }
}
