//! Measurements for policy runs.
//!
//! A [`RunMetrics`] captures one policy against one batch: execution time,
//! total assigned load, throughput and how evenly the load landed. A
//! [`ComparisonReport`] arranges runs as a policy-by-batch table.

use crate::clock::TimingMode;
use lbsim_policies::{total_capability, total_load, PolicyKind, Server};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricsError {
    #[error("throughput is undefined for a zero-length run (time = {0}s)")]
    ZeroDurationThroughput(f64),
    #[error("throughput is undefined for a pool with zero total capability")]
    ZeroCapability,
}

/// Throughput of a pool: `total_load / time_secs / total_capability`.
///
/// Scaling every capability by `k` scales the result by `1 / k`.
pub fn throughput(servers: &[Server], time_secs: f64) -> Result<f64, MetricsError> {
    if !(time_secs > 0.0) {
        return Err(MetricsError::ZeroDurationThroughput(time_secs));
    }
    let capability = total_capability(servers);
    if capability <= 0.0 {
        return Err(MetricsError::ZeroCapability);
    }
    Ok(total_load(servers) / time_secs / capability)
}

/// Aggregated measurements for one policy run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetrics {
    pub policy: PolicyKind,
    pub timing: TimingMode,
    pub num_tasks: usize,
    /// Execution time in microseconds (real or simulated).
    pub elapsed_us: f64,
    /// Seconds used as the throughput denominator.
    pub measured_secs: f64,
    /// Sum of the task weights fed to the policy.
    pub offered_load: f64,
    /// Sum of the load found on the policy's pool afterwards.
    pub total_load: f64,
    /// `None` when the run took no measurable time.
    pub throughput: Option<f64>,

    // Distribution
    pub per_server_load: Vec<f64>,
    pub load_spread: f64,
    pub load_cv: f64,
    /// Jain's index over capability-normalised loads.
    pub jains_fairness_index: f64,

    // Custom policy metrics
    pub custom_metrics: HashMap<String, f64>,
}

impl RunMetrics {
    /// Build metrics from a finished policy's pool.
    pub fn from_pool(
        policy: PolicyKind,
        timing: TimingMode,
        task_loads: &[f64],
        elapsed_us: f64,
        measured_secs: f64,
        servers: &[Server],
        custom_metrics: HashMap<String, f64>,
    ) -> Self {
        let per_server_load: Vec<f64> = servers.iter().map(Server::load).collect();
        let normalised: Vec<f64> = servers
            .iter()
            .map(|s| s.load() / s.capability().max(1) as f64)
            .collect();

        Self {
            policy,
            timing,
            num_tasks: task_loads.len(),
            elapsed_us,
            measured_secs,
            offered_load: task_loads.iter().sum(),
            total_load: total_load(servers),
            throughput: throughput(servers, measured_secs).ok(),
            load_spread: load_spread(&per_server_load),
            load_cv: coefficient_of_variation(&per_server_load),
            jains_fairness_index: jains_fairness_index(&normalised),
            per_server_load,
            custom_metrics,
        }
    }

    /// Whether every offered unit of work ended up on some server.
    pub fn conserves_load(&self) -> bool {
        (self.total_load - self.offered_load).abs() <= 1e-9 * self.offered_load.max(1.0)
    }
}

/// One row of a comparison: a policy across every batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRow {
    pub policy: PolicyKind,
    pub runs: Vec<RunMetrics>,
}

impl PolicyRow {
    /// Throughput of the last batch, which is what the report shows.
    pub fn throughput(&self) -> Option<f64> {
        self.runs.last().and_then(|r| r.throughput)
    }
}

/// Policy-by-batch comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub name: String,
    pub timing: TimingMode,
    pub batch_sizes: Vec<usize>,
    pub rows: Vec<PolicyRow>,
}

impl ComparisonReport {
    /// `[policy][batch] -> elapsed microseconds`.
    pub fn durations(&self) -> Vec<Vec<f64>> {
        self.rows
            .iter()
            .map(|row| row.runs.iter().map(|r| r.elapsed_us).collect())
            .collect()
    }

    /// `[policy][batch] -> total load assigned across the pool`.
    pub fn total_loads(&self) -> Vec<Vec<f64>> {
        self.rows
            .iter()
            .map(|row| row.runs.iter().map(|r| r.total_load).collect())
            .collect()
    }

    /// `[policy] -> throughput`.
    pub fn throughputs(&self) -> Vec<Option<f64>> {
        self.rows.iter().map(PolicyRow::throughput).collect()
    }

    pub fn row(&self, policy: PolicyKind) -> Option<&PolicyRow> {
        self.rows.iter().find(|r| r.policy == policy)
    }
}

/// Max minus min.
pub fn load_spread(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    max - min
}

/// Coefficient of variation (std / mean).
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if mean == 0.0 {
        return 0.0;
    }
    let variance = values.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt() / mean
}

/// Jain's fairness index: (sum(x_i))^2 / (n * sum(x_i^2)).
pub fn jains_fairness_index(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 1.0;
    }
    let n = values.len() as f64;
    let sum: f64 = values.iter().sum();
    let sum_sq: f64 = values.iter().map(|v| v.powi(2)).sum();
    if sum_sq == 0.0 {
        return 1.0;
    }
    (sum * sum) / (n * sum_sq)
}

const COLUMN: usize = 20;

fn format_throughput(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.6}", v),
        None => "n/a".to_string(),
    }
}

/// Format a single run as a pretty-printed table string.
pub fn format_table(metrics: &RunMetrics) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "\n{:=<70}\n",
        format!("  {} Results  ", metrics.policy.display_name())
    ));
    out.push_str(&format!(
        "  Tasks: {} | Timing: {} | Execution time: {:.1}us\n",
        metrics.num_tasks, metrics.timing, metrics.elapsed_us
    ));
    out.push_str(&format!("{:-<70}\n", "  Load  "));
    out.push_str(&format!(
        "  Offered: {:.2}  Assigned: {:.2}  Throughput: {}\n",
        metrics.offered_load,
        metrics.total_load,
        format_throughput(metrics.throughput),
    ));
    out.push_str(&format!("{:-<70}\n", "  Fairness  "));
    out.push_str(&format!(
        "  Spread: {:.2}  Load CV: {:.3}  Jain's index: {:.4}\n",
        metrics.load_spread, metrics.load_cv, metrics.jains_fairness_index,
    ));
    if !metrics.custom_metrics.is_empty() {
        out.push_str(&format!("{:-<70}\n", "  Policy  "));
        let mut keys: Vec<&String> = metrics.custom_metrics.keys().collect();
        keys.sort();
        for key in keys {
            out.push_str(&format!("  {}: {:.4}\n", key, metrics.custom_metrics[key]));
        }
    }
    out.push_str(&format!("{:=<70}\n", ""));
    out
}

/// Format the policy-by-batch comparison in fixed 20-character columns.
///
/// One execution-time column per batch size, then a trailing throughput
/// column taken from each policy's last batch.
pub fn format_comparison_table(report: &ComparisonReport) -> String {
    if report.rows.is_empty() {
        return String::from("No results to compare.\n");
    }

    let mut out = String::new();
    out.push_str(&format!("{:>w$}", "Load Balancing Algorithm", w = COLUMN));
    for size in &report.batch_sizes {
        out.push_str(&format!("{:>w$}", format!("Num Tasks: {}", size), w = COLUMN));
    }
    out.push_str(&format!("{:>w$}\n", "Throughput (Tasks/s)", w = COLUMN));

    out.push_str(&format!("{:>w$}", "", w = COLUMN));
    for _ in &report.batch_sizes {
        out.push_str(&format!("{:>w$}", "Execution Time (us)", w = COLUMN));
    }
    out.push_str(&format!("{:>w$}\n", "", w = COLUMN));

    for row in &report.rows {
        out.push_str(&format!("{:>w$}", row.policy.display_name(), w = COLUMN));
        for run in &row.runs {
            out.push_str(&format!("{:>w$.1}", run.elapsed_us, w = COLUMN));
        }
        out.push_str(&format!(
            "{:>w$}\n",
            format_throughput(row.throughput()),
            w = COLUMN
        ));
    }
    out
}

/// Format the total load each policy assigned per batch, in the same columns
/// as [`format_comparison_table`].
pub fn format_load_table(report: &ComparisonReport) -> String {
    if report.rows.is_empty() {
        return String::from("No results to compare.\n");
    }

    let mut out = String::new();
    out.push_str(&format!("{:>w$}", "Load Balancing Algorithm", w = COLUMN));
    for size in &report.batch_sizes {
        out.push_str(&format!("{:>w$}", format!("Num Tasks: {}", size), w = COLUMN));
    }
    out.push('\n');

    out.push_str(&format!("{:>w$}", "", w = COLUMN));
    for _ in &report.batch_sizes {
        out.push_str(&format!("{:>w$}", "Total Load", w = COLUMN));
    }
    out.push('\n');

    for (row, loads) in report.rows.iter().zip(report.total_loads()) {
        out.push_str(&format!("{:>w$}", row.policy.display_name(), w = COLUMN));
        for load in loads {
            out.push_str(&format!("{:>w$.2}", load, w = COLUMN));
        }
        out.push('\n');
    }
    out
}
