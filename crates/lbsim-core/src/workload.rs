//! Workload generation and workload files.
//!
//! Synthetic batches draw task weights uniformly from a real range and server
//! capabilities uniformly from an integer range. Workload files hold one task
//! weight per line as a JSON number (JSONL), so they can be produced by other
//! tools and replayed across runs.

use rand::Rng;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkloadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error at line {line}: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },
    #[error("Invalid task weight at line {line}: {weight}")]
    InvalidWeight { line: usize, weight: f64 },
    #[error("Failed to encode task weight: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Invalid range: {0}")]
    InvalidRange(String),
}

/// Draw `count` task weights uniformly from `[min, max)`.
///
/// `min == max` yields a constant batch.
pub fn generate_task_loads<R: Rng>(
    rng: &mut R,
    count: usize,
    min: f64,
    max: f64,
) -> Result<Vec<f64>, WorkloadError> {
    if !(min > 0.0 && min <= max && max.is_finite()) {
        return Err(WorkloadError::InvalidRange(format!(
            "task loads need 0 < min ({}) <= max ({})",
            min, max
        )));
    }
    if min == max {
        return Ok(vec![min; count]);
    }
    Ok((0..count).map(|_| rng.gen_range(min..max)).collect())
}

/// Draw `count` integer capabilities uniformly from `[min, max]`.
pub fn generate_capabilities<R: Rng>(
    rng: &mut R,
    count: usize,
    min: u32,
    max: u32,
) -> Result<Vec<u32>, WorkloadError> {
    if min == 0 || min > max {
        return Err(WorkloadError::InvalidRange(format!(
            "capabilities need 1 <= min ({}) <= max ({})",
            min, max
        )));
    }
    Ok((0..count).map(|_| rng.gen_range(min..=max)).collect())
}

/// Load task weights from a JSONL file. Blank lines are skipped.
pub fn load_task_loads(path: &Path) -> Result<Vec<f64>, WorkloadError> {
    let file = std::fs::File::open(path)?;
    parse_task_loads(BufReader::new(file))
}

/// Parse task weights from any JSONL reader.
pub fn parse_task_loads<B: BufRead>(reader: B) -> Result<Vec<f64>, WorkloadError> {
    let mut loads = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let weight: f64 = serde_json::from_str(trimmed).map_err(|source| WorkloadError::Parse {
            line: idx + 1,
            source,
        })?;
        if !(weight.is_finite() && weight > 0.0) {
            return Err(WorkloadError::InvalidWeight {
                line: idx + 1,
                weight,
            });
        }
        loads.push(weight);
    }
    Ok(loads)
}

/// Write task weights as JSONL.
pub fn write_task_loads(loads: &[f64], path: &Path) -> Result<(), WorkloadError> {
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    for weight in loads {
        writeln!(writer, "{}", serde_json::to_string(weight)?)?;
    }
    writer.flush()?;
    Ok(())
}
