/// Integration tests for workload files.
use lbsim_core::config::SimConfig;
use lbsim_core::workload::{self, WorkloadError};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("lbsim-{}-{}.jsonl", name, std::process::id()))
}

#[test]
fn test_written_workload_loads_back() {
    let path = temp_path("roundtrip");
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let loads = workload::generate_task_loads(&mut rng, 250, 1.0, 10.0).unwrap();

    workload::write_task_loads(&loads, &path).unwrap();
    let loaded = workload::load_task_loads(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded, loads);
}

#[test]
fn test_missing_file() {
    let path = temp_path("does-not-exist");
    match workload::load_task_loads(&path) {
        Err(WorkloadError::Io(_)) => {}
        other => panic!("Expected IO error, got {:?}", other),
    }
}

#[test]
fn test_config_workload_file_replaces_batches() {
    let path = temp_path("config");
    workload::write_task_loads(&[3.0, 3.0, 3.0, 3.0], &path).unwrap();

    let config = SimConfig::from_str(&format!(
        r#"
[simulation]
timing = "simulated"

[cluster]
num_servers = 2
capabilities = "uniform"

[workload]
path = "{}"

[policies]
names = ["round_robin"]
"#,
        path.display().to_string().replace('\\', "\\\\")
    ))
    .unwrap();

    let report = lbsim_core::run_comparison(&config).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(report.batch_sizes, vec![4]);
    let run = &report.rows[0].runs[0];
    assert_eq!(run.per_server_load, vec![6.0, 6.0]);
    assert_eq!(run.total_load, 12.0);
    // 12 load / 4 s / 2 capability
    assert_eq!(run.throughput, Some(1.5));
}
