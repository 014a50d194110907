/// Integration tests for config-driven comparisons.
use lbsim_core::config::SimConfig;
use lbsim_core::metrics::{self, ComparisonReport};
use lbsim_core::{CapabilityMode, SimulationError, TimingMode};
use lbsim_policies::{total_capability, PolicyKind};

fn small_config(timing: &str) -> SimConfig {
    SimConfig::from_str(&format!(
        r#"
[simulation]
name = "driver-test"
seed = 7
timing = "{}"

[cluster]
num_servers = 6
capabilities = "random"
min_capability = 1
max_capability = 100

[workload]
batch_sizes = [20, 60]

[ant_colony]
iterations = 5
"#,
        timing
    ))
    .unwrap()
}

#[test]
fn test_comparison_covers_every_policy_and_batch() {
    let config = small_config("simulated");
    let report = lbsim_core::run_comparison(&config).unwrap();

    assert_eq!(report.name, "driver-test");
    assert_eq!(report.timing, TimingMode::Simulated);
    assert_eq!(report.batch_sizes, vec![20, 60]);
    let order: Vec<PolicyKind> = report.rows.iter().map(|r| r.policy).collect();
    assert_eq!(order, PolicyKind::ALL.to_vec());

    let durations = report.durations();
    for row in &durations {
        assert_eq!(row, &vec![20_000_000.0, 60_000_000.0]);
    }
    for row in &report.rows {
        for run in &row.runs {
            assert!(run.conserves_load(), "{}", row.policy);
        }
    }
}

#[test]
fn test_simulated_throughput_matches_formula() {
    let config = small_config("simulated");
    let driver = lbsim_core::build_driver(&config).unwrap();
    let capability = total_capability(driver.servers());
    let report = driver
        .compare("formula", &[PolicyKind::RoundRobin], &[vec![4.0; 10]])
        .unwrap();

    // 40 load over 10 simulated seconds
    let expected = 40.0 / 10.0 / capability;
    let got = report.rows[0].throughput().unwrap();
    assert!((got - expected).abs() < 1e-12);
}

#[test]
fn test_same_config_same_pool() {
    let config = small_config("wall_clock");
    let a = lbsim_core::build_driver(&config).unwrap();
    let b = lbsim_core::build_driver(&config).unwrap();
    assert_eq!(a.servers(), b.servers());
    assert!(a
        .servers()
        .iter()
        .all(|s| (1..=100).contains(&s.capability())));
}

#[test]
fn test_uniform_capabilities() {
    let mut config = small_config("wall_clock");
    config.cluster.capabilities = CapabilityMode::Uniform;
    let driver = lbsim_core::build_driver(&config).unwrap();
    assert!(driver.servers().iter().all(|s| s.capability() == 1));
}

#[test]
fn test_wall_clock_report_table() {
    let config = small_config("wall_clock");
    let report = lbsim_core::run_comparison(&config).unwrap();
    let table = metrics::format_comparison_table(&report);

    for kind in PolicyKind::ALL {
        assert!(table.contains(kind.display_name()), "missing {}", kind);
    }
    assert!(table.contains("Num Tasks: 20"));
    assert!(table.contains("Num Tasks: 60"));
}

#[test]
fn test_report_round_trips_through_json() {
    let config = small_config("simulated");
    let report = lbsim_core::run_comparison(&config).unwrap();
    let json = serde_json::to_string(&report).unwrap();
    let decoded: ComparisonReport = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded.rows.len(), report.rows.len());
    assert_eq!(decoded.durations(), report.durations());
}

#[test]
fn test_run_policy_by_name() {
    let config = small_config("simulated");
    let metrics = lbsim_core::run_policy(&config, "active_clustering", &[1.0, 2.0, 3.0]).unwrap();
    assert_eq!(metrics.policy, PolicyKind::ActiveClustering);
    assert_eq!(metrics.total_load, 6.0);

    match lbsim_core::run_policy(&config, "telepathy", &[1.0]) {
        Err(SimulationError::UnknownPolicy(name)) => assert_eq!(name, "telepathy"),
        other => panic!("Expected UnknownPolicy, got {:?}", other),
    }
}

#[test]
fn test_policy_subset_in_configured_order() {
    let mut config = small_config("simulated");
    config.policies.names = vec!["ant_colony".to_string(), "random".to_string()];
    let report = lbsim_core::run_comparison(&config).unwrap();
    let order: Vec<PolicyKind> = report.rows.iter().map(|r| r.policy).collect();
    assert_eq!(order, vec![PolicyKind::AntColony, PolicyKind::Random]);
}

#[test]
fn test_load_table_matches_offered_volume() {
    let config = small_config("simulated");
    let driver = lbsim_core::build_driver(&config).unwrap();
    let batches = lbsim_core::build_batches(&config).unwrap();
    let report = driver.compare("volume", &PolicyKind::ALL, &batches).unwrap();

    let offered: Vec<f64> = batches.iter().map(|b| b.iter().sum()).collect();
    for loads in report.total_loads() {
        for (got, want) in loads.iter().zip(&offered) {
            assert!((got - want).abs() < 1e-9);
        }
    }

    let table = metrics::format_load_table(&report);
    assert!(table.contains("Total Load"));
    assert!(table.contains(&format!("{:.2}", offered[1])));
}

#[test]
fn test_bad_ant_colony_config_rejected() {
    let mut config = small_config("simulated");
    config.ant_colony.alpha = f64::NAN;
    assert!(matches!(
        lbsim_core::run_comparison(&config),
        Err(SimulationError::Config(_))
    ));
}
