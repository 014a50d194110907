/// Integration tests for load-balancing policies driven through the harness.
use lbsim_core::clock::TimingMode;
use lbsim_core::{build_pool, build_uniform_pool, SimulationDriver};
use lbsim_policies::*;

fn uniform_tasks(n: usize, weight: f64) -> Vec<f64> {
    vec![weight; n]
}

fn mixed_tasks(n: usize) -> Vec<f64> {
    (0..n).map(|i| [1.0, 2.5, 4.0, 7.25, 9.5][i % 5]).collect()
}

#[test]
fn test_all_policies_conserve_load() {
    let driver = SimulationDriver::new(build_pool(&[3, 7, 1, 12, 5]), TimingMode::WallClock)
        .with_ant_colony_params(AntColonyParams {
            iterations: 10,
            ..AntColonyParams::default()
        });
    let tasks = mixed_tasks(200);

    for kind in PolicyKind::ALL {
        let metrics = driver.run(kind, &tasks).unwrap();
        assert!(
            metrics.conserves_load(),
            "{} assigned {} of {}",
            kind,
            metrics.total_load,
            metrics.offered_load
        );
    }
}

#[test]
fn test_all_policies_conserve_load_in_simulated_mode() {
    let driver = SimulationDriver::new(build_uniform_pool(4), TimingMode::Simulated)
        .with_ant_colony_params(AntColonyParams {
            iterations: 3,
            ..AntColonyParams::default()
        });
    let tasks = mixed_tasks(40);

    for kind in PolicyKind::ALL {
        let metrics = driver.run(kind, &tasks).unwrap();
        assert!(metrics.conserves_load(), "{}", kind);
        assert_eq!(metrics.elapsed_us, 40_000_000.0);
    }
}

#[test]
fn test_single_server_all_policies_identical() {
    let driver = SimulationDriver::new(build_pool(&[9]), TimingMode::WallClock);
    let tasks = mixed_tasks(23);
    let expected: f64 = tasks.iter().sum();

    for kind in PolicyKind::ALL {
        let metrics = driver.run(kind, &tasks).unwrap();
        assert_eq!(metrics.per_server_load.len(), 1);
        assert!((metrics.per_server_load[0] - expected).abs() < 1e-9, "{}", kind);
    }
}

#[test]
fn test_least_loaded_policies_balance_equal_tasks() {
    let driver = SimulationDriver::new(build_uniform_pool(5), TimingMode::WallClock);
    let tasks = uniform_tasks(103, 2.0);

    for kind in [PolicyKind::WeightedRoundRobin, PolicyKind::ActiveClustering] {
        let metrics = driver.run(kind, &tasks).unwrap();
        assert!(
            metrics.load_spread <= 2.0,
            "{} spread {}",
            kind,
            metrics.load_spread
        );
    }
}

#[test]
fn test_least_loaded_beats_random_on_spread() {
    let driver = SimulationDriver::new(build_uniform_pool(8), TimingMode::WallClock).with_seed(9);
    let tasks = mixed_tasks(400);

    let random = driver.run(PolicyKind::Random, &tasks).unwrap();
    let clustering = driver.run(PolicyKind::ActiveClustering, &tasks).unwrap();
    assert!(clustering.load_spread < random.load_spread);
    assert!(clustering.jains_fairness_index >= random.jains_fairness_index);
}

#[test]
fn test_round_robin_exact_sequence() {
    let driver = SimulationDriver::new(build_uniform_pool(3), TimingMode::WallClock);
    let metrics = driver
        .run(PolicyKind::RoundRobin, &[1.0, 10.0, 100.0, 2.0, 20.0, 200.0, 3.0])
        .unwrap();
    assert_eq!(metrics.per_server_load, vec![6.0, 30.0, 300.0]);
}

#[test]
fn test_seeded_comparisons_are_reproducible() {
    let driver = SimulationDriver::new(build_uniform_pool(6), TimingMode::Simulated)
        .with_seed(1234)
        .with_ant_colony_params(AntColonyParams {
            iterations: 4,
            ..AntColonyParams::default()
        });
    let batches = vec![mixed_tasks(30), mixed_tasks(60)];

    let a = driver.compare("a", &PolicyKind::ALL, &batches).unwrap();
    let b = driver.compare("b", &PolicyKind::ALL, &batches).unwrap();
    for (ra, rb) in a.rows.iter().zip(&b.rows) {
        for (ma, mb) in ra.runs.iter().zip(&rb.runs) {
            assert_eq!(ma.per_server_load, mb.per_server_load, "{}", ra.policy);
        }
    }
}

#[test]
fn test_ant_colony_reports_custom_metrics() {
    let driver = SimulationDriver::new(build_uniform_pool(3), TimingMode::WallClock)
        .with_ant_colony_params(AntColonyParams {
            iterations: 7,
            ..AntColonyParams::default()
        });
    let metrics = driver.run(PolicyKind::AntColony, &mixed_tasks(12)).unwrap();
    assert_eq!(metrics.custom_metrics["aco_iterations_run"], 7.0);
    assert!(metrics.custom_metrics["aco_min_pheromone"] > 0.0);
}
