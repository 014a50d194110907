//! lbsim CLI: compare load-distribution policies on synthetic workloads.

use clap::{Parser, Subcommand};
use lbsim_core::config::SimConfig;
use lbsim_core::clock::TimingMode;
use lbsim_core::{metrics, workload};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "lbsim",
    about = "Compare load-balancing policies on a simulated server pool",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single policy against one batch.
    Run {
        /// Path to TOML configuration file (defaults are used when omitted).
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Policy name.
        #[arg(short, long, default_value = "round_robin")]
        policy: String,
        /// Number of tasks (defaults to the last configured batch size).
        #[arg(short = 'n', long)]
        tasks: Option<usize>,
        /// Timing mode: wall_clock or simulated.
        #[arg(long)]
        timing: Option<String>,
        /// Output results to JSON file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compare policies across every configured batch.
    Compare {
        /// Path to TOML configuration file (defaults are used when omitted).
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Comma-separated list of policy names.
        #[arg(short = 'P', long, value_delimiter = ',')]
        policies: Vec<String>,
        /// Timing mode: wall_clock or simulated.
        #[arg(long)]
        timing: Option<String>,
        /// Output results to JSON file.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also print the total load each policy assigned per batch.
        #[arg(long)]
        show_load: bool,
    },
    /// Generate a synthetic workload file.
    GenWorkload {
        /// Number of tasks.
        #[arg(short = 'n', long)]
        count: usize,
        /// Minimum task weight.
        #[arg(long, default_value = "1.0")]
        min: f64,
        /// Maximum task weight.
        #[arg(long, default_value = "10.0")]
        max: f64,
        /// Random seed.
        #[arg(long, default_value = "42")]
        seed: u64,
        /// Output file path.
        #[arg(short, long)]
        output: PathBuf,
    },
    /// List available policies.
    ListPolicies,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(
                    "lbsim=info,lbsim_core=info,lbsim_policies=warn",
                )),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            policy,
            tasks,
            timing,
            output,
        } => {
            let mut sim_config = load_config(config.as_deref());
            apply_timing(&mut sim_config, timing.as_deref());

            if let Some(n) = tasks {
                sim_config.workload.path = None;
                sim_config.workload.batch_sizes = vec![n];
            } else if sim_config.workload.path.is_none() {
                let last = sim_config.workload.batch_sizes.last().copied();
                sim_config.workload.batch_sizes = last.into_iter().collect();
            }
            let task_loads = single_batch(&sim_config);

            let result = lbsim_core::run_policy(&sim_config, &policy, &task_loads)
                .unwrap_or_else(|e| {
                    eprintln!("Error running {}: {}", policy, e);
                    std::process::exit(1);
                });
            println!("{}", metrics::format_table(&result));

            if let Some(output_path) = output {
                write_json(&result, &output_path);
            }
        }
        Commands::Compare {
            config,
            policies,
            timing,
            output,
            show_load,
        } => {
            let mut sim_config = load_config(config.as_deref());
            apply_timing(&mut sim_config, timing.as_deref());
            if !policies.is_empty() {
                sim_config.policies.names = policies;
            }

            let report = lbsim_core::run_comparison(&sim_config).unwrap_or_else(|e| {
                eprintln!("Error running comparison: {}", e);
                std::process::exit(1);
            });
            println!("{}", metrics::format_comparison_table(&report));
            if show_load {
                println!("{}", metrics::format_load_table(&report));
            }

            if let Some(output_path) = output {
                write_json(&report, &output_path);
            }
        }
        Commands::GenWorkload {
            count,
            min,
            max,
            seed,
            output,
        } => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let loads = workload::generate_task_loads(&mut rng, count, min, max)
                .and_then(|loads| workload::write_task_loads(&loads, &output).map(|_| loads))
                .unwrap_or_else(|e| {
                    eprintln!("Error generating workload: {}", e);
                    std::process::exit(1);
                });
            println!("Generated {} tasks to {}", loads.len(), output.display());
        }
        Commands::ListPolicies => {
            println!("Available load-balancing policies:");
            for kind in lbsim_policies::PolicyKind::ALL {
                let seeded = if kind.is_stochastic() { " (seeded)" } else { "" };
                println!("  - {:<22} {}{}", kind.as_str(), kind.display_name(), seeded);
            }
        }
    }
}

fn load_config(path: Option<&Path>) -> SimConfig {
    match path {
        Some(p) => SimConfig::from_file(p).unwrap_or_else(|e| {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }),
        None => SimConfig::default(),
    }
}

fn apply_timing(config: &mut SimConfig, timing: Option<&str>) {
    if let Some(t) = timing {
        config.simulation.timing = t.parse::<TimingMode>().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });
    }
}

fn single_batch(config: &SimConfig) -> Vec<f64> {
    lbsim_core::build_batches(config)
        .unwrap_or_else(|e| {
            eprintln!("Error building workload: {}", e);
            std::process::exit(1);
        })
        .pop()
        .unwrap_or_default()
}

fn write_json<T: Serialize>(value: &T, path: &Path) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error encoding results: {}", e);
        std::process::exit(1);
    });
    std::fs::write(path, json).unwrap_or_else(|e| {
        eprintln!("Error writing output: {}", e);
        std::process::exit(1);
    });
    println!("Results written to {}", path.display());
}
