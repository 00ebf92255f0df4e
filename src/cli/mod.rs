//! The harness command-line interface.
//!
//! Entry point for all subcommands; resolves configuration (defaults, then
//! YAML file, then flags) and dispatches into the batch orchestration.

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::batch;
use crate::cli::args::{Command, HarnessArgs};
use crate::config::HarnessConfig;
use crate::errors::Result;
use crate::fixtures::FixtureStore;
use crate::synth::WorkloadKind;

pub mod args;

/// The main entry point for the CLI. Returns the process exit code.
pub fn run() -> i32 {
    let args = HarnessArgs::parse();
    init_tracing(args.verbose);

    match dispatch(args) {
        Ok(exit) => exit,
        Err(e) => {
            error!("{e}");
            eprintln!("{:?}", miette::Report::new(e));
            1
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Merge the resolved config from defaults, YAML file, and flags.
fn resolve_config(args: &HarnessArgs) -> Result<HarnessConfig> {
    let mut config = match &args.config {
        Some(path) => HarnessConfig::load(path)?,
        None => HarnessConfig::default(),
    };
    if let Some(root) = &args.root {
        config.dataset_root = root.clone();
    }
    if let Some(results) = &args.results {
        config.results_dir = results.clone();
    }
    if let Some(engine) = &args.engine {
        config.engine = engine.clone();
    }
    if args.keep_logs {
        config.keep_logs = true;
    }
    config.validate()?;
    Ok(config)
}

fn dispatch(args: HarnessArgs) -> Result<i32> {
    let config = resolve_config(&args)?;
    let store = FixtureStore::new(&config.dataset_root);

    match args.command {
        Command::Prepare { datasets, kinds } => {
            for dataset in &datasets {
                batch::prepare_dataset(&store, &config, dataset, &kinds)?;
            }
            Ok(0)
        }
        Command::Bench { datasets, kinds } => {
            batch::warn_on_empty_datasets(&store, &datasets);
            for dataset in &datasets {
                let report = batch::bench_dataset(&store, &config, dataset, &kinds)?;
                println!("report written to {}", report.display());
            }
            Ok(0)
        }
        Command::Verify { datasets, kind } => {
            batch::warn_on_empty_datasets(&store, &datasets);
            let mut mismatches = 0usize;
            for dataset in &datasets {
                let summary = batch::verify_dataset(&store, &config, dataset, kind)?;
                println!(
                    "{dataset}: {} fixtures, {} mismatches, {} without data (report: {})",
                    summary.fixtures,
                    summary.mismatches,
                    summary.no_data,
                    summary.report.display()
                );
                mismatches += summary.mismatches;
            }
            // A disagreement between strategies is a result, not an error,
            // but it must fail the batch exit status.
            Ok(if mismatches > 0 { 2 } else { 0 })
        }
        Command::Run { datasets } => {
            let prepare_kinds = [WorkloadKind::Construct, WorkloadKind::Correctness];
            let bench_kinds = [WorkloadKind::Construct];
            let mut mismatches = 0usize;
            for dataset in &datasets {
                batch::prepare_dataset(&store, &config, dataset, &prepare_kinds)?;
                batch::bench_dataset(&store, &config, dataset, &bench_kinds)?;
                let summary =
                    batch::verify_dataset(&store, &config, dataset, WorkloadKind::Correctness)?;
                mismatches += summary.mismatches;
            }
            Ok(if mismatches > 0 { 2 } else { 0 })
        }
    }
}
