//! Command-line arguments and subcommands for the harness.
//!
//! Uses `clap` with its "derive" feature for a declarative, type-safe
//! argument structure. Flags override values from the optional YAML config.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::synth::WorkloadKind;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "cfpq-bench",
    version,
    about = "Benchmark and correctness harness for dynamic context-free path query engines."
)]
pub struct HarnessArgs {
    /// Optional YAML config file; flags below override its values.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Root of the fixture store.
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Directory receiving per-dataset reports and run logs.
    #[arg(long, global = true)]
    pub results: Option<PathBuf>,

    /// Path to the engine executable.
    #[arg(long, global = true)]
    pub engine: Option<PathBuf>,

    /// Retain per-run engine logs.
    #[arg(long, global = true)]
    pub keep_logs: bool,

    /// Increase log verbosity (-v: debug, -vv: trace).
    #[arg(short, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Synthesize query workloads for the named datasets.
    Prepare {
        /// Dataset names under the store root.
        #[arg(required = true)]
        datasets: Vec<String>,

        /// Workload kinds to synthesize.
        #[arg(long, value_enum, value_delimiter = ',',
              default_values_t = vec![WorkloadKind::Construct, WorkloadKind::Correctness])]
        kinds: Vec<WorkloadKind>,
    },
    /// Run the timing suite and write per-dataset reports.
    Bench {
        #[arg(required = true)]
        datasets: Vec<String>,

        /// Timing workload kinds to run.
        #[arg(long, value_enum, value_delimiter = ',',
              default_values_t = vec![WorkloadKind::Construct])]
        kinds: Vec<WorkloadKind>,
    },
    /// Run the correctness suite and record equivalence verdicts.
    Verify {
        #[arg(required = true)]
        datasets: Vec<String>,

        /// Correctness workload kind to verify.
        #[arg(long, value_enum, default_value_t = WorkloadKind::Correctness)]
        kind: WorkloadKind,
    },
    /// Prepare, bench, and verify in one pass.
    Run {
        #[arg(required = true)]
        datasets: Vec<String>,
    },
}
