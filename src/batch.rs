//! Batch orchestration: prepare, bench, verify.
//!
//! Runs one workload at a time, sequentially. Per-fixture failures are
//! isolated: a malformed graph or a crashing engine run is logged and shows
//! up as `no data` without aborting the dataset. Only a missing engine
//! executable stops a batch.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::HarnessConfig;
use crate::driver::EngineRunner;
use crate::errors::Result;
use crate::fixtures::{fixture_name, FixtureStore};
use crate::graph::line_count;
use crate::oracle;
use crate::report::ReportWriter;
use crate::synth::{synthesize_workload, Strategy, WorkloadKind};

// Terminal colors for verdict output, enabled only on a tty.
const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";

fn colorize(text: &str, color: &str) -> String {
    if atty::is(atty::Stream::Stdout) {
        format!("{color}{text}{RESET}")
    } else {
        text.to_string()
    }
}

/// Outcome of a correctness suite over one dataset.
#[derive(Debug, Clone)]
pub struct VerifySummary {
    pub report: PathBuf,
    pub fixtures: usize,
    pub mismatches: usize,
    /// Fixtures with no verdict: a workload was missing or a run produced
    /// no timing line. Never counted as a mismatch.
    pub no_data: usize,
}

/// Distinct log path per `(dataset, graph, grammar, kind, strategy)` tuple.
fn run_log_path(
    config: &HarnessConfig,
    dataset: &str,
    graph: &str,
    grammar: &str,
    kind: WorkloadKind,
    strategy: Strategy,
) -> Result<PathBuf> {
    let dir = config.results_dir.join("logs").join(dataset);
    fs::create_dir_all(&dir).map_err(|e| crate::errors::HarnessError::io(&dir, e))?;
    Ok(dir.join(format!("{graph}_{grammar}_{kind}_{strategy}.log")))
}

/// Synthesize the requested workload kinds for every graph of a dataset.
///
/// Existing workload files are left untouched, so re-running preparation
/// after an interruption picks up where it stopped.
pub fn prepare_dataset(
    store: &FixtureStore,
    config: &HarnessConfig,
    dataset: &str,
    kinds: &[WorkloadKind],
) -> Result<()> {
    store.ensure_layout(&[dataset.to_string()])?;
    info!(dataset, "preparing workloads");

    for graph_path in store.graphs(dataset)? {
        let graph = fixture_name(&graph_path);
        let lines = line_count(&graph_path)?;
        if lines > config.graph_line_ceiling {
            info!(%graph, lines, "graph above line ceiling, skipping");
            continue;
        }
        for &kind in kinds {
            for strategy in Strategy::ALL {
                let target = store.workload_path(dataset, &graph, kind, strategy);
                if let Err(e) = synthesize_workload(&graph_path, &target, kind, strategy) {
                    // Isolate the broken fixture, keep preparing the rest.
                    warn!(%graph, %kind, %strategy, error = %e, "workload synthesis failed");
                }
            }
        }
        info!(%graph, "prepared");
    }
    Ok(())
}

/// Time every `(grammar, graph, strategy)` under the given kinds, streaming
/// rows into the dataset report as they are measured.
pub fn bench_dataset(
    store: &FixtureStore,
    config: &HarnessConfig,
    dataset: &str,
    kinds: &[WorkloadKind],
) -> Result<PathBuf> {
    let runner = EngineRunner::new(config);
    runner.ensure_engine()?;

    let mut report = ReportWriter::create(&config.results_dir, dataset, "bench")?;
    let empty = store.empty_graph()?;
    let graphs = store.graphs(dataset)?;

    for grammar_path in store.grammars(dataset)? {
        let grammar = fixture_name(&grammar_path);
        for &kind in kinds.iter().filter(|k| !k.is_correctness()) {
            report.timing_section(&grammar, kind)?;
            for graph_path in &graphs {
                let graph = fixture_name(graph_path);
                let mut measured = [None, None];
                for (slot, strategy) in Strategy::ALL.into_iter().enumerate() {
                    let queries = store.workload_path(dataset, &graph, kind, strategy);
                    if !queries.is_file() {
                        warn!(%graph, %grammar, %kind, %strategy, "workload missing, run `prepare` first");
                        continue;
                    }
                    let log = run_log_path(config, dataset, &graph, &grammar, kind, strategy)?;
                    info!(%graph, %grammar, %kind, %strategy, "benchmarking");
                    match runner.run_averaged(&empty, &grammar_path, &queries, &log) {
                        Ok(avg) => measured[slot] = avg.map(|a| a.mean_elapsed),
                        Err(e) => {
                            warn!(%graph, %grammar, %strategy, error = %e, "benchmark run failed")
                        }
                    }
                }
                report.timing_row(&graph, measured[0], measured[1])?;
            }
            report.end_section()?;
        }
    }
    info!(dataset, report = %report.path().display(), "benchmark suite finished");
    Ok(report.path().to_path_buf())
}

/// Run the correctness workload under both strategies for every
/// `(grammar, graph)` and record whether their path answers agree.
pub fn verify_dataset(
    store: &FixtureStore,
    config: &HarnessConfig,
    dataset: &str,
    kind: WorkloadKind,
) -> Result<VerifySummary> {
    let runner = EngineRunner::new(config);
    runner.ensure_engine()?;

    let mut report = ReportWriter::create(&config.results_dir, dataset, "correctness")?;
    let empty = store.empty_graph()?;
    let graphs = store.graphs(dataset)?;
    let mut fixtures = 0usize;
    let mut mismatches = 0usize;
    let mut no_data = 0usize;

    for grammar_path in store.grammars(dataset)? {
        let grammar = fixture_name(&grammar_path);
        report.verdict_section(&grammar, kind)?;
        for graph_path in &graphs {
            let graph = fixture_name(graph_path);
            let mut logs = Vec::with_capacity(2);
            let mut complete = true;
            for strategy in Strategy::ALL {
                let queries = store.workload_path(dataset, &graph, kind, strategy);
                if !queries.is_file() {
                    warn!(%graph, %grammar, %strategy, "workload missing, run `prepare` first");
                    complete = false;
                    continue;
                }
                let log = run_log_path(config, dataset, &graph, &grammar, kind, strategy)?;
                info!(%graph, %grammar, %strategy, "running correctness workload");
                // One run per strategy; the log is the oracle's input.
                match runner.run_once(&empty, &grammar_path, &queries, &log) {
                    Ok(result) => {
                        if result.elapsed.is_none() {
                            warn!(%graph, %grammar, %strategy, "run produced no timing line");
                            complete = false;
                        }
                        logs.push(log);
                    }
                    Err(e) => {
                        warn!(%graph, %grammar, %strategy, error = %e, "correctness run failed");
                        complete = false;
                    }
                }
            }

            // A verdict only exists when both strategies ran to completion;
            // a preparation or execution gap is `no data`, never a mismatch.
            let verdict = match (complete, logs.as_slice()) {
                (true, [brute, smart]) => Some(oracle::equivalent(brute, smart)?),
                _ => None,
            };
            fixtures += 1;
            match verdict {
                Some(true) => println!("{}: {graph} ({grammar})", colorize("EQUAL", GREEN)),
                Some(false) => {
                    mismatches += 1;
                    println!("{}: {graph} ({grammar})", colorize("MISMATCH", RED));
                }
                None => {
                    no_data += 1;
                    println!("{}: {graph} ({grammar})", colorize("NO DATA", YELLOW));
                }
            }
            report.verdict_row(&graph, verdict)?;

            if !config.keep_logs {
                for log in &logs {
                    let _ = fs::remove_file(log);
                }
            }
        }
        report.end_section()?;
    }

    info!(
        dataset,
        fixtures, mismatches, no_data, "correctness suite finished"
    );
    Ok(VerifySummary {
        report: report.path().to_path_buf(),
        fixtures,
        mismatches,
        no_data,
    })
}

/// Check that the store holds at least one grammar for each dataset; a
/// dataset without grammars benchmarks vacuously.
pub fn warn_on_empty_datasets(store: &FixtureStore, datasets: &[String]) {
    for dataset in datasets {
        match (store.graphs(dataset), store.grammars(dataset)) {
            (Ok(graphs), Ok(grammars)) => {
                if graphs.is_empty() {
                    warn!(dataset, "no graph fixtures found");
                }
                if grammars.is_empty() {
                    warn!(dataset, "no grammar fixtures found");
                }
            }
            _ => warn!(dataset, root = %store.root().display(), "dataset directory missing"),
        }
    }
}
