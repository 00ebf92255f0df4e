//! Execution of the external engine.
//!
//! The engine is an opaque executable invoked as
//! `engine <graph> <grammar> <queries>` with stdout captured to a per-run
//! log file. Its exit status is never authoritative: a run succeeded iff
//! the log contains a parseable timing line, and a run without one is a
//! soft failure that is excluded from averaging, not a hard error.

use std::fs::{self, File};
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::HarnessConfig;
use crate::errors::{HarnessError, Result};
use crate::graph::line_count;
use crate::metrics::{parse_log, RunResult};

/// Kill a timed-out engine run together with any workers it spawned.
fn kill_process_group(child: &mut Child) {
    // The child was placed in its own group at spawn, so its pid is the pgid.
    unsafe {
        libc::kill(-(child.id() as libc::pid_t), libc::SIGKILL);
    }
    let _ = child.kill();
    let _ = child.wait();
}

/// Aggregate over the repeated runs of one workload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Averaged {
    /// Mean elapsed seconds over runs that produced a timing line.
    pub mean_elapsed: f64,
    /// Iteration count of the last successful run.
    pub iterations: u64,
    pub successful: u32,
    pub attempted: u32,
}

/// Drives engine invocations under one configuration.
#[derive(Debug, Clone)]
pub struct EngineRunner {
    config: HarnessConfig,
}

impl EngineRunner {
    pub fn new(config: &HarnessConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    fn engine(&self) -> &Path {
        &self.config.engine
    }

    /// Fail fast if the engine executable is absent. Missing tooling is the
    /// one fatal error class: everything else is isolated per fixture.
    pub fn ensure_engine(&self) -> Result<()> {
        if self.engine().is_file() {
            Ok(())
        } else {
            Err(HarnessError::EngineMissing {
                path: self.engine().to_path_buf(),
            })
        }
    }

    /// One engine invocation; stdout goes to `log_path`.
    pub fn run_once(
        &self,
        graph: &Path,
        grammar: &Path,
        queries: &Path,
        log_path: &Path,
    ) -> Result<RunResult> {
        let log = File::create(log_path).map_err(|e| HarnessError::io(log_path, e))?;
        let mut cmd = Command::new(self.engine());
        cmd.arg(graph)
            .arg(grammar)
            .arg(queries)
            .stdout(Stdio::from(log))
            .stderr(Stdio::null());
        // Engines may be wrapper scripts with workers of their own; give each
        // invocation its own process group so a timeout kill reaches them all.
        cmd.process_group(0);
        let mut child = cmd.spawn().map_err(|e| HarnessError::EngineSpawn {
            path: self.engine().to_path_buf(),
            source: e,
        })?;

        match self.config.run_timeout() {
            None => {
                child
                    .wait()
                    .map_err(|e| HarnessError::io(self.engine(), e))?;
            }
            Some(limit) => {
                let started = Instant::now();
                loop {
                    let status = child
                        .try_wait()
                        .map_err(|e| HarnessError::io(self.engine(), e))?;
                    if status.is_some() {
                        break;
                    }
                    if started.elapsed() >= limit {
                        warn!(
                            engine = %self.engine().display(),
                            queries = %queries.display(),
                            "engine exceeded {}s timeout, killing",
                            limit.as_secs()
                        );
                        kill_process_group(&mut child);
                        break;
                    }
                    thread::sleep(Duration::from_millis(25));
                }
            }
        }

        // Exit status deliberately ignored; the timing line decides.
        parse_log(log_path)
    }

    /// Run one workload repeatedly and average the timings.
    ///
    /// The repeat count comes from the configured size tiers: large
    /// workloads run fewer repetitions to keep total wall-clock bounded.
    /// `None` means every repetition failed to produce a timing line.
    pub fn run_averaged(
        &self,
        graph: &Path,
        grammar: &Path,
        queries: &Path,
        log_path: &Path,
    ) -> Result<Option<Averaged>> {
        let size = line_count(queries)?;
        let repeats = self.config.repeats_for(size);
        debug!(
            queries = %queries.display(),
            size,
            repeats,
            "measuring workload"
        );

        let mut total = 0.0;
        let mut successful = 0u32;
        let mut iterations = 0u64;
        for run in 0..repeats {
            let result = self.run_once(graph, grammar, queries, log_path)?;
            match result.elapsed {
                Some(secs) => {
                    debug!(run, secs, "run complete");
                    total += secs;
                    iterations = result.iterations;
                    successful += 1;
                }
                None => warn!(run, queries = %queries.display(), "run produced no timing line"),
            }
        }

        if !self.config.keep_logs {
            if let Err(e) = fs::remove_file(log_path) {
                debug!(log = %log_path.display(), error = %e, "could not remove run log");
            }
        }

        if successful == 0 {
            info!(queries = %queries.display(), "no successful runs, reporting no data");
            return Ok(None);
        }
        Ok(Some(Averaged {
            mean_elapsed: total / f64::from(successful),
            iterations,
            successful,
            attempted: repeats,
        }))
    }
}
