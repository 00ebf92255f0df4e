//! Explicit harness configuration.
//!
//! Everything the original batch scripts held as ambient process state
//! (working directory, engine path, repeat schedule) is carried here and
//! passed into components. A YAML file can override the defaults; CLI flags
//! override both.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{HarnessError, Result};

/// One rung of the repeat schedule: workloads strictly larger than
/// `above_lines` run `repeats` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatTier {
    pub above_lines: usize,
    pub repeats: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Root of the fixture store.
    pub dataset_root: PathBuf,
    /// Directory receiving per-dataset reports.
    pub results_dir: PathBuf,
    /// The external engine executable.
    pub engine: PathBuf,
    /// Repeat count for workloads below every tier.
    pub base_repeats: u32,
    /// Larger workloads run fewer repetitions; must be sorted ascending by
    /// size with non-increasing repeat counts.
    pub repeat_tiers: Vec<RepeatTier>,
    /// Graphs above this line count are skipped during preparation.
    pub graph_line_ceiling: usize,
    /// Wall-clock limit for one engine invocation, in seconds. A run that
    /// exceeds it is killed and recorded as a soft failure.
    pub run_timeout_secs: Option<u64>,
    /// Retain per-run logs after their metrics are folded into the average.
    pub keep_logs: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            dataset_root: PathBuf::from("input"),
            results_dir: PathBuf::from("results"),
            engine: PathBuf::from("./main"),
            base_repeats: 100,
            repeat_tiers: vec![
                RepeatTier {
                    above_lines: 10_000,
                    repeats: 10,
                },
                RepeatTier {
                    above_lines: 40_000,
                    repeats: 2,
                },
            ],
            graph_line_ceiling: 100_000,
            run_timeout_secs: None,
            keep_logs: false,
        }
    }
}

impl HarnessConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| HarnessError::io(path, e))?;
        let config: HarnessConfig =
            serde_yaml::from_str(&text).map_err(|e| HarnessError::ConfigParse {
                path: path.to_path_buf(),
                source: e,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject repeat schedules that are not monotonic non-increasing in
    /// workload size.
    pub fn validate(&self) -> Result<()> {
        let mut prev_size: Option<usize> = None;
        let mut prev_repeats = self.base_repeats;
        for tier in &self.repeat_tiers {
            if let Some(prev) = prev_size {
                if tier.above_lines <= prev {
                    return Err(HarnessError::InvalidConfig {
                        message: format!(
                            "repeat tiers must be sorted by strictly ascending size; {} follows {}",
                            tier.above_lines, prev
                        ),
                    });
                }
            }
            if tier.repeats > prev_repeats {
                return Err(HarnessError::InvalidConfig {
                    message: format!(
                        "repeat count must not increase with workload size; tier above {} lines has {} > {}",
                        tier.above_lines, tier.repeats, prev_repeats
                    ),
                });
            }
            if tier.repeats == 0 {
                return Err(HarnessError::InvalidConfig {
                    message: "repeat count must be at least 1".to_string(),
                });
            }
            prev_size = Some(tier.above_lines);
            prev_repeats = tier.repeats;
        }
        if self.base_repeats == 0 {
            return Err(HarnessError::InvalidConfig {
                message: "base_repeats must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Repeat count for a workload of `lines` lines.
    pub fn repeats_for(&self, lines: usize) -> u32 {
        let mut repeats = self.base_repeats;
        for tier in &self.repeat_tiers {
            if lines > tier.above_lines {
                repeats = tier.repeats;
            }
        }
        repeats
    }

    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout_secs.map(Duration::from_secs)
    }
}
