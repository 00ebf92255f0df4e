//! Extraction of structured measurements from engine output.
//!
//! The engine's interface is free text on stdout. Two line shapes carry
//! metrics and must be matched exactly for compatibility:
//!
//! ```text
//! Total time: <float> s
//! Iteration count: <int>
//! ```
//!
//! Everything else (including path-answer lines) is ignored here; the
//! equivalence oracle consumes the raw log separately.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{HarnessError, Result};

static TOTAL_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Total time: (\S+) s$").expect("timing regex"));
static ITERATION_COUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Iteration count: (\d+)$").expect("iteration regex"));

/// Measurements recovered from one engine invocation.
///
/// `elapsed == None` means the log held no parseable timing line, which is
/// how an engine crash or malformed run manifests. It is never zero time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RunResult {
    pub elapsed: Option<f64>,
    pub iterations: u64,
}

/// Parse one captured engine log.
///
/// The last timing line wins (multi-section output overwrites); iteration
/// counts accumulate across all matching lines (multi-phase output sums).
pub fn parse_log(path: &Path) -> Result<RunResult> {
    let file = File::open(path).map_err(|e| HarnessError::io(path, e))?;
    let reader = BufReader::new(file);

    let mut result = RunResult::default();
    for line in reader.lines() {
        let line = line.map_err(|e| HarnessError::io(path, e))?;
        if let Some(caps) = TOTAL_TIME.captures(&line) {
            // A non-numeric capture means a garbled line; treat as no match.
            if let Ok(secs) = caps[1].parse::<f64>() {
                result.elapsed = Some(secs);
            }
        } else if let Some(caps) = ITERATION_COUNT.captures(&line) {
            if let Ok(n) = caps[1].parse::<u64>() {
                result.iterations += n;
            }
        }
    }
    Ok(result)
}
