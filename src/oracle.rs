//! Equivalence oracle between the two strategy runs.
//!
//! Both strategies are fed the same `find-path` queries in the same order
//! (a synthesizer guarantee), so their path-answer lines can be compared
//! positionally without sorting or canonicalizing. Any difference in count
//! or content is a `false` verdict.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::errors::{HarnessError, Result};

/// Marker distinguishing path-answer lines from timing/header noise.
const PATH_MARKER: &str = "path";

fn path_answer_lines(log: &Path) -> Result<Vec<String>> {
    let file = File::open(log).map_err(|e| HarnessError::io(log, e))?;
    let mut lines = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| HarnessError::io(log, e))?;
        if line.contains(PATH_MARKER) {
            lines.push(line);
        }
    }
    Ok(lines)
}

/// True iff the two logs agree on every path-query answer, in order.
pub fn equivalent(brute_log: &Path, smart_log: &Path) -> Result<bool> {
    Ok(path_answer_lines(brute_log)? == path_answer_lines(smart_log)?)
}
