//! Per-dataset markdown reports.
//!
//! One document per dataset, sectioned by grammar and workload kind, with
//! one table row per graph. Rows are written unbuffered and flushed as they
//! are produced, so a long batch is observable mid-run and the report stays
//! usable if the batch is interrupted.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::errors::{HarnessError, Result};
use crate::synth::WorkloadKind;

/// Rendered cell for a measurement that may have failed.
pub fn time_cell(elapsed: Option<f64>) -> String {
    match elapsed {
        // Six decimal places, trailing zeros trimmed for readable cells.
        Some(secs) => {
            let rounded = (secs * 1e6).round() / 1e6;
            format!("{rounded}")
        }
        None => "no data".to_string(),
    }
}

/// Rendered cell for an equivalence verdict.
///
/// `None` means at least one strategy produced no comparable run, so no
/// verdict exists; it renders as `no data`, never as `false`.
pub fn verdict_cell(verdict: Option<bool>) -> String {
    match verdict {
        Some(v) => v.to_string(),
        None => "no data".to_string(),
    }
}

pub struct ReportWriter {
    path: PathBuf,
    out: File,
}

impl ReportWriter {
    /// Open `<results_dir>/<dataset>_<suite>.md` and write the title.
    ///
    /// The suite qualifier keeps the timing and correctness documents of one
    /// dataset from clobbering each other in a combined run.
    pub fn create(results_dir: &Path, dataset: &str, suite: &str) -> Result<Self> {
        fs::create_dir_all(results_dir).map_err(|e| HarnessError::io(results_dir, e))?;
        let path = results_dir.join(format!("{dataset}_{suite}.md"));
        let mut out = File::create(&path).map_err(|e| HarnessError::io(&path, e))?;
        writeln!(out, "# {dataset}\n").map_err(|e| HarnessError::io(&path, e))?;
        Ok(Self { path, out })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&mut self, text: &str) -> Result<()> {
        self.out
            .write_all(text.as_bytes())
            .and_then(|_| self.out.flush())
            .map_err(|e| HarnessError::io(&self.path, e))
    }

    /// Begin a `(grammar, kind)` section with the table header for timings.
    pub fn timing_section(&mut self, grammar: &str, kind: WorkloadKind) -> Result<()> {
        self.write(&format!(
            "## Grammar: {grammar}\n## Test type: {kind}\n\n\
             | Graph | Brute | Smart |\n|:-----:|:-----:|:-----:|\n"
        ))
    }

    pub fn timing_row(
        &mut self,
        graph: &str,
        brute: Option<f64>,
        smart: Option<f64>,
    ) -> Result<()> {
        self.write(&format!(
            "| {graph} | {} | {} |\n",
            time_cell(brute),
            time_cell(smart)
        ))
    }

    /// Begin a `(grammar, kind)` section with the table header for verdicts.
    pub fn verdict_section(&mut self, grammar: &str, kind: WorkloadKind) -> Result<()> {
        self.write(&format!(
            "## Grammar: {grammar}\n## Test type: {kind}\n\n\
             | Graph | equal(Brute, Smart) |\n|:-----:|:-------------------:|\n"
        ))
    }

    pub fn verdict_row(&mut self, graph: &str, verdict: Option<bool>) -> Result<()> {
        self.write(&format!("| {graph} | {} |\n", verdict_cell(verdict)))
    }

    pub fn end_section(&mut self) -> Result<()> {
        self.write("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_sections_rows_and_no_data() {
        let tmp = tempfile::tempdir().unwrap();
        let mut report = ReportWriter::create(tmp.path(), "RDF", "bench").unwrap();
        report
            .timing_section("an_bm_cm_dn_cnf", WorkloadKind::Construct)
            .unwrap();
        report
            .timing_row("skos", Some(0.1234561), None)
            .unwrap();
        report.end_section().unwrap();
        report
            .verdict_section("an_bm_cm_dn_cnf", WorkloadKind::Correctness)
            .unwrap();
        report.verdict_row("skos", Some(true)).unwrap();
        report.verdict_row("foaf", None).unwrap();
        report.end_section().unwrap();

        let text = fs::read_to_string(report.path()).unwrap();
        assert!(text.starts_with("# RDF\n"));
        assert!(text.contains("## Test type: Construct"));
        assert!(text.contains("| skos | 0.123456 | no data |"));
        assert!(text.contains("| skos | true |"));
        assert!(text.contains("| foaf | no data |"));
    }

    #[test]
    fn rows_visible_before_writer_is_dropped() {
        let tmp = tempfile::tempdir().unwrap();
        let mut report = ReportWriter::create(tmp.path(), "D", "bench").unwrap();
        report
            .timing_section("g", WorkloadKind::Construct)
            .unwrap();
        report.timing_row("first", Some(1.0), Some(2.0)).unwrap();

        // Re-read while the writer is still live.
        let text = fs::read_to_string(report.path()).unwrap();
        assert!(text.contains("| first | 1 | 2 |"));
    }

    #[test]
    fn time_cell_trims_trailing_zeros() {
        assert_eq!(time_cell(Some(0.5)), "0.5");
        assert_eq!(time_cell(Some(0.12345678)), "0.123457");
        assert_eq!(time_cell(None), "no data");
    }

    #[test]
    fn verdict_cell_distinguishes_no_data_from_false() {
        assert_eq!(verdict_cell(Some(true)), "true");
        assert_eq!(verdict_cell(Some(false)), "false");
        assert_eq!(verdict_cell(None), "no data");
    }
}
