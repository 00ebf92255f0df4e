//! On-disk fixture store.
//!
//! Layout, per dataset under the store root:
//!
//! ```text
//! <root>/<dataset>/Graphs/<graph>.txt
//! <root>/<dataset>/Grammars/<grammar>_cnf.txt
//! <root>/<dataset>/Queries/<graph>/<kind>/<strategy>.txt
//! ```
//!
//! All creation is idempotent: directories and fixture files that already
//! exist are left untouched, so an interrupted preparation batch can be
//! resumed by re-running it.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::errors::{HarnessError, Result};
use crate::graph::line_count;
use crate::synth::{Strategy, WorkloadKind};

pub const GRAPHS_DIR: &str = "Graphs";
pub const GRAMMARS_DIR: &str = "Grammars";
pub const QUERIES_DIR: &str = "Queries";

/// Handle on the dataset root directory.
#[derive(Debug, Clone)]
pub struct FixtureStore {
    root: PathBuf,
}

impl FixtureStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the per-dataset directory skeleton. Safe to call repeatedly.
    pub fn ensure_layout(&self, datasets: &[String]) -> Result<()> {
        for dataset in datasets {
            for sub in [GRAPHS_DIR, GRAMMARS_DIR, QUERIES_DIR] {
                let dir = self.root.join(dataset).join(sub);
                fs::create_dir_all(&dir).map_err(|e| HarnessError::io(&dir, e))?;
            }
        }
        Ok(())
    }

    pub fn graph_path(&self, dataset: &str, graph: &str) -> PathBuf {
        self.root
            .join(dataset)
            .join(GRAPHS_DIR)
            .join(format!("{graph}.txt"))
    }

    pub fn grammar_path(&self, dataset: &str, grammar: &str) -> PathBuf {
        self.root
            .join(dataset)
            .join(GRAMMARS_DIR)
            .join(format!("{grammar}_cnf.txt"))
    }

    pub fn workload_dir(&self, dataset: &str, graph: &str, kind: WorkloadKind) -> PathBuf {
        self.root
            .join(dataset)
            .join(QUERIES_DIR)
            .join(graph)
            .join(kind.dir_name())
    }

    pub fn workload_path(
        &self,
        dataset: &str,
        graph: &str,
        kind: WorkloadKind,
        strategy: Strategy,
    ) -> PathBuf {
        self.workload_dir(dataset, graph, kind)
            .join(format!("{strategy}.txt"))
    }

    pub fn has_graph(&self, dataset: &str, graph: &str) -> bool {
        self.graph_path(dataset, graph).is_file()
    }

    pub fn has_grammar(&self, dataset: &str, grammar: &str) -> bool {
        self.grammar_path(dataset, grammar).is_file()
    }

    pub fn has_workload(
        &self,
        dataset: &str,
        graph: &str,
        kind: WorkloadKind,
        strategy: Strategy,
    ) -> bool {
        self.workload_path(dataset, graph, kind, strategy).is_file()
    }

    /// Graph fixture files of a dataset, smallest first by line count.
    pub fn graphs(&self, dataset: &str) -> Result<Vec<PathBuf>> {
        self.fixture_files(&self.root.join(dataset).join(GRAPHS_DIR))
    }

    /// Grammar fixture files of a dataset, smallest first by line count.
    pub fn grammars(&self, dataset: &str) -> Result<Vec<PathBuf>> {
        self.fixture_files(&self.root.join(dataset).join(GRAMMARS_DIR))
    }

    fn fixture_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut sized = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                let io = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "walk error"));
                HarnessError::io(dir, io)
            })?;
            if entry.file_type().is_file() {
                let path = entry.into_path();
                let lines = line_count(&path)?;
                sized.push((lines, path));
            }
        }
        sized.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        Ok(sized.into_iter().map(|(_, p)| p).collect())
    }

    /// Path to the shared empty graph, created on first use.
    ///
    /// Timing runs start from an empty graph: the workload's mutation
    /// commands rebuild the fixture inside the engine, which is the thing
    /// being measured.
    pub fn empty_graph(&self) -> Result<PathBuf> {
        let path = self.root.join("Empty.txt");
        if !path.exists() {
            fs::create_dir_all(&self.root).map_err(|e| HarnessError::io(&self.root, e))?;
            fs::write(&path, "").map_err(|e| HarnessError::io(&path, e))?;
        }
        Ok(path)
    }
}

/// File stem used to key fixtures (`foo/bar_cnf.txt` -> `bar_cnf`).
pub fn fixture_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FixtureStore::new(tmp.path());
        let datasets = vec!["RDF".to_string()];
        store.ensure_layout(&datasets).unwrap();
        store.ensure_layout(&datasets).unwrap();
        assert!(tmp.path().join("RDF/Graphs").is_dir());
        assert!(tmp.path().join("RDF/Grammars").is_dir());
        assert!(tmp.path().join("RDF/Queries").is_dir());
    }

    #[test]
    fn existence_checks_track_files() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FixtureStore::new(tmp.path());
        store.ensure_layout(&["D".to_string()]).unwrap();
        assert!(!store.has_graph("D", "g1"));
        fs::write(store.graph_path("D", "g1"), "1 a 2\n").unwrap();
        assert!(store.has_graph("D", "g1"));
        assert!(!store.has_grammar("D", "gr"));
        fs::write(store.grammar_path("D", "gr"), "S -> a\n").unwrap();
        assert!(store.has_grammar("D", "gr"));
    }

    #[test]
    fn graphs_sorted_smallest_first() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FixtureStore::new(tmp.path());
        store.ensure_layout(&["D".to_string()]).unwrap();
        fs::write(store.graph_path("D", "big"), "1 a 2\n2 a 3\n3 a 4\n").unwrap();
        fs::write(store.graph_path("D", "small"), "1 a 2\n").unwrap();
        let names: Vec<String> = store
            .graphs("D")
            .unwrap()
            .iter()
            .map(|p| fixture_name(p))
            .collect();
        assert_eq!(names, vec!["small", "big"]);
    }

    #[test]
    fn empty_graph_created_once() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FixtureStore::new(tmp.path());
        let p1 = store.empty_graph().unwrap();
        let p2 = store.empty_graph().unwrap();
        assert_eq!(p1, p2);
        assert_eq!(fs::read_to_string(&p1).unwrap(), "");
    }
}
