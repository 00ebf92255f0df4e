//! Query workload synthesis.
//!
//! Turns one edge-list graph into deterministic command workloads for the
//! external engine, one file per `(kind, strategy)`. The two strategy files
//! of a kind carry identical `find-path` lines in identical order and differ
//! only in the strategy tag on mutation lines; the equivalence oracle relies
//! on that parallelism.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use clap::ValueEnum;
use tracing::debug;

use crate::errors::{HarnessError, Result};
use crate::graph::{read_edges, vertex_bounds, Edge, VertexBounds};

/// Engine algorithm variant a mutation line is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Baseline non-incremental variant, authoritative for correctness.
    Brute,
    /// Incremental variant under validation.
    Smart,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::Brute, Strategy::Smart];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Brute => "brute",
            Strategy::Smart => "smart",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of a synthesized workload.
// CLI names match `dir_name` casing so clap can round-trip defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
#[value(rename_all = "PascalCase")]
pub enum WorkloadKind {
    /// Edge-add for every edge, in file order.
    Construct,
    /// Edge-delete for every edge, in file order.
    Deconstruct,
    /// All adds, then one exhaustive `find-path` block over `[min_v, max_v]`.
    Correctness,
    /// Edge-deletes with the exhaustive `find-path` block re-issued after
    /// every single mutation.
    DeconstructCorrectness,
}

impl WorkloadKind {
    /// Directory name under `Queries/<graph>/`.
    pub fn dir_name(&self) -> &'static str {
        match self {
            WorkloadKind::Construct => "Construct",
            WorkloadKind::Deconstruct => "Deconstruct",
            WorkloadKind::Correctness => "Correctness",
            WorkloadKind::DeconstructCorrectness => "DeconstructCorrectness",
        }
    }

    /// Kinds whose output feeds the equivalence oracle rather than timing.
    pub fn is_correctness(&self) -> bool {
        matches!(
            self,
            WorkloadKind::Correctness | WorkloadKind::DeconstructCorrectness
        )
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

fn mutation_line(strategy: Strategy, verb: &str, e: &Edge) -> String {
    format!("{}-edge-{} {} {} {}", strategy, verb, e.from, e.to, e.label)
}

fn write_find_path_block(out: &mut impl Write, bounds: VertexBounds) -> std::io::Result<()> {
    for i in bounds.min..=bounds.max {
        for j in bounds.min..=bounds.max {
            if i != j {
                writeln!(out, "find-path {i} {j}")?;
            }
        }
    }
    Ok(())
}

/// Render one workload for one strategy into `out`.
///
/// Correctness kinds need the vertex interval before the first `find-path`
/// line can be emitted, so synthesis is two-pass over the edge data: bounds
/// scan first, generation second.
pub fn render_workload(
    edges: &[Edge],
    kind: WorkloadKind,
    strategy: Strategy,
    out: &mut impl Write,
) -> std::io::Result<()> {
    let bounds = vertex_bounds(edges);
    match kind {
        WorkloadKind::Construct => {
            for e in edges {
                writeln!(out, "{}", mutation_line(strategy, "add", e))?;
            }
        }
        WorkloadKind::Deconstruct => {
            for e in edges {
                writeln!(out, "{}", mutation_line(strategy, "delete", e))?;
            }
        }
        WorkloadKind::Correctness => {
            for e in edges {
                writeln!(out, "{}", mutation_line(strategy, "add", e))?;
            }
            if let Some(b) = bounds {
                write_find_path_block(out, b)?;
            }
        }
        WorkloadKind::DeconstructCorrectness => {
            for e in edges {
                writeln!(out, "{}", mutation_line(strategy, "delete", e))?;
                if let Some(b) = bounds {
                    write_find_path_block(out, b)?;
                }
            }
        }
    }
    Ok(())
}

/// Synthesize one `(kind, strategy)` workload file from a graph.
///
/// A no-op if the target already exists: workload files are immutable once
/// written, which makes interrupted preparation batches resumable.
pub fn synthesize_workload(
    graph_path: &Path,
    target: &Path,
    kind: WorkloadKind,
    strategy: Strategy,
) -> Result<()> {
    if target.exists() {
        debug!(target = %target.display(), "workload already present, skipping");
        return Ok(());
    }
    if let Some(dir) = target.parent() {
        fs::create_dir_all(dir).map_err(|e| HarnessError::io(dir, e))?;
    }

    let edges = read_edges(graph_path)?;
    let file = File::create(target).map_err(|e| HarnessError::io(target, e))?;
    let mut out = BufWriter::new(file);
    render_workload(&edges, kind, strategy, &mut out).map_err(|e| HarnessError::io(target, e))?;
    out.flush().map_err(|e| HarnessError::io(target, e))?;
    debug!(target = %target.display(), "workload synthesized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn edges_of(content: &str) -> Vec<Edge> {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        read_edges(f.path()).unwrap()
    }

    fn render(content: &str, kind: WorkloadKind, strategy: Strategy) -> String {
        let mut buf = Vec::new();
        render_workload(&edges_of(content), kind, strategy, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    const THREE_EDGES: &str = "1 a 2\n2 b 3\n1 a 3\n";

    #[test]
    fn construct_emits_one_add_per_edge() {
        let brute = render(THREE_EDGES, WorkloadKind::Construct, Strategy::Brute);
        assert_eq!(
            brute,
            "brute-edge-add 1 2 a\nbrute-edge-add 2 3 b\nbrute-edge-add 1 3 a\n"
        );
    }

    #[test]
    fn strategy_files_differ_only_in_tag() {
        let brute = render(THREE_EDGES, WorkloadKind::Construct, Strategy::Brute);
        let smart = render(THREE_EDGES, WorkloadKind::Construct, Strategy::Smart);
        assert_eq!(brute.replace("brute-", "smart-"), smart);
    }

    #[test]
    fn deconstruct_emits_deletes() {
        let out = render("5 z 6\n", WorkloadKind::Deconstruct, Strategy::Smart);
        assert_eq!(out, "smart-edge-delete 5 6 z\n");
    }

    #[test]
    fn correctness_covers_all_ordered_pairs() {
        let out = render(THREE_EDGES, WorkloadKind::Correctness, Strategy::Brute);
        let lines: Vec<&str> = out.lines().collect();
        // 3 mutations, then 3*2 ordered pairs over [1, 3].
        assert_eq!(lines.len(), 3 + 6);
        assert_eq!(lines[3], "find-path 1 2");
        assert!(lines[3..].iter().all(|l| l.starts_with("find-path ")));
        assert!(lines[3..].contains(&"find-path 3 1"));
    }

    #[test]
    fn correctness_queries_span_interval_not_just_present_vertices() {
        // Vertex 3 never appears, but [2, 4] is queried exhaustively.
        let out = render("2 a 4\n", WorkloadKind::Correctness, Strategy::Brute);
        assert!(out.contains("find-path 3 2"));
        assert!(out.contains("find-path 2 3"));
        let queries = out.lines().filter(|l| l.starts_with("find-path")).count();
        assert_eq!(queries as u64, 3 * 2);
    }

    #[test]
    fn deconstruct_correctness_interleaves_query_block() {
        let out = render(
            "1 a 2\n2 a 1\n",
            WorkloadKind::DeconstructCorrectness,
            Strategy::Smart,
        );
        let lines: Vec<&str> = out.lines().collect();
        // delete, 2 pairs, delete, 2 pairs
        assert_eq!(lines.len(), 2 * (1 + 2));
        assert_eq!(lines[0], "smart-edge-delete 1 2 a");
        assert_eq!(lines[3], "smart-edge-delete 2 1 a");
    }

    #[test]
    fn empty_graph_yields_empty_workload() {
        for kind in [
            WorkloadKind::Construct,
            WorkloadKind::Correctness,
            WorkloadKind::DeconstructCorrectness,
        ] {
            assert_eq!(render("", kind, Strategy::Brute), "");
        }
    }

    #[test]
    fn synthesize_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let graph = tmp.path().join("g.txt");
        std::fs::write(&graph, THREE_EDGES).unwrap();
        let target = tmp.path().join("q/Construct/brute.txt");

        synthesize_workload(&graph, &target, WorkloadKind::Construct, Strategy::Brute).unwrap();
        let first = std::fs::read(&target).unwrap();

        // A second pass must not rewrite (nor fail), even if the graph changed.
        std::fs::write(&graph, "9 q 9\n").unwrap();
        synthesize_workload(&graph, &target, WorkloadKind::Construct, Strategy::Brute).unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), first);
    }
}
