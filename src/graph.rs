//! Edge-list graph parsing.
//!
//! A graph file is line-oriented: one `<from> <label> <to>` triple per line,
//! whitespace-separated. Vertex identifiers are arbitrary integers, not
//! necessarily dense or zero-based; the distinct identifiers span a closed
//! interval `[min_v, max_v]` that the correctness synthesizer queries
//! exhaustively, including vertices with no incident edges.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::errors::{HarnessError, Result};

/// One labeled edge, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: i64,
    pub label: String,
    pub to: i64,
}

/// Inclusive vertex-identifier interval spanned by a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexBounds {
    pub min: i64,
    pub max: i64,
}

impl VertexBounds {
    /// Number of ordered `(i, j)` pairs with `i != j` over the interval.
    pub fn ordered_pair_count(&self) -> u64 {
        let n = (self.max - self.min + 1) as u64;
        n * n.saturating_sub(1)
    }
}

/// Read all edges from a graph file, preserving file order.
///
/// Blank lines are tolerated; any other line that does not split into
/// exactly three tokens with integer endpoints is a malformed-fixture error.
pub fn read_edges(path: &Path) -> Result<Vec<Edge>> {
    let file = File::open(path).map_err(|e| HarnessError::io(path, e))?;
    let reader = BufReader::new(file);

    let mut edges = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| HarnessError::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        edges.push(parse_edge(&line).ok_or_else(|| HarnessError::MalformedGraphLine {
            path: path.to_path_buf(),
            line: idx + 1,
            found: line.clone(),
        })?);
    }
    Ok(edges)
}

fn parse_edge(line: &str) -> Option<Edge> {
    let mut tokens = line.split_whitespace();
    let from = tokens.next()?.parse().ok()?;
    let label = tokens.next()?.to_string();
    let to = tokens.next()?.parse().ok()?;
    if tokens.next().is_some() {
        return None;
    }
    Some(Edge { from, label, to })
}

/// Scan edges for the vertex interval. `None` for an empty graph.
pub fn vertex_bounds(edges: &[Edge]) -> Option<VertexBounds> {
    let mut bounds: Option<VertexBounds> = None;
    for e in edges {
        let (lo, hi) = (e.from.min(e.to), e.from.max(e.to));
        bounds = Some(match bounds {
            None => VertexBounds { min: lo, max: hi },
            Some(b) => VertexBounds {
                min: b.min.min(lo),
                max: b.max.max(hi),
            },
        });
    }
    bounds
}

/// Count the lines of a text file in-process.
///
/// Used both for workload sizing (repeat-tier selection) and for ordering
/// fixtures smallest-first in a batch.
pub fn line_count(path: &Path) -> Result<usize> {
    let file = File::open(path).map_err(|e| HarnessError::io(path, e))?;
    Ok(BufReader::new(file).lines().count())
}
