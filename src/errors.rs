//! Unified error type for all harness failure modes.
//!
//! Every fallible operation in the crate returns [`HarnessError`]. Errors
//! carry enough path/line context to be actionable from a batch log, and
//! render through `miette` at the CLI boundary.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    #[error("I/O error on {}: {source}", path.display())]
    #[diagnostic(code(cfpq_bench::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "malformed graph line {line} in {}: expected `<from> <label> <to>`, got {found:?}",
        path.display()
    )]
    #[diagnostic(
        code(cfpq_bench::graph::malformed),
        help("graph files are line-oriented: three whitespace-separated tokens per line")
    )]
    MalformedGraphLine {
        path: PathBuf,
        line: usize,
        found: String,
    },

    #[error("engine executable not found: {}", path.display())]
    #[diagnostic(
        code(cfpq_bench::engine::missing),
        help("build the engine first, or point --engine at the built binary")
    )]
    EngineMissing { path: PathBuf },

    #[error("failed to spawn engine {}: {source}", path.display())]
    #[diagnostic(code(cfpq_bench::engine::spawn))]
    EngineSpawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {message}")]
    #[diagnostic(code(cfpq_bench::config::invalid))]
    InvalidConfig { message: String },

    #[error("failed to parse config file {}: {source}", path.display())]
    #[diagnostic(code(cfpq_bench::config::parse))]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl HarnessError {
    /// Attach a path to a bare `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HarnessError::Io {
            path: path.into(),
            source,
        }
    }
}
