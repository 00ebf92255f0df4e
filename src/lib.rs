pub use crate::errors::{HarnessError, Result};

pub mod batch;
pub mod cli;
pub mod config;
pub mod driver;
pub mod errors;
pub mod fixtures;
pub mod graph;
pub mod metrics;
pub mod oracle;
pub mod report;
pub mod synth;
