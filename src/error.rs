use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced while loading input or configuring a run.
///
/// Numeric edge cases (zero or negative sums of squares) are never errors;
/// they flow through the selected strategy and show up in the output values.
#[derive(Debug, Error)]
pub enum FastNormError {
    /// The feature file could not be opened or read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A row's field count differs from the first row's.
    #[error("line {line}: expected {expected} fields, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },
    /// Configuration is inconsistent or failed to load.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<config::ConfigError> for FastNormError {
    fn from(err: config::ConfigError) -> Self {
        FastNormError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FastNormError>;
