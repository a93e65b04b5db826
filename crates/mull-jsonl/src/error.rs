//! Error types for mull-jsonl operations.

use std::io;
use thiserror::Error;

/// The error type for mull-jsonl operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred while reading or writing.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A line failed to parse as a record. Fatal: the file is corrupt.
    #[error("line {line_number}: malformed record: {source}")]
    Parse {
        /// 1-based line number of the offending line.
        line_number: usize,
        /// The underlying JSON parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A value failed to serialize on the write path.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A specialized Result type for mull-jsonl operations.
pub type Result<T> = std::result::Result<T, Error>;
