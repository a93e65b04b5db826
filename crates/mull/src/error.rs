//! Error types for mull operations.

use crate::domain::{ItemId, Status};
use std::io;
use thiserror::Error;

/// The error type for mull operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The record file contains a line that does not parse. Fatal and
    /// non-recoverable; the file needs manual attention.
    #[error("record file corrupt at line {line_number}: {message}")]
    Corrupt {
        /// 1-based line number of the corrupt record.
        line_number: usize,
        /// Description of the parse failure.
        message: String,
    },

    /// A record failed to serialize.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Input rejected before any state change.
    #[error("validation failed: {0}")]
    Validation(String),

    /// No record with the given id exists.
    #[error("item not found: {0}")]
    NotFound(ItemId),

    /// No dependency edge exists between the given pair.
    #[error("no dependency from item {item_id} on item {depends_on_id}")]
    DependencyNotFound {
        /// The dependent item.
        item_id: ItemId,
        /// The missing edge's target.
        depends_on_id: ItemId,
    },

    /// Illegal status transition. The message names the legal alternatives
    /// so the caller can present them.
    #[error("invalid status transition {from} -> {to}; valid targets from {from}: {allowed}")]
    InvalidTransition {
        /// Current status.
        from: Status,
        /// Requested status.
        to: Status,
        /// Comma-separated legal target statuses.
        allowed: String,
    },

    /// Adding the edge would close a blocking cycle. Carries the discovered
    /// path so the caller can explain the conflict.
    #[error("dependency would create a cycle: {}", format_cycle(.path))]
    CycleDetected {
        /// The cycle path, starting and ending at the same item.
        path: Vec<ItemId>,
    },

    /// The advisory lock could not be acquired within the retry budget.
    /// Retryable: the holder may simply be slow.
    #[error("lock acquisition timed out after {attempts} attempts ({waited_ms} ms)")]
    LockTimeout {
        /// Number of acquisition attempts made.
        attempts: u32,
        /// Total time spent backing off, in milliseconds.
        waited_ms: u64,
    },
}

impl Error {
    /// Whether the operation may reasonably be retried as-is.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::LockTimeout { .. })
    }
}

fn format_cycle(path: &[ItemId]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl From<mull_jsonl::Error> for Error {
    fn from(err: mull_jsonl::Error) -> Self {
        match err {
            mull_jsonl::Error::Io(e) => Error::Io(e),
            mull_jsonl::Error::Parse {
                line_number,
                source,
            } => Error::Corrupt {
                line_number,
                message: source.to_string(),
            },
            mull_jsonl::Error::Serialize(e) => Error::Serialization(e),
        }
    }
}

/// A specialized Result type for mull operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_error_formats_path() {
        let err = Error::CycleDetected {
            path: vec![ItemId(1), ItemId(3), ItemId(2), ItemId(1)],
        };
        assert_eq!(
            err.to_string(),
            "dependency would create a cycle: 1 -> 3 -> 2 -> 1"
        );
    }

    #[test]
    fn only_lock_timeout_is_retryable() {
        let timeout = Error::LockTimeout {
            attempts: 5,
            waited_ms: 120,
        };
        assert!(timeout.is_retryable());
        assert!(!Error::NotFound(ItemId(9)).is_retryable());
    }

    #[test]
    fn corrupt_error_names_the_line() {
        let err = Error::Corrupt {
            line_number: 4,
            message: "expected value".to_string(),
        };
        assert!(err.to_string().contains("line 4"));
    }
}
