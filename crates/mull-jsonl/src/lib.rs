//! Strict line-delimited JSON record files.
//!
//! This crate is the on-disk format layer for the mull decision tracker:
//! one serialized record per line, read back strictly (any unparseable line
//! is a fatal error carrying its line number), written either by appending a
//! single line or by atomically replacing the whole file via a sibling temp
//! file and a single rename.
//!
//! Strictness is deliberate. A record file is the system of record, not a
//! log to be salvaged; a line that does not parse means the file is corrupt
//! and the caller must know, immediately and loudly. There is no
//! skip-and-warn path.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod atomic;
pub mod error;
pub mod reader;
pub mod writer;

pub use atomic::{write_jsonl_atomic, write_jsonl_atomic_iter};
pub use error::{Error, Result};
pub use reader::{JsonlReader, read_jsonl};
pub use writer::{JsonlWriter, append_jsonl_line};
