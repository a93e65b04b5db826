//! Strict JSONL reading operations.
//!
//! This module provides async, buffered, line-by-line reading of record
//! files. Every line must parse; the first line that does not aborts the
//! read with [`Error::Parse`] carrying the 1-based line number.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Async strict reader for JSONL (JSON Lines) data.
///
/// `JsonlReader` wraps an async reader and yields one deserialized record
/// per line. It tracks line numbers so a parse failure can point at the
/// exact offending line.
///
/// # Type Parameters
///
/// * `R` - The underlying async reader type. Must implement [`AsyncRead`] and [`Unpin`].
///
/// # Examples
///
/// ```no_run
/// use mull_jsonl::JsonlReader;
/// use tokio::fs::File;
///
/// # async fn example() -> mull_jsonl::Result<()> {
/// let file = File::open("items.jsonl").await?;
/// let mut reader = JsonlReader::new(file);
/// while let Some(value) = reader.read_record::<serde_json::Value>().await? {
///     println!("{value}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct JsonlReader<R> {
    /// Buffered reader wrapping the underlying async reader.
    reader: BufReader<R>,
    /// Current line number (1-based; 0 before any line is read).
    line_number: usize,
}

impl<R: AsyncRead + Unpin> JsonlReader<R> {
    /// Creates a new `JsonlReader` wrapping the given async reader.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
        }
    }

    /// Returns the line number of the last line read (0 before any read).
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Reads and parses the next record.
    ///
    /// Returns `Ok(None)` at end of input. The line terminator (`\n`, with
    /// an optional preceding `\r`) is stripped before parsing; nothing else
    /// is trimmed or skipped — a blank or whitespace-only line is a parse
    /// error like any other, by the strict-format policy.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] on read failure; [`Error::Parse`] with the 1-based line
    /// number when the line is not a valid record.
    pub async fn read_record<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        let mut line = String::new();
        let bytes = self.reader.read_line(&mut line).await?;
        if bytes == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        let trimmed = line.strip_suffix('\n').unwrap_or(&line);
        let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);

        match serde_json::from_str(trimmed) {
            Ok(value) => Ok(Some(value)),
            Err(source) => Err(Error::Parse {
                line_number: self.line_number,
                source,
            }),
        }
    }
}

/// Reads an entire JSONL file strictly into a vector of records.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened or read (including
/// when it does not exist — callers that treat an absent file as an empty
/// set must map `io::ErrorKind::NotFound` themselves), and [`Error::Parse`]
/// on the first line that fails to deserialize.
///
/// # Examples
///
/// ```no_run
/// use mull_jsonl::read_jsonl;
///
/// # async fn example() -> mull_jsonl::Result<()> {
/// let values: Vec<serde_json::Value> = read_jsonl("items.jsonl").await?;
/// println!("{} records", values.len());
/// # Ok(())
/// # }
/// ```
pub async fn read_jsonl<T, P>(path: P) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref()).await?;
    let mut reader = JsonlReader::new(file);
    let mut records = Vec::new();
    while let Some(record) = reader.read_record().await? {
        records.push(record);
    }
    Ok(records)
}
