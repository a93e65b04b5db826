//! JSONL writing operations.
//!
//! This module provides async buffered writing of records, one JSON value
//! per line, plus a convenience for appending a single line to an existing
//! file (the hot path for record creation).

use crate::error::Result;
use serde::Serialize;
use std::path::Path;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

/// Async writer for JSONL (JSON Lines) data.
///
/// Each value is serialized to a single line followed by a newline. Writes
/// are buffered; call [`flush`](Self::flush) before dropping to make sure
/// everything reaches the underlying writer.
///
/// # Examples
///
/// ```no_run
/// use mull_jsonl::JsonlWriter;
/// use tokio::fs::File;
///
/// # async fn example() -> mull_jsonl::Result<()> {
/// let file = File::create("items.jsonl").await?;
/// let mut writer = JsonlWriter::new(file);
/// writer.write(&serde_json::json!({"id": 1})).await?;
/// writer.flush().await?;
/// # Ok(())
/// # }
/// ```
pub struct JsonlWriter<W> {
    /// Buffered writer wrapping the underlying async writer.
    writer: BufWriter<W>,
}

impl<W: AsyncWrite + Unpin> JsonlWriter<W> {
    /// Creates a new `JsonlWriter` wrapping the given async writer.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }

    /// Serializes one value and writes it as a single line.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Serialize`] if the value fails to serialize
    /// and [`crate::Error::Io`] on write failure.
    pub async fn write<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let mut line = serde_json::to_vec(value)?;
        line.push(b'\n');
        self.writer.write_all(&line).await?;
        Ok(())
    }

    /// Writes every value from the iterator, one line each.
    ///
    /// # Errors
    ///
    /// See [`write`](Self::write); the first failure aborts the batch.
    pub async fn write_all<T, I>(&mut self, values: I) -> Result<()>
    where
        T: Serialize,
        I: IntoIterator<Item = T>,
    {
        for value in values {
            self.write(&value).await?;
        }
        Ok(())
    }

    /// Flushes buffered data to the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] on flush failure.
    pub async fn flush(&mut self) -> Result<()> {
        self.writer.flush().await?;
        Ok(())
    }

    /// Consumes the writer, returning the underlying buffered writer.
    ///
    /// Does not flush; call [`flush`](Self::flush) first.
    #[must_use]
    pub fn into_inner(self) -> BufWriter<W> {
        self.writer
    }
}

/// Appends a single record as one line to the file at `path`.
///
/// The file is created if it does not exist. The write is flushed before
/// returning. Callers that need mutual exclusion against other writers must
/// hold their own lock around this call; the function itself does no
/// locking.
///
/// # Errors
///
/// Returns [`crate::Error::Serialize`] if the value fails to serialize and
/// [`crate::Error::Io`] on open/write failure.
pub async fn append_jsonl_line<T, P>(path: P, value: &T) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path.as_ref())
        .await?;
    let mut writer = JsonlWriter::new(file);
    writer.write(value).await?;
    writer.flush().await?;
    Ok(())
}
