//! Atomic whole-file writes for JSONL files.
//!
//! Replacing a record file in place is how files get torn. This module
//! writes the full record set to a sibling temporary file, flushes it, and
//! renames it over the target in a single filesystem operation. On POSIX
//! systems a same-directory rename is atomic, so a crash at any point leaves
//! the original file intact; at worst a stale `.tmp` sibling survives.

use crate::error::Result;
use crate::writer::JsonlWriter;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs::File;

/// Atomically writes a slice of values to a JSONL file.
///
/// Either the target ends up containing exactly the given records, or it is
/// left untouched. See the module docs for the crash-safety argument.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created, a value fails
/// to serialize, an IO error occurs while writing, or the rename fails
/// (e.g. a cross-filesystem target). On failure the temporary file is
/// removed best-effort and the original file is unchanged.
///
/// # Examples
///
/// ```no_run
/// use mull_jsonl::write_jsonl_atomic;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Record {
///     id: u64,
/// }
///
/// # async fn example() -> mull_jsonl::Result<()> {
/// let records = vec![Record { id: 1 }, Record { id: 2 }];
/// write_jsonl_atomic("items.jsonl", &records).await?;
/// # Ok(())
/// # }
/// ```
pub async fn write_jsonl_atomic<T, P>(path: P, values: &[T]) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    write_jsonl_atomic_iter(path, values.iter()).await
}

/// Atomically writes an iterator of values to a JSONL file.
///
/// A more flexible form of [`write_jsonl_atomic`] that avoids collecting
/// into a slice first.
///
/// # Errors
///
/// See [`write_jsonl_atomic`].
pub async fn write_jsonl_atomic_iter<T, I, P>(path: P, values: I) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let temp_path = make_temp_path(path);

    if let Err(e) = write_to_temp_file(&temp_path, values).await {
        // Best-effort cleanup; the original file has not been touched.
        if let Err(cleanup) = tokio::fs::remove_file(&temp_path).await {
            tracing::debug!(
                path = %temp_path.display(),
                error = %cleanup,
                "could not remove temp file after failed write"
            );
        }
        return Err(e);
    }

    tokio::fs::rename(&temp_path, path).await?;
    Ok(())
}

/// Derives the sibling temp path by appending `.tmp` to the file name.
fn make_temp_path(path: &Path) -> PathBuf {
    let mut temp_path = path.to_path_buf();
    let new_extension = match path.extension() {
        Some(ext) => {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".tmp");
            new_ext
        }
        None => std::ffi::OsString::from("tmp"),
    };
    temp_path.set_extension(new_extension);
    temp_path
}

/// Writes all values to the temp file and flushes it.
async fn write_to_temp_file<T, I>(temp_path: &Path, values: I) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let file = File::create(temp_path).await?;
    let mut writer = JsonlWriter::new(file);
    writer.write_all(values).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestRecord {
        id: u64,
        name: String,
    }

    #[test]
    fn temp_path_appends_to_extension() {
        let temp = make_temp_path(Path::new("/data/items.jsonl"));
        assert_eq!(temp, Path::new("/data/items.jsonl.tmp"));
    }

    #[test]
    fn temp_path_without_extension() {
        let temp = make_temp_path(Path::new("/data/items"));
        assert_eq!(temp, Path::new("/data/items.tmp"));
    }

    #[tokio::test]
    async fn atomic_write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("items.jsonl");

        let records = vec![
            TestRecord {
                id: 1,
                name: "first".to_string(),
            },
            TestRecord {
                id: 2,
                name: "second".to_string(),
            },
        ];
        write_jsonl_atomic(&target, &records).await.unwrap();

        let text = std::fs::read_to_string(&target).unwrap();
        assert_eq!(text.lines().count(), 2);
    }

    #[tokio::test]
    async fn atomic_write_replaces_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("items.jsonl");
        std::fs::write(&target, "old content\n").unwrap();

        let records = vec![TestRecord {
            id: 42,
            name: "new".to_string(),
        }];
        write_jsonl_atomic(&target, &records).await.unwrap();

        let text = std::fs::read_to_string(&target).unwrap();
        assert_eq!(text.trim(), "{\"id\":42,\"name\":\"new\"}");
    }

    #[tokio::test]
    async fn temp_file_is_gone_after_success() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("items.jsonl");

        let records = vec![TestRecord {
            id: 1,
            name: "only".to_string(),
        }];
        write_jsonl_atomic(&target, &records).await.unwrap();

        assert!(target.exists());
        assert!(!dir.path().join("items.jsonl.tmp").exists());
    }

    #[tokio::test]
    async fn atomic_write_empty_set_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("items.jsonl");
        std::fs::write(&target, "{\"id\":1,\"name\":\"gone\"}\n").unwrap();

        let records: Vec<TestRecord> = vec![];
        write_jsonl_atomic(&target, &records).await.unwrap();

        let metadata = std::fs::metadata(&target).unwrap();
        assert_eq!(metadata.len(), 0);
    }

    #[tokio::test]
    async fn iter_form_accepts_generators() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("items.jsonl");

        let records = (0..100).map(|id| TestRecord {
            id,
            name: format!("r{id}"),
        });
        write_jsonl_atomic_iter(&target, records).await.unwrap();

        let text = std::fs::read_to_string(&target).unwrap();
        assert_eq!(text.lines().count(), 100);
    }
}
