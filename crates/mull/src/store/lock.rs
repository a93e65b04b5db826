//! Advisory cross-process lock file.
//!
//! Mutual exclusion across independent processes rides on one filesystem
//! primitive: exclusively creating the lock file fails when it already
//! exists. The file contains the holder's pid so contenders can tell a
//! busy holder from a dead one — a lock whose recorded process no longer
//! exists is removed and retried immediately, while a live holder is
//! waited out with exponential backoff up to a bounded attempt budget.
//!
//! The guard removes the lock file when dropped, on success and on error
//! alike; a lock must never be left held after the operation returns.

use super::process;
use crate::error::{Error, Result};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Tuning for lock acquisition backoff.
#[derive(Debug, Clone)]
pub struct LockConfig {
    /// Delay before the first retry against a live holder.
    pub initial_delay: Duration,

    /// Per-retry delay ceiling for the exponential backoff.
    pub max_delay: Duration,

    /// Total acquisition attempts before giving up with
    /// [`Error::LockTimeout`].
    pub max_attempts: u32,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(250),
            max_attempts: 20,
        }
    }
}

/// RAII guard for the lock file. Dropping it releases the lock.
#[derive(Debug)]
pub(crate) struct LockGuard {
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // Ignore errors: the file may already be gone if a contender
        // reclaimed a lock it judged stale.
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Acquires the advisory lock at `path`.
///
/// # Errors
///
/// [`Error::LockTimeout`] (retryable) once the attempt budget is spent
/// against a live holder; [`Error::Io`] for unexpected filesystem failures.
pub(crate) async fn acquire(path: &Path, config: &LockConfig) -> Result<LockGuard> {
    let mut delay = config.initial_delay;
    let mut waited = Duration::ZERO;
    let mut attempts = 0u32;

    while attempts < config.max_attempts {
        attempts += 1;
        match try_create(path).await {
            Ok(()) => {
                return Ok(LockGuard {
                    path: path.to_path_buf(),
                });
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                if reclaim_if_stale(path).await? {
                    // Dead or unreadable holder cleaned up; no backoff.
                    continue;
                }
                tracing::debug!(
                    path = %path.display(),
                    attempt = attempts,
                    delay_ms = delay.as_millis() as u64,
                    "lock held by live process, backing off"
                );
                tokio::time::sleep(delay).await;
                waited += delay;
                delay = (delay * 2).min(config.max_delay);
            }
            Err(e) => return Err(Error::Io(e)),
        }
    }

    Err(Error::LockTimeout {
        attempts,
        waited_ms: u64::try_from(waited.as_millis()).unwrap_or(u64::MAX),
    })
}

/// Exclusively creates the lock file and records our pid in it.
async fn try_create(path: &Path) -> io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(std::process::id().to_string().as_bytes())
        .await?;
    file.flush().await?;
    Ok(())
}

/// Inspects an existing lock file. Returns true when it was stale and has
/// been removed, meaning the caller should retry immediately.
async fn reclaim_if_stale(path: &Path) -> Result<bool> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        // The holder released between our create attempt and this read.
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(Error::Io(e)),
    };

    let trimmed = content.trim();
    if trimmed.is_empty() {
        // A holder that just created the file but has not recorded its pid
        // yet. Back off; the pid will be there on the next attempt.
        return Ok(false);
    }

    let Ok(pid) = trimmed.parse::<u32>() else {
        tracing::warn!(path = %path.display(), "lock file has invalid contents, removing");
        remove_lock(path).await?;
        return Ok(true);
    };

    if process::is_alive(pid) {
        return Ok(false);
    }

    tracing::warn!(pid, path = %path.display(), "reclaiming stale lock from dead process");
    remove_lock(path).await?;
    Ok(true)
}

async fn remove_lock(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        // Another contender removed it first; that is fine.
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Io(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> LockConfig {
        LockConfig {
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
            max_attempts: 4,
        }
    }

    #[tokio::test]
    async fn acquire_writes_our_pid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.lock");

        let guard = acquire(&path, &LockConfig::default()).await.unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim(), std::process::id().to_string());
        drop(guard);
    }

    #[tokio::test]
    async fn drop_releases_the_lock() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.lock");

        let guard = acquire(&path, &LockConfig::default()).await.unwrap();
        assert!(path.exists());
        drop(guard);
        assert!(!path.exists());

        // And it can be taken again.
        let _guard = acquire(&path, &LockConfig::default()).await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stale_lock_is_reclaimed_without_backoff() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.lock");
        std::fs::write(&path, "4000000000").unwrap();

        let config = LockConfig {
            // A full backoff walk at these settings would be absurdly
            // long; success proves the stale path skipped it.
            initial_delay: Duration::from_secs(30),
            max_delay: Duration::from_secs(30),
            max_attempts: 3,
        };
        let started = std::time::Instant::now();
        let _guard = acquire(&path, &config).await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn garbage_contents_are_treated_as_stale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.lock");
        std::fs::write(&path, "not-a-pid").unwrap();

        let _guard = acquire(&path, &fast_config()).await.unwrap();
    }

    #[tokio::test]
    async fn live_holder_times_out_with_retryable_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.lock");
        // Our own pid is definitely alive.
        std::fs::write(&path, std::process::id().to_string()).unwrap();

        let err = acquire(&path, &fast_config()).await.unwrap_err();
        assert!(matches!(err, Error::LockTimeout { attempts: 4, .. }));
        assert!(err.is_retryable());

        // The foreign lock file must not have been touched.
        assert!(path.exists());
    }
}
