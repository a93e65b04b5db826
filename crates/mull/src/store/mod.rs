//! Concurrent durable storage for item records.
//!
//! One serialized [`Item`] per line of `items.jsonl` in the data
//! directory, with a co-located `items.lock` advisory lock file holding
//! the writing process's pid. Writers serialize through the lock; readers
//! take lock-free snapshots and may observe the state before or after any
//! in-flight write, but never a torn file — updates and deletes rewrite
//! through a sibling temp file and a single atomic rename.
//!
//! Id assignment happens inside the writer's critical section
//! (`max(existing) + 1`), which is what makes concurrent appends from
//! independent processes produce distinct ids.

pub(crate) mod lock;
mod process;

pub use lock::LockConfig;

use crate::config::StoreConfig;
use crate::domain::{Item, ItemId, NewItem, Status, normalize_tags};
use crate::error::{Error, Result};
use crate::status;
use async_trait::async_trait;
use chrono::Utc;
use std::io;
use std::path::{Path, PathBuf};

const ITEMS_FILE: &str = "items.jsonl";
const LOCK_FILE: &str = "items.lock";

/// Record-level persistence for items.
///
/// The trait is the seam between the core and its consumers (commands,
/// protocol handlers); [`FileStore`] is the durable implementation.
/// Implementations must be safe to share across concurrent tasks — every
/// method takes `&self` and does its own synchronization.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Creates a record from the payload, assigning the next id and the
    /// timestamps under the store's lock. Returns the stored item.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] before any state change when the payload is
    /// invalid; lock and IO errors from the critical section.
    async fn append(&self, new_item: NewItem) -> Result<Item>;

    /// Reads the full record set. Lock-free; an absent file is an empty
    /// set.
    ///
    /// # Errors
    ///
    /// [`Error::Corrupt`] on the first unparseable line — corruption is
    /// fatal, never skipped.
    async fn read_all(&self) -> Result<Vec<Item>>;

    /// Finds one record by id. `None` when absent.
    ///
    /// # Errors
    ///
    /// Same read errors as [`read_all`](Self::read_all).
    async fn get(&self, id: ItemId) -> Result<Option<Item>>;

    /// Replaces the record whose id matches `item.id`, stamping
    /// `updated_at`. Returns the stored item.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when no such record exists (no partial effect);
    /// [`Error::Validation`] when the replacement is invalid.
    async fn update(&self, item: Item) -> Result<Item>;

    /// Hard delete: removes the record entirely.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when no such record exists.
    async fn delete(&self, id: ItemId) -> Result<()>;

    /// Soft delete: flips the record's status to archived through the
    /// state machine and keeps it on disk.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when no such record exists.
    async fn archive(&self, id: ItemId) -> Result<Item>;

    /// The id the next append would assign: `max(existing) + 1`, or 1 for
    /// an empty store. Computed under the lock.
    ///
    /// # Errors
    ///
    /// Lock and read errors.
    async fn next_id(&self) -> Result<ItemId>;
}

/// Durable [`ItemStore`] backed by a line-delimited record file.
///
/// The struct itself is stateless between calls — all state lives in the
/// filesystem — so a single instance can be shared freely across tasks.
pub struct FileStore {
    items_path: PathBuf,
    lock_path: PathBuf,
    lock_config: LockConfig,
}

impl FileStore {
    /// Opens (and creates if needed) the data directory and returns a
    /// store over it.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] when the directory cannot be created.
    pub async fn open(config: StoreConfig) -> Result<Self> {
        tokio::fs::create_dir_all(&config.data_dir).await?;
        restrict_dir_permissions(&config.data_dir);
        Ok(Self {
            items_path: config.data_dir.join(ITEMS_FILE),
            lock_path: config.data_dir.join(LOCK_FILE),
            lock_config: config.lock,
        })
    }

    /// Path of the backing record file.
    #[must_use]
    pub fn items_path(&self) -> &Path {
        &self.items_path
    }

    async fn lock(&self) -> Result<lock::LockGuard> {
        lock::acquire(&self.lock_path, &self.lock_config).await
    }

    async fn read_records(&self) -> Result<Vec<Item>> {
        match mull_jsonl::read_jsonl(&self.items_path).await {
            Ok(items) => Ok(items),
            Err(mull_jsonl::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

fn max_id(items: &[Item]) -> u64 {
    items.iter().map(|item| item.id.0).max().unwrap_or(0)
}

#[async_trait]
impl ItemStore for FileStore {
    async fn append(&self, new_item: NewItem) -> Result<Item> {
        new_item.validate().map_err(Error::Validation)?;

        let guard = self.lock().await?;
        let existing = self.read_records().await?;
        let now = Utc::now();
        let item = Item {
            id: ItemId(max_id(&existing) + 1),
            decision: new_item.decision.trim().to_string(),
            context: new_item.context,
            status: Status::Pending,
            priority: new_item.priority,
            tags: normalize_tags(&new_item.tags),
            dependencies: Vec::new(),
            trigger: new_item.trigger,
            created_at: now,
            updated_at: now,
        };
        mull_jsonl::append_jsonl_line(&self.items_path, &item).await?;
        drop(guard);

        restrict_file_permissions(&self.items_path);
        Ok(item)
    }

    async fn read_all(&self) -> Result<Vec<Item>> {
        self.read_records().await
    }

    async fn get(&self, id: ItemId) -> Result<Option<Item>> {
        Ok(self
            .read_records()
            .await?
            .into_iter()
            .find(|item| item.id == id))
    }

    async fn update(&self, mut item: Item) -> Result<Item> {
        item.validate().map_err(Error::Validation)?;
        item.touch();

        let guard = self.lock().await?;
        let mut items = self.read_records().await?;
        let slot = items
            .iter_mut()
            .find(|existing| existing.id == item.id)
            .ok_or(Error::NotFound(item.id))?;
        slot.clone_from(&item);
        mull_jsonl::write_jsonl_atomic(&self.items_path, &items).await?;
        drop(guard);

        restrict_file_permissions(&self.items_path);
        Ok(item)
    }

    async fn delete(&self, id: ItemId) -> Result<()> {
        let guard = self.lock().await?;
        let mut items = self.read_records().await?;
        let before = items.len();
        items.retain(|item| item.id != id);
        if items.len() == before {
            return Err(Error::NotFound(id));
        }
        mull_jsonl::write_jsonl_atomic(&self.items_path, &items).await?;
        drop(guard);

        restrict_file_permissions(&self.items_path);
        Ok(())
    }

    async fn archive(&self, id: ItemId) -> Result<Item> {
        let guard = self.lock().await?;
        let mut items = self.read_records().await?;
        let slot = items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(Error::NotFound(id))?;
        status::validate_transition(slot.status, Status::Archived)?;
        slot.status = Status::Archived;
        slot.touch();
        let archived = slot.clone();
        mull_jsonl::write_jsonl_atomic(&self.items_path, &items).await?;
        drop(guard);

        restrict_file_permissions(&self.items_path);
        Ok(archived)
    }

    async fn next_id(&self) -> Result<ItemId> {
        let _guard = self.lock().await?;
        let items = self.read_records().await?;
        Ok(ItemId(max_id(&items) + 1))
    }
}

/// Best-effort owner-only permissions on the record file.
#[cfg(unix)]
fn restrict_file_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)) {
        tracing::debug!(path = %path.display(), error = %e, "could not tighten file permissions");
    }
}

#[cfg(not(unix))]
fn restrict_file_permissions(_path: &Path) {}

/// Best-effort owner-only permissions on the data directory.
#[cfg(unix)]
fn restrict_dir_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700)) {
        tracing::debug!(path = %path.display(), error = %e, "could not tighten directory permissions");
    }
}

#[cfg(not(unix))]
fn restrict_dir_permissions(_path: &Path) {}
