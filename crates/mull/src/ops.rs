//! Operation glue composing graph checks with store writes.
//!
//! Every mutation here follows the same shape: load the current record
//! set, build a snapshot, run the relevant check, write back through the
//! store. The store orders the writers; the checks run against the
//! snapshot the caller loaded, which is as strong a guarantee as a
//! lock-per-operation design can give.

use crate::domain::{Dependency, DependencyKind, Item, ItemId, Status};
use crate::error::{Error, Result};
use crate::graph::{GraphSnapshot, would_create_cycle};
use crate::status;
use crate::store::ItemStore;
use chrono::Utc;

/// Adds a dependency edge from `item_id` onto `depends_on_id`.
///
/// Blocking edges are cycle-checked against the current graph before
/// anything is persisted; the check is a hard precondition and a positive
/// result rejects the edge with the discovered path. Inserting an edge
/// that already exists (same pair, same kind) is an idempotent no-op.
///
/// # Errors
///
/// [`Error::Validation`] for a self-dependency, [`Error::NotFound`] when
/// either endpoint does not exist, [`Error::CycleDetected`] when a
/// blocking edge would close a loop.
pub async fn add_dependency<S>(
    store: &S,
    item_id: ItemId,
    depends_on_id: ItemId,
    kind: DependencyKind,
) -> Result<Item>
where
    S: ItemStore + ?Sized,
{
    if item_id == depends_on_id {
        return Err(Error::Validation(format!(
            "item {item_id} cannot depend on itself"
        )));
    }

    let items = store.read_all().await?;
    let mut item = items
        .iter()
        .find(|item| item.id == item_id)
        .cloned()
        .ok_or(Error::NotFound(item_id))?;
    if !items.iter().any(|item| item.id == depends_on_id) {
        return Err(Error::NotFound(depends_on_id));
    }

    if item
        .dependencies
        .iter()
        .any(|d| d.depends_on_id == depends_on_id && d.kind == kind)
    {
        return Ok(item);
    }

    if kind == DependencyKind::Blocks {
        let snapshot = GraphSnapshot::build(&items);
        let check = would_create_cycle(&snapshot, item_id, depends_on_id);
        if check.has_cycle {
            return Err(Error::CycleDetected {
                path: check.path.unwrap_or_else(|| vec![item_id]),
            });
        }
    }

    item.dependencies.push(Dependency {
        depends_on_id,
        kind,
        created_at: Utc::now(),
    });
    item.dependencies
        .sort_by_key(|d| (d.depends_on_id, d.kind));
    store.update(item).await
}

/// Removes every dependency edge from `item_id` onto `depends_on_id`.
///
/// # Errors
///
/// [`Error::NotFound`] when the item does not exist,
/// [`Error::DependencyNotFound`] when no such edge exists.
pub async fn remove_dependency<S>(
    store: &S,
    item_id: ItemId,
    depends_on_id: ItemId,
) -> Result<Item>
where
    S: ItemStore + ?Sized,
{
    let mut item = store
        .get(item_id)
        .await?
        .ok_or(Error::NotFound(item_id))?;
    let before = item.dependencies.len();
    item.dependencies
        .retain(|d| d.depends_on_id != depends_on_id);
    if item.dependencies.len() == before {
        return Err(Error::DependencyNotFound {
            item_id,
            depends_on_id,
        });
    }
    store.update(item).await
}

/// Moves an item to a new status through the state machine.
///
/// This is the enforcement point for lifecycle transitions: the table is
/// consulted here, with the item's current status, before anything is
/// written.
///
/// # Errors
///
/// [`Error::NotFound`] when the item does not exist,
/// [`Error::InvalidTransition`] when the table forbids the move.
pub async fn set_status<S>(store: &S, id: ItemId, to: Status) -> Result<Item>
where
    S: ItemStore + ?Sized,
{
    let mut item = store.get(id).await?.ok_or(Error::NotFound(id))?;
    status::validate_transition(item.status, to)?;
    item.status = to;
    store.update(item).await
}
