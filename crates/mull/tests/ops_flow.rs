//! End-to-end tests for the operation glue: dependency management with
//! cycle enforcement, and state-machine-checked status changes, all
//! persisted through the store.

use mull::config::StoreConfig;
use mull::domain::{DependencyKind, Item, ItemId, NewItem, Status};
use mull::error::Error;
use mull::graph::{self, GraphSnapshot};
use mull::ops;
use mull::store::{FileStore, ItemStore};
use tempfile::TempDir;

async fn open_store(dir: &TempDir) -> FileStore {
    FileStore::open(StoreConfig {
        data_dir: dir.path().to_path_buf(),
        ..StoreConfig::default()
    })
    .await
    .unwrap()
}

async fn seed(store: &FileStore, count: u64) -> Vec<Item> {
    let mut items = Vec::new();
    for n in 1..=count {
        items.push(store.append(NewItem::new(format!("decision {n}"))).await.unwrap());
    }
    items
}

#[tokio::test]
async fn add_dependency_persists_the_edge() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let items = seed(&store, 2).await;

    let updated = ops::add_dependency(&store, items[1].id, items[0].id, DependencyKind::Blocks)
        .await
        .unwrap();
    assert_eq!(updated.dependencies.len(), 1);
    assert_eq!(updated.dependencies[0].depends_on_id, items[0].id);

    // Visible in a fresh snapshot.
    let loaded = store.read_all().await.unwrap();
    let snapshot = GraphSnapshot::build(&loaded);
    assert_eq!(snapshot.dependencies_of(items[1].id), vec![items[0].id]);
    assert!(graph::is_blocked(&snapshot, items[1].id));
}

#[tokio::test]
async fn self_dependency_is_rejected() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let items = seed(&store, 1).await;

    let err = ops::add_dependency(&store, items[0].id, items[0].id, DependencyKind::Blocks)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn missing_endpoints_are_not_found() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let items = seed(&store, 1).await;

    let err = ops::add_dependency(&store, ItemId(9), items[0].id, DependencyKind::Blocks)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(ItemId(9))));

    let err = ops::add_dependency(&store, items[0].id, ItemId(9), DependencyKind::Blocks)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(ItemId(9))));
}

#[tokio::test]
async fn closing_a_cycle_is_rejected_with_the_path() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let items = seed(&store, 3).await;
    let (a, b, c) = (items[0].id, items[1].id, items[2].id);

    ops::add_dependency(&store, b, a, DependencyKind::Blocks).await.unwrap();
    ops::add_dependency(&store, c, b, DependencyKind::Blocks).await.unwrap();

    let err = ops::add_dependency(&store, a, c, DependencyKind::Blocks)
        .await
        .unwrap_err();
    match err {
        Error::CycleDetected { path } => assert_eq!(path, vec![a, c, b, a]),
        other => panic!("expected CycleDetected, got {other:?}"),
    }

    // The rejected edge never reached disk.
    let loaded = store.get(a).await.unwrap().unwrap();
    assert!(loaded.dependencies.is_empty());
}

#[tokio::test]
async fn duplicate_edges_are_idempotent() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let items = seed(&store, 2).await;

    ops::add_dependency(&store, items[1].id, items[0].id, DependencyKind::Blocks)
        .await
        .unwrap();
    let again = ops::add_dependency(&store, items[1].id, items[0].id, DependencyKind::Blocks)
        .await
        .unwrap();
    assert_eq!(again.dependencies.len(), 1);
}

#[tokio::test]
async fn same_pair_may_carry_different_kinds() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let items = seed(&store, 2).await;

    ops::add_dependency(&store, items[1].id, items[0].id, DependencyKind::Blocks)
        .await
        .unwrap();
    let updated = ops::add_dependency(&store, items[1].id, items[0].id, DependencyKind::RelatesTo)
        .await
        .unwrap();
    assert_eq!(updated.dependencies.len(), 2);
}

#[tokio::test]
async fn informational_kinds_bypass_the_cycle_check() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let items = seed(&store, 2).await;

    // A relates-to loop is fine; only blocking edges form cycles.
    ops::add_dependency(&store, items[0].id, items[1].id, DependencyKind::RelatesTo)
        .await
        .unwrap();
    ops::add_dependency(&store, items[1].id, items[0].id, DependencyKind::RelatesTo)
        .await
        .unwrap();
}

#[tokio::test]
async fn remove_dependency_drops_the_edge() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let items = seed(&store, 2).await;

    ops::add_dependency(&store, items[1].id, items[0].id, DependencyKind::Blocks)
        .await
        .unwrap();
    let updated = ops::remove_dependency(&store, items[1].id, items[0].id)
        .await
        .unwrap();
    assert!(updated.dependencies.is_empty());

    let err = ops::remove_dependency(&store, items[1].id, items[0].id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DependencyNotFound { .. }));
}

#[tokio::test]
async fn status_changes_go_through_the_state_machine() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let items = seed(&store, 1).await;
    let id = items[0].id;

    // pending -> done is not in the table.
    let err = ops::set_status(&store, id, Status::Done).await.unwrap_err();
    match &err {
        Error::InvalidTransition { allowed, .. } => {
            assert!(allowed.contains("in-progress"));
        }
        other => panic!("expected InvalidTransition, got {other:?}"),
    }
    assert_eq!(store.get(id).await.unwrap().unwrap().status, Status::Pending);

    // The legal route works.
    ops::set_status(&store, id, Status::InProgress).await.unwrap();
    let done = ops::set_status(&store, id, Status::Done).await.unwrap();
    assert_eq!(done.status, Status::Done);
    assert!(done.updated_at >= done.created_at);
}

#[tokio::test]
async fn resolving_a_blocker_unblocks_exactly_its_ready_dependents() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let items = seed(&store, 3).await;
    let (a, b, c) = (items[0].id, items[1].id, items[2].id);

    // b -> a, c -> b.
    ops::add_dependency(&store, b, a, DependencyKind::Blocks).await.unwrap();
    ops::add_dependency(&store, c, b, DependencyKind::Blocks).await.unwrap();

    // Before anything resolves, the chain resolves bottom-up.
    let snapshot = GraphSnapshot::build(&store.read_all().await.unwrap());
    assert_eq!(graph::resolution_order(&snapshot), vec![a, b, c]);

    // Resolve a; only b becomes workable, c still waits on b.
    ops::set_status(&store, a, Status::InProgress).await.unwrap();
    ops::set_status(&store, a, Status::Done).await.unwrap();

    let snapshot = GraphSnapshot::build(&store.read_all().await.unwrap());
    assert_eq!(graph::items_unblocked_by(&snapshot, a), vec![b]);
    assert!(!graph::is_blocked(&snapshot, b));
    assert!(graph::is_blocked(&snapshot, c));
    assert_eq!(graph::resolution_order(&snapshot), vec![b, c]);
}
