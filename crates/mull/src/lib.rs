//! Mull — a tracker for decisions you are deliberately not making yet.
//!
//! The crate has two load-bearing subsystems and a little glue:
//!
//! - The **dependency graph engine** ([`graph`]): builds a
//!   blocking-relationship snapshot over the full item set, detects cycles
//!   before an edge is committed, derives blocked sets with their direct
//!   and transitive blockers, and produces topological resolution orders.
//! - The **concurrent durable store** ([`store`]): one JSON record per
//!   line, serialized across independent processes by an advisory pid lock
//!   file with stale-holder reclamation, with every rewrite going through
//!   a temp file and an atomic rename so a crash can never tear the file.
//!
//! The two are deliberately decoupled: the graph is a pure
//! create-query-discard value built from whatever snapshot the caller
//! loaded, and the store neither knows nor cares what the records mean.
//! [`ops`] composes them along the one sanctioned control flow — load,
//! build, check, write back.
//!
//! # Example
//!
//! ```no_run
//! use mull::config::StoreConfig;
//! use mull::domain::{DependencyKind, NewItem};
//! use mull::graph::{self, GraphSnapshot};
//! use mull::ops;
//! use mull::store::{FileStore, ItemStore};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let store = FileStore::open(StoreConfig::default()).await?;
//!
//!     let groundwork = store.append(NewItem::new("pick a storage backend")).await?;
//!     let protocol = store.append(NewItem::new("design the sync protocol")).await?;
//!     ops::add_dependency(&store, protocol.id, groundwork.id, DependencyKind::Blocks).await?;
//!
//!     let items = store.read_all().await?;
//!     let snapshot = GraphSnapshot::build(&items);
//!     for blocked in graph::blocked_items(&snapshot) {
//!         println!("item {} waits on {:?}", blocked.id, blocked.blocked_by);
//!     }
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod domain;
pub mod error;
pub mod graph;
pub mod ops;
pub mod status;
pub mod store;

pub use error::{Error, Result};
