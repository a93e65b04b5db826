//! Dependency graph snapshot over the full item set.
//!
//! A [`GraphSnapshot`] is built fresh from an item snapshot for every
//! query and discarded afterwards — create, query, discard. It holds no
//! references back into the items, only ids and statuses, so it carries no
//! concurrency obligations of its own and cannot go stale in interesting
//! ways: it is simply a picture of one moment.
//!
//! Only `blocks` dependencies become edges. Edge direction is **dependent
//! -> dependency** (source depends on target) throughout this crate.

pub mod analyzer;
pub mod cycle;

pub use analyzer::{
    BlockedItem, DependencyChain, GraphStats, blocked_items, dependency_chain, is_blocked,
    items_unblocked_by, resolution_order, stats,
};
pub use cycle::{CycleCheck, would_create_cycle};

use crate::domain::{DependencyKind, Item, ItemId, Status};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// An immutable picture of the blocking-dependency graph at one moment.
///
/// # Examples
///
/// ```
/// use mull::graph::GraphSnapshot;
///
/// let snapshot = GraphSnapshot::build(&[]);
/// assert!(snapshot.is_empty());
/// ```
pub struct GraphSnapshot {
    /// Blocking edges, dependent -> dependency.
    graph: DiGraph<ItemId, ()>,
    /// Id to node lookup.
    node_map: HashMap<ItemId, NodeIndex>,
    /// Status of every indexed item.
    statuses: HashMap<ItemId, Status>,
}

impl GraphSnapshot {
    /// Builds a snapshot from the full item set.
    ///
    /// Every item becomes a node; every `blocks` dependency becomes an
    /// edge. A blocking edge whose target id is not present in the item set
    /// is skipped with a warning — the graph never invents nodes for
    /// dangling references.
    #[must_use]
    pub fn build(items: &[Item]) -> Self {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::with_capacity(items.len());
        let mut statuses = HashMap::with_capacity(items.len());

        for item in items {
            let node = graph.add_node(item.id);
            node_map.insert(item.id, node);
            statuses.insert(item.id, item.status);
        }

        for item in items {
            for dep in item.blocking_dependencies() {
                let Some(&to) = node_map.get(&dep.depends_on_id) else {
                    tracing::warn!(
                        item = %item.id,
                        depends_on = %dep.depends_on_id,
                        "skipping blocking edge to unknown item"
                    );
                    continue;
                };
                let from = node_map[&item.id];
                graph.add_edge(from, to, ());
            }
        }

        Self {
            graph,
            node_map,
            statuses,
        }
    }

    /// Number of items in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    /// Whether the snapshot contains no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }

    /// Whether the given id is indexed.
    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.node_map.contains_key(&id)
    }

    /// Ids of the items `id` depends on (direct blocking targets), sorted.
    #[must_use]
    pub fn dependencies_of(&self, id: ItemId) -> Vec<ItemId> {
        self.adjacent(id, Direction::Outgoing)
    }

    /// Ids of the items that depend on `id` (direct dependents), sorted.
    #[must_use]
    pub fn dependents_of(&self, id: ItemId) -> Vec<ItemId> {
        self.adjacent(id, Direction::Incoming)
    }

    fn adjacent(&self, id: ItemId, direction: Direction) -> Vec<ItemId> {
        let Some(&node) = self.node_map.get(&id) else {
            return Vec::new();
        };
        let mut out: Vec<ItemId> = self
            .graph
            .neighbors_directed(node, direction)
            .map(|n| self.graph[n])
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// All indexed ids, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = self.node_map.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub(crate) fn node(&self, id: ItemId) -> Option<NodeIndex> {
        self.node_map.get(&id).copied()
    }

    pub(crate) fn id_of(&self, node: NodeIndex) -> ItemId {
        self.graph[node]
    }

    pub(crate) fn inner(&self) -> &DiGraph<ItemId, ()> {
        &self.graph
    }

    /// Whether the item's status counts as resolved. Unknown ids are
    /// treated as unresolved; they cannot occur for nodes in the graph.
    pub(crate) fn is_resolved(&self, id: ItemId) -> bool {
        self.statuses.get(&id).is_some_and(|s| s.is_resolved())
    }
}
