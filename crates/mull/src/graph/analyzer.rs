//! Blocked-item and resolution-order analysis.
//!
//! Stateless query functions over a [`GraphSnapshot`]. "Resolved" means a
//! status of done or archived; everything else can block and be blocked.
//! An empty snapshot is valid input everywhere and yields empty results.

use super::GraphSnapshot;
use crate::domain::ItemId;
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// One blocked item and why it is blocked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedItem {
    /// The blocked item.
    pub id: ItemId,

    /// Direct unresolved blockers, sorted.
    pub blocked_by: Vec<ItemId>,

    /// Every unresolved item reachable through forward edges, sorted.
    pub transitive_blockers: Vec<ItemId>,

    /// Whether resolving the direct blockers alone would unblock the item:
    /// there is at least one direct blocker and none of them is itself
    /// blocked.
    pub can_unblock: bool,
}

/// The longest blocking chain hanging off one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyChain {
    /// The path from the item to a leaf blocker, item first.
    pub chain: Vec<ItemId>,

    /// `chain.len() - 1`.
    pub depth: usize,

    /// Count of all distinct items reachable through forward edges — the
    /// whole upstream subgraph, not just the longest path.
    pub total_blockers: usize,
}

/// Aggregate graph diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphStats {
    /// Number of items in the snapshot.
    pub total_items: usize,

    /// Items with at least one outgoing blocking edge.
    pub items_with_dependencies: usize,

    /// Items currently blocked.
    pub blocked_items: usize,

    /// Maximum blocking-chain depth across all items.
    pub max_chain_depth: usize,
}

/// Computes every blocked item with its direct and transitive blockers.
///
/// An unresolved item is blocked iff any unresolved item is reachable from
/// it through forward edges — resolved intermediates do not stop the
/// traversal, so an item whose direct targets are all done can still be
/// blocked from deeper in the graph. Results are sorted by id.
#[must_use]
pub fn blocked_items(snapshot: &GraphSnapshot) -> Vec<BlockedItem> {
    let mut entries = Vec::new();
    let mut blocked_ids: HashSet<ItemId> = HashSet::new();

    for id in snapshot.ids() {
        if snapshot.is_resolved(id) {
            continue;
        }
        let Some(node) = snapshot.node(id) else {
            continue;
        };
        let transitive_blockers = unresolved_closure(snapshot, node);
        if transitive_blockers.is_empty() {
            continue;
        }
        let mut blocked_by: Vec<ItemId> = snapshot
            .inner()
            .neighbors(node)
            .map(|n| snapshot.id_of(n))
            .filter(|&b| !snapshot.is_resolved(b))
            .collect();
        blocked_by.sort_unstable();
        blocked_by.dedup();

        blocked_ids.insert(id);
        entries.push((id, blocked_by, transitive_blockers));
    }

    entries
        .into_iter()
        .map(|(id, blocked_by, transitive_blockers)| {
            // With no direct unresolved blocker the blockage sits deeper in
            // the graph, and resolving direct blockers cannot clear it.
            let can_unblock = !blocked_by.is_empty()
                && blocked_by.iter().all(|b| !blocked_ids.contains(b));
            BlockedItem {
                id,
                blocked_by,
                transitive_blockers,
                can_unblock,
            }
        })
        .collect()
}

/// Whether the item is currently blocked.
///
/// Equivalent to `id` appearing in [`blocked_items`], computed without
/// materializing the full report.
#[must_use]
pub fn is_blocked(snapshot: &GraphSnapshot, id: ItemId) -> bool {
    if snapshot.is_resolved(id) {
        return false;
    }
    let Some(node) = snapshot.node(id) else {
        return false;
    };
    !unresolved_closure(snapshot, node).is_empty()
}

/// Predicts which items would become unblocked if `id` were resolved.
///
/// Returns the unresolved direct dependents of `id` that have no other
/// unresolved direct blocker. Pure prediction; nothing is mutated. Sorted
/// by id.
#[must_use]
pub fn items_unblocked_by(snapshot: &GraphSnapshot, id: ItemId) -> Vec<ItemId> {
    let Some(node) = snapshot.node(id) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for dependent_node in snapshot.inner().neighbors_directed(node, Direction::Incoming) {
        let dependent = snapshot.id_of(dependent_node);
        if snapshot.is_resolved(dependent) {
            continue;
        }
        let other_unresolved = snapshot
            .inner()
            .neighbors(dependent_node)
            .map(|n| snapshot.id_of(n))
            .any(|b| b != id && !snapshot.is_resolved(b));
        if !other_unresolved {
            out.push(dependent);
        }
    }
    out.sort_unstable();
    out.dedup();
    out
}

/// Computes the longest blocking chain starting at `id`.
///
/// The chain follows forward edges to a leaf blocker regardless of status;
/// ties between equally deep branches resolve toward the smaller id so the
/// result is deterministic. An id absent from the snapshot yields the
/// trivial chain `[id]`.
#[must_use]
pub fn dependency_chain(snapshot: &GraphSnapshot, id: ItemId) -> DependencyChain {
    let Some(start) = snapshot.node(id) else {
        return DependencyChain {
            chain: vec![id],
            depth: 0,
            total_blockers: 0,
        };
    };

    let mut memo = HashMap::new();
    let mut on_stack = HashSet::new();
    let depth = longest_from(snapshot, start, &mut memo, &mut on_stack);

    let mut chain = vec![id];
    let mut current = start;
    while let Some(&(_, Some(next))) = memo.get(&current) {
        chain.push(snapshot.id_of(next));
        current = next;
    }

    let total_blockers = reachable_count(snapshot, start);

    DependencyChain {
        chain,
        depth,
        total_blockers,
    }
}

/// Computes a topological resolution order over the unresolved items.
///
/// For every blocking edge `A -> B` (A depends on B), B precedes A.
/// Resolved items are excluded entirely — they are already settled and do
/// not appear in the sequence. Kahn's algorithm with an id-ordered ready
/// set keeps the output deterministic. Items on a pre-existing cycle (only
/// possible in hand-edited data) never reach in-degree zero and are
/// omitted.
#[must_use]
pub fn resolution_order(snapshot: &GraphSnapshot) -> Vec<ItemId> {
    let mut indegree: HashMap<ItemId, usize> = HashMap::new();
    for id in snapshot.ids() {
        if snapshot.is_resolved(id) {
            continue;
        }
        let Some(node) = snapshot.node(id) else {
            continue;
        };
        let unresolved_deps = snapshot
            .inner()
            .neighbors(node)
            .map(|n| snapshot.id_of(n))
            .filter(|&b| !snapshot.is_resolved(b))
            .count();
        indegree.insert(id, unresolved_deps);
    }

    let mut ready: BTreeSet<ItemId> = indegree
        .iter()
        .filter(|&(_, &deps)| deps == 0)
        .map(|(&id, _)| id)
        .collect();

    let mut order = Vec::with_capacity(indegree.len());
    while let Some(id) = ready.pop_first() {
        order.push(id);
        let Some(node) = snapshot.node(id) else {
            continue;
        };
        for dependent_node in snapshot.inner().neighbors_directed(node, Direction::Incoming) {
            let dependent = snapshot.id_of(dependent_node);
            if let Some(deps) = indegree.get_mut(&dependent) {
                if *deps > 0 {
                    *deps -= 1;
                    if *deps == 0 {
                        ready.insert(dependent);
                    }
                }
            }
        }
    }
    order
}

/// Aggregate counts over the snapshot.
#[must_use]
pub fn stats(snapshot: &GraphSnapshot) -> GraphStats {
    let mut memo = HashMap::new();
    let mut max_chain_depth = 0;
    let mut items_with_dependencies = 0;

    for id in snapshot.ids() {
        let Some(node) = snapshot.node(id) else {
            continue;
        };
        if snapshot.inner().neighbors(node).next().is_some() {
            items_with_dependencies += 1;
        }
        let mut on_stack = HashSet::new();
        let depth = longest_from(snapshot, node, &mut memo, &mut on_stack);
        max_chain_depth = max_chain_depth.max(depth);
    }

    GraphStats {
        total_items: snapshot.len(),
        items_with_dependencies,
        blocked_items: blocked_items(snapshot).len(),
        max_chain_depth,
    }
}

/// All unresolved items reachable from `start` through forward edges,
/// excluding `start` itself. BFS; resolved intermediates are traversed but
/// not reported. Sorted.
fn unresolved_closure(snapshot: &GraphSnapshot, start: NodeIndex) -> Vec<ItemId> {
    let mut visited: HashSet<NodeIndex> = HashSet::from([start]);
    let mut queue: VecDeque<NodeIndex> = VecDeque::from([start]);
    let mut out = Vec::new();

    while let Some(node) = queue.pop_front() {
        for next in snapshot.inner().neighbors(node) {
            if visited.insert(next) {
                let id = snapshot.id_of(next);
                if !snapshot.is_resolved(id) {
                    out.push(id);
                }
                queue.push_back(next);
            }
        }
    }
    out.sort_unstable();
    out
}

/// Count of distinct nodes reachable from `start`, excluding it.
fn reachable_count(snapshot: &GraphSnapshot, start: NodeIndex) -> usize {
    let mut visited: HashSet<NodeIndex> = HashSet::from([start]);
    let mut queue: VecDeque<NodeIndex> = VecDeque::from([start]);
    let mut count = 0;

    while let Some(node) = queue.pop_front() {
        for next in snapshot.inner().neighbors(node) {
            if visited.insert(next) {
                count += 1;
                queue.push_back(next);
            }
        }
    }
    count
}

/// Memoized longest-path depth from `node`, recording the best child for
/// chain reconstruction. Children are visited in id order so equal-depth
/// ties resolve toward the smaller id. A back-edge onto the current stack
/// (pre-existing cycle) terminates that branch at depth zero instead of
/// recursing forever.
fn longest_from(
    snapshot: &GraphSnapshot,
    node: NodeIndex,
    memo: &mut HashMap<NodeIndex, (usize, Option<NodeIndex>)>,
    on_stack: &mut HashSet<NodeIndex>,
) -> usize {
    if let Some(&(depth, _)) = memo.get(&node) {
        return depth;
    }
    if !on_stack.insert(node) {
        return 0;
    }

    let mut children: Vec<NodeIndex> = snapshot.inner().neighbors(node).collect();
    children.sort_unstable_by_key(|&n| snapshot.id_of(n));
    children.dedup();

    let mut best: (usize, Option<NodeIndex>) = (0, None);
    for child in children {
        let depth = longest_from(snapshot, child, memo, on_stack) + 1;
        if depth > best.0 {
            best = (depth, Some(child));
        }
    }

    on_stack.remove(&node);
    memo.insert(node, best);
    best.0
}
