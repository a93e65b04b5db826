//! Cycle detection for blocking dependencies.
//!
//! The check is a precondition, not a background invariant: it must run —
//! and a positive result must be honored — before a new blocking edge is
//! persisted. Existing cycles in loaded data are not repaired here.

use super::GraphSnapshot;
use crate::domain::ItemId;
use petgraph::graph::NodeIndex;
use std::collections::HashSet;

/// Result of a prospective-edge cycle check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleCheck {
    /// Whether adding the edge would close a cycle.
    pub has_cycle: bool,

    /// The discovered cycle path, starting and ending at the dependent
    /// item (`[item_id, depends_on_id, ..., item_id]`), or `[item_id]`
    /// alone for a self-dependency. `None` when no cycle was found.
    pub path: Option<Vec<ItemId>>,
}

impl CycleCheck {
    fn clear() -> Self {
        Self {
            has_cycle: false,
            path: None,
        }
    }
}

/// Checks whether adding the blocking edge `item_id -> depends_on_id`
/// would close a cycle over the existing edges.
///
/// A self-edge is immediately cyclic. Otherwise the existing forward edges
/// are searched depth-first from `depends_on_id`; reaching `item_id` means
/// the new edge would complete a loop back to it. Endpoints missing from
/// the snapshot cannot participate in any existing path, so the check is
/// negative for them.
///
/// # Examples
///
/// ```
/// use mull::graph::{GraphSnapshot, would_create_cycle};
/// use mull::domain::ItemId;
///
/// let snapshot = GraphSnapshot::build(&[]);
/// let check = would_create_cycle(&snapshot, ItemId(1), ItemId(1));
/// assert!(check.has_cycle);
/// assert_eq!(check.path, Some(vec![ItemId(1)]));
/// ```
#[must_use]
pub fn would_create_cycle(
    snapshot: &GraphSnapshot,
    item_id: ItemId,
    depends_on_id: ItemId,
) -> CycleCheck {
    if item_id == depends_on_id {
        return CycleCheck {
            has_cycle: true,
            path: Some(vec![item_id]),
        };
    }

    let (Some(start), Some(_)) = (snapshot.node(depends_on_id), snapshot.node(item_id)) else {
        return CycleCheck::clear();
    };

    let mut visited: HashSet<NodeIndex> = HashSet::from([start]);
    let mut path = vec![item_id, depends_on_id];
    if walk(snapshot, start, item_id, &mut visited, &mut path) {
        CycleCheck {
            has_cycle: true,
            path: Some(path),
        }
    } else {
        CycleCheck::clear()
    }
}

/// DFS over forward edges, growing `path` along the current branch. Returns
/// true the moment `target` is reached, leaving the full cycle in `path`.
fn walk(
    snapshot: &GraphSnapshot,
    current: NodeIndex,
    target: ItemId,
    visited: &mut HashSet<NodeIndex>,
    path: &mut Vec<ItemId>,
) -> bool {
    for next in snapshot.inner().neighbors(current) {
        let next_id = snapshot.id_of(next);
        if next_id == target {
            path.push(target);
            return true;
        }
        if visited.insert(next) {
            path.push(next_id);
            if walk(snapshot, next, target, visited, path) {
                return true;
            }
            path.pop();
        }
    }
    false
}
