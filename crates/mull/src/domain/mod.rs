//! Domain types for the deferred-decision tracker.
//!
//! An [`Item`] is a decision someone chose not to make yet. Items carry a
//! lifecycle [`Status`], a [`Priority`], free-form tags, and zero or more
//! [`Dependency`] edges on other items. Only `blocks` edges participate in
//! graph analysis; the other kinds are informational.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of the decision text, in characters.
pub const MAX_DECISION_LEN: usize = 500;

/// Unique identifier for an item.
///
/// Ids are positive integers assigned by the store (`max + 1` under its
/// lock) and immutable once set. They are plain values, cheap to copy and
/// usable as map keys.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Lifecycle status of an item.
///
/// Transitions between statuses are governed by the state machine in
/// [`crate::status`]; nothing else may move an item between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    /// Deferred; the decision has not been picked up.
    Pending,

    /// Actively being worked toward a resolution.
    InProgress,

    /// Decided. Resolved for blocking purposes.
    Done,

    /// Shelved without a decision. Resolved for blocking purposes.
    Archived,
}

impl Status {
    /// Whether this status counts as resolved for blocking computations.
    #[must_use]
    pub fn is_resolved(self) -> bool {
        matches!(self, Status::Done | Status::Archived)
    }

    /// The canonical serialized name of this status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in-progress",
            Status::Done => "done",
            Status::Archived => "archived",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority of an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait.
    Low,

    /// The default.
    #[default]
    Medium,

    /// Should be revisited soon.
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        };
        f.write_str(s)
    }
}

/// Kind of relationship between two items.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyKind {
    /// Hard blocker: the dependent cannot resolve until the target does.
    /// The only kind that participates in cycle detection, blocking
    /// computation, and resolution ordering.
    Blocks,

    /// Soft link, informational only.
    RelatesTo,

    /// Parent/child structure, informational only.
    Hierarchical,
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DependencyKind::Blocks => "blocks",
            DependencyKind::RelatesTo => "relates-to",
            DependencyKind::Hierarchical => "hierarchical",
        };
        f.write_str(s)
    }
}

/// A directed dependency edge, stored on the dependent item.
///
/// Identity is the `(owning item, depends_on_id)` pair; at most one edge of
/// a given kind may exist per pair (insertion de-duplicates).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// The item this edge points at.
    pub depends_on_id: ItemId,

    /// Kind of relationship.
    pub kind: DependencyKind,

    /// When the edge was created.
    pub created_at: DateTime<Utc>,
}

/// A deferred decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Store-assigned identity, immutable once set.
    pub id: ItemId,

    /// What is being deferred. Non-empty, trimmed, at most
    /// [`MAX_DECISION_LEN`] characters.
    pub decision: String,

    /// Free-form background for the future decider.
    pub context: String,

    /// Lifecycle status.
    pub status: Status,

    /// Priority.
    pub priority: Priority,

    /// Normalized tag set: lowercase, deduplicated, sorted.
    pub tags: Vec<String>,

    /// Outgoing dependency edges.
    #[serde(default)]
    pub dependencies: Vec<Dependency>,

    /// Optional revisit condition ("when the beta ships", a date, ...).
    #[serde(default)]
    pub trigger: Option<String>,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last-modification timestamp. Never precedes `created_at`.
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Validate record-level invariants.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated invariant: empty or
    /// overlong decision text, a self-dependency, or timestamps out of
    /// order.
    pub fn validate(&self) -> Result<(), String> {
        validate_decision(&self.decision)?;
        if self.dependencies.iter().any(|d| d.depends_on_id == self.id) {
            return Err(format!("item {} cannot depend on itself", self.id));
        }
        if self.updated_at < self.created_at {
            return Err("updated_at precedes created_at".to_string());
        }
        Ok(())
    }

    /// Iterates the blocking dependencies only.
    pub fn blocking_dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies
            .iter()
            .filter(|d| d.kind == DependencyKind::Blocks)
    }

    /// Stamps `updated_at`, preserving the `updated_at >= created_at`
    /// invariant against clock skew.
    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.created_at);
    }
}

/// Data for creating a new item. The store assigns id, status, and
/// timestamps.
#[derive(Debug, Clone, Default)]
pub struct NewItem {
    /// What is being deferred.
    pub decision: String,

    /// Free-form background.
    pub context: String,

    /// Priority (defaults to medium).
    pub priority: Priority,

    /// Tags; normalized on insert.
    pub tags: Vec<String>,

    /// Optional revisit condition.
    pub trigger: Option<String>,
}

impl NewItem {
    /// Creates a payload with the given decision text and defaults
    /// everywhere else.
    pub fn new(decision: impl Into<String>) -> Self {
        Self {
            decision: decision.into(),
            ..Self::default()
        }
    }

    /// Validate the creation payload.
    ///
    /// # Errors
    ///
    /// Returns a description of the violation when the decision text is
    /// empty after trimming or exceeds [`MAX_DECISION_LEN`] characters.
    pub fn validate(&self) -> Result<(), String> {
        validate_decision(&self.decision)
    }
}

fn validate_decision(decision: &str) -> Result<(), String> {
    if decision.trim().is_empty() {
        return Err("decision text must not be empty".to_string());
    }
    if decision.trim().chars().count() > MAX_DECISION_LEN {
        return Err(format!(
            "decision text exceeds {MAX_DECISION_LEN} characters"
        ));
    }
    Ok(())
}

/// Normalizes a tag list: lowercase, trimmed, empty entries dropped,
/// sorted, deduplicated. Insertion order is deliberately not preserved; the
/// tag set serializes identically regardless of how it was assembled.
#[must_use]
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = tags
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}
