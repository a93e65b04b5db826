//! Status lifecycle state machine.
//!
//! One transition table, one lookup. Staying in place is always legal for a
//! status that allows it; the table is the single source of truth and is
//! enforced at the point a status changes, never retroactively.

use crate::domain::Status;
use crate::error::{Error, Result};

/// Returns the statuses reachable from `from`, including `from` itself
/// where the table allows staying in place.
#[must_use]
pub fn valid_transitions(from: Status) -> &'static [Status] {
    match from {
        Status::Pending => &[Status::Pending, Status::InProgress, Status::Archived],
        Status::InProgress => &[
            Status::InProgress,
            Status::Pending,
            Status::Done,
            Status::Archived,
        ],
        Status::Done => &[Status::Done, Status::Archived],
        Status::Archived => &[Status::Archived, Status::Pending],
    }
}

/// Validates a status transition against the table.
///
/// # Errors
///
/// Returns [`Error::InvalidTransition`] naming the illegal pair and the
/// legal alternatives.
pub fn validate_transition(from: Status, to: Status) -> Result<()> {
    if valid_transitions(from).contains(&to) {
        return Ok(());
    }
    let allowed = valid_transitions(from)
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    Err(Error::InvalidTransition { from, to, allowed })
}
