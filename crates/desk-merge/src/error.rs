//! Error types for the merge crate.

use desk_types::{FieldValue, TicketId};

/// Errors that can occur while planning or applying a merge.
///
/// The first three variants are validation errors an agent can fix by
/// changing the selection or the chosen values; they block submission.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MergeError {
    /// Fewer than two distinct tickets are selected.
    #[error("select at least 2 tickets to merge (selected {selected})")]
    TooFewTickets { selected: usize },

    /// The target ticket is not part of the selection.
    #[error("target ticket {0} is not among the selected tickets")]
    TargetNotSelected(TicketId),

    /// An agent-chosen value is not one of the conflicting candidates.
    #[error("'{value}' is not a candidate value for field '{field}'")]
    UnknownResolution { field: String, value: FieldValue },

    /// A payload is structurally invalid (no sources, target listed as a
    /// source).
    #[error("invalid merge payload: {0}")]
    InvalidPayload(String),

    /// A ticket referenced by the payload does not exist.
    #[error("ticket not found: {0}")]
    TicketNotFound(TicketId),
}

impl MergeError {
    /// Returns `true` for errors the agent resolves by editing the form.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::TooFewTickets { .. } | Self::TargetNotSelected(_) | Self::UnknownResolution { .. }
        )
    }
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;
