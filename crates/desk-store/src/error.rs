use desk_merge::MergeError;
use desk_sla::SlaError;
use desk_types::{TicketId, TypeError};

/// Errors produced by state transitions and backend calls.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum StoreError {
    #[error(transparent)]
    Sla(#[from] SlaError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("ticket not found: {0}")]
    TicketNotFound(TicketId),

    /// The backend could not serve the request. Callers may retry.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("state lock poisoned")]
    LockPoisoned,

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Returns `true` when the request itself was wrong (bad policy, bad
    /// selection, bad payload) rather than the backend failing.
    pub fn is_validation(&self) -> bool {
        match self {
            Self::Sla(e) => !matches!(e, SlaError::PolicyNotFound(_)),
            Self::Merge(e) => e.is_validation() || matches!(e, MergeError::InvalidPayload(_)),
            Self::Type(_) => true,
            _ => false,
        }
    }

    /// Returns `true` when a referenced ticket or policy does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::TicketNotFound(_)
                | Self::Merge(MergeError::TicketNotFound(_))
                | Self::Sla(SlaError::PolicyNotFound(_))
        )
    }
}

/// Convenience alias for store results.
pub type StoreResult<T> = Result<T, StoreError>;
