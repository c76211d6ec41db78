use desk_types::TypeError;

/// Errors that can occur while building or evaluating SLA policies.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SlaError {
    /// A policy failed creation-time validation.
    #[error("invalid SLA policy '{id}': {reason}")]
    InvalidPolicy { id: String, reason: String },

    /// Two policies in the same list share an id.
    #[error("duplicate SLA policy id: {0}")]
    DuplicatePolicy(String),

    /// A policy referenced by id does not exist.
    #[error("SLA policy not found: {0}")]
    PolicyNotFound(String),

    /// A shared type operation failed (reordering, parsing).
    #[error(transparent)]
    Type(#[from] TypeError),
}

impl SlaError {
    /// Create an invalid-policy error with an id and reason.
    pub fn invalid(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPolicy {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the SLA crate.
pub type Result<T> = std::result::Result<T, SlaError>;
