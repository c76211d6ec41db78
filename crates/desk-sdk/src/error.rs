use thiserror::Error;

use desk_jobs::JobError;
use desk_merge::MergeError;
use desk_sla::SlaError;
use desk_store::StoreError;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error(transparent)]
    Sla(#[from] SlaError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Job(#[from] JobError),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

impl SdkError {
    /// Returns `true` for errors the user fixes by changing their input.
    pub fn is_validation(&self) -> bool {
        match self {
            Self::Sla(e) => !matches!(e, SlaError::PolicyNotFound(_)),
            Self::Merge(e) => e.is_validation() || matches!(e, MergeError::InvalidPayload(_)),
            Self::Store(e) => e.is_validation(),
            Self::Job(JobError::InvalidConfig(_)) => true,
            Self::Job(_) => false,
            Self::InvalidOperation(_) => true,
        }
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
