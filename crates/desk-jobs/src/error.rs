use crate::job::JobId;

/// Errors produced when configuring or awaiting jobs.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum JobError {
    #[error("invalid job config: {0}")]
    InvalidConfig(String),

    /// The job's task went away before reaching a terminal state.
    #[error("job {0} stopped without finishing")]
    Aborted(JobId),
}

/// Convenience alias for job results.
pub type JobResult<T> = Result<T, JobError>;
