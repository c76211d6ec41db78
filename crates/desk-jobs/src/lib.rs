//! Simulated background jobs.
//!
//! Long-running dashboard work (model training, imports, exports) is
//! modelled as a job with an explicit state and a 0-100 progress value.
//! [`JobRunner::spawn`] starts the job on tokio and returns a
//! [`JobHandle`] for observing it.
//!
//! ```rust,no_run
//! use desk_jobs::{JobConfig, JobRunner, JobState};
//!
//! # async fn demo() -> desk_jobs::JobResult<()> {
//! let runner = JobRunner::new(JobConfig::default().with_steps(4))?;
//! let done = runner.spawn("train assistant").wait().await?;
//! assert_eq!(done.state, JobState::Completed);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod job;
pub mod runner;

pub use config::JobConfig;
pub use error::{JobError, JobResult};
pub use job::{JobId, JobSnapshot, JobState};
pub use runner::{JobHandle, JobRunner};
