//! Job execution on the tokio runtime.
//!
//! A job is a spawned task that moves from `Pending` to `Running`, advances
//! progress once per tick, and ends in `Completed` or `Failed`. Every change
//! is published on a `watch` channel; observers read the latest snapshot
//! and never block the job. There is no cancellation: once spawned, a job
//! runs until it finishes or fails.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::JobConfig;
use crate::error::{JobError, JobResult};
use crate::job::{JobId, JobSnapshot, JobState};

/// Spawns simulated jobs with a shared configuration.
#[derive(Clone, Debug, Default)]
pub struct JobRunner {
    config: JobConfig,
}

impl JobRunner {
    pub fn new(config: JobConfig) -> JobResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    /// Start a job. Must be called from within a tokio runtime.
    pub fn spawn(&self, name: impl Into<String>) -> JobHandle {
        let id = JobId::new();
        let (tx, rx) = watch::channel(JobSnapshot::pending(id, name.into()));
        let task = tokio::spawn(drive(self.config.clone(), tx));
        JobHandle { id, rx, task }
    }
}

/// Observer side of a running job.
pub struct JobHandle {
    id: JobId,
    rx: watch::Receiver<JobSnapshot>,
    task: JoinHandle<()>,
}

impl JobHandle {
    pub fn id(&self) -> JobId {
        self.id
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> JobSnapshot {
        self.rx.borrow().clone()
    }

    /// A receiver that sees every future update.
    pub fn subscribe(&self) -> watch::Receiver<JobSnapshot> {
        self.rx.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the job to reach a terminal state and return that snapshot.
    pub async fn wait(mut self) -> JobResult<JobSnapshot> {
        loop {
            {
                let current = self.rx.borrow_and_update();
                if current.is_terminal() {
                    return Ok(current.clone());
                }
            }
            if self.rx.changed().await.is_err() {
                let last = self.rx.borrow().clone();
                return if last.is_terminal() {
                    Ok(last)
                } else {
                    Err(JobError::Aborted(self.id))
                };
            }
        }
    }
}

async fn drive(config: JobConfig, tx: watch::Sender<JobSnapshot>) {
    let tick = Duration::from_millis(config.tick_ms);
    let (id, name) = {
        let s = tx.borrow();
        (s.id, s.name.clone())
    };
    tracing::debug!(job = %id, name = %name, steps = config.steps, "job started");

    publish(&tx, JobState::Running, 0);
    if config.fail_at == Some(0) {
        fail(&tx, 0);
        return;
    }

    for step in 1..=config.steps {
        tokio::time::sleep(tick).await;
        let progress = config.progress_at(step);

        if let Some(limit) = config.fail_at {
            if progress >= limit {
                fail(&tx, limit);
                return;
            }
        }
        publish(&tx, JobState::Running, progress);
    }

    publish(&tx, JobState::Completed, 100);
    tracing::info!(job = %id, name = %name, "job completed");
}

fn publish(tx: &watch::Sender<JobSnapshot>, state: JobState, progress: u8) {
    tx.send_modify(|s| {
        s.state = state;
        s.progress = s.progress.max(progress);
    });
}

fn fail(tx: &watch::Sender<JobSnapshot>, at: u8) {
    publish(tx, JobState::Failed(format!("simulated failure at {at}%")), at);
    let s = tx.borrow();
    tracing::warn!(job = %s.id, name = %s.name, progress = s.progress, "job failed");
}
