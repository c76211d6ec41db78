use serde::{Deserialize, Serialize};

use crate::error::{JobError, JobResult};

/// How simulated jobs advance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Number of progress increments between 0% and 100%.
    pub steps: u32,
    /// Delay before each increment, in milliseconds.
    pub tick_ms: u64,
    /// Fail once progress reaches this percentage.
    pub fail_at: Option<u8>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            steps: 10,
            tick_ms: 200,
            fail_at: None,
        }
    }
}

impl JobConfig {
    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_tick_ms(mut self, tick_ms: u64) -> Self {
        self.tick_ms = tick_ms;
        self
    }

    pub fn failing_at(mut self, percent: u8) -> Self {
        self.fail_at = Some(percent);
        self
    }

    pub fn validate(&self) -> JobResult<()> {
        if self.steps == 0 || self.steps > 100 {
            return Err(JobError::InvalidConfig(format!(
                "steps must be between 1 and 100, got {}",
                self.steps
            )));
        }
        if let Some(p) = self.fail_at {
            if p > 100 {
                return Err(JobError::InvalidConfig(format!(
                    "fail_at must be a percentage, got {p}"
                )));
            }
        }
        Ok(())
    }

    /// Progress after `step` increments. Reaches exactly 100 on the last.
    pub(crate) fn progress_at(&self, step: u32) -> u8 {
        (step.min(self.steps) * 100 / self.steps) as u8
    }
}
