use std::sync::Arc;

use desk_jobs::{JobConfig, JobHandle, JobRunner};
use desk_merge::{detect_conflicts, MergeRequest, MergeResponse};
use desk_sla::{SlaConfig, SlaEvaluator, SlaPolicy, TicketSla};
use desk_store::{DeskState, InMemoryBackend, TicketBackend};
use desk_types::{TicketId, Timestamp};

use crate::error::{SdkError, SdkResult};
use crate::feedback::Feedback;
use crate::plan::MergePlan;

/// High-level support desk API over a ticket backend.
pub struct Desk {
    backend: Arc<dyn TicketBackend>,
    sla: SlaConfig,
    jobs: JobRunner,
}

impl Desk {
    pub fn new(backend: Arc<dyn TicketBackend>) -> Self {
        Self {
            backend,
            sla: SlaConfig::default(),
            jobs: JobRunner::default(),
        }
    }

    /// A desk backed by an in-memory store seeded with `state`.
    pub fn in_memory(state: DeskState) -> Self {
        Self::new(Arc::new(InMemoryBackend::new(state)))
    }

    pub fn with_sla_config(mut self, sla: SlaConfig) -> Self {
        self.sla = sla;
        self
    }

    pub fn with_job_config(mut self, config: JobConfig) -> SdkResult<Self> {
        self.jobs = JobRunner::new(config)?;
        Ok(self)
    }

    pub fn backend(&self) -> &Arc<dyn TicketBackend> {
        &self.backend
    }

    // ---- SLA operations ----

    async fn evaluator(&self) -> SdkResult<SlaEvaluator> {
        let policies = self.backend.list_policies().await?;
        Ok(SlaEvaluator::new(self.sla.clone(), policies)?)
    }

    pub async fn evaluate_ticket(&self, id: &TicketId, now: Timestamp) -> SdkResult<TicketSla> {
        let ticket = self.backend.get_ticket(id).await?;
        Ok(self.evaluator().await?.evaluate(&ticket, now))
    }

    /// SLA state of every ticket at `now`.
    pub async fn evaluate_all(&self, now: Timestamp) -> SdkResult<Vec<TicketSla>> {
        let evaluator = self.evaluator().await?;
        let tickets = self.backend.list_tickets().await?;
        Ok(tickets.iter().map(|t| evaluator.evaluate(t, now)).collect())
    }

    /// Tickets with at least one overdue clock at `now`.
    pub async fn breached(&self, now: Timestamp) -> SdkResult<Vec<TicketSla>> {
        let mut all = self.evaluate_all(now).await?;
        all.retain(TicketSla::is_breached);
        Ok(all)
    }

    pub async fn create_policy(&self, policy: SlaPolicy) -> Result<SlaPolicy, Feedback> {
        self.backend
            .create_policy(policy)
            .await
            .map_err(|e| Feedback::from(&SdkError::from(e)))
    }

    // ---- Merge operations ----

    /// Validate a selection and detect its field conflicts.
    pub async fn plan_merge(&self, selected: &[TicketId], target: &TicketId) -> SdkResult<MergePlan> {
        let request = MergeRequest::from_selection(selected, target)?;
        let mut tickets = Vec::with_capacity(request.source_ticket_ids.len() + 1);
        for id in request.selected_ids() {
            tickets.push(self.backend.get_ticket(&id).await?);
        }
        let conflicts = detect_conflicts(&tickets, target);
        Ok(MergePlan {
            request,
            conflicts,
            tickets,
        })
    }

    /// Submit a planned merge. Failures come back as user feedback, never as
    /// a raw error.
    pub async fn submit_merge(&self, plan: &MergePlan) -> Result<MergeResponse, Feedback> {
        let payload = plan.payload().map_err(|e| Feedback::for_merge(&e))?;
        match self.backend.merge_tickets(&payload).await {
            Ok(response) => {
                tracing::info!(target_ticket = %response.target_ticket_id, "merge submitted");
                Ok(response)
            }
            Err(e) => {
                tracing::warn!(error = %e, "merge submission failed");
                Err(Feedback::for_merge(&SdkError::from(e)))
            }
        }
    }

    // ---- Jobs ----

    /// Start a simulated background job.
    pub fn start_job(&self, name: impl Into<String>) -> JobHandle {
        self.jobs.spawn(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use desk_jobs::JobState;
    use desk_sla::SlaScope;
    use desk_store::StoreError;
    use desk_types::{parse_timestamp, Channel, FieldValue, Priority, Ticket, TicketStatus};

    fn created() -> Timestamp {
        parse_timestamp("2024-01-15T10:00:00Z").unwrap()
    }

    fn state() -> DeskState {
        DeskState::from_parts(
            vec![
                Ticket::new("A", Priority::High, Channel::Slack, created()).with_field("plan", "Pro"),
                Ticket::new("B", Priority::Low, Channel::Email, created()).with_field("plan", "Enterprise"),
            ],
            vec![
                SlaPolicy::new("high", "High", 1, SlaScope::priorities([Priority::High]))
                    .with_first_response(1, 0),
                SlaPolicy::new("default", "Default", 2, SlaScope::all()).with_first_response(4, 0),
            ],
        )
    }

    fn ids() -> Vec<TicketId> {
        vec!["A".into(), "B".into()]
    }

    #[tokio::test]
    async fn evaluates_and_finds_breaches() {
        let desk = Desk::in_memory(state());
        let now = created() + Duration::hours(2);

        let a = desk.evaluate_ticket(&"A".into(), now).await.unwrap();
        assert_eq!(a.policy_id.as_deref(), Some("high"));
        assert!(a.is_breached());

        let breached = desk.breached(now).await.unwrap();
        assert_eq!(breached.len(), 1);
        assert_eq!(breached[0].ticket_id, TicketId::from("A"));
        assert_eq!(desk.evaluate_all(now).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn plan_resolve_and_submit() {
        let backend = Arc::new(InMemoryBackend::new(state()));
        let desk = Desk::new(backend.clone());

        let mut plan = desk.plan_merge(&ids(), &"A".into()).await.unwrap();
        assert!(plan.has_conflicts());
        assert_eq!(plan.conflicts[0].selected_value, FieldValue::from("Pro"));

        plan.resolve("plan", "Enterprise").unwrap();
        assert!(plan.resolve("plan", "Free").is_err());
        assert!(plan.resolve("region", "EU").is_err());

        let response = desk.submit_merge(&plan).await.unwrap();
        assert_eq!(response.target_ticket_id, TicketId::from("A"));

        let a = backend.get_ticket(&"A".into()).await.unwrap();
        assert_eq!(a.field("plan"), Some(&FieldValue::from("Enterprise")));
        let b = backend.get_ticket(&"B".into()).await.unwrap();
        assert_eq!(b.status, TicketStatus::Closed);
    }

    #[tokio::test]
    async fn invalid_selection_is_reported_before_submission() {
        let desk = Desk::in_memory(state());
        let err = desk.plan_merge(&["A".into()], &"A".into()).await.unwrap_err();
        assert!(err.is_validation());
        assert!(Feedback::for_merge(&err).is_inline());

        let err = desk.plan_merge(&["A".into(), "Z".into()], &"A".into()).await.unwrap_err();
        assert!(matches!(err, SdkError::Store(StoreError::TicketNotFound(_))));
    }

    #[tokio::test]
    async fn backend_failure_becomes_toast_and_retry_succeeds() {
        let backend = Arc::new(InMemoryBackend::new(state()));
        let desk = Desk::new(backend.clone());
        let plan = desk.plan_merge(&ids(), &"A".into()).await.unwrap();

        backend.fail_next_merges(1);
        let feedback = desk.submit_merge(&plan).await.unwrap_err();
        assert_eq!(feedback, Feedback::toast(crate::feedback::MERGE_FAILED));

        assert!(desk.submit_merge(&plan).await.is_ok());
    }

    #[tokio::test]
    async fn invalid_policy_is_inline_feedback() {
        let desk = Desk::in_memory(state());
        let bad = SlaPolicy::new("x", "", 3, SlaScope::all()).with_first_response(1, 0);
        let feedback = desk.create_policy(bad).await.unwrap_err();
        assert!(feedback.is_inline());
    }

    #[tokio::test]
    async fn jobs_run_through_the_desk() {
        let desk = Desk::in_memory(state())
            .with_job_config(JobConfig::default().with_steps(2).with_tick_ms(1))
            .unwrap();
        let done = desk.start_job("train").wait().await.unwrap();
        assert_eq!(done.state, JobState::Completed);
    }
}
