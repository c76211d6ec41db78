use async_trait::async_trait;

use desk_merge::{MergePayload, MergeResponse};
use desk_sla::SlaPolicy;
use desk_types::{Ticket, TicketId};

use crate::error::StoreResult;

/// The ticket backend the dashboard talks to.
#[async_trait]
pub trait TicketBackend: Send + Sync {
    async fn list_tickets(&self) -> StoreResult<Vec<Ticket>>;

    async fn get_ticket(&self, id: &TicketId) -> StoreResult<Ticket>;

    /// Policies in evaluation order.
    async fn list_policies(&self) -> StoreResult<Vec<SlaPolicy>>;

    /// Validate and store a new policy, returning it as stored.
    async fn create_policy(&self, policy: SlaPolicy) -> StoreResult<SlaPolicy>;

    /// Fold the payload's sources into its target.
    async fn merge_tickets(&self, payload: &MergePayload) -> StoreResult<MergeResponse>;
}
