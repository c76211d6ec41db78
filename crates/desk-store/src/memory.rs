//! In-memory ticket backend.
//!
//! State lives behind a `RwLock` and every write goes through
//! [`reduce`]. Useful for tests, the local server, and demos.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use desk_merge::{MergePayload, MergeResponse};
use desk_sla::SlaPolicy;
use desk_types::{Ticket, TicketId};

use crate::action::{reduce, Action};
use crate::error::{StoreError, StoreResult};
use crate::state::DeskState;
use crate::traits::TicketBackend;

pub struct InMemoryBackend {
    state: RwLock<DeskState>,
    failing_merges: AtomicUsize,
}

impl InMemoryBackend {
    pub fn new(state: DeskState) -> Self {
        Self {
            state: RwLock::new(state),
            failing_merges: AtomicUsize::new(0),
        }
    }

    /// Make the next `n` merge calls fail with [`StoreError::Unavailable`].
    pub fn fail_next_merges(&self, n: usize) {
        self.failing_merges.store(n, Ordering::SeqCst);
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> StoreResult<DeskState> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(state.clone())
    }

    /// Apply an action under the write lock. On error the stored state is
    /// unchanged.
    pub fn dispatch(&self, action: Action) -> StoreResult<()> {
        let mut state = self.state.write().map_err(|_| StoreError::LockPoisoned)?;
        let next = reduce(state.clone(), action)?;
        *state = next;
        Ok(())
    }

    fn take_injected_failure(&self) -> bool {
        self.failing_merges
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new(DeskState::default())
    }
}

#[async_trait]
impl TicketBackend for InMemoryBackend {
    async fn list_tickets(&self) -> StoreResult<Vec<Ticket>> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(state.tickets.values().cloned().collect())
    }

    async fn get_ticket(&self, id: &TicketId) -> StoreResult<Ticket> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        state.ticket(id).cloned()
    }

    async fn list_policies(&self) -> StoreResult<Vec<SlaPolicy>> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(state.policies.clone())
    }

    async fn create_policy(&self, policy: SlaPolicy) -> StoreResult<SlaPolicy> {
        self.dispatch(Action::AddPolicy(policy.clone()))?;
        tracing::info!(policy = %policy.id, order = policy.order, "SLA policy created");
        Ok(policy)
    }

    async fn merge_tickets(&self, payload: &MergePayload) -> StoreResult<MergeResponse> {
        if self.take_injected_failure() {
            tracing::warn!(target_ticket = %payload.target_ticket_id, "injected merge failure");
            return Err(StoreError::Unavailable("merge service did not respond".into()));
        }

        self.dispatch(Action::ApplyMerge {
            payload: payload.clone(),
            now: chrono::Utc::now(),
        })?;
        Ok(MergeResponse {
            target_ticket_id: payload.target_ticket_id.clone(),
        })
    }
}
