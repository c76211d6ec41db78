use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use desk_sla::SlaPolicy;
use desk_types::{Ticket, TicketId};

use crate::error::{StoreError, StoreResult};

/// Everything the desk knows: tickets by id and the ranked policy list.
///
/// Policies are kept sorted by `order`. All mutation goes through
/// [`crate::reduce`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeskState {
    #[serde(default)]
    pub tickets: BTreeMap<TicketId, Ticket>,
    #[serde(default)]
    pub policies: Vec<SlaPolicy>,
}

impl DeskState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state from loose tickets and policies. Later tickets with a
    /// repeated id replace earlier ones; policies are sorted by `order`.
    pub fn from_parts(tickets: Vec<Ticket>, policies: Vec<SlaPolicy>) -> Self {
        let tickets = tickets.into_iter().map(|t| (t.id.clone(), t)).collect();
        let mut policies = policies;
        policies.sort_by_key(|p| p.order);
        Self { tickets, policies }
    }

    /// Load a state document (`{"tickets": {...}, "policies": [...]}`).
    pub fn from_json(raw: &str) -> StoreResult<Self> {
        let mut state: Self =
            serde_json::from_str(raw).map_err(|e| StoreError::Serialization(e.to_string()))?;
        state.policies.sort_by_key(|p| p.order);
        Ok(state)
    }

    pub fn ticket(&self, id: &TicketId) -> StoreResult<&Ticket> {
        self.tickets
            .get(id)
            .ok_or_else(|| StoreError::TicketNotFound(id.clone()))
    }

    /// Tickets for the given ids, in the order given.
    pub fn select(&self, ids: &[TicketId]) -> StoreResult<Vec<Ticket>> {
        ids.iter().map(|id| self.ticket(id).cloned()).collect()
    }

    pub fn policy(&self, id: &str) -> Option<&SlaPolicy> {
        self.policies.iter().find(|p| p.id == id)
    }
}
