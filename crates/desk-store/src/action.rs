//! State transitions.
//!
//! [`reduce`] is the only way [`DeskState`] changes. It consumes a state
//! and returns the next one; on error nothing is returned, so a caller that
//! kept its own copy still holds the previous state.

use desk_merge::{apply_merge, MergePayload};
use desk_sla::{SlaError, SlaPolicy};
use desk_types::{move_item, reindex, Ticket, TicketId, Timestamp};

use crate::error::{StoreError, StoreResult};
use crate::state::DeskState;

/// A single change to the desk state.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// Insert or replace a ticket.
    UpsertTicket(Ticket),
    RemoveTicket(TicketId),
    /// Add a validated policy. Its id must be unused.
    AddPolicy(SlaPolicy),
    /// Remove a policy and re-rank the rest 1..n.
    RemovePolicy(String),
    /// Move the policy at `from` to `to` and re-rank 1..n.
    ReorderPolicies { from: usize, to: usize },
    /// Fold source tickets into a target.
    ApplyMerge { payload: MergePayload, now: Timestamp },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::UpsertTicket(_) => "upsert_ticket",
            Self::RemoveTicket(_) => "remove_ticket",
            Self::AddPolicy(_) => "add_policy",
            Self::RemovePolicy(_) => "remove_policy",
            Self::ReorderPolicies { .. } => "reorder_policies",
            Self::ApplyMerge { .. } => "apply_merge",
        }
    }
}

/// Apply `action` to `state`, producing the next state.
pub fn reduce(mut state: DeskState, action: Action) -> StoreResult<DeskState> {
    tracing::debug!(action = action.name(), "reducing");

    match action {
        Action::UpsertTicket(ticket) => {
            state.tickets.insert(ticket.id.clone(), ticket);
        }
        Action::RemoveTicket(id) => {
            if state.tickets.remove(&id).is_none() {
                return Err(StoreError::TicketNotFound(id));
            }
        }
        Action::AddPolicy(policy) => {
            policy.validate()?;
            if state.policy(&policy.id).is_some() {
                return Err(SlaError::DuplicatePolicy(policy.id).into());
            }
            let at = state.policies.partition_point(|p| p.order <= policy.order);
            state.policies.insert(at, policy);
        }
        Action::RemovePolicy(id) => {
            let Some(index) = state.policies.iter().position(|p| p.id == id) else {
                return Err(SlaError::PolicyNotFound(id).into());
            };
            state.policies.remove(index);
            reindex(&mut state.policies);
        }
        Action::ReorderPolicies { from, to } => {
            state.policies = move_item(&state.policies, from, to)?;
        }
        Action::ApplyMerge { payload, now } => {
            let outcome = apply_merge(&state.tickets, &payload, now)?;
            for source in outcome.sources {
                state.tickets.insert(source.id.clone(), source);
            }
            state.tickets.insert(outcome.target.id.clone(), outcome.target);
        }
    }

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use desk_sla::SlaScope;
    use desk_types::{parse_timestamp, Channel, Priority, TicketStatus};

    fn now() -> Timestamp {
        parse_timestamp("2024-01-15T12:00:00Z").unwrap()
    }

    fn ticket(id: &str) -> Ticket {
        Ticket::new(id, Priority::Medium, Channel::Email, parse_timestamp("2024-01-15T10:00:00Z").unwrap())
    }

    fn policy(id: &str, order: u32) -> SlaPolicy {
        SlaPolicy::new(id, id.to_uppercase(), order, SlaScope::all()).with_first_response(1, 0)
    }

    fn seeded() -> DeskState {
        DeskState::from_parts(
            vec![ticket("A"), ticket("B").with_tag("vip")],
            vec![policy("p1", 1), policy("p2", 2), policy("p3", 3)],
        )
    }

    #[test]
    fn upsert_and_remove_tickets() {
        let state = reduce(DeskState::new(), Action::UpsertTicket(ticket("A"))).unwrap();
        assert_eq!(state.tickets.len(), 1);

        let state = reduce(state, Action::RemoveTicket("A".into())).unwrap();
        assert!(state.tickets.is_empty());

        let err = reduce(state, Action::RemoveTicket("A".into())).unwrap_err();
        assert_eq!(err, StoreError::TicketNotFound("A".into()));
    }

    #[test]
    fn add_policy_validates_and_keeps_order() {
        let state = reduce(seeded(), Action::AddPolicy(policy("mid", 2))).unwrap();
        let ids: Vec<_> = state.policies.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["p1", "p2", "mid", "p3"]);

        let err = reduce(state.clone(), Action::AddPolicy(policy("p1", 9))).unwrap_err();
        assert_eq!(err, StoreError::Sla(SlaError::DuplicatePolicy("p1".into())));

        let bad = SlaPolicy::new("bad", "Bad", 1, SlaScope::all());
        let err = reduce(state, Action::AddPolicy(bad)).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn remove_and_reorder_rerank() {
        let state = reduce(seeded(), Action::RemovePolicy("p1".into())).unwrap();
        let orders: Vec<_> = state.policies.iter().map(|p| (p.id.as_str(), p.order)).collect();
        assert_eq!(orders, [("p2", 1), ("p3", 2)]);

        let state = reduce(state, Action::ReorderPolicies { from: 1, to: 0 }).unwrap();
        let orders: Vec<_> = state.policies.iter().map(|p| (p.id.as_str(), p.order)).collect();
        assert_eq!(orders, [("p3", 1), ("p2", 2)]);

        let err = reduce(state.clone(), Action::ReorderPolicies { from: 5, to: 0 }).unwrap_err();
        assert!(matches!(err, StoreError::Type(_)));

        let err = reduce(state, Action::RemovePolicy("nope".into())).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn merge_updates_target_and_sources() {
        let payload = MergePayload {
            target_ticket_id: "A".into(),
            source_ticket_ids: vec!["B".into()],
            merge_messages: true,
            copy_tags: true,
            copy_custom_fields: None,
            close_source_tickets: true,
        };
        let state = reduce(seeded(), Action::ApplyMerge { payload, now: now() }).unwrap();
        let a = state.ticket(&"A".into()).unwrap();
        let b = state.ticket(&"B".into()).unwrap();
        assert!(a.tags.contains("vip"));
        assert_eq!(a.updated_at, now());
        assert_eq!(b.status, TicketStatus::Closed);
    }

    #[test]
    fn failed_merge_leaves_callers_copy_intact() {
        let before = seeded();
        let payload = MergePayload {
            target_ticket_id: "A".into(),
            source_ticket_ids: vec!["B".into(), "missing".into()],
            merge_messages: true,
            copy_tags: true,
            copy_custom_fields: None,
            close_source_tickets: true,
        };
        let err = reduce(before.clone(), Action::ApplyMerge { payload, now: now() }).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(before, seeded());
    }
}
