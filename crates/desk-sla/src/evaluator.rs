use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use desk_types::{move_item, Ticket, TicketId, Timestamp};

use crate::config::{ScopeMatch, SlaConfig};
use crate::deadline::{compute_deadline, format_time_remaining, TimeRemaining};
use crate::error::{Result, SlaError};
use crate::policy::SlaPolicy;

// ---------------------------------------------------------------------------
// First-match resolution
// ---------------------------------------------------------------------------

/// Resolve the policy that applies to a ticket using OR semantics across
/// scope dimensions.
///
/// See [`resolve_applicable_policy_with`].
pub fn resolve_applicable_policy<'a>(
    ticket: &Ticket,
    policies: &'a [SlaPolicy],
) -> Option<&'a SlaPolicy> {
    resolve_applicable_policy_with(ticket, policies, ScopeMatch::Any)
}

/// Resolve the policy that applies to a ticket.
///
/// Policies are considered in ascending `order`; the first one whose scope
/// matches wins. Ties on `order` go to the policy listed first. The input
/// does not need to be pre-sorted.
pub fn resolve_applicable_policy_with<'a>(
    ticket: &Ticket,
    policies: &'a [SlaPolicy],
    mode: ScopeMatch,
) -> Option<&'a SlaPolicy> {
    let matched = policies
        .iter()
        .filter(|p| p.applies(ticket, mode))
        .min_by_key(|p| p.order);

    match matched {
        Some(policy) => {
            tracing::debug!(ticket = %ticket.id, policy = %policy.id, order = policy.order, "SLA policy matched");
        }
        None => {
            tracing::debug!(ticket = %ticket.id, "no SLA policy matched");
        }
    }
    matched
}

// ---------------------------------------------------------------------------
// Evaluation result
// ---------------------------------------------------------------------------

/// A single SLA clock for a ticket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaTimer {
    pub deadline: Timestamp,
    pub remaining: TimeRemaining,
}

impl SlaTimer {
    fn at(deadline: Timestamp, now: Timestamp) -> Self {
        Self {
            deadline,
            remaining: format_time_remaining(deadline, now),
        }
    }
}

/// The SLA picture for one ticket at one instant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketSla {
    pub ticket_id: TicketId,
    pub policy_id: Option<String>,
    pub policy_name: Option<String>,
    pub first_response: Option<SlaTimer>,
    pub resolution: Option<SlaTimer>,
}

impl TicketSla {
    /// Returns `true` if any clock is past its deadline.
    pub fn is_breached(&self) -> bool {
        self.first_response.iter().chain(self.resolution.iter()).any(|t| t.remaining.overdue)
    }

    /// Returns `true` if a policy applied.
    pub fn is_covered(&self) -> bool {
        self.policy_id.is_some()
    }
}

// ---------------------------------------------------------------------------
// SlaEvaluator
// ---------------------------------------------------------------------------

/// A validated, ordered SLA policy set plus evaluation configuration.
///
/// Construction validates every policy and rejects duplicate ids; the
/// stored list is stably sorted by `order`. Evaluation is never cached.
#[derive(Clone, Debug)]
pub struct SlaEvaluator {
    config: SlaConfig,
    policies: Vec<SlaPolicy>,
}

impl SlaEvaluator {
    /// Build an evaluator from unsorted policies.
    pub fn new(config: SlaConfig, policies: Vec<SlaPolicy>) -> Result<Self> {
        let mut seen = HashSet::new();
        for policy in &policies {
            policy.validate()?;
            if !seen.insert(policy.id.as_str()) {
                return Err(SlaError::DuplicatePolicy(policy.id.clone()));
            }
        }

        let mut policies = policies;
        policies.sort_by_key(|p| p.order);
        Ok(Self { config, policies })
    }

    /// An evaluator with no policies; every ticket is uncovered.
    pub fn empty(config: SlaConfig) -> Self {
        Self {
            config,
            policies: Vec::new(),
        }
    }

    pub fn config(&self) -> &SlaConfig {
        &self.config
    }

    /// Policies in evaluation order.
    pub fn policies(&self) -> &[SlaPolicy] {
        &self.policies
    }

    /// Look up a policy by id.
    pub fn policy(&self, id: &str) -> Result<&SlaPolicy> {
        self.policies
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| SlaError::PolicyNotFound(id.to_string()))
    }

    /// Add a policy, validating it against the existing set.
    pub fn insert(&mut self, policy: SlaPolicy) -> Result<()> {
        policy.validate()?;
        if self.policies.iter().any(|p| p.id == policy.id) {
            return Err(SlaError::DuplicatePolicy(policy.id));
        }
        let at = self.policies.partition_point(|p| p.order <= policy.order);
        self.policies.insert(at, policy);
        Ok(())
    }

    /// Move the policy at `from` to `to` and re-rank the whole list.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        self.policies = move_item(&self.policies, from, to)?;
        Ok(())
    }

    /// The policy that applies to `ticket`, if any.
    pub fn resolve(&self, ticket: &Ticket) -> Option<&SlaPolicy> {
        resolve_applicable_policy_with(ticket, &self.policies, self.config.scope_match)
    }

    /// Deadlines and time remaining for a ticket at `now`.
    pub fn evaluate(&self, ticket: &Ticket, now: Timestamp) -> TicketSla {
        let Some(policy) = self.resolve(ticket) else {
            return TicketSla {
                ticket_id: ticket.id.clone(),
                policy_id: None,
                policy_name: None,
                first_response: None,
                resolution: None,
            };
        };

        let first_response = compute_deadline(ticket.created_at, policy.first_response_sla.as_ref())
            .map(|d| SlaTimer::at(d, now));
        let resolution = compute_deadline(ticket.created_at, policy.resolution_sla.as_ref())
            .map(|d| SlaTimer::at(d, now));

        TicketSla {
            ticket_id: ticket.id.clone(),
            policy_id: Some(policy.id.clone()),
            policy_name: Some(policy.name.clone()),
            first_response,
            resolution,
        }
    }

    /// Write the derived deadline fields onto a ticket. Both are cleared
    /// when no policy applies. Returns the applied policy.
    pub fn apply_deadlines(&self, ticket: &mut Ticket) -> Option<&SlaPolicy> {
        let policy = self.resolve(ticket);
        let created_at = ticket.created_at;
        ticket.first_response_deadline =
            policy.and_then(|p| compute_deadline(created_at, p.first_response_sla.as_ref()));
        ticket.resolution_deadline =
            policy.and_then(|p| compute_deadline(created_at, p.resolution_sla.as_ref()));
        policy
    }
}
