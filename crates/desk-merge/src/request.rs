use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use desk_types::{FieldValue, TicketId};

use crate::error::{MergeError, MergeResult};

/// Check the selection an agent made before a merge can be planned.
///
/// Duplicate ids count once. At least two distinct tickets must be selected
/// and the target must be one of them.
pub fn validate_selection(selected: &[TicketId], target: &TicketId) -> MergeResult<()> {
    let distinct = dedup(selected);
    if distinct.len() < 2 {
        return Err(MergeError::TooFewTickets {
            selected: distinct.len(),
        });
    }
    if !distinct.contains(&target) {
        return Err(MergeError::TargetNotSelected(target.clone()));
    }
    Ok(())
}

fn dedup(ids: &[TicketId]) -> Vec<&TicketId> {
    let mut out: Vec<&TicketId> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

/// An agent's merge request: which ticket survives, which are folded in,
/// and how their content is consolidated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRequest {
    pub target_ticket_id: TicketId,
    /// Tickets folded into the target. Never contains the target.
    pub source_ticket_ids: Vec<TicketId>,
    pub merge_messages: bool,
    pub copy_tags: bool,
    pub copy_custom_fields: bool,
    pub close_source_tickets: bool,
    /// Agent-chosen values for conflicting fields, overriding defaults.
    #[serde(default)]
    pub custom_field_resolutions: BTreeMap<String, FieldValue>,
}

impl MergeRequest {
    /// Build a request from a validated selection. Every consolidation
    /// option starts enabled.
    pub fn from_selection(selected: &[TicketId], target: &TicketId) -> MergeResult<Self> {
        validate_selection(selected, target)?;
        let source_ticket_ids = dedup(selected)
            .into_iter()
            .filter(|id| *id != target)
            .cloned()
            .collect();

        Ok(Self {
            target_ticket_id: target.clone(),
            source_ticket_ids,
            merge_messages: true,
            copy_tags: true,
            copy_custom_fields: true,
            close_source_tickets: true,
            custom_field_resolutions: BTreeMap::new(),
        })
    }

    pub fn with_merge_messages(mut self, enabled: bool) -> Self {
        self.merge_messages = enabled;
        self
    }

    pub fn with_copy_tags(mut self, enabled: bool) -> Self {
        self.copy_tags = enabled;
        self
    }

    pub fn with_copy_custom_fields(mut self, enabled: bool) -> Self {
        self.copy_custom_fields = enabled;
        self
    }

    pub fn with_close_source_tickets(mut self, enabled: bool) -> Self {
        self.close_source_tickets = enabled;
        self
    }

    /// Record the agent's choice for a conflicting field.
    pub fn resolve(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.custom_field_resolutions.insert(field.into(), value.into());
        self
    }

    /// Every ticket taking part in the merge, target first.
    pub fn selected_ids(&self) -> Vec<TicketId> {
        std::iter::once(self.target_ticket_id.clone())
            .chain(self.source_ticket_ids.iter().cloned())
            .collect()
    }

    /// Re-check the request's own invariants (for requests that arrived
    /// deserialized rather than through [`Self::from_selection`]).
    pub fn validate(&self) -> MergeResult<()> {
        if self.source_ticket_ids.contains(&self.target_ticket_id) {
            return Err(MergeError::InvalidPayload(format!(
                "target ticket {} is also listed as a source",
                self.target_ticket_id
            )));
        }
        validate_selection(&self.selected_ids(), &self.target_ticket_id)
    }
}
