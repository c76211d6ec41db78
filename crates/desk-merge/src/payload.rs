use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use desk_types::{FieldValue, TicketId};

use crate::conflict::FieldConflict;
use crate::error::{MergeError, MergeResult};
use crate::request::MergeRequest;

/// The body sent to the ticket backend's merge endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergePayload {
    pub target_ticket_id: TicketId,
    pub source_ticket_ids: Vec<TicketId>,
    pub merge_messages: bool,
    pub copy_tags: bool,
    /// Resolved value per conflicting field, or `null` when custom fields
    /// are not copied.
    pub copy_custom_fields: Option<BTreeMap<String, FieldValue>>,
    pub close_source_tickets: bool,
}

/// The backend's answer to a successful merge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeResponse {
    pub target_ticket_id: TicketId,
}

/// Assemble the merge payload from a request and the detected conflicts.
///
/// Each conflict contributes its `selected_value`, unless the request holds
/// an agent resolution for that field, which must be one of the conflict's
/// candidates. Resolutions for fields that are no longer in conflict are
/// ignored.
pub fn build_merge_payload(
    request: &MergeRequest,
    conflicts: &[FieldConflict],
) -> MergeResult<MergePayload> {
    request.validate()?;

    let copy_custom_fields = if request.copy_custom_fields {
        let mut resolved = BTreeMap::new();
        for conflict in conflicts {
            let value = match request.custom_field_resolutions.get(&conflict.field_key) {
                Some(chosen) if conflict.is_candidate(chosen) => chosen.clone(),
                Some(chosen) => {
                    return Err(MergeError::UnknownResolution {
                        field: conflict.field_key.clone(),
                        value: chosen.clone(),
                    })
                }
                None => conflict.selected_value.clone(),
            };
            resolved.insert(conflict.field_key.clone(), value);
        }

        for field in request.custom_field_resolutions.keys() {
            if !conflicts.iter().any(|c| &c.field_key == field) {
                tracing::debug!(field = %field, "ignoring resolution for field without conflict");
            }
        }
        Some(resolved)
    } else {
        None
    };

    Ok(MergePayload {
        target_ticket_id: request.target_ticket_id.clone(),
        source_ticket_ids: request.source_ticket_ids.clone(),
        merge_messages: request.merge_messages,
        copy_tags: request.copy_tags,
        copy_custom_fields,
        close_source_tickets: request.close_source_tickets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::detect_conflicts;
    use desk_types::{parse_timestamp, Channel, Priority, Ticket};

    fn ticket(id: &str) -> Ticket {
        Ticket::new(id, Priority::Medium, Channel::Email, parse_timestamp("2024-01-15T10:00:00Z").unwrap())
    }

    fn selection() -> Vec<Ticket> {
        vec![
            ticket("A").with_field("product", "Pro").with_field("region", "EU"),
            ticket("B").with_field("product", "Enterprise").with_field("region", "EU"),
        ]
    }

    fn request(target: &str) -> MergeRequest {
        let ids: Vec<TicketId> = selection().iter().map(|t| t.id.clone()).collect();
        MergeRequest::from_selection(&ids, &target.into()).unwrap()
    }

    #[test]
    fn defaults_come_from_conflicts() {
        let conflicts = detect_conflicts(&selection(), &"A".into());
        let payload = build_merge_payload(&request("A"), &conflicts).unwrap();

        assert_eq!(payload.target_ticket_id, TicketId::from("A"));
        assert_eq!(payload.source_ticket_ids, vec![TicketId::from("B")]);
        let fields = payload.copy_custom_fields.unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["product"], FieldValue::from("Pro"));
    }

    #[test]
    fn agent_resolution_overrides_default() {
        let conflicts = detect_conflicts(&selection(), &"A".into());
        let payload =
            build_merge_payload(&request("A").resolve("product", "Enterprise"), &conflicts).unwrap();
        assert_eq!(payload.copy_custom_fields.unwrap()["product"], FieldValue::from("Enterprise"));
    }

    #[test]
    fn non_candidate_resolution_is_rejected() {
        let conflicts = detect_conflicts(&selection(), &"A".into());
        let err = build_merge_payload(&request("A").resolve("product", "Free"), &conflicts).unwrap_err();
        assert_eq!(
            err,
            MergeError::UnknownResolution { field: "product".into(), value: "Free".into() }
        );
    }

    #[test]
    fn copy_custom_fields_off_sends_null() {
        let conflicts = detect_conflicts(&selection(), &"A".into());
        let payload =
            build_merge_payload(&request("A").with_copy_custom_fields(false), &conflicts).unwrap();
        assert!(payload.copy_custom_fields.is_none());

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json["copyCustomFields"].is_null());
        assert_eq!(json["targetTicketId"], "A");
        assert_eq!(json["sourceTicketIds"], serde_json::json!(["B"]));
        assert_eq!(json["closeSourceTickets"], true);
    }

    #[test]
    fn stale_resolution_is_ignored() {
        let payload = build_merge_payload(&request("A").resolve("plan", "Gold"), &[]).unwrap();
        assert_eq!(payload.copy_custom_fields, Some(BTreeMap::new()));
    }
}
