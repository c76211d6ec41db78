//! Applying a merge payload to ticket records.
//!
//! This is what the ticket backend does on `POST /api/tickets/merge`. It is
//! a pure function over a ticket map: the updated target and sources are
//! returned and the caller decides how to store them. Any missing ticket
//! aborts the merge before anything is produced.

use std::collections::{BTreeMap, BTreeSet};

use desk_types::{Message, Ticket, TicketId, TicketStatus, Timestamp};

use crate::error::{MergeError, MergeResult};
use crate::payload::MergePayload;

/// Tag added to source tickets closed by a merge.
pub const MERGED_TAG: &str = "merged";

/// The tickets produced by applying a merge.
#[derive(Clone, Debug, PartialEq)]
pub struct MergeOutcome {
    /// The target ticket after consolidation.
    pub target: Ticket,
    /// Source tickets after the merge (closed if requested).
    pub sources: Vec<Ticket>,
    /// Number of messages moved onto the target.
    pub moved_messages: usize,
    /// Tags the target did not have before.
    pub added_tags: Vec<String>,
    /// Custom-field keys written on the target.
    pub updated_fields: Vec<String>,
}

/// Apply `payload` to the tickets in `tickets`.
///
/// - `merge_messages`: source messages are appended to the target, and the
///   combined conversation is ordered by `created_at`.
/// - `copy_tags`: the target's tags become the union of all tags.
/// - `copy_custom_fields`: resolved conflict values are written to the
///   target; non-conflicting source fields the target lacks are copied too.
/// - `close_source_tickets`: sources are closed, tagged [`MERGED_TAG`], and
///   get a note pointing at the target.
pub fn apply_merge(
    tickets: &BTreeMap<TicketId, Ticket>,
    payload: &MergePayload,
    now: Timestamp,
) -> MergeResult<MergeOutcome> {
    if payload.source_ticket_ids.is_empty() {
        return Err(MergeError::InvalidPayload("no source tickets".into()));
    }
    if payload.source_ticket_ids.contains(&payload.target_ticket_id) {
        return Err(MergeError::InvalidPayload(format!(
            "target ticket {} is also listed as a source",
            payload.target_ticket_id
        )));
    }

    let mut seen = BTreeSet::new();
    if let Some(dup) = payload.source_ticket_ids.iter().find(|id| !seen.insert(*id)) {
        return Err(MergeError::InvalidPayload(format!(
            "source ticket {dup} is listed more than once"
        )));
    }

    let mut target = lookup(tickets, &payload.target_ticket_id)?.clone();
    let mut sources = payload
        .source_ticket_ids
        .iter()
        .map(|id| lookup(tickets, id).cloned())
        .collect::<MergeResult<Vec<Ticket>>>()?;

    let mut moved_messages = 0;
    if payload.merge_messages {
        for source in &sources {
            target.messages.extend(source.messages.iter().cloned());
            moved_messages += source.messages.len();
        }
        target.messages.sort_by_key(|m| m.created_at);
    }

    let mut added_tags = Vec::new();
    if payload.copy_tags {
        for source in &sources {
            for tag in &source.tags {
                if target.tags.insert(tag.clone()) {
                    added_tags.push(tag.clone());
                }
            }
        }
    }

    let mut updated_fields = Vec::new();
    if let Some(resolved) = &payload.copy_custom_fields {
        for source in &sources {
            for (key, value) in &source.custom_fields {
                if value.is_null() || resolved.contains_key(key) || target.field(key).is_some() {
                    continue;
                }
                target.custom_fields.insert(key.clone(), value.clone());
                updated_fields.push(key.clone());
            }
        }
        for (key, value) in resolved {
            if value.is_null() {
                continue;
            }
            if target.custom_fields.get(key) != Some(value) {
                updated_fields.push(key.clone());
            }
            target.custom_fields.insert(key.clone(), value.clone());
        }
        updated_fields.sort();
        updated_fields.dedup();
    }

    if payload.close_source_tickets {
        for source in &mut sources {
            source.status = TicketStatus::Closed;
            source.tags.insert(MERGED_TAG.to_string());
            source.messages.push(Message::new(
                "system",
                format!("Merged into ticket {}", target.id),
                now,
            ));
            source.updated_at = now;
        }
    }
    target.updated_at = now;

    tracing::info!(
        target_ticket = %target.id,
        sources = sources.len(),
        moved_messages,
        added_tags = added_tags.len(),
        updated_fields = updated_fields.len(),
        "tickets merged"
    );

    Ok(MergeOutcome {
        target,
        sources,
        moved_messages,
        added_tags,
        updated_fields,
    })
}

fn lookup<'a>(tickets: &'a BTreeMap<TicketId, Ticket>, id: &TicketId) -> MergeResult<&'a Ticket> {
    tickets
        .get(id)
        .ok_or_else(|| MergeError::TicketNotFound(id.clone()))
}
