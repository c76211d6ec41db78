//! Custom-field conflict detection across a ticket selection.
//!
//! For every custom-field key present on any selected ticket, the non-null
//! values are collected together with the ticket they came from. A key is in
//! conflict when more than one distinct value remains.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use desk_types::{FieldValue, Ticket, TicketId};

use crate::error::{MergeError, MergeResult};

/// One ticket's value for a conflicting field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictValue {
    pub ticket_id: TicketId,
    pub value: FieldValue,
}

/// A custom field whose values diverge across the selection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConflict {
    pub field_key: String,
    /// Every non-null `(ticket, value)` pair, in selection order.
    pub values: Vec<ConflictValue>,
    /// The value the merged ticket will carry.
    pub selected_value: FieldValue,
}

impl FieldConflict {
    /// Distinct candidate values in first-seen order.
    pub fn distinct_values(&self) -> Vec<&FieldValue> {
        let mut out: Vec<&FieldValue> = Vec::new();
        for cv in &self.values {
            if !out.contains(&&cv.value) {
                out.push(&cv.value);
            }
        }
        out
    }

    /// Returns `true` if `value` is one of the candidates.
    pub fn is_candidate(&self, value: &FieldValue) -> bool {
        self.values.iter().any(|cv| &cv.value == value)
    }

    /// Choose the value for the merged ticket. Only candidates are allowed.
    pub fn select(&mut self, value: FieldValue) -> MergeResult<()> {
        if !self.is_candidate(&value) {
            return Err(MergeError::UnknownResolution {
                field: self.field_key.clone(),
                value,
            });
        }
        self.selected_value = value;
        Ok(())
    }
}

/// Detect diverging custom fields across `selected`.
///
/// Conflicts are returned sorted by field key. Each conflict's
/// `selected_value` defaults to the target ticket's own value, falling back
/// to the first collected value when the target has none.
pub fn detect_conflicts(selected: &[Ticket], target: &TicketId) -> Vec<FieldConflict> {
    let keys: BTreeSet<&str> = selected
        .iter()
        .flat_map(|t| t.custom_fields.keys().map(String::as_str))
        .collect();

    let mut conflicts = Vec::new();
    for key in keys {
        let values: Vec<ConflictValue> = selected
            .iter()
            .filter_map(|t| {
                t.field(key).map(|v| ConflictValue {
                    ticket_id: t.id.clone(),
                    value: v.clone(),
                })
            })
            .collect();

        let Some(first) = values.first() else {
            continue;
        };
        if values.iter().all(|cv| cv.value == first.value) {
            continue;
        }

        let selected_value = values
            .iter()
            .find(|cv| &cv.ticket_id == target)
            .unwrap_or(first)
            .value
            .clone();

        conflicts.push(FieldConflict {
            field_key: key.to_string(),
            values,
            selected_value,
        });
    }

    tracing::debug!(tickets = selected.len(), conflicts = conflicts.len(), "conflict detection finished");
    conflicts
}
