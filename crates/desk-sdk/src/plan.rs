use serde::{Deserialize, Serialize};

use desk_merge::{build_merge_payload, FieldConflict, MergePayload, MergeRequest};
use desk_types::{FieldValue, Ticket};

use crate::error::{SdkError, SdkResult};

/// A merge being prepared: the agent's request plus the conflicts found in
/// the current selection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergePlan {
    pub request: MergeRequest,
    pub conflicts: Vec<FieldConflict>,
    /// The selected tickets as they were when the plan was made.
    pub tickets: Vec<Ticket>,
}

impl MergePlan {
    /// Pick the value the merged ticket keeps for a conflicting field.
    pub fn resolve(&mut self, field: &str, value: impl Into<FieldValue>) -> SdkResult<()> {
        let value = value.into();
        let conflict = self
            .conflicts
            .iter_mut()
            .find(|c| c.field_key == field)
            .ok_or_else(|| SdkError::InvalidOperation(format!("field '{field}' is not in conflict")))?;
        conflict.select(value.clone())?;
        self.request.custom_field_resolutions.insert(field.to_string(), value);
        Ok(())
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// The payload that would be submitted right now.
    pub fn payload(&self) -> SdkResult<MergePayload> {
        Ok(build_merge_payload(&self.request, &self.conflicts)?)
    }
}
