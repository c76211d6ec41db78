//! User-facing outcomes of a failed operation.
//!
//! Validation problems are shown next to the control that caused them and
//! block submission. Everything else becomes a generic toast; the user
//! retries by submitting again.

use std::fmt;

use serde::{Deserialize, Serialize};

use desk_merge::MergeError;
use desk_sla::SlaError;
use desk_store::StoreError;

use crate::error::SdkError;

/// Toast text shown when a merge submission fails.
pub const MERGE_FAILED: &str = "Failed to merge tickets. Please try again.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Feedback {
    /// Shown beside the offending control.
    Inline {
        /// The form control at fault, when one can be named.
        field: Option<String>,
        message: String,
    },
    /// A transient notification.
    Toast { message: String, retryable: bool },
}

impl Feedback {
    pub fn inline(field: Option<&str>, message: impl Into<String>) -> Self {
        Self::Inline {
            field: field.map(str::to_string),
            message: message.into(),
        }
    }

    pub fn toast(message: impl Into<String>) -> Self {
        Self::Toast {
            message: message.into(),
            retryable: true,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Inline { message, .. } | Self::Toast { message, .. } => message,
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Self::Inline { .. })
    }

    /// Feedback for a failed merge submission.
    pub fn for_merge(err: &SdkError) -> Self {
        if err.is_validation() {
            Self::inline(control_for(err), err.to_string())
        } else {
            Self::toast(MERGE_FAILED)
        }
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl From<&SdkError> for Feedback {
    fn from(err: &SdkError) -> Self {
        if err.is_validation() {
            Self::inline(control_for(err), err.to_string())
        } else {
            Self::toast(err.to_string())
        }
    }
}

fn control_for(err: &SdkError) -> Option<&str> {
    let merge = match err {
        SdkError::Merge(e) | SdkError::Store(StoreError::Merge(e)) => Some(e),
        _ => None,
    };
    if let Some(e) = merge {
        return match e {
            MergeError::TooFewTickets { .. } => Some("selection"),
            MergeError::TargetNotSelected(_) => Some("target"),
            MergeError::UnknownResolution { field, .. } => Some(field.as_str()),
            _ => None,
        };
    }
    match err {
        SdkError::Sla(SlaError::InvalidPolicy { .. })
        | SdkError::Store(StoreError::Sla(SlaError::InvalidPolicy { .. })) => Some("policy"),
        _ => None,
    }
}
