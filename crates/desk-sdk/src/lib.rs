//! High-level SDK for the support desk.
//!
//! [`Desk`] ties the SLA evaluator, the merge engine, the ticket backend,
//! and simulated jobs into one API. Merge submission never surfaces a raw
//! error: failures come back as [`Feedback`], either inline (fix the form)
//! or as a toast (try again).

pub mod desk;
pub mod error;
pub mod feedback;
pub mod plan;

pub use desk::Desk;
pub use error::{SdkError, SdkResult};
pub use feedback::Feedback;
pub use plan::MergePlan;

// Re-export key types
pub use desk_jobs::{JobConfig, JobHandle, JobSnapshot, JobState};
pub use desk_merge::{FieldConflict, MergePayload, MergeResponse};
pub use desk_sla::{SlaConfig, SlaPolicy, SlaScope, TicketSla};
pub use desk_store::DeskState;
pub use desk_types::{Channel, FieldValue, Priority, Ticket, TicketId, TicketStatus, Timestamp};
