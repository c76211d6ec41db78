//! Ticket merge engine for the support desk.
//!
//! Merging folds one or more source tickets into a target ticket. Planning
//! a merge detects custom fields whose values diverge across the selection,
//! lets the agent pick a value for each, and assembles the payload sent to
//! the ticket backend. Applying a payload consolidates messages, tags, and
//! fields and closes the sources.
//!
//! # Key Types
//!
//! - [`FieldConflict`] / [`detect_conflicts`] -- Diverging custom fields
//! - [`MergeRequest`] / [`validate_selection`] -- Agent intent and its checks
//! - [`MergePayload`] / [`build_merge_payload`] -- Backend request body
//! - [`MergeOutcome`] / [`apply_merge`] -- Backend-side consolidation

pub mod apply;
pub mod conflict;
pub mod error;
pub mod payload;
pub mod request;

pub use apply::{apply_merge, MergeOutcome, MERGED_TAG};
pub use conflict::{detect_conflicts, ConflictValue, FieldConflict};
pub use error::{MergeError, MergeResult};
pub use payload::{build_merge_payload, MergePayload, MergeResponse};
pub use request::{validate_selection, MergeRequest};
