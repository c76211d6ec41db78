//! Foundation types for the support desk engines.
//!
//! This crate provides the ticket model and the small helpers shared by the
//! SLA evaluator, the merge resolver, and the application state. Every other
//! desk crate depends on `desk-types`.
//!
//! # Key Types
//!
//! - [`Ticket`] — A support ticket with scope attributes, tags, and messages
//! - [`TicketId`] — Opaque ticket identifier assigned by the backend
//! - [`FieldValue`] / [`CustomFields`] — Scalar custom-field value bag
//! - [`Ordered`] / [`move_item`] — Drag-and-drop reordering with re-indexing
//! - [`Timestamp`] — UTC timestamp with RFC 3339 helpers

pub mod error;
pub mod field;
pub mod ordering;
pub mod ticket;
pub mod timestamp;

pub use error::TypeError;
pub use field::{CustomFields, FieldValue};
pub use ordering::{move_item, reindex, Ordered};
pub use ticket::{Channel, Message, MessageId, Priority, Ticket, TicketId, TicketStatus};
pub use timestamp::{format_timestamp, parse_timestamp, Timestamp};
