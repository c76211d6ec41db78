//! Application state for the support desk.
//!
//! The desk's tickets and SLA policies live in an explicit [`DeskState`]
//! value. Changes are expressed as [`Action`]s and applied by the pure
//! [`reduce`] function, so every transition can be tested without a
//! backend.
//!
//! # Modules
//!
//! - [`error`] — [`StoreError`] and the [`StoreResult`] alias
//! - [`state`] — [`DeskState`]
//! - [`action`] — [`Action`] and [`reduce`]
//! - [`traits`] — The async [`TicketBackend`] boundary
//! - [`memory`] — [`InMemoryBackend`] with merge-failure injection

pub mod action;
pub mod error;
pub mod memory;
pub mod state;
pub mod traits;

pub use action::{reduce, Action};
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryBackend;
pub use state::DeskState;
pub use traits::TicketBackend;
