//! HTTP API for the support desk.
//!
//! Serves tickets and SLA policies from a [`desk_store::TicketBackend`]
//! and accepts merge submissions. Errors map to status codes: validation
//! failures are 400, unknown tickets 404, and backend outages 503.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::{AppState, HealthResponse};
pub use router::build_router;
pub use server::DeskServer;
