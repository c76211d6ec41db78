use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

/// Build the axum router with all desk endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/api/tickets", get(handler::list_tickets))
        .route("/api/tickets/merge", post(handler::merge_tickets))
        .route("/api/tickets/:id", get(handler::get_ticket))
        .route("/api/tickets/:id/sla", get(handler::ticket_sla))
        .route(
            "/api/slas",
            get(handler::list_policies).post(handler::create_policy),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
