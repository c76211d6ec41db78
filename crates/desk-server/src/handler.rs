use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use desk_merge::{MergePayload, MergeResponse};
use desk_sla::{SlaConfig, SlaEvaluator, SlaPolicy, TicketSla};
use desk_store::TicketBackend;
use desk_types::{Ticket, TicketId};

use crate::error::ServerResult;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn TicketBackend>,
    pub sla: SlaConfig,
}

impl AppState {
    pub fn new(backend: Arc<dyn TicketBackend>, sla: SlaConfig) -> Self {
        Self { backend, sla }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

pub async fn list_tickets(State(state): State<AppState>) -> ServerResult<Json<Vec<Ticket>>> {
    Ok(Json(state.backend.list_tickets().await?))
}

pub async fn get_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServerResult<Json<Ticket>> {
    Ok(Json(state.backend.get_ticket(&TicketId::new(id)).await?))
}

/// SLA deadlines and time remaining for one ticket, evaluated now.
pub async fn ticket_sla(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServerResult<Json<TicketSla>> {
    let ticket = state.backend.get_ticket(&TicketId::new(id)).await?;
    let policies = state.backend.list_policies().await?;
    let evaluator = SlaEvaluator::new(state.sla.clone(), policies)?;
    Ok(Json(evaluator.evaluate(&ticket, chrono::Utc::now())))
}

pub async fn list_policies(State(state): State<AppState>) -> ServerResult<Json<Vec<SlaPolicy>>> {
    Ok(Json(state.backend.list_policies().await?))
}

pub async fn create_policy(
    State(state): State<AppState>,
    Json(policy): Json<SlaPolicy>,
) -> ServerResult<(StatusCode, Json<SlaPolicy>)> {
    let created = state.backend.create_policy(policy).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn merge_tickets(
    State(state): State<AppState>,
    Json(payload): Json<MergePayload>,
) -> ServerResult<Json<MergeResponse>> {
    Ok(Json(state.backend.merge_tickets(&payload).await?))
}
