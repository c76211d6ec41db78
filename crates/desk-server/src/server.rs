use std::sync::Arc;

use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use desk_store::TicketBackend;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::AppState;
use crate::router::build_router;

/// The desk HTTP API over a ticket backend.
pub struct DeskServer {
    config: ServerConfig,
    backend: Arc<dyn TicketBackend>,
}

impl DeskServer {
    pub fn new(config: ServerConfig, backend: Arc<dyn TicketBackend>) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        let app = build_router(AppState::new(self.backend.clone(), self.config.sla.clone()));
        if self.config.cors {
            app.layer(CorsLayer::permissive())
        } else {
            app
        }
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("desk API listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use desk_store::InMemoryBackend;

    #[test]
    fn server_construction() {
        let server = DeskServer::new(ServerConfig::default(), Arc::new(InMemoryBackend::default()));
        assert_eq!(server.config().bind_addr.port(), crate::config::DEFAULT_PORT);
    }

    #[test]
    fn router_builds_with_cors() {
        let config = ServerConfig {
            cors: true,
            ..ServerConfig::default()
        };
        let server = DeskServer::new(config, Arc::new(InMemoryBackend::default()));
        let _router = server.router();
    }
}
