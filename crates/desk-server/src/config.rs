use std::net::{Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};

use desk_sla::SlaConfig;

use crate::error::{ServerError, ServerResult};

/// Default port for the desk API.
pub const DEFAULT_PORT: u16 = 8787;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Allow cross-origin requests from any origin (local dashboards).
    pub cors: bool,
    /// Scope matching used by the per-ticket SLA endpoint.
    pub sla: SlaConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            cors: false,
            sla: SlaConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the bind address from `host:port` text.
    pub fn with_bind_str(self, raw: &str) -> ServerResult<Self> {
        let addr = raw
            .trim()
            .parse()
            .map_err(|e| ServerError::Config(format!("invalid bind address '{raw}': {e}")))?;
        Ok(self.with_bind_addr(addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:8787".parse::<SocketAddr>().unwrap());
        assert!(!c.cors);
        assert_eq!(c.sla, SlaConfig::default());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let c: ServerConfig = serde_json::from_str(r#"{"bind_addr": "0.0.0.0:9000"}"#).unwrap();
        assert_eq!(c.bind_addr.port(), 9000);
        assert!(!c.cors);
    }

    #[test]
    fn bind_address_from_text() {
        let c = ServerConfig::default().with_bind_str("0.0.0.0:9100").unwrap();
        assert_eq!(c.bind_addr.port(), 9100);

        let err = ServerConfig::default().with_bind_str("localhost").unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
        assert!(err.to_string().contains("invalid bind address 'localhost'"));
        assert_eq!(err.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
