//! Listener configuration

use crate::error::{Result, ServerError};
use config::GatewayConfig;
use std::net::SocketAddr;

/// Where an HTTP server listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to (e.g. "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port 0 asks the OS for an ephemeral port
    pub port: u16,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn from_gateway(gateway: &GatewayConfig) -> Self {
        Self::new(gateway.host.clone(), gateway.port)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let host = if self.host == "localhost" {
            "127.0.0.1"
        } else {
            self.host.as_str()
        };

        format!("{}:{}", host, self.port)
            .parse()
            .map_err(|_| ServerError::InvalidAddress(format!("{}:{}", self.host, self.port)))
    }
}
