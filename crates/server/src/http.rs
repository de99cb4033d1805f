//! Axum HTTP server

use async_trait::async_trait;
use axum::Router;
use parking_lot::RwLock;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use crate::traits::Server;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Idle,
    Listening(SocketAddr),
    Stopped,
}

/// Serves a router under a component name until cancelled.
#[derive(Clone)]
pub struct HttpServer {
    component: &'static str,
    config: ServerConfig,
    router: Router,
    state: Arc<RwLock<Lifecycle>>,
    bound: Arc<Notify>,
}

impl HttpServer {
    pub fn new(component: &'static str, config: ServerConfig, router: Router) -> Self {
        Self {
            component,
            config,
            router,
            state: Arc::new(RwLock::new(Lifecycle::Idle)),
            bound: Arc::new(Notify::new()),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Resolves once the listener is bound. `None` if the server already stopped.
    pub async fn wait_until_bound(&self) -> Option<SocketAddr> {
        loop {
            let notified = self.bound.notified();
            match *self.state.read() {
                Lifecycle::Listening(addr) => return Some(addr),
                Lifecycle::Stopped => return None,
                Lifecycle::Idle => {}
            }
            notified.await;
        }
    }

    fn set_state(&self, state: Lifecycle) {
        *self.state.write() = state;
        self.bound.notify_waiters();
    }
}

#[async_trait]
impl Server for HttpServer {
    fn name(&self) -> &str {
        self.component
    }

    fn address(&self) -> Option<SocketAddr> {
        match *self.state.read() {
            Lifecycle::Listening(addr) => Some(addr),
            _ => None,
        }
    }

    fn is_running(&self) -> bool {
        matches!(*self.state.read(), Lifecycle::Listening(_))
    }

    async fn run(&self, shutdown: CancellationToken) -> Result<()> {
        let component = self.component;
        let addr = self.config.socket_addr()?;

        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(e) => {
                self.set_state(Lifecycle::Stopped);
                return Err(ServerError::bind(addr.to_string(), e));
            }
        };
        let local_addr = listener.local_addr()?;

        self.set_state(Lifecycle::Listening(local_addr));
        info!(component, %local_addr, "Listening");

        let served = axum::serve(listener, self.router.clone())
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                info!(component, "Draining connections");
            })
            .await;

        self.set_state(Lifecycle::Stopped);

        served.map_err(|e| {
            error!(component, error = %e, "Server stopped with error");
            ServerError::Io(e)
        })?;

        info!(component, "Stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ServerExt;
    use axum::routing::get;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    #[tokio::test]
    async fn test_serves_until_cancelled() {
        let router = Router::new().route("/healthz", get(|| async { "OK" }));
        let server = HttpServer::new("gateway", ServerConfig::new("127.0.0.1", 0), router);
        let token = CancellationToken::new();
        let handle = server.clone().spawn(token.clone());

        let addr = tokio::time::timeout(Duration::from_secs(5), server.wait_until_bound())
            .await
            .unwrap()
            .unwrap();
        assert!(server.is_running());
        assert_eq!(server.name(), "gateway");

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /healthz HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.ends_with("OK"));

        token.cancel();
        let result = tokio::time::timeout(Duration::from_secs(5), handle).await;
        assert!(result.unwrap().unwrap().is_ok());
        assert!(!server.is_running());
        assert_eq!(server.address(), None);
    }

    #[tokio::test]
    async fn test_bind_conflict() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();

        let server = HttpServer::new("gateway", ServerConfig::new("127.0.0.1", port), Router::new());
        let result = server.run(CancellationToken::new()).await;
        assert!(matches!(result, Err(ServerError::BindError { .. })));
        assert_eq!(server.wait_until_bound().await, None);
    }
}
