//! Server lifecycle for the broker ledger
//!
//! Long-running components implement [`Server`]; [`ServerExt`] adds
//! `spawn`. Shutdown is coordinated through a [`ShutdownController`] whose
//! `CancellationToken` is handed to every component, the settlement worker
//! included.
//!
//! ```ignore
//! let shutdown = ShutdownController::with_ctrl_c();
//! let server = HttpServer::new("gateway", ServerConfig::from_gateway(&config.gateway), router);
//! let handle = server.spawn(shutdown.child_token());
//! shutdown.wait_for_shutdown().await;
//! handle.await??;
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod shutdown;
pub mod traits;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use http::HttpServer;
pub use shutdown::ShutdownController;
pub use traits::{Server, ServerExt};
