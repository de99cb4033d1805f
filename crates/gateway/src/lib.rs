//! HTTP collaborators of the settlement core
//!
//! - `POST /trades` validates and enqueues a trade
//! - `GET /healthz` pings the database
//! - `GET /stats/:account` reads the account ledger
//!
//! Error bodies are plain text.

pub mod error;
pub mod handlers;
pub mod routes;

pub use error::GatewayError;
pub use handlers::GatewayState;
pub use routes::create_router;

/// Result type for gateway handlers
pub type Result<T> = std::result::Result<T, GatewayError>;
