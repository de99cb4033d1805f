//! Gateway error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Invalid JSON payload")]
    InvalidJson,

    /// Submission rejected by trade validation; carries the bare message
    #[error("{0}")]
    Validation(String),

    #[error("Account is required")]
    MissingAccount,

    #[error("Failed to enqueue trade: {0}")]
    Enqueue(String),

    #[error("Failed to fetch stats: {0}")]
    Stats(String),

    #[error("Database connection failed")]
    Unhealthy,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidJson | Self::Validation(_) | Self::MissingAccount => StatusCode::BAD_REQUEST,
            Self::Enqueue(_) | Self::Stats(_) | Self::Unhealthy => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
