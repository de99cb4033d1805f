//! Request handlers

use crate::{GatewayError, Result};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use common::{AccountStats, TradeSubmission};
use std::sync::Arc;
use storage::Database;
use tracing::{debug, info, warn};

/// Shared state for gateway handlers.
pub struct GatewayState {
    pub db: Database,
}

impl GatewayState {
    pub fn new(db: Database) -> Arc<Self> {
        Arc::new(Self { db })
    }
}

/// POST /trades
pub async fn submit_trade(
    State(state): State<Arc<GatewayState>>,
    body: Bytes,
) -> Result<StatusCode> {
    let submission: TradeSubmission =
        serde_json::from_slice(&body).map_err(|_| GatewayError::InvalidJson)?;

    let trade = submission.validate().map_err(|e| {
        debug!(error = %e, "Trade rejected");
        GatewayError::Validation(e.message().to_string())
    })?;

    let id = state.db.queue().enqueue(&trade).await.map_err(|e| {
        warn!(error = %e, account = %trade.account, "Failed to enqueue trade");
        GatewayError::Enqueue(e.to_string())
    })?;

    info!(trade_id = %id, account = %trade.account, symbol = %trade.symbol, "Trade accepted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /healthz
pub async fn healthz(State(state): State<Arc<GatewayState>>) -> Result<&'static str> {
    state.db.ping().await.map_err(|e| {
        warn!(error = %e, "Health check failed");
        GatewayError::Unhealthy
    })?;
    Ok("OK")
}

/// GET /stats/:account
pub async fn get_stats(
    State(state): State<Arc<GatewayState>>,
    Path(account): Path<String>,
) -> Result<Json<AccountStats>> {
    if account.is_empty() {
        return Err(GatewayError::MissingAccount);
    }

    let stats = state.db.ledger().get(&account).await.map_err(|e| {
        warn!(error = %e, account = %account, "Failed to fetch stats");
        GatewayError::Stats(e.to_string())
    })?;

    Ok(Json(stats))
}

/// GET /stats/
pub async fn missing_account() -> GatewayError {
    GatewayError::MissingAccount
}
