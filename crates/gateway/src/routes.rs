//! Router construction

use crate::handlers::{self, GatewayState};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the gateway router.
///
/// # Routes
///
/// - `POST /trades` - enqueue a trade (204, 400 or 500)
/// - `GET /healthz` - `OK` when the database answers
/// - `GET /stats/:account` - ledger totals, zeros for unknown accounts
pub fn create_router(state: Arc<GatewayState>, request_timeout: Duration) -> Router {
    Router::new()
        .route("/trades", post(handlers::submit_trade))
        .route("/healthz", get(handlers::healthz))
        .route("/stats/", get(handlers::missing_account))
        .route("/stats/:account", get(handlers::get_stats))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use storage::Database;
    use tower::ServiceExt;

    async fn app() -> (Router, Database) {
        let db = Database::in_memory().await.unwrap();
        let router = create_router(GatewayState::new(db.clone()), Duration::from_secs(5));
        (router, db)
    }

    fn post_trade(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/trades")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_submit_valid_trade() {
        let (router, db) = app().await;
        let response = router
            .oneshot(post_trade(
                r#"{"account":"123","symbol":"EURUSD","volume":1.0,"open":1.1,"close":1.2,"side":"buy"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(db.queue().pending_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_submit_invalid_json() {
        let (router, db) = app().await;
        let response = router.oneshot(post_trade("{not json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Invalid JSON payload");
        assert_eq!(db.queue().pending_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_submit_rejected_trade() {
        let (router, db) = app().await;
        let response = router
            .oneshot(post_trade(
                r#"{"account":"123","symbol":"eurusd","volume":1.0,"open":1.1,"close":1.2,"side":"buy"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "symbol must match ^[A-Z]{6}$");
        assert_eq!(db.queue().pending_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_submit_missing_fields_fail_validation() {
        let (router, _db) = app().await;
        let response = router
            .oneshot(post_trade(r#"{"symbol":"EURUSD","volume":1.0,"open":1.1,"close":1.2,"side":"buy"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "account must not be empty");
    }

    #[tokio::test]
    async fn test_submit_storage_failure() {
        let (router, db) = app().await;
        sqlx::query("DROP TABLE trades_q")
            .execute(db.pool())
            .await
            .unwrap();

        let response = router
            .oneshot(post_trade(
                r#"{"account":"123","symbol":"EURUSD","volume":1.0,"open":1.1,"close":1.2,"side":"sell"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_text(response).await.starts_with("Failed to enqueue trade"));
    }

    #[tokio::test]
    async fn test_healthz() {
        let (router, db) = app().await;
        let response = router.clone().oneshot(get("/healthz")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");

        db.close().await;
        let response = router.oneshot(get("/healthz")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "Database connection failed");
    }

    #[tokio::test]
    async fn test_stats_for_unknown_account() {
        let (router, _db) = app().await;
        let response = router.oneshot(get("/stats/nobody")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["account"], "nobody");
        assert_eq!(json["trades"], 0);
        assert_eq!(json["profit"], 0.0);
    }

    #[tokio::test]
    async fn test_stats_for_settled_account() {
        let (router, db) = app().await;
        sqlx::query("INSERT INTO account_stats (account, trades, profit) VALUES ('123', 2, 1000000.0)")
            .execute(db.pool())
            .await
            .unwrap();

        let response = router.oneshot(get("/stats/123")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["trades"], 2);
        assert_eq!(json["profit"], 1_000_000.0);
    }

    #[tokio::test]
    async fn test_stats_without_account() {
        let (router, _db) = app().await;
        let response = router.oneshot(get("/stats/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Account is required");
    }

    #[tokio::test]
    async fn test_wrong_method() {
        let (router, _db) = app().await;
        let response = router.oneshot(get("/trades")).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
