use crate::state::AppState;
use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;

/// Liveness check handler
pub(crate) async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
