use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use mongodb::bson::doc;
use serde_json::json;

use crate::AppState;

use super::{error_json, ok_json};

// GET /health
pub async fn health() -> Response {
    ok_json(json!({ "status": "ok" }))
}

// GET /health/db
pub async fn health_db(State(state): State<AppState>) -> Response {
    match state.db.run_command(doc! { "ping": 1 }, None).await {
        Ok(_) => ok_json(json!({ "db": "ok" })),
        Err(e) => error_json(StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
    }
}

pub async fn not_found() -> Response {
    error_json(StatusCode::NOT_FOUND, "not found")
}
