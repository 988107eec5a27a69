pub mod alerts_controller;
pub mod home_controller;
pub mod market_controller;
pub mod portfolio_controller;
pub mod watch_controller;
pub mod watchlist_controller;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::json;

pub(crate) fn ok_json(data: serde_json::Value) -> Response {
    (StatusCode::OK, Json(json!({ "success": true, "data": data }))).into_response()
}

pub(crate) fn created_json(data: serde_json::Value) -> Response {
    (
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": data })),
    )
        .into_response()
}

pub(crate) fn error_json(status: StatusCode, detail: impl Into<String>) -> Response {
    (
        status,
        Json(json!({ "success": false, "detail": detail.into() })),
    )
        .into_response()
}

/// Destructive endpoints refuse to run without an explicit confirmation flag.
#[derive(Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}

pub(crate) fn require_confirm(q: &ConfirmQuery) -> Option<Response> {
    if q.confirm {
        None
    } else {
        Some(error_json(
            StatusCode::BAD_REQUEST,
            "confirmation required: pass confirm=true",
        ))
    }
}

pub(crate) fn parse_object_id(id: &str) -> Result<ObjectId, Response> {
    ObjectId::parse_str(id).map_err(|_| error_json(StatusCode::BAD_REQUEST, "invalid id"))
}
