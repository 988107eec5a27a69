use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::services::watch_service;
use crate::AppState;

use super::{created_json, error_json, ok_json, parse_object_id};

// GET /api/watch
pub async fn get_watch_items(State(state): State<AppState>) -> Response {
    let views = match watch_service::list_item_views(&state).await {
        Ok(v) => v,
        Err(e) => return error_json(StatusCode::INTERNAL_SERVER_ERROR, e),
    };

    let items: Vec<serde_json::Value> = views
        .iter()
        .map(|v| {
            json!({
                "id": v.id,
                "symbol": v.symbol,
                "notes": v.notes,
                "current_price": v.current_price,
                "change": v.change,
                "change_percent": v.change_percent,
            })
        })
        .collect();

    ok_json(json!(items))
}

#[derive(Deserialize)]
pub struct AddWatchItemBody {
    pub symbol: String,

    #[serde(default)]
    pub notes: String,
}

// POST /api/watch
pub async fn post_add_watch_item(
    State(state): State<AppState>,
    Json(body): Json<AddWatchItemBody>,
) -> Response {
    if body.symbol.trim().is_empty() {
        return error_json(StatusCode::BAD_REQUEST, "symbol is required");
    }

    match watch_service::add_item(&state, &body.symbol, body.notes.trim()).await {
        Ok(Some(item)) => created_json(json!({
            "id": item.id.to_hex(),
            "symbol": item.symbol,
            "notes": item.notes,
            "created_at": item.created_at,
        })),
        Ok(None) => error_json(StatusCode::CONFLICT, "symbol is already tracked"),
        Err(e) => error_json(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

// DELETE /api/watch/:id
pub async fn delete_watch_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let oid = match parse_object_id(&id) {
        Ok(x) => x,
        Err(resp) => return resp,
    };

    match watch_service::remove_item(&state, oid).await {
        Ok(true) => ok_json(json!({ "deleted": true })),
        Ok(false) => error_json(StatusCode::NOT_FOUND, "watch item not found"),
        Err(e) => error_json(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}
