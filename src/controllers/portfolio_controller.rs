use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::services::portfolio_service;
use crate::AppState;

use super::{created_json, error_json, ok_json, parse_object_id, require_confirm, ConfirmQuery};

// GET /api/portfolio
pub async fn get_portfolio(State(state): State<AppState>) -> Response {
    let views = match portfolio_service::list_holding_views(&state).await {
        Ok(v) => v,
        Err(e) => return error_json(StatusCode::INTERNAL_SERVER_ERROR, e),
    };

    let items: Vec<serde_json::Value> = views
        .iter()
        .map(|v| {
            json!({
                "id": v.id,
                "symbol": v.symbol,
                "quantity": v.quantity,
                "avg_buy_price": v.avg_buy_price,
                "current_price": v.current_price,
                "pnl": v.pnl,
                "pnl_pct": v.pnl_pct,
                "notes": v.notes,
            })
        })
        .collect();

    ok_json(json!(items))
}

#[derive(Deserialize)]
pub struct AddHoldingBody {
    pub symbol: String,
    pub quantity: i64,
    pub avg_buy_price: f64,

    #[serde(default)]
    pub notes: String,
}

// POST /api/portfolio
pub async fn post_add_holding(
    State(state): State<AppState>,
    Json(body): Json<AddHoldingBody>,
) -> Response {
    if body.symbol.trim().is_empty() {
        return error_json(StatusCode::BAD_REQUEST, "symbol is required");
    }
    if body.quantity <= 0 {
        return error_json(StatusCode::BAD_REQUEST, "quantity must be positive");
    }
    if !body.avg_buy_price.is_finite() || body.avg_buy_price <= 0.0 {
        return error_json(StatusCode::BAD_REQUEST, "average buy price must be positive");
    }

    let added = portfolio_service::add_item(
        &state,
        &body.symbol,
        body.quantity,
        body.avg_buy_price,
        body.notes.trim(),
    )
    .await;

    match added {
        Ok(item) => created_json(json!({
            "id": item.id.to_hex(),
            "symbol": item.symbol,
            "quantity": item.quantity,
            "avg_buy_price": item.avg_buy_price,
            "notes": item.notes,
            "created_at": item.created_at,
        })),
        Err(e) => error_json(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

#[derive(Deserialize)]
pub struct UpdateHoldingBody {
    pub quantity: i64,
    pub avg_buy_price: f64,

    #[serde(default)]
    pub notes: String,
}

// PUT /api/portfolio/:id
pub async fn put_update_holding(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateHoldingBody>,
) -> Response {
    let oid = match parse_object_id(&id) {
        Ok(x) => x,
        Err(resp) => return resp,
    };

    if body.quantity <= 0 {
        return error_json(StatusCode::BAD_REQUEST, "quantity must be positive");
    }
    if !body.avg_buy_price.is_finite() || body.avg_buy_price <= 0.0 {
        return error_json(StatusCode::BAD_REQUEST, "average buy price must be positive");
    }

    let updated = portfolio_service::update_item(
        &state,
        oid,
        body.quantity,
        body.avg_buy_price,
        body.notes.trim(),
    )
    .await;

    match updated {
        Ok(true) => ok_json(json!({ "updated": true })),
        Ok(false) => error_json(StatusCode::NOT_FOUND, "holding not found"),
        Err(e) => error_json(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

// DELETE /api/portfolio/:id?confirm=true
pub async fn delete_holding(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<ConfirmQuery>,
) -> Response {
    if let Some(resp) = require_confirm(&q) {
        return resp;
    }

    let oid = match parse_object_id(&id) {
        Ok(x) => x,
        Err(resp) => return resp,
    };

    match portfolio_service::remove_item(&state, oid).await {
        Ok(true) => ok_json(json!({ "deleted": true })),
        Ok(false) => error_json(StatusCode::NOT_FOUND, "holding not found"),
        Err(e) => error_json(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}
