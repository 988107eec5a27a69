use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::models::quote::normalize_symbol;
use crate::models::{Quote, StockEntry, Watchlist};
use crate::services::watchlist_service::{NewStock, StockUpdate};
use crate::services::watchlist_sync::PageView;
use crate::AppState;

use super::{created_json, error_json, ok_json, parse_object_id, require_confirm, ConfirmQuery};

fn stock_json(s: &StockEntry) -> serde_json::Value {
    json!({
        "id": s.id.to_hex(),
        "watchlist_id": s.watchlist_id.to_hex(),
        "symbol": s.symbol,
        "exchange": s.exchange,
        "target_price": s.target_price,
        "alert_price": s.alert_price,
        "is_alert_enabled": s.is_alert_enabled,
        "notes": s.notes,
        "current_price": s.current_price,
        "price_change": s.price_change,
        "price_change_percent": s.price_change_percent,
        "last_price_at": s.last_price_at,
    })
}

fn watchlist_json(w: &Watchlist) -> serde_json::Value {
    json!({
        "id": w.id.to_hex(),
        "name": w.name,
        "description": w.description,
        "is_default": w.is_default,
        "created_at": w.created_at,
        "updated_at": w.updated_at,
        "stocks": w.stocks.iter().map(stock_json).collect::<Vec<_>>(),
    })
}

fn view_json(v: &PageView) -> serde_json::Value {
    json!({
        "watchlist_id": v.watchlist_id.map(|id| id.to_hex()),
        "name": v.name,
        "empty": v.watchlist_id.is_none(),
        "stocks": v.stocks.iter().map(stock_json).collect::<Vec<_>>(),
        "page": v.page,
        "page_size": v.page_size,
        "total_pages": v.total_pages,
        "total_stocks": v.total_stocks,
        "start_item": v.start_item,
        "end_item": v.end_item,
    })
}

// GET /api/watchlists
pub async fn get_watchlists(State(state): State<AppState>) -> Response {
    if let Err(e) = state.watchlists.load_watchlists().await {
        return error_json(StatusCode::INTERNAL_SERVER_ERROR, e);
    }

    let lists = state.watchlists.all().await;
    let summary = state.watchlists.summary().await;

    ok_json(json!({
        "watchlists": lists.iter().map(watchlist_json).collect::<Vec<_>>(),
        "summary": {
            "watchlists": summary.watchlists,
            "total_stocks": summary.total_stocks,
            "alerts_enabled": summary.alerts_enabled,
        },
    }))
}

#[derive(Deserialize)]
pub struct CreateWatchlistBody {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub is_default: bool,
}

// POST /api/watchlists
pub async fn post_create_watchlist(
    State(state): State<AppState>,
    Json(body): Json<CreateWatchlistBody>,
) -> Response {
    let name = body.name.trim();
    if name.is_empty() {
        return error_json(StatusCode::BAD_REQUEST, "watchlist name is required");
    }

    match state
        .watchlists
        .create_watchlist(name, body.description.trim(), body.is_default)
        .await
    {
        Ok(watchlist) => created_json(watchlist_json(&watchlist)),
        Err(e) => error_json(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

// GET /api/watchlists/view
pub async fn get_view(State(state): State<AppState>) -> Response {
    let view = state.watchlists.page_view().await;
    ok_json(view_json(&view))
}

#[derive(Deserialize)]
pub struct PageBody {
    pub page: usize,
}

// POST /api/watchlists/view/page
pub async fn post_view_page(
    State(state): State<AppState>,
    Json(body): Json<PageBody>,
) -> Response {
    let changed = state.watchlists.go_to_page(body.page).await;
    let view = state.watchlists.page_view().await;

    ok_json(json!({ "changed": changed, "view": view_json(&view) }))
}

#[derive(Deserialize)]
pub struct PageSizeBody {
    pub page_size: usize,
}

// POST /api/watchlists/view/page-size
pub async fn post_view_page_size(
    State(state): State<AppState>,
    Json(body): Json<PageSizeBody>,
) -> Response {
    if body.page_size == 0 {
        return error_json(StatusCode::BAD_REQUEST, "page size must be positive");
    }

    let changed = state.watchlists.change_page_size(body.page_size).await;
    let view = state.watchlists.page_view().await;

    ok_json(json!({ "changed": changed, "view": view_json(&view) }))
}

// POST /api/watchlists/sync
pub async fn post_sync_prices(State(state): State<AppState>) -> Response {
    match state.watchlists.clone().sync_prices().await {
        Ok(written) => ok_json(json!({ "synced": written })),
        Err(e) if e == "no watchlist selected" => error_json(StatusCode::BAD_REQUEST, e),
        Err(e) => error_json(StatusCode::BAD_GATEWAY, e),
    }
}

#[derive(Deserialize)]
pub struct PushedQuote {
    pub symbol: String,
    pub price: f64,

    #[serde(default)]
    pub change: f64,

    #[serde(default)]
    pub change_percent: f64,
}

// POST /api/watchlists/prices  (pushed quote batches from an external feed:
// persist, patch the cached view, then run the affected symbols through the
// alert engine)
pub async fn post_push_prices(
    State(state): State<AppState>,
    Json(body): Json<Vec<PushedQuote>>,
) -> Response {
    if body
        .iter()
        .any(|q| !q.price.is_finite() || q.price <= 0.0 || q.symbol.trim().is_empty())
    {
        return error_json(StatusCode::BAD_REQUEST, "every quote needs a symbol and a positive price");
    }

    let quotes: Vec<Quote> = body
        .into_iter()
        .map(|q| Quote {
            symbol: normalize_symbol(&q.symbol),
            price: q.price,
            change: q.change,
            change_percent: q.change_percent,
        })
        .collect();

    let written = match state.watchlists.push_prices(&quotes).await {
        Ok(n) => n,
        Err(e) => return error_json(StatusCode::INTERNAL_SERVER_ERROR, e),
    };

    let mut triggered = 0usize;
    for q in &quotes {
        triggered += state.alerts.check_alerts(&q.symbol, q.price).await;
    }

    ok_json(json!({ "updated": written, "triggered": triggered }))
}

// GET /api/watchlists/:id
pub async fn get_watchlist_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let oid = match parse_object_id(&id) {
        Ok(x) => x,
        Err(resp) => return resp,
    };

    match state.watchlists.load_details(oid).await {
        Ok(()) => {
            let view = state.watchlists.page_view().await;
            ok_json(view_json(&view))
        }
        Err(e) if e == "watchlist not found" => error_json(StatusCode::NOT_FOUND, e),
        Err(e) => error_json(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

// DELETE /api/watchlists/:id?confirm=true
pub async fn delete_watchlist(
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

    match state.watchlists.delete_watchlist(oid).await {
        Ok(true) => ok_json(json!({ "deleted": true })),
        Ok(false) => error_json(StatusCode::NOT_FOUND, "watchlist not found"),
        Err(e) => error_json(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

#[derive(Deserialize)]
pub struct AddStockBody {
    pub symbol: String,

    #[serde(default = "default_exchange")]
    pub exchange: String,

    pub target_price: Option<f64>,
    pub alert_price: Option<f64>,

    #[serde(default)]
    pub notes: String,
}

fn default_exchange() -> String {
    "NSE".to_string()
}

// POST /api/watchlists/:id/stocks
pub async fn post_add_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<AddStockBody>,
) -> Response {
    let oid = match parse_object_id(&id) {
        Ok(x) => x,
        Err(resp) => return resp,
    };

    if body.symbol.trim().is_empty() {
        return error_json(StatusCode::BAD_REQUEST, "symbol is required");
    }

    for price in [body.target_price, body.alert_price].into_iter().flatten() {
        if !price.is_finite() || price <= 0.0 {
            return error_json(StatusCode::BAD_REQUEST, "prices must be positive");
        }
    }

    let added = state
        .watchlists
        .add_stock(
            oid,
            NewStock {
                symbol: body.symbol,
                exchange: body.exchange,
                target_price: body.target_price,
                alert_price: body.alert_price,
                notes: body.notes,
            },
        )
        .await;

    match added {
        Ok(entry) => {
            // mirror the original add-then-reload flow
            let _ = state.watchlists.load_details(oid).await;
            created_json(stock_json(&entry))
        }
        Err(e) => error_json(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

#[derive(Deserialize)]
pub struct UpdateStockBody {
    pub target_price: Option<f64>,
    pub alert_price: Option<f64>,

    #[serde(default)]
    pub is_alert_enabled: bool,

    #[serde(default)]
    pub notes: String,
}

// PUT /api/watchlists/stocks/:id
pub async fn put_update_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateStockBody>,
) -> Response {
    let oid = match parse_object_id(&id) {
        Ok(x) => x,
        Err(resp) => return resp,
    };

    for price in [body.target_price, body.alert_price].into_iter().flatten() {
        if !price.is_finite() || price <= 0.0 {
            return error_json(StatusCode::BAD_REQUEST, "prices must be positive");
        }
    }

    let updated = state
        .watchlists
        .update_stock(
            oid,
            StockUpdate {
                target_price: body.target_price,
                alert_price: body.alert_price,
                is_alert_enabled: body.is_alert_enabled,
                notes: body.notes,
            },
        )
        .await;

    match updated {
        Ok(true) => {
            if let Some(current) = state.watchlists.current_id().await {
                let _ = state.watchlists.load_details(current).await;
            }
            ok_json(json!({ "updated": true }))
        }
        Ok(false) => error_json(StatusCode::NOT_FOUND, "stock not found"),
        Err(e) => error_json(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

// DELETE /api/watchlists/stocks/:id?confirm=true
pub async fn delete_stock(
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

    match state.watchlists.remove_stock(oid).await {
        Ok(true) => {
            if let Some(current) = state.watchlists.current_id().await {
                let _ = state.watchlists.load_details(current).await;
            }
            ok_json(json!({ "deleted": true }))
        }
        Ok(false) => error_json(StatusCode::NOT_FOUND, "stock not found"),
        Err(e) => error_json(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}
