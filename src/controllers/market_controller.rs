use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::json;

use crate::AppState;

use super::{error_json, ok_json};

// GET /api/market/quote/:symbol
pub async fn get_quote(State(state): State<AppState>, Path(symbol): Path<String>) -> Response {
    let sym = symbol.trim().to_string();
    if sym.is_empty() {
        return error_json(StatusCode::BAD_REQUEST, "symbol is required");
    }

    match state.quotes.quote(&sym).await {
        Ok(q) => ok_json(json!({
            "symbol": q.symbol,
            "price": q.price,
            "change": q.change,
            "change_percent": q.change_percent,
        })),
        Err(e) => error_json(StatusCode::BAD_GATEWAY, e),
    }
}
