use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::models::{Alert, AlertCondition};
use crate::services::alert_engine::{AlertAddOutcome, NewAlert};
use crate::AppState;

use super::{created_json, error_json, ok_json, parse_object_id, require_confirm, ConfirmQuery};

fn alert_json(a: &Alert) -> serde_json::Value {
    json!({
        "id": a.id.to_hex(),
        "symbol": a.symbol,
        "condition": a.condition.as_str(),
        "target_price": a.target_price,
        "notes": a.notes,
        "created_at": a.created_at,
        "triggered": a.triggered,
        "triggered_at": a.triggered_at,
    })
}

// GET /api/alerts
pub async fn get_alerts(State(state): State<AppState>) -> Response {
    let items: Vec<serde_json::Value> =
        state.alerts.snapshot().await.iter().map(alert_json).collect();

    ok_json(json!(items))
}

#[derive(Deserialize)]
pub struct CreateAlertBody {
    pub symbol: String,
    pub target_price: f64,
    pub condition: String,

    #[serde(default)]
    pub notes: String,
}

// POST /api/alerts
pub async fn post_create_alert(
    State(state): State<AppState>,
    Json(body): Json<CreateAlertBody>,
) -> Response {
    let Some(condition) = AlertCondition::parse(&body.condition) else {
        return error_json(
            StatusCode::BAD_REQUEST,
            "condition must be \"above\" or \"below\"",
        );
    };

    if body.symbol.trim().is_empty() {
        return error_json(StatusCode::BAD_REQUEST, "symbol is required");
    }

    if !body.target_price.is_finite() || body.target_price <= 0.0 {
        return error_json(StatusCode::BAD_REQUEST, "target price must be positive");
    }

    let outcome = state
        .alerts
        .add_alert(NewAlert {
            symbol: body.symbol,
            target_price: body.target_price,
            condition,
            notes: body.notes,
        })
        .await;

    match outcome {
        Ok(AlertAddOutcome::Created(alert)) => created_json(alert_json(&alert)),
        Ok(AlertAddOutcome::Duplicate) => {
            error_json(StatusCode::CONFLICT, "A similar alert already exists")
        }
        Err(e) => error_json(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

#[derive(Deserialize)]
pub struct EditAlertBody {
    pub target_price: f64,
    pub condition: String,
}

// PUT /api/alerts/:id
pub async fn put_edit_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<EditAlertBody>,
) -> Response {
    let oid = match parse_object_id(&id) {
        Ok(x) => x,
        Err(resp) => return resp,
    };

    let Some(condition) = AlertCondition::parse(&body.condition) else {
        return error_json(
            StatusCode::BAD_REQUEST,
            "condition must be \"above\" or \"below\"",
        );
    };

    if !body.target_price.is_finite() || body.target_price <= 0.0 {
        return error_json(StatusCode::BAD_REQUEST, "target price must be positive");
    }

    match state.alerts.edit_alert(oid, body.target_price, condition).await {
        Ok(Some(alert)) => ok_json(alert_json(&alert)),
        Ok(None) => error_json(StatusCode::NOT_FOUND, "alert not found"),
        Err(e) => error_json(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

// DELETE /api/alerts/:id?confirm=true
pub async fn delete_alert(
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

    match state.alerts.delete_alert(oid).await {
        Ok(true) => ok_json(json!({ "deleted": true })),
        Ok(false) => error_json(StatusCode::NOT_FOUND, "alert not found"),
        Err(e) => error_json(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

#[derive(Deserialize)]
pub struct CheckQuery {
    pub price: f64,
}

// GET /api/alerts/check/:symbol?price=3510
pub async fn get_check_alerts(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(q): Query<CheckQuery>,
) -> Response {
    if !q.price.is_finite() || q.price <= 0.0 {
        return error_json(StatusCode::BAD_REQUEST, "price must be positive");
    }

    let sym = symbol.trim().to_uppercase();
    let triggered = state.alerts.check_alerts(&sym, q.price).await;

    ok_json(json!({ "symbol": sym, "price": q.price, "triggered": triggered }))
}
