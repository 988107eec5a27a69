mod common;

use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{test_state, watchlist_with_n_stocks, watchlist_with_symbols, TestHarness};
use stockwatch::routes;

async fn response_json(res: axum::response::Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<axum::body::Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<axum::body::Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<axum::body::Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap()
}

async fn seeded_app() -> (Router, TestHarness) {
    let harness = test_state().await;
    let app = routes::app(harness.state.clone());
    (app, harness)
}

#[tokio::test]
async fn listing_returns_watchlists_and_summary() {
    let (app, harness) = seeded_app().await;

    let mut tech = watchlist_with_symbols("Tech", true, &["TCS", "INFY"]);
    tech.stocks[0].is_alert_enabled = true;
    harness.watchlist_store.seed(tech);
    harness
        .watchlist_store
        .seed(watchlist_with_symbols("Banks", false, &["SBIN"]));

    let res = app.oneshot(get_request("/api/watchlists")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_json(res).await;
    assert_eq!(body["data"]["watchlists"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["summary"]["total_stocks"], json!(3));
    assert_eq!(body["data"]["summary"]["alerts_enabled"], json!(1));
}

#[tokio::test]
async fn empty_listing_reports_empty_view() {
    let (app, _harness) = seeded_app().await;

    let res = app
        .clone()
        .oneshot(get_request("/api/watchlists"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let view = response_json(app.oneshot(get_request("/api/watchlists/view")).await.unwrap()).await;
    assert_eq!(view["data"]["empty"], json!(true));
    assert_eq!(view["data"]["start_item"], json!(0));
    assert_eq!(view["data"]["end_item"], json!(0));
}

#[tokio::test]
async fn create_watchlist_requires_a_name() {
    let (app, _harness) = seeded_app().await;

    let res = app
        .oneshot(json_request(
            "POST",
            "/api/watchlists",
            json!({ "name": "   " }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn creating_a_default_watchlist_clears_the_previous_default() {
    let (app, harness) = seeded_app().await;
    harness
        .watchlist_store
        .seed(watchlist_with_symbols("Old", true, &[]));

    let res = app
        .oneshot(json_request(
            "POST",
            "/api/watchlists",
            json!({ "name": "New", "is_default": true }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let stored = harness.watchlist_store.stored();
    let defaults: Vec<_> = stored.iter().filter(|w| w.is_default).collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].name, "New");
}

#[tokio::test]
async fn view_paginates_through_the_selected_watchlist() {
    let (app, harness) = seeded_app().await;
    harness
        .watchlist_store
        .seed(watchlist_with_n_stocks("Big", 57));

    // select via the listing
    let res = app
        .clone()
        .oneshot(get_request("/api/watchlists"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let view = response_json(app.clone().oneshot(get_request("/api/watchlists/view")).await.unwrap())
        .await;
    assert_eq!(view["data"]["total_pages"], json!(3));
    assert_eq!(view["data"]["stocks"].as_array().unwrap().len(), 25);

    let paged = response_json(
        app.clone()
            .oneshot(json_request(
                "POST",
                "/api/watchlists/view/page",
                json!({ "page": 3 }),
            ))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(paged["data"]["changed"], json!(true));
    assert_eq!(paged["data"]["view"]["start_item"], json!(51));
    assert_eq!(paged["data"]["view"]["end_item"], json!(57));

    let out_of_range = response_json(
        app.clone()
            .oneshot(json_request(
                "POST",
                "/api/watchlists/view/page",
                json!({ "page": 4 }),
            ))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(out_of_range["data"]["changed"], json!(false));
    assert_eq!(out_of_range["data"]["view"]["page"], json!(3));

    let resized = response_json(
        app.oneshot(json_request(
            "POST",
            "/api/watchlists/view/page-size",
            json!({ "page_size": 10 }),
        ))
        .await
        .unwrap(),
    )
    .await;
    assert_eq!(resized["data"]["view"]["page"], json!(1));
    assert_eq!(resized["data"]["view"]["total_pages"], json!(6));
}

#[tokio::test]
async fn zero_page_size_is_rejected() {
    let (app, _harness) = seeded_app().await;

    let res = app
        .oneshot(json_request(
            "POST",
            "/api/watchlists/view/page-size",
            json!({ "page_size": 0 }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn add_stock_requires_a_symbol() {
    let (app, harness) = seeded_app().await;
    let tech = watchlist_with_symbols("Tech", true, &[]);
    let id = tech.id.to_hex();
    harness.watchlist_store.seed(tech);

    let res = app
        .oneshot(json_request(
            "POST",
            &format!("/api/watchlists/{id}/stocks"),
            json!({ "symbol": "" }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn add_stock_rejects_non_positive_prices() {
    let (app, harness) = seeded_app().await;
    let tech = watchlist_with_symbols("Tech", true, &[]);
    let id = tech.id.to_hex();
    harness.watchlist_store.seed(tech);

    let res = app
        .oneshot(json_request(
            "POST",
            &format!("/api/watchlists/{id}/stocks"),
            json!({ "symbol": "TCS", "target_price": -5.0 }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn added_stock_lands_in_the_store_uppercased() {
    let (app, harness) = seeded_app().await;
    let tech = watchlist_with_symbols("Tech", true, &[]);
    let id = tech.id.to_hex();
    harness.watchlist_store.seed(tech);

    let res = app
        .oneshot(json_request(
            "POST",
            &format!("/api/watchlists/{id}/stocks"),
            json!({ "symbol": "tcs", "alert_price": 3500.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let body = response_json(res).await;
    assert_eq!(body["data"]["symbol"], json!("TCS"));
    assert_eq!(body["data"]["is_alert_enabled"], json!(true));

    let stored = harness.watchlist_store.stored();
    assert_eq!(stored[0].stocks.len(), 1);
    assert_eq!(stored[0].stocks[0].symbol, "TCS");
}

#[tokio::test]
async fn stock_removal_requires_confirmation() {
    let (app, harness) = seeded_app().await;
    let tech = watchlist_with_symbols("Tech", true, &["TCS"]);
    let stock_id = tech.stocks[0].id.to_hex();
    harness.watchlist_store.seed(tech);

    let res = app
        .clone()
        .oneshot(empty_request(
            "DELETE",
            &format!("/api/watchlists/stocks/{stock_id}"),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(harness.watchlist_store.stored()[0].stocks.len(), 1);

    let res = app
        .oneshot(empty_request(
            "DELETE",
            &format!("/api/watchlists/stocks/{stock_id}?confirm=true"),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(harness.watchlist_store.stored()[0].stocks.is_empty());
}

#[tokio::test]
async fn watchlist_delete_requires_confirmation() {
    let (app, harness) = seeded_app().await;
    let tech = watchlist_with_symbols("Tech", true, &["TCS"]);
    let id = tech.id.to_hex();
    harness.watchlist_store.seed(tech);

    let res = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/api/watchlists/{id}")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .oneshot(empty_request(
            "DELETE",
            &format!("/api/watchlists/{id}?confirm=true"),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(harness.watchlist_store.stored().is_empty());
}

#[tokio::test]
async fn details_with_malformed_id_is_a_bad_request() {
    let (app, _harness) = seeded_app().await;

    let res = app
        .oneshot(get_request("/api/watchlists/not-an-id"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn details_for_unknown_watchlist_is_not_found() {
    let (app, _harness) = seeded_app().await;

    let missing = mongodb::bson::oid::ObjectId::new().to_hex();
    let res = app
        .oneshot(get_request(&format!("/api/watchlists/{missing}")))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pushed_prices_update_the_view_and_trigger_alerts() {
    let (app, harness) = seeded_app().await;
    harness
        .watchlist_store
        .seed(watchlist_with_symbols("Tech", true, &["TCS", "INFY"]));

    // select the watchlist and arm an alert on one of its symbols
    let res = app
        .clone()
        .oneshot(get_request("/api/watchlists"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/alerts",
            json!({ "symbol": "TCS", "target_price": 3500.0, "condition": "above" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/watchlists/prices",
            json!([{ "symbol": "NSE:TCS-EQ", "price": 3510.0, "change": 12.0 }]),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_json(res).await;
    assert_eq!(body["data"]["updated"], json!(1));
    assert_eq!(body["data"]["triggered"], json!(1));

    let view = response_json(app.oneshot(get_request("/api/watchlists/view")).await.unwrap()).await;
    let stocks = view["data"]["stocks"].as_array().unwrap();
    let tcs = stocks
        .iter()
        .find(|s| s["symbol"] == json!("TCS"))
        .unwrap();
    assert_eq!(tcs["current_price"], json!(3510.0));
}

#[tokio::test]
async fn pushed_prices_reject_non_positive_values() {
    let (app, _harness) = seeded_app().await;

    let res = app
        .oneshot(json_request(
            "POST",
            "/api/watchlists/prices",
            json!([{ "symbol": "TCS", "price": 0.0 }]),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn quote_endpoint_serves_scripted_prices() {
    let (app, harness) = seeded_app().await;
    harness.quotes.set("TCS", 3510.0);

    let res = app
        .oneshot(get_request("/api/market/quote/TCS"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_json(res).await;
    assert_eq!(body["data"]["symbol"], json!("TCS"));
    assert_eq!(body["data"]["price"], json!(3510.0));
}

#[tokio::test]
async fn quote_endpoint_maps_provider_failure_to_bad_gateway() {
    let (app, harness) = seeded_app().await;
    harness.quotes.fail("TCS");

    let res = app
        .oneshot(get_request("/api/market/quote/TCS"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
}
