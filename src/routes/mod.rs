use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::{controllers::home_controller, AppState};

pub mod alerts_routes;
pub mod market_routes;
pub mod portfolio_routes;
pub mod realtime_routes;
pub mod watch_routes;
pub mod watchlist_routes;

pub fn app(state: AppState) -> Router {
    let router = Router::<AppState>::new()
        .route("/health", get(home_controller::health))
        .route("/health/db", get(home_controller::health_db));

    let router = alerts_routes::add_routes(router);
    let router = watchlist_routes::add_routes(router);
    let router = watch_routes::add_routes(router);
    let router = portfolio_routes::add_routes(router);
    let router = market_routes::add_routes(router);
    let router = realtime_routes::add_routes(router);

    router
        .fallback(home_controller::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
