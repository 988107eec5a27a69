use axum::{Router, routing::{get, post}};
use crate::{AppState, controllers::watchlist_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/api/watchlists",
            get(watchlist_controller::get_watchlists)
                .post(watchlist_controller::post_create_watchlist),
        )
        .route("/api/watchlists/view", get(watchlist_controller::get_view))
        .route(
            "/api/watchlists/view/page",
            post(watchlist_controller::post_view_page),
        )
        .route(
            "/api/watchlists/view/page-size",
            post(watchlist_controller::post_view_page_size),
        )
        .route(
            "/api/watchlists/sync",
            post(watchlist_controller::post_sync_prices),
        )
        .route(
            "/api/watchlists/prices",
            post(watchlist_controller::post_push_prices),
        )
        .route(
            "/api/watchlists/stocks/:id",
            axum::routing::put(watchlist_controller::put_update_stock)
                .delete(watchlist_controller::delete_stock),
        )
        .route(
            "/api/watchlists/:id",
            get(watchlist_controller::get_watchlist_details)
                .delete(watchlist_controller::delete_watchlist),
        )
        .route(
            "/api/watchlists/:id/stocks",
            post(watchlist_controller::post_add_stock),
        )
}
