use axum::{Router, routing::get};
use crate::{AppState, controllers::watch_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/api/watch",
            get(watch_controller::get_watch_items).post(watch_controller::post_add_watch_item),
        )
        .route(
            "/api/watch/:id",
            axum::routing::delete(watch_controller::delete_watch_item),
        )
}
