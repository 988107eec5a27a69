use axum::{Router, routing::get};
use crate::{events, AppState};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router.route("/api/events", get(events::sse_events))
}
