use axum::{Router, routing::get};
use crate::{AppState, controllers::portfolio_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/api/portfolio",
            get(portfolio_controller::get_portfolio).post(portfolio_controller::post_add_holding),
        )
        .route(
            "/api/portfolio/:id",
            axum::routing::put(portfolio_controller::put_update_holding)
                .delete(portfolio_controller::delete_holding),
        )
}
