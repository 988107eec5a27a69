//! Library entrypoint for stockwatch.
//!
//! This file exists mainly to make controller and engine tests easy
//! (integration tests under `tests/` can import the app state, routers,
//! services and the store traits they stub out).

pub mod config;
pub mod models;

pub mod services;

pub mod controllers;
pub mod events;
pub mod routes;

use std::sync::Arc;

use services::alert_engine::AlertEngine;
use services::notify::Notifier;
use services::quote_source::QuoteSource;
use services::watchlist_sync::WatchlistSync;

#[derive(Clone)]
pub struct AppState {
    pub db: mongodb::Database,
    pub settings: config::Settings,
    pub quotes: Arc<dyn QuoteSource>,
    pub alerts: Arc<AlertEngine>,
    pub watchlists: Arc<WatchlistSync>,
    pub notifier: Notifier,
}
