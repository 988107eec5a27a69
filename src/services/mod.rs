pub mod db_init;

pub mod fyers;
pub mod mock_quotes;
pub mod quote_source;

pub mod optimistic;
pub mod pagination;
pub mod poller;
pub mod seq;

pub mod notify;

pub mod alert_engine;
pub mod alerts_service;
pub mod watchlist_service;
pub mod watchlist_sync;

pub mod portfolio_service;
pub mod watch_service;
