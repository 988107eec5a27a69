use std::net::SocketAddr;
use std::sync::Arc;

use mongodb::Client;
use tokio::sync::broadcast;

use stockwatch::services::alert_engine::AlertEngine;
use stockwatch::services::alerts_service::MongoAlertStore;
use stockwatch::services::db_init;
use stockwatch::services::fyers::FyersClient;
use stockwatch::services::mock_quotes::MockQuoteSource;
use stockwatch::services::notify::{Notifier, PushChannel, PushPermission, WebhookPush};
use stockwatch::services::quote_source::QuoteSource;
use stockwatch::services::watchlist_service::MongoWatchlistStore;
use stockwatch::services::watchlist_sync::WatchlistSync;
use stockwatch::{config, routes, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = config::load();

    // Mongo connection
    let client = Client::with_uri_str(&settings.mongodb_uri)
        .await
        .expect("Failed to connect to MongoDB");
    let db = client.database(&settings.mongodb_db);

    if let Err(e) = db_init::ensure_indexes(&db).await {
        tracing::warn!("index creation failed: {}", e);
    }

    let quotes: Arc<dyn QuoteSource> = match settings.quote_source.as_str() {
        "fyers" => Arc::new(FyersClient::new(
            settings.fyers_base_url.clone(),
            settings.fyers_app_id.clone(),
            settings.fyers_access_token.clone(),
        )),
        _ => Arc::new(MockQuoteSource::new()),
    };
    tracing::info!("quote source: {}", settings.quote_source);

    let (toasts_tx, _toasts_rx) = broadcast::channel(64);

    let push: Option<Arc<dyn PushChannel>> = if settings.push_webhook_url.trim().is_empty() {
        None
    } else {
        Some(Arc::new(WebhookPush::new(settings.push_webhook_url.clone())))
    };

    let notifier = Notifier::new(
        toasts_tx,
        push,
        PushPermission::parse(&settings.push_permission),
        settings.push_opt_in,
    );

    let alerts = Arc::new(AlertEngine::new(
        Arc::new(MongoAlertStore::new(db.clone())),
        Arc::clone(&quotes),
        notifier.clone(),
    ));

    let watchlists = Arc::new(WatchlistSync::new(
        Arc::new(MongoWatchlistStore::new(db.clone())),
        Arc::clone(&quotes),
        notifier.clone(),
        settings.sync_refetch_delay(),
    ));

    alerts.load_alerts().await;
    alerts.clone().start(settings.alert_poll_interval());

    if let Err(e) = watchlists.load_watchlists().await {
        tracing::warn!("initial watchlist load failed: {}", e);
    }
    watchlists.clone().start(settings.watchlist_refresh_interval());

    let state = AppState {
        db,
        settings: settings.clone(),
        quotes,
        alerts,
        watchlists,
        notifier,
    };

    let app = routes::app(state);

    let addr = SocketAddr::from((
        settings
            .host
            .parse::<std::net::IpAddr>()
            .expect("invalid HOST"),
        settings.port,
    ));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.expect("bind failed");
    axum::serve(listener, app).await.expect("server error");
}
