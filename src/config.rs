use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Settings {
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub host: String,
    pub port: u16,

    // "mock" | "fyers"
    pub quote_source: String,
    pub fyers_base_url: String,
    pub fyers_app_id: String,
    pub fyers_access_token: String,

    pub alert_poll_secs: u64,
    pub watchlist_refresh_secs: u64,
    pub sync_refetch_delay_secs: u64,

    pub push_webhook_url: String,
    // "granted" | "denied" | "ask"
    pub push_permission: String,
    pub push_opt_in: bool,
}

impl Settings {
    pub fn alert_poll_interval(&self) -> Duration {
        Duration::from_secs(self.alert_poll_secs)
    }

    pub fn watchlist_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.watchlist_refresh_secs)
    }

    pub fn sync_refetch_delay(&self) -> Duration {
        Duration::from_secs(self.sync_refetch_delay_secs)
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(default)
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let mongodb_uri = env::var("MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

    let mongodb_db = env::var("MONGODB_DB")
        .unwrap_or_else(|_| "stockwatch".to_string());

    let host = env::var("HOST")
        .unwrap_or_else(|_| "127.0.0.1".to_string());

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let quote_source = env::var("QUOTE_SOURCE").unwrap_or_else(|_| "mock".to_string());

    let fyers_base_url = env::var("FYERS_BASE_URL")
        .unwrap_or_else(|_| "https://api-t1.fyers.in/api/v3".to_string());
    let fyers_app_id = env::var("FYERS_APP_ID").unwrap_or_default();
    let fyers_access_token = env::var("FYERS_ACCESS_TOKEN").unwrap_or_default();

    let alert_poll_secs = env_u64("ALERT_POLL_SECS", 60);
    let watchlist_refresh_secs = env_u64("WATCHLIST_REFRESH_SECS", 30);
    let sync_refetch_delay_secs = env_u64("SYNC_REFETCH_DELAY_SECS", 3);

    let push_webhook_url = env::var("PUSH_WEBHOOK_URL").unwrap_or_default();
    let push_permission = env::var("PUSH_PERMISSION").unwrap_or_else(|_| "ask".to_string());
    let push_opt_in = env::var("PUSH_OPT_IN")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    Settings {
        mongodb_uri,
        mongodb_db,
        host,
        port,
        quote_source,
        fyers_base_url,
        fyers_app_id,
        fyers_access_token,
        alert_poll_secs,
        watchlist_refresh_secs,
        sync_refetch_delay_secs,
        push_webhook_url,
        push_permission,
        push_opt_in,
    }
}
