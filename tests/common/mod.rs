#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::broadcast;

use stockwatch::config;
use stockwatch::models::quote::normalize_symbol;
use stockwatch::models::{Alert, AlertCondition, Quote, StockEntry, Watchlist};
use stockwatch::services::alert_engine::AlertEngine;
use stockwatch::services::alerts_service::AlertStore;
use stockwatch::services::notify::{Notifier, PushChannel, PushPermission, Toast};
use stockwatch::services::quote_source::QuoteSource;
use stockwatch::services::watchlist_service::{NewStock, StockUpdate, WatchlistStore};
use stockwatch::services::watchlist_sync::WatchlistSync;
use stockwatch::AppState;

// ---------------------------------------------------------------------------
// In-memory store doubles
// ---------------------------------------------------------------------------

pub struct MemoryAlertStore {
    alerts: Mutex<Vec<Alert>>,
    pub fail_trigger_updates: AtomicBool,
}

impl MemoryAlertStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            alerts: Mutex::new(Vec::new()),
            fail_trigger_updates: AtomicBool::new(false),
        })
    }

    pub fn stored(&self) -> Vec<Alert> {
        self.alerts.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlertStore for MemoryAlertStore {
    async fn list(&self) -> Result<Vec<Alert>, String> {
        Ok(self.stored())
    }

    async fn insert(&self, alert: &Alert) -> Result<(), String> {
        self.alerts.lock().unwrap().insert(0, alert.clone());
        Ok(())
    }

    async fn set_triggered(
        &self,
        id: ObjectId,
        triggered: bool,
        triggered_at: Option<i64>,
    ) -> Result<(), String> {
        if self.fail_trigger_updates.load(Ordering::SeqCst) {
            return Err("injected store failure".to_string());
        }

        let mut alerts = self.alerts.lock().unwrap();
        if let Some(a) = alerts.iter_mut().find(|a| a.id == id) {
            a.triggered = triggered;
            a.triggered_at = triggered_at;
        }
        Ok(())
    }

    async fn update_terms(
        &self,
        id: ObjectId,
        target_price: f64,
        condition: AlertCondition,
    ) -> Result<(), String> {
        let mut alerts = self.alerts.lock().unwrap();
        if let Some(a) = alerts.iter_mut().find(|a| a.id == id) {
            a.target_price = target_price;
            a.condition = condition;
        }
        Ok(())
    }

    async fn delete(&self, id: ObjectId) -> Result<bool, String> {
        let mut alerts = self.alerts.lock().unwrap();
        let before = alerts.len();
        alerts.retain(|a| a.id != id);
        Ok(alerts.len() < before)
    }
}

pub struct MemoryWatchlistStore {
    watchlists: Mutex<Vec<Watchlist>>,
    pub fail_details: AtomicBool,
}

impl MemoryWatchlistStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            watchlists: Mutex::new(Vec::new()),
            fail_details: AtomicBool::new(false),
        })
    }

    pub fn seed(&self, watchlist: Watchlist) {
        self.watchlists.lock().unwrap().push(watchlist);
    }

    pub fn stored(&self) -> Vec<Watchlist> {
        self.watchlists.lock().unwrap().clone()
    }
}

#[async_trait]
impl WatchlistStore for MemoryWatchlistStore {
    async fn list(&self) -> Result<Vec<Watchlist>, String> {
        Ok(self.stored())
    }

    async fn details(&self, id: ObjectId) -> Result<Option<Watchlist>, String> {
        if self.fail_details.load(Ordering::SeqCst) {
            return Err("injected store failure".to_string());
        }

        Ok(self
            .watchlists
            .lock()
            .unwrap()
            .iter()
            .find(|w| w.id == id)
            .cloned())
    }

    async fn create(
        &self,
        name: &str,
        description: &str,
        is_default: bool,
    ) -> Result<Watchlist, String> {
        let mut lists = self.watchlists.lock().unwrap();

        if is_default {
            for w in lists.iter_mut() {
                w.is_default = false;
            }
        }

        let watchlist = Watchlist::new(name, description, is_default);
        lists.push(watchlist.clone());
        Ok(watchlist)
    }

    async fn delete(&self, id: ObjectId) -> Result<bool, String> {
        let mut lists = self.watchlists.lock().unwrap();
        let before = lists.len();
        lists.retain(|w| w.id != id);
        Ok(lists.len() < before)
    }

    async fn add_stock(
        &self,
        watchlist_id: ObjectId,
        stock: NewStock,
    ) -> Result<StockEntry, String> {
        let entry = StockEntry::new(
            watchlist_id,
            &stock.symbol,
            &stock.exchange,
            stock.target_price,
            stock.alert_price,
            &stock.notes,
        );

        let mut lists = self.watchlists.lock().unwrap();
        let Some(watchlist) = lists.iter_mut().find(|w| w.id == watchlist_id) else {
            return Err("watchlist not found".to_string());
        };

        watchlist.stocks.insert(0, entry.clone());
        Ok(entry)
    }

    async fn update_stock(
        &self,
        stock_id: ObjectId,
        changes: StockUpdate,
    ) -> Result<bool, String> {
        let mut lists = self.watchlists.lock().unwrap();

        for w in lists.iter_mut() {
            if let Some(s) = w.stocks.iter_mut().find(|s| s.id == stock_id) {
                s.target_price = changes.target_price;
                s.alert_price = changes.alert_price;
                s.is_alert_enabled = changes.is_alert_enabled;
                s.notes = changes.notes;
                return Ok(true);
            }
        }

        Ok(false)
    }

    async fn remove_stock(&self, stock_id: ObjectId) -> Result<bool, String> {
        let mut lists = self.watchlists.lock().unwrap();

        for w in lists.iter_mut() {
            let before = w.stocks.len();
            w.stocks.retain(|s| s.id != stock_id);
            if w.stocks.len() < before {
                return Ok(true);
            }
        }

        Ok(false)
    }

    async fn write_prices(&self, quotes: &[Quote]) -> Result<u64, String> {
        let mut lists = self.watchlists.lock().unwrap();
        let mut touched = 0u64;

        for q in quotes {
            for w in lists.iter_mut() {
                for s in w.stocks.iter_mut().filter(|s| s.symbol == q.symbol) {
                    s.current_price = Some(q.price);
                    s.price_change = Some(q.change);
                    s.price_change_percent = Some(q.change_percent);
                    touched += 1;
                }
            }
        }

        Ok(touched)
    }
}

// ---------------------------------------------------------------------------
// Quote source and push channel doubles
// ---------------------------------------------------------------------------

pub struct ScriptedQuotes {
    prices: Mutex<HashMap<String, f64>>,
    failing: Mutex<HashSet<String>>,
}

impl ScriptedQuotes {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            prices: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
        })
    }

    pub fn set(&self, symbol: &str, price: f64) {
        self.prices
            .lock()
            .unwrap()
            .insert(symbol.to_uppercase(), price);
    }

    pub fn fail(&self, symbol: &str) {
        self.failing.lock().unwrap().insert(symbol.to_uppercase());
    }
}

#[async_trait]
impl QuoteSource for ScriptedQuotes {
    async fn quote(&self, symbol: &str) -> Result<Quote, String> {
        let sym = normalize_symbol(symbol);

        if self.failing.lock().unwrap().contains(&sym) {
            return Err("scripted quote failure".to_string());
        }

        let price = self
            .prices
            .lock()
            .unwrap()
            .get(&sym)
            .copied()
            .ok_or_else(|| format!("no scripted price for {sym}"))?;

        Ok(Quote {
            symbol: sym,
            price,
            change: 0.0,
            change_percent: 0.0,
        })
    }
}

pub struct RecordingPush {
    pub sent: Mutex<Vec<(String, String)>>,
}

impl RecordingPush {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl PushChannel for RecordingPush {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, title: &str, body: &str) -> Result<(), String> {
        self.sent
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Wiring helpers
// ---------------------------------------------------------------------------

pub fn notifier_with(
    push: Option<Arc<dyn PushChannel>>,
    permission: PushPermission,
    opt_in: bool,
) -> (Notifier, broadcast::Receiver<Toast>) {
    let (tx, rx) = broadcast::channel(64);
    (Notifier::new(tx, push, permission, opt_in), rx)
}

pub fn quiet_notifier() -> (Notifier, broadcast::Receiver<Toast>) {
    notifier_with(None, PushPermission::Denied, false)
}

pub fn drain_toasts(rx: &mut broadcast::Receiver<Toast>) -> Vec<Toast> {
    let mut out = Vec::new();
    while let Ok(t) = rx.try_recv() {
        out.push(t);
    }
    out
}

pub fn watchlist_with_symbols(name: &str, is_default: bool, symbols: &[&str]) -> Watchlist {
    let mut w = Watchlist::new(name, "", is_default);
    for s in symbols {
        w.stocks.push(StockEntry::new(w.id, s, "NSE", None, None, ""));
    }
    w
}

pub fn watchlist_with_n_stocks(name: &str, n: usize) -> Watchlist {
    let mut w = Watchlist::new(name, "", true);
    for i in 0..n {
        let symbol = format!("STK{i:04}");
        w.stocks
            .push(StockEntry::new(w.id, &symbol, "NSE", None, None, ""));
    }
    w
}

pub struct TestHarness {
    pub state: AppState,
    pub alert_store: Arc<MemoryAlertStore>,
    pub watchlist_store: Arc<MemoryWatchlistStore>,
    pub quotes: Arc<ScriptedQuotes>,
    pub toasts: broadcast::Receiver<Toast>,
}

/// App state over in-memory stores. The Mongo client is lazy, so no database
/// is touched unless a handler under test actually queries it.
pub async fn test_state() -> TestHarness {
    let settings = config::load();

    let client = mongodb::Client::with_uri_str(&settings.mongodb_uri)
        .await
        .expect("mongodb client");
    let db = client.database(&settings.mongodb_db);

    let alert_store = MemoryAlertStore::new();
    let watchlist_store = MemoryWatchlistStore::new();
    let quotes = ScriptedQuotes::new();
    let (notifier, toasts) = quiet_notifier();

    let alerts = Arc::new(AlertEngine::new(
        alert_store.clone(),
        quotes.clone(),
        notifier.clone(),
    ));
    alerts.load_alerts().await;

    let watchlists = Arc::new(WatchlistSync::new(
        watchlist_store.clone(),
        quotes.clone(),
        notifier.clone(),
        Duration::from_millis(10),
    ));

    let state = AppState {
        db,
        settings,
        quotes: quotes.clone(),
        alerts,
        watchlists,
        notifier,
    };

    TestHarness {
        state,
        alert_store,
        watchlist_store,
        quotes,
        toasts,
    }
}
