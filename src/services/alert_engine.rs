use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use chrono::Utc;
use futures_util::future::join_all;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use crate::models::{Alert, AlertCondition};

use super::alerts_service::AlertStore;
use super::notify::{Notifier, ToastLevel};
use super::optimistic;
use super::poller::Poller;
use super::quote_source::{quote_or_none, QuoteSource};

pub struct NewAlert {
    pub symbol: String,
    pub target_price: f64,
    pub condition: AlertCondition,
    pub notes: String,
}

pub enum AlertAddOutcome {
    Created(Alert),
    Duplicate,
}

/// Owns the in-memory alert list and keeps it synchronized with the store.
///
/// Trigger evaluation is optimistic: the alert is flipped locally first, then
/// persisted; a failed write reverts the flip, so a trigger is notified
/// exactly once and only when it is durable.
pub struct AlertEngine {
    store: Arc<dyn AlertStore>,
    quotes: Arc<dyn QuoteSource>,
    notifier: Notifier,
    alerts: RwLock<Vec<Alert>>,
    initialized: AtomicBool,
    poller: StdMutex<Option<Poller>>,
}

impl AlertEngine {
    pub fn new(
        store: Arc<dyn AlertStore>,
        quotes: Arc<dyn QuoteSource>,
        notifier: Notifier,
    ) -> Self {
        Self {
            store,
            quotes,
            notifier,
            alerts: RwLock::new(Vec::new()),
            initialized: AtomicBool::new(false),
            poller: StdMutex::new(None),
        }
    }

    /// Fetch all alerts into memory. A failed fetch logs, toasts, and leaves
    /// the engine initialized over an empty list; the next poll cycle is the
    /// only retry.
    pub async fn load_alerts(&self) {
        match self.store.list().await {
            Ok(items) => *self.alerts.write().await = items,
            Err(e) => {
                tracing::error!("failed to load alerts: {}", e);
                self.notifier.toast(ToastLevel::Error, "Failed to load alerts");
                self.alerts.write().await.clear();
            }
        }

        self.initialized.store(true, Ordering::SeqCst);
    }

    pub fn start(self: Arc<Self>, every: Duration) {
        let engine = Arc::clone(&self);
        let poller = Poller::spawn("alert-engine", every, move || {
            let engine = Arc::clone(&engine);
            async move { engine.check_all_alerts().await }
        });

        *self.poller_slot() = Some(poller);
    }

    pub fn stop(&self) {
        if let Some(p) = self.poller_slot().take() {
            p.stop();
        }
    }

    fn poller_slot(&self) -> std::sync::MutexGuard<'_, Option<Poller>> {
        match self.poller.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Display order: active alerts first, then ascending by symbol.
    pub async fn snapshot(&self) -> Vec<Alert> {
        let mut items = self.alerts.read().await.clone();
        items.sort_by(|a, b| {
            a.triggered
                .cmp(&b.triggered)
                .then_with(|| a.symbol.cmp(&b.symbol))
        });
        items
    }

    /// Evaluate every active alert on `symbol` against `price`. Returns how
    /// many alerts newly triggered. No-op until `load_alerts` has run.
    pub async fn check_alerts(&self, symbol: &str, price: f64) -> usize {
        if !self.is_initialized() {
            return 0;
        }

        let now = Utc::now().timestamp();
        let mut triggered = 0usize;
        let mut alerts = self.alerts.write().await;

        for alert in alerts
            .iter_mut()
            .filter(|a| a.symbol == symbol && !a.triggered)
        {
            if !alert.should_trigger(price) {
                continue;
            }

            let persist = self.store.set_triggered(alert.id, true, Some(now));
            let res = optimistic::apply(
                alert,
                |a| {
                    a.triggered = true;
                    a.triggered_at = Some(now);
                },
                |a| {
                    a.triggered = false;
                    a.triggered_at = None;
                },
                persist,
            )
            .await;

            match res {
                Ok(()) => {
                    self.notifier.alert_triggered(alert, price).await;
                    triggered += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        "alert {} trigger not persisted, reverted: {}",
                        alert.id.to_hex(),
                        e
                    );
                }
            }
        }

        triggered
    }

    /// One poll cycle: collect the distinct symbols of active alerts, fetch
    /// their quotes concurrently (failures logged per symbol, never blocking
    /// the others), and evaluate each resolved quote.
    pub async fn check_all_alerts(&self) {
        if !self.is_initialized() {
            return;
        }

        let symbols: Vec<String> = {
            let alerts = self.alerts.read().await;
            let set: BTreeSet<String> = alerts
                .iter()
                .filter(|a| !a.triggered)
                .map(|a| a.symbol.clone())
                .collect();
            set.into_iter().collect()
        };

        if symbols.is_empty() {
            return;
        }

        let results = join_all(
            symbols
                .iter()
                .map(|s| quote_or_none(self.quotes.as_ref(), s)),
        )
        .await;

        for (symbol, quote) in symbols.iter().zip(results) {
            let Some(q) = quote else { continue };

            if !q.price.is_finite() || q.price <= 0.0 {
                continue;
            }

            self.check_alerts(symbol, q.price).await;
        }
    }

    /// Persist and prepend a new alert, unless an identical active one exists
    /// (the duplicate is rejected with a warning toast and no write).
    pub async fn add_alert(&self, data: NewAlert) -> Result<AlertAddOutcome, String> {
        let symbol = data.symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err("symbol is required".to_string());
        }
        if !data.target_price.is_finite() || data.target_price <= 0.0 {
            return Err("target price must be positive".to_string());
        }

        {
            let alerts = self.alerts.read().await;
            let exists = alerts.iter().any(|a| {
                !a.triggered
                    && a.symbol == symbol
                    && a.target_price == data.target_price
                    && a.condition == data.condition
            });

            if exists {
                self.notifier
                    .toast(ToastLevel::Warning, "A similar alert already exists");
                return Ok(AlertAddOutcome::Duplicate);
            }
        }

        let alert = Alert::new(&symbol, data.condition, data.target_price, &data.notes);
        self.store.insert(&alert).await?;

        self.alerts.write().await.insert(0, alert.clone());
        self.notifier.toast(ToastLevel::Success, "Alert added");

        Ok(AlertAddOutcome::Created(alert))
    }

    pub async fn delete_alert(&self, id: ObjectId) -> Result<bool, String> {
        let removed = self.store.delete(id).await?;

        self.alerts.write().await.retain(|a| a.id != id);

        if removed {
            self.notifier.toast(ToastLevel::Success, "Alert deleted");
        }

        Ok(removed)
    }

    /// Change an alert's threshold and direction. Persists first, then
    /// updates memory in place.
    pub async fn edit_alert(
        &self,
        id: ObjectId,
        target_price: f64,
        condition: AlertCondition,
    ) -> Result<Option<Alert>, String> {
        if !target_price.is_finite() || target_price <= 0.0 {
            return Err("target price must be positive".to_string());
        }

        {
            let alerts = self.alerts.read().await;
            if !alerts.iter().any(|a| a.id == id) {
                return Ok(None);
            }
        }

        self.store.update_terms(id, target_price, condition).await?;

        let mut alerts = self.alerts.write().await;
        let Some(alert) = alerts.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };

        alert.target_price = target_price;
        alert.condition = condition;
        self.notifier.toast(ToastLevel::Success, "Alert updated");

        Ok(Some(alert.clone()))
    }
}
