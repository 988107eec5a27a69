use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use crate::models::quote::normalize_symbol;
use crate::models::{Quote, StockEntry, Watchlist};

use super::notify::{Notifier, ToastLevel};
use super::pagination::Pagination;
use super::poller::Poller;
use super::quote_source::QuoteSource;
use super::seq::SeqGate;
use super::watchlist_service::{NewStock, StockUpdate, WatchlistStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchlistSummary {
    pub watchlists: usize,
    pub total_stocks: usize,
    pub alerts_enabled: usize,
}

/// One page of the currently selected watchlist, plus the numbers the
/// paginator needs. `watchlist_id = None` is the empty state.
#[derive(Debug, Clone)]
pub struct PageView {
    pub watchlist_id: Option<ObjectId>,
    pub name: String,
    pub stocks: Vec<StockEntry>,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_stocks: usize,
    pub start_item: usize,
    pub end_item: usize,
}

struct ViewState {
    watchlists: Vec<Watchlist>,
    current_id: Option<ObjectId>,
    pages: Pagination,
}

/// Keeps the watchlist collection cached, tracks the current selection and
/// its pagination, and refreshes the selected watchlist on a schedule.
///
/// Detail fetches are sequence-tagged: when poll cycles overlap, a response
/// that lost the race is discarded instead of overwriting fresher state.
pub struct WatchlistSync {
    store: Arc<dyn WatchlistStore>,
    quotes: Arc<dyn QuoteSource>,
    notifier: Notifier,
    state: RwLock<ViewState>,
    view_seq: SeqGate,
    refetch_delay: Duration,
    poller: StdMutex<Option<Poller>>,
}

impl WatchlistSync {
    pub fn new(
        store: Arc<dyn WatchlistStore>,
        quotes: Arc<dyn QuoteSource>,
        notifier: Notifier,
        refetch_delay: Duration,
    ) -> Self {
        Self {
            store,
            quotes,
            notifier,
            state: RwLock::new(ViewState {
                watchlists: Vec::new(),
                current_id: None,
                pages: Pagination::new(),
            }),
            view_seq: SeqGate::new(),
            refetch_delay,
            poller: StdMutex::new(None),
        }
    }

    /// Fetch all watchlists and select the default one (else the first). An
    /// empty set leaves nothing selected; a failed fetch keeps prior state.
    pub async fn load_watchlists(&self) -> Result<(), String> {
        let lists = match self.store.list().await {
            Ok(l) => l,
            Err(e) => {
                tracing::error!("failed to load watchlists: {}", e);
                self.notifier
                    .toast(ToastLevel::Error, "Failed to load watchlists");
                return Err(e);
            }
        };

        let selected = lists
            .iter()
            .find(|w| w.is_default)
            .or_else(|| lists.first())
            .map(|w| w.id);

        {
            let mut state = self.state.write().await;
            let page_size = state.pages.page_size;
            state.watchlists = lists;
            state.current_id = None;
            state.pages = Pagination {
                page_size,
                ..Pagination::new()
            };
        }

        match selected {
            Some(id) => self.load_details(id).await,
            None => Ok(()),
        }
    }

    /// Full refresh of one watchlist: replace the cached copy wholesale (no
    /// merge), select it, and reset to page 1. Stale responses are dropped.
    pub async fn load_details(&self, id: ObjectId) -> Result<(), String> {
        let ticket = self.view_seq.issue();

        let fetched = match self.store.details(id).await {
            Ok(Some(w)) => w,
            Ok(None) => {
                self.notifier.toast(ToastLevel::Error, "Watchlist not found");
                return Err("watchlist not found".to_string());
            }
            Err(e) => {
                tracing::error!("failed to load watchlist details: {}", e);
                self.notifier
                    .toast(ToastLevel::Error, "Failed to load watchlist details");
                return Err(e);
            }
        };

        if !self.view_seq.admit(ticket) {
            tracing::debug!("discarding stale response for watchlist {}", id.to_hex());
            return Ok(());
        }

        let mut state = self.state.write().await;
        state.current_id = Some(id);
        state.pages.reset(fetched.stocks.len());

        match state.watchlists.iter_mut().find(|w| w.id == id) {
            Some(slot) => *slot = fetched,
            None => state.watchlists.push(fetched),
        }

        Ok(())
    }

    pub async fn current_id(&self) -> Option<ObjectId> {
        self.state.read().await.current_id
    }

    pub async fn all(&self) -> Vec<Watchlist> {
        self.state.read().await.watchlists.clone()
    }

    pub async fn summary(&self) -> WatchlistSummary {
        let state = self.state.read().await;

        WatchlistSummary {
            watchlists: state.watchlists.len(),
            total_stocks: state.watchlists.iter().map(|w| w.stocks.len()).sum(),
            alerts_enabled: state
                .watchlists
                .iter()
                .flat_map(|w| w.stocks.iter())
                .filter(|s| s.is_alert_enabled)
                .count(),
        }
    }

    pub async fn page_view(&self) -> PageView {
        let state = self.state.read().await;

        let current = state
            .current_id
            .and_then(|id| state.watchlists.iter().find(|w| w.id == id));

        let Some(current) = current else {
            return PageView {
                watchlist_id: None,
                name: String::new(),
                stocks: Vec::new(),
                page: 1,
                page_size: state.pages.page_size,
                total_pages: 1,
                total_stocks: 0,
                start_item: 0,
                end_item: 0,
            };
        };

        let range = state.pages.slice_range();
        let (start_item, end_item) = state.pages.item_bounds();

        PageView {
            watchlist_id: Some(current.id),
            name: current.name.clone(),
            stocks: current.stocks.get(range).map(<[_]>::to_vec).unwrap_or_default(),
            page: state.pages.page,
            page_size: state.pages.page_size,
            total_pages: state.pages.total_pages(),
            total_stocks: state.pages.total_items,
            start_item,
            end_item,
        }
    }

    pub async fn go_to_page(&self, page: usize) -> bool {
        self.state.write().await.pages.go_to(page)
    }

    pub async fn change_page_size(&self, size: usize) -> bool {
        self.state.write().await.pages.set_page_size(size)
    }

    pub fn start(self: Arc<Self>, every: Duration) {
        let sync = Arc::clone(&self);
        let poller = Poller::spawn("watchlist-refresh", every, move || {
            let sync = Arc::clone(&sync);
            async move {
                if let Some(id) = sync.current_id().await {
                    let _ = sync.load_details(id).await;
                }
            }
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

    /// Batch-refresh broker prices for the current watchlist, then re-fetch
    /// its details after a fixed delay so the persisted prices land in the
    /// view (a deliberate eventual-consistency window, not a confirmation).
    pub async fn sync_prices(self: Arc<Self>) -> Result<u64, String> {
        let (id, symbols) = {
            let state = self.state.read().await;

            let current = state
                .current_id
                .and_then(|id| state.watchlists.iter().find(|w| w.id == id));

            let Some(current) = current else {
                self.notifier.toast(ToastLevel::Error, "No watchlist selected");
                return Err("no watchlist selected".to_string());
            };

            (
                current.id,
                current
                    .stocks
                    .iter()
                    .map(|s| s.symbol.clone())
                    .collect::<Vec<_>>(),
            )
        };

        if symbols.is_empty() {
            return Ok(0);
        }

        let quotes = match self.quotes.quotes(&symbols).await {
            Ok(q) => q,
            Err(e) => {
                self.notifier.toast(ToastLevel::Error, "Price sync failed");
                return Err(e);
            }
        };

        let written = match self.store.write_prices(&quotes).await {
            Ok(n) => n,
            Err(e) => {
                self.notifier.toast(ToastLevel::Error, "Price sync failed");
                return Err(e);
            }
        };

        self.notifier.toast(ToastLevel::Info, "Price sync started");

        let sync = Arc::clone(&self);
        let delay = self.refetch_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = sync.load_details(id).await;
        });

        Ok(written)
    }

    /// Persist a pushed batch of quotes and patch the cached view in place.
    /// Used when an external feed delivers prices, instead of a full re-fetch.
    pub async fn push_prices(&self, quotes: &[Quote]) -> Result<u64, String> {
        let written = self.store.write_prices(quotes).await?;
        self.patch_prices(quotes).await;
        Ok(written)
    }

    /// Targeted patch: update only the matching cached rows' price fields,
    /// leaving everything else (and every other row) untouched.
    pub async fn patch_prices(&self, quotes: &[Quote]) -> usize {
        let mut state = self.state.write().await;

        let Some(id) = state.current_id else { return 0 };
        let Some(current) = state.watchlists.iter_mut().find(|w| w.id == id) else {
            return 0;
        };

        let mut patched = 0usize;
        for q in quotes {
            let sym = normalize_symbol(&q.symbol);

            for row in current.stocks.iter_mut().filter(|s| s.symbol == sym) {
                row.current_price = Some(q.price);
                row.price_change = Some(q.change);
                row.price_change_percent = Some(q.change_percent);
                patched += 1;
            }
        }

        patched
    }

    // --- CRUD pass-throughs used by the HTTP layer; callers refresh the view
    // afterwards, mirroring the original add-then-reload flow.

    pub async fn create_watchlist(
        &self,
        name: &str,
        description: &str,
        is_default: bool,
    ) -> Result<Watchlist, String> {
        let watchlist = self.store.create(name, description, is_default).await?;
        self.notifier.toast(ToastLevel::Success, "Watchlist created");
        Ok(watchlist)
    }

    pub async fn delete_watchlist(&self, id: ObjectId) -> Result<bool, String> {
        let removed = self.store.delete(id).await?;

        if removed {
            let mut state = self.state.write().await;
            state.watchlists.retain(|w| w.id != id);
            if state.current_id == Some(id) {
                state.current_id = None;
                state.pages.reset(0);
            }
            self.notifier.toast(ToastLevel::Success, "Watchlist deleted");
        }

        Ok(removed)
    }

    pub async fn add_stock(
        &self,
        watchlist_id: ObjectId,
        stock: NewStock,
    ) -> Result<StockEntry, String> {
        let entry = self.store.add_stock(watchlist_id, stock).await?;
        self.notifier.toast(ToastLevel::Success, "Stock added");
        Ok(entry)
    }

    pub async fn update_stock(
        &self,
        stock_id: ObjectId,
        changes: StockUpdate,
    ) -> Result<bool, String> {
        let updated = self.store.update_stock(stock_id, changes).await?;
        if updated {
            self.notifier.toast(ToastLevel::Success, "Stock updated");
        }
        Ok(updated)
    }

    pub async fn remove_stock(&self, stock_id: ObjectId) -> Result<bool, String> {
        let removed = self.store.remove_stock(stock_id).await?;
        if removed {
            self.notifier.toast(ToastLevel::Success, "Stock removed");
        }
        Ok(removed)
    }
}
