use async_trait::async_trait;
use chrono::Utc;
use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::FindOptions;
use mongodb::Database;

use crate::models::{Quote, StockEntry, Watchlist};

pub struct NewStock {
    pub symbol: String,
    pub exchange: String,
    pub target_price: Option<f64>,
    pub alert_price: Option<f64>,
    pub notes: String,
}

pub struct StockUpdate {
    pub target_price: Option<f64>,
    pub alert_price: Option<f64>,
    pub is_alert_enabled: bool,
    pub notes: String,
}

/// Persistence seam for watchlists and their stock rows.
#[async_trait]
pub trait WatchlistStore: Send + Sync {
    /// All watchlists with their stock rows, default first.
    async fn list(&self) -> Result<Vec<Watchlist>, String>;

    async fn details(&self, id: ObjectId) -> Result<Option<Watchlist>, String>;

    /// Creating a default watchlist clears the flag on every other one.
    async fn create(
        &self,
        name: &str,
        description: &str,
        is_default: bool,
    ) -> Result<Watchlist, String>;

    async fn delete(&self, id: ObjectId) -> Result<bool, String>;

    async fn add_stock(
        &self,
        watchlist_id: ObjectId,
        stock: NewStock,
    ) -> Result<StockEntry, String>;

    async fn update_stock(&self, stock_id: ObjectId, changes: StockUpdate)
        -> Result<bool, String>;

    async fn remove_stock(&self, stock_id: ObjectId) -> Result<bool, String>;

    /// Write a batch of fresh prices into every matching stock row across all
    /// watchlists; returns the number of rows touched.
    async fn write_prices(&self, quotes: &[Quote]) -> Result<u64, String>;
}

pub struct MongoWatchlistStore {
    db: Database,
}

impl MongoWatchlistStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn watchlists(&self) -> mongodb::Collection<Watchlist> {
        self.db.collection::<Watchlist>("watchlists")
    }

    fn stocks(&self) -> mongodb::Collection<StockEntry> {
        self.db.collection::<StockEntry>("watchlist_stocks")
    }

    async fn stocks_for(&self, watchlist_id: ObjectId) -> Result<Vec<StockEntry>, String> {
        let find_opts = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();

        let mut cursor = self
            .stocks()
            .find(doc! { "watchlist_id": watchlist_id }, find_opts)
            .await
            .map_err(|e| e.to_string())?;

        let mut items: Vec<StockEntry> = Vec::new();
        while let Some(res) = cursor.next().await {
            items.push(res.map_err(|e| e.to_string())?);
        }

        Ok(items)
    }
}

#[async_trait]
impl WatchlistStore for MongoWatchlistStore {
    async fn list(&self) -> Result<Vec<Watchlist>, String> {
        let find_opts = FindOptions::builder()
            .sort(doc! { "is_default": -1, "created_at": 1 })
            .build();

        let mut cursor = self
            .watchlists()
            .find(None, find_opts)
            .await
            .map_err(|e| e.to_string())?;

        let mut lists: Vec<Watchlist> = Vec::new();
        while let Some(res) = cursor.next().await {
            lists.push(res.map_err(|e| e.to_string())?);
        }

        for w in lists.iter_mut() {
            w.stocks = self.stocks_for(w.id).await?;
        }

        Ok(lists)
    }

    async fn details(&self, id: ObjectId) -> Result<Option<Watchlist>, String> {
        let found = self
            .watchlists()
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| e.to_string())?;

        let Some(mut watchlist) = found else {
            return Ok(None);
        };

        watchlist.stocks = self.stocks_for(id).await?;
        Ok(Some(watchlist))
    }

    async fn create(
        &self,
        name: &str,
        description: &str,
        is_default: bool,
    ) -> Result<Watchlist, String> {
        if is_default {
            self.watchlists()
                .update_many(
                    doc! { "is_default": true },
                    doc! { "$set": { "is_default": false } },
                    None,
                )
                .await
                .map_err(|e| e.to_string())?;
        }

        let watchlist = Watchlist::new(name, description, is_default);

        self.watchlists()
            .insert_one(&watchlist, None)
            .await
            .map_err(|e| e.to_string())?;

        Ok(watchlist)
    }

    async fn delete(&self, id: ObjectId) -> Result<bool, String> {
        let res = self
            .watchlists()
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| e.to_string())?;

        self.stocks()
            .delete_many(doc! { "watchlist_id": id }, None)
            .await
            .map_err(|e| e.to_string())?;

        Ok(res.deleted_count > 0)
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

        self.stocks()
            .insert_one(&entry, None)
            .await
            .map_err(|e| e.to_string())?;

        self.watchlists()
            .update_one(
                doc! { "_id": watchlist_id },
                doc! { "$set": { "updated_at": Utc::now().timestamp() } },
                None,
            )
            .await
            .map_err(|e| e.to_string())?;

        Ok(entry)
    }

    async fn update_stock(
        &self,
        stock_id: ObjectId,
        changes: StockUpdate,
    ) -> Result<bool, String> {
        let res = self
            .stocks()
            .update_one(
                doc! { "_id": stock_id },
                doc! { "$set": {
                    "target_price": changes.target_price,
                    "alert_price": changes.alert_price,
                    "is_alert_enabled": changes.is_alert_enabled,
                    "notes": changes.notes,
                } },
                None,
            )
            .await
            .map_err(|e| e.to_string())?;

        Ok(res.matched_count > 0)
    }

    async fn remove_stock(&self, stock_id: ObjectId) -> Result<bool, String> {
        let res = self
            .stocks()
            .delete_one(doc! { "_id": stock_id }, None)
            .await
            .map_err(|e| e.to_string())?;

        Ok(res.deleted_count > 0)
    }

    async fn write_prices(&self, quotes: &[Quote]) -> Result<u64, String> {
        let now = Utc::now().timestamp();
        let mut touched = 0u64;

        for q in quotes {
            let res = self
                .stocks()
                .update_many(
                    doc! { "symbol": &q.symbol },
                    doc! { "$set": {
                        "current_price": q.price,
                        "price_change": q.change,
                        "price_change_percent": q.change_percent,
                        "last_price_at": now,
                    } },
                    None,
                )
                .await
                .map_err(|e| e.to_string())?;

            touched += res.modified_count;
        }

        Ok(touched)
    }
}
