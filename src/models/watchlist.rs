use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A named, server-tracked collection of stock rows. The `stocks` field is
/// assembled from its own collection on read and never persisted inline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Watchlist {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub name: String,
    pub description: String,
    pub is_default: bool,

    pub created_at: i64,
    pub updated_at: i64,

    #[serde(skip)]
    pub stocks: Vec<StockEntry>,
}

impl Watchlist {
    pub fn new(name: &str, description: &str, is_default: bool) -> Self {
        let now = Utc::now().timestamp();
        Self {
            id: ObjectId::new(),
            name: name.to_string(),
            description: description.to_string(),
            is_default,
            created_at: now,
            updated_at: now,
            stocks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockEntry {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub watchlist_id: ObjectId,
    pub symbol: String,
    pub exchange: String,

    pub target_price: Option<f64>,
    pub alert_price: Option<f64>,
    pub is_alert_enabled: bool,
    pub notes: String,

    // refreshed by price syncs, stale between them
    pub current_price: Option<f64>,
    pub price_change: Option<f64>,
    pub price_change_percent: Option<f64>,
    pub last_price_at: Option<i64>,

    pub created_at: i64,
}

impl StockEntry {
    pub fn new(
        watchlist_id: ObjectId,
        symbol: &str,
        exchange: &str,
        target_price: Option<f64>,
        alert_price: Option<f64>,
        notes: &str,
    ) -> Self {
        Self {
            id: ObjectId::new(),
            watchlist_id,
            symbol: symbol.to_uppercase(),
            exchange: exchange.to_uppercase(),
            target_price,
            alert_price,
            is_alert_enabled: alert_price.is_some(),
            notes: notes.to_string(),
            current_price: None,
            price_change: None,
            price_change_percent: None,
            last_price_at: None,
            created_at: Utc::now().timestamp(),
        }
    }
}
