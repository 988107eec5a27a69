use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One row of the simple tracked-symbol list. Its current price is derived
/// from the quote source on every read and never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchItem {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub symbol: String,
    pub notes: String,

    pub created_at: i64,
}

impl WatchItem {
    pub fn new(symbol: &str, notes: &str) -> Self {
        Self {
            id: ObjectId::new(),
            symbol: symbol.to_uppercase(),
            notes: notes.to_string(),
            created_at: Utc::now().timestamp(),
        }
    }
}
