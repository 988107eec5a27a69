use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioItem {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub symbol: String,
    pub quantity: i64,
    pub avg_buy_price: f64,
    pub notes: String,

    pub created_at: i64,
}

impl PortfolioItem {
    pub fn new(symbol: &str, quantity: i64, avg_buy_price: f64, notes: &str) -> Self {
        Self {
            id: ObjectId::new(),
            symbol: symbol.to_uppercase(),
            quantity,
            avg_buy_price,
            notes: notes.to_string(),
            created_at: Utc::now().timestamp(),
        }
    }
}
