use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Trigger direction relative to the target price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCondition {
    Above,
    Below,
}

impl AlertCondition {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "above" => Some(Self::Above),
            "below" => Some(Self::Below),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Above => "above",
            Self::Below => "below",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub symbol: String,
    pub condition: AlertCondition,
    pub target_price: f64,
    pub notes: String,

    pub created_at: i64,

    pub triggered: bool,
    pub triggered_at: Option<i64>,
}

impl Alert {
    pub fn new(symbol: &str, condition: AlertCondition, target_price: f64, notes: &str) -> Self {
        Self {
            id: ObjectId::new(),
            symbol: symbol.to_uppercase(),
            condition,
            target_price,
            notes: notes.to_string(),
            created_at: Utc::now().timestamp(),
            triggered: false,
            triggered_at: None,
        }
    }

    pub fn should_trigger(&self, price: f64) -> bool {
        match self.condition {
            AlertCondition::Above => price >= self.target_price,
            AlertCondition::Below => price <= self.target_price,
        }
    }
}
