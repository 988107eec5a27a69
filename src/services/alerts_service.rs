use async_trait::async_trait;
use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::FindOptions;
use mongodb::Database;

use crate::models::{Alert, AlertCondition};

/// Persistence seam for alert records. The engine only ever talks to this
/// trait, so tests can swap in in-memory stores and failure injectors.
#[async_trait]
pub trait AlertStore: Send + Sync {
    /// All alerts, newest first.
    async fn list(&self) -> Result<Vec<Alert>, String>;

    async fn insert(&self, alert: &Alert) -> Result<(), String>;

    async fn set_triggered(
        &self,
        id: ObjectId,
        triggered: bool,
        triggered_at: Option<i64>,
    ) -> Result<(), String>;

    async fn update_terms(
        &self,
        id: ObjectId,
        target_price: f64,
        condition: AlertCondition,
    ) -> Result<(), String>;

    async fn delete(&self, id: ObjectId) -> Result<bool, String>;
}

pub struct MongoAlertStore {
    db: Database,
}

impl MongoAlertStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn alerts(&self) -> mongodb::Collection<Alert> {
        self.db.collection::<Alert>("alerts")
    }
}

#[async_trait]
impl AlertStore for MongoAlertStore {
    async fn list(&self) -> Result<Vec<Alert>, String> {
        let find_opts = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();

        let mut cursor = self
            .alerts()
            .find(None, find_opts)
            .await
            .map_err(|e| e.to_string())?;

        let mut items: Vec<Alert> = Vec::new();
        while let Some(res) = cursor.next().await {
            items.push(res.map_err(|e| e.to_string())?);
        }

        Ok(items)
    }

    async fn insert(&self, alert: &Alert) -> Result<(), String> {
        self.alerts()
            .insert_one(alert, None)
            .await
            .map_err(|e| e.to_string())?;

        Ok(())
    }

    async fn set_triggered(
        &self,
        id: ObjectId,
        triggered: bool,
        triggered_at: Option<i64>,
    ) -> Result<(), String> {
        // the `triggered` filter keeps the flip idempotent per direction
        self.alerts()
            .update_one(
                doc! { "_id": id, "triggered": !triggered },
                doc! { "$set": { "triggered": triggered, "triggered_at": triggered_at } },
                None,
            )
            .await
            .map_err(|e| e.to_string())?;

        Ok(())
    }

    async fn update_terms(
        &self,
        id: ObjectId,
        target_price: f64,
        condition: AlertCondition,
    ) -> Result<(), String> {
        self.alerts()
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "target_price": target_price, "condition": condition.as_str() } },
                None,
            )
            .await
            .map_err(|e| e.to_string())?;

        Ok(())
    }

    async fn delete(&self, id: ObjectId) -> Result<bool, String> {
        let res = self
            .alerts()
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| e.to_string())?;

        Ok(res.deleted_count > 0)
    }
}
