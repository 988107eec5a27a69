use futures_util::future::join_all;
use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::FindOptions;

use crate::models::WatchItem;
use crate::services::quote_source::quote_or_none;
use crate::AppState;

/// A watch item as served to clients, with its price freshly derived from
/// the quote source (never persisted).
#[derive(Debug, Clone)]
pub struct WatchItemView {
    pub id: String,
    pub symbol: String,
    pub notes: String,
    pub current_price: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
}

pub async fn list_items(state: &AppState) -> Result<Vec<WatchItem>, String> {
    let items = state.db.collection::<WatchItem>("watch_items");

    let find_opts = FindOptions::builder()
        .sort(doc! { "created_at": -1 })
        .build();

    let mut cursor = items
        .find(None, find_opts)
        .await
        .map_err(|e| e.to_string())?;

    let mut out: Vec<WatchItem> = Vec::new();
    while let Some(res) = cursor.next().await {
        out.push(res.map_err(|e| e.to_string())?);
    }

    Ok(out)
}

pub async fn list_item_views(state: &AppState) -> Result<Vec<WatchItemView>, String> {
    let items = list_items(state).await?;

    let views = join_all(items.into_iter().map(|it| async move {
        let quote = quote_or_none(state.quotes.as_ref(), &it.symbol).await;

        WatchItemView {
            id: it.id.to_hex(),
            symbol: it.symbol,
            notes: it.notes,
            current_price: quote.as_ref().map(|q| q.price),
            change: quote.as_ref().map(|q| q.change),
            change_percent: quote.as_ref().map(|q| q.change_percent),
        }
    }))
    .await;

    Ok(views)
}

/// Returns `None` when the symbol is already tracked (no duplicate rows).
pub async fn add_item(
    state: &AppState,
    symbol: &str,
    notes: &str,
) -> Result<Option<WatchItem>, String> {
    let sym = symbol.trim().to_uppercase();
    let items = state.db.collection::<WatchItem>("watch_items");

    let existing = items
        .find_one(doc! { "symbol": &sym }, None)
        .await
        .map_err(|e| e.to_string())?;

    if existing.is_some() {
        return Ok(None);
    }

    let item = WatchItem::new(&sym, notes);

    items
        .insert_one(&item, None)
        .await
        .map_err(|e| e.to_string())?;

    Ok(Some(item))
}

pub async fn remove_item(state: &AppState, id: ObjectId) -> Result<bool, String> {
    let items = state.db.collection::<WatchItem>("watch_items");

    let res = items
        .delete_one(doc! { "_id": id }, None)
        .await
        .map_err(|e| e.to_string())?;

    Ok(res.deleted_count > 0)
}
