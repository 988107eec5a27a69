use futures_util::future::join_all;
use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::FindOptions;

use crate::models::PortfolioItem;
use crate::services::quote_source::quote_or_none;
use crate::AppState;

#[derive(Debug, Clone)]
pub struct HoldingView {
    pub id: String,
    pub symbol: String,
    pub quantity: i64,
    pub avg_buy_price: f64,
    pub current_price: f64,
    pub pnl: f64,
    pub pnl_pct: f64,
    pub notes: String,
}

pub async fn list_items(state: &AppState) -> Result<Vec<PortfolioItem>, String> {
    let items = state.db.collection::<PortfolioItem>("portfolio_items");

    let find_opts = FindOptions::builder()
        .sort(doc! { "created_at": -1 })
        .build();

    let mut cursor = items
        .find(None, find_opts)
        .await
        .map_err(|e| e.to_string())?;

    let mut out: Vec<PortfolioItem> = Vec::new();
    while let Some(res) = cursor.next().await {
        out.push(res.map_err(|e| e.to_string())?);
    }

    Ok(out)
}

/// Holdings enriched with live prices and PnL. Quotes are fetched
/// concurrently; a symbol whose quote fails shows a zero price rather than
/// sinking the whole listing.
pub async fn list_holding_views(state: &AppState) -> Result<Vec<HoldingView>, String> {
    let items = list_items(state).await?;

    let views = join_all(items.into_iter().map(|p| async move {
        let last = quote_or_none(state.quotes.as_ref(), &p.symbol)
            .await
            .map(|q| q.price)
            .unwrap_or(0.0);

        let pnl = (last - p.avg_buy_price) * (p.quantity as f64);
        let pnl_pct = if p.avg_buy_price > 0.0 {
            ((last - p.avg_buy_price) / p.avg_buy_price) * 100.0
        } else {
            0.0
        };

        HoldingView {
            id: p.id.to_hex(),
            symbol: p.symbol,
            quantity: p.quantity,
            avg_buy_price: p.avg_buy_price,
            current_price: last,
            pnl,
            pnl_pct,
            notes: p.notes,
        }
    }))
    .await;

    Ok(views)
}

pub async fn add_item(
    state: &AppState,
    symbol: &str,
    quantity: i64,
    avg_buy_price: f64,
    notes: &str,
) -> Result<PortfolioItem, String> {
    let item = PortfolioItem::new(symbol.trim(), quantity, avg_buy_price, notes);

    state
        .db
        .collection::<PortfolioItem>("portfolio_items")
        .insert_one(&item, None)
        .await
        .map_err(|e| e.to_string())?;

    Ok(item)
}

pub async fn update_item(
    state: &AppState,
    id: ObjectId,
    quantity: i64,
    avg_buy_price: f64,
    notes: &str,
) -> Result<bool, String> {
    let res = state
        .db
        .collection::<PortfolioItem>("portfolio_items")
        .update_one(
            doc! { "_id": id },
            doc! { "$set": {
                "quantity": quantity,
                "avg_buy_price": avg_buy_price,
                "notes": notes,
            } },
            None,
        )
        .await
        .map_err(|e| e.to_string())?;

    Ok(res.matched_count > 0)
}

pub async fn remove_item(state: &AppState, id: ObjectId) -> Result<bool, String> {
    let res = state
        .db
        .collection::<PortfolioItem>("portfolio_items")
        .delete_one(doc! { "_id": id }, None)
        .await
        .map_err(|e| e.to_string())?;

    Ok(res.deleted_count > 0)
}
