use mongodb::{
    bson::doc,
    options::IndexOptions,
    Database, IndexModel,
};

pub async fn ensure_indexes(db: &Database) -> Result<(), String> {
    // alerts: poll-cycle scan (triggered + symbol)
    {
        let col = db.collection::<mongodb::bson::Document>("alerts");
        let model = IndexModel::builder()
            .keys(doc! { "triggered": 1, "symbol": 1 })
            .build();

        col.create_index(model, None)
            .await
            .map_err(|e| e.to_string())?;
    }

    // watch_items: one row per symbol
    {
        let col = db.collection::<mongodb::bson::Document>("watch_items");
        let model = IndexModel::builder()
            .keys(doc! { "symbol": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        col.create_index(model, None)
            .await
            .map_err(|e| e.to_string())?;
    }

    // portfolio_items: newest-first listing
    {
        let col = db.collection::<mongodb::bson::Document>("portfolio_items");
        let model = IndexModel::builder()
            .keys(doc! { "created_at": -1 })
            .build();

        col.create_index(model, None)
            .await
            .map_err(|e| e.to_string())?;
    }

    // watchlist_stocks: per-watchlist listing and price writes by symbol
    {
        let col = db.collection::<mongodb::bson::Document>("watchlist_stocks");

        let by_watchlist = IndexModel::builder()
            .keys(doc! { "watchlist_id": 1, "created_at": -1 })
            .build();
        col.create_index(by_watchlist, None)
            .await
            .map_err(|e| e.to_string())?;

        let by_symbol = IndexModel::builder().keys(doc! { "symbol": 1 }).build();
        let _ = col.create_index(by_symbol, None).await;
    }

    // watchlists: default lookup
    {
        let col = db.collection::<mongodb::bson::Document>("watchlists");
        let model = IndexModel::builder().keys(doc! { "is_default": 1 }).build();

        let _ = col.create_index(model, None).await;
    }

    Ok(())
}
