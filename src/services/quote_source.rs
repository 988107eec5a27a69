use async_trait::async_trait;
use futures_util::future::join_all;

use crate::models::Quote;

/// A provider of current prices. Implementations normalize symbols and field
/// names at their own boundary; callers only ever see [`Quote`].
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn quote(&self, symbol: &str) -> Result<Quote, String>;

    /// Batch fetch. Default: one concurrent request per symbol, with failed
    /// symbols dropped so one bad fetch never blocks the rest.
    async fn quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, String> {
        let fetched = join_all(symbols.iter().map(|s| quote_or_none(self, s))).await;
        Ok(fetched.into_iter().flatten().collect())
    }
}

/// Failure-tolerant single fetch: errors are logged and collapse to `None`.
pub async fn quote_or_none<S>(source: &S, symbol: &str) -> Option<Quote>
where
    S: QuoteSource + ?Sized,
{
    match source.quote(symbol).await {
        Ok(q) => Some(q),
        Err(e) => {
            tracing::warn!("quote fetch failed for {}: {}", symbol, e);
            None
        }
    }
}
