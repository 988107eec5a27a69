use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::models::quote::normalize_symbol;
use crate::models::Quote;

use super::quote_source::QuoteSource;

// Fyers rejects quote requests above this many symbols.
const QUOTE_BATCH_LIMIT: usize = 50;

/// Fyers data-API client. Quotes come back keyed by the exchange-qualified
/// symbol (`NSE:TCS-EQ`) with broker field names (`lp`, `ch`, `chp`); both
/// are normalized here so nothing upstream sees provider formats.
#[derive(Clone)]
pub struct FyersClient {
    http: Client,
    base_url: String,
    app_id: String,
    access_token: String,
}

impl FyersClient {
    pub fn new(base_url: String, app_id: String, access_token: String) -> Self {
        Self {
            http: Client::new(),
            base_url,
            app_id,
            access_token,
        }
    }

    fn has_credentials(&self) -> bool {
        !self.app_id.trim().is_empty() && !self.access_token.trim().is_empty()
    }

    fn auth_header(&self) -> String {
        format!("{}:{}", self.app_id, self.access_token)
    }

    /// `TCS` -> `NSE:TCS-EQ`; already-qualified symbols pass through.
    fn format_symbol(symbol: &str) -> String {
        let sym = symbol.trim();
        if sym.contains(':') {
            sym.to_string()
        } else {
            format!("NSE:{}-EQ", sym.to_uppercase())
        }
    }

    async fn fetch_batch(&self, symbols: &[String]) -> Result<QuotesResponse, String> {
        if !self.has_credentials() {
            return Err("FYERS_APP_ID / FYERS_ACCESS_TOKEN is missing in .env".to_string());
        }

        let formatted: Vec<String> = symbols.iter().map(|s| Self::format_symbol(s)).collect();
        let url = format!("{}/data/quotes", self.base_url);

        let res = self
            .http
            .get(&url)
            .header("authorization", self.auth_header())
            .query(&[("symbols", formatted.join(","))])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("Fyers quotes failed: {status} {body}"));
        }

        res.json::<QuotesResponse>().await.map_err(|e| e.to_string())
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct QuotesResponse {
    pub s: String,

    #[serde(default)]
    pub d: Vec<QuoteEnvelope>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct QuoteEnvelope {
    // exchange-qualified symbol, e.g. "NSE:TCS-EQ"
    pub n: String,

    pub s: String,
    pub v: QuoteValues,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct QuoteValues {
    // last traded price
    pub lp: f64,

    // absolute change
    #[serde(default)]
    pub ch: f64,

    // percent change
    #[serde(default)]
    pub chp: f64,
}

impl QuoteEnvelope {
    fn to_quote(&self) -> Quote {
        Quote {
            symbol: normalize_symbol(&self.n),
            price: self.v.lp,
            change: self.v.ch,
            change_percent: self.v.chp,
        }
    }
}

#[async_trait]
impl QuoteSource for FyersClient {
    async fn quote(&self, symbol: &str) -> Result<Quote, String> {
        let resp = self.fetch_batch(&[symbol.to_string()]).await?;

        resp.d
            .iter()
            .find(|e| e.s == "ok")
            .map(|e| e.to_quote())
            .ok_or_else(|| format!("Fyers returned no quote for {symbol}"))
    }

    async fn quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, String> {
        let mut out = Vec::with_capacity(symbols.len());

        for chunk in symbols.chunks(QUOTE_BATCH_LIMIT) {
            match self.fetch_batch(chunk).await {
                Ok(resp) => {
                    out.extend(resp.d.iter().filter(|e| e.s == "ok").map(|e| e.to_quote()));
                }
                // one bad batch must not sink the rest
                Err(e) => tracing::warn!("Fyers batch failed: {}", e),
            }
        }

        Ok(out)
    }
}
