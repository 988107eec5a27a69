use async_trait::async_trait;
use rand::Rng;

use crate::models::quote::normalize_symbol;
use crate::models::Quote;

use super::quote_source::QuoteSource;

/// Deterministic pseudo-quotes for running without broker credentials: every
/// symbol hashes to a stable base in [100, 1000) and each read jitters within
/// +/-5% of that base. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockQuoteSource;

impl MockQuoteSource {
    pub fn new() -> Self {
        Self
    }

    pub fn base_price(symbol: &str) -> f64 {
        100.0 + (hash_code(symbol).unsigned_abs() % 900) as f64
    }
}

fn hash_code(s: &str) -> i32 {
    let mut h: i32 = 0;
    for c in s.chars() {
        h = h.wrapping_shl(5).wrapping_sub(h).wrapping_add(c as i32);
    }
    h
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[async_trait]
impl QuoteSource for MockQuoteSource {
    async fn quote(&self, symbol: &str) -> Result<Quote, String> {
        let symbol = normalize_symbol(symbol);
        let base = Self::base_price(&symbol);

        let factor: f64 = rand::thread_rng().gen_range(0.95..1.05);
        let price = round2(base * factor);
        let change = round2(price - base);
        let change_percent = round2(change / base * 100.0);

        Ok(Quote {
            symbol,
            price,
            change,
            change_percent,
        })
    }
}
