use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A point-in-time price observation, normalized at the provider boundary.
/// Internal code never sees broker field names or exchange-qualified symbols.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
}

/// Strips exchange qualifiers from a broker symbol: `NSE:TCS-EQ` -> `TCS`.
pub fn normalize_symbol(raw: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^(?:NSE|BSE):|-EQ$").expect("symbol pattern")
    });
    re.replace_all(raw.trim(), "").to_uppercase()
}
