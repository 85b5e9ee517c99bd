//! Latest price bar as reported by the market-data feed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceBar {
    /// A bar whose close cannot be traded on (NaN, infinite, or non-positive).
    pub fn is_usable(&self) -> bool {
        self.close.is_finite() && self.close > 0.0
    }
}
