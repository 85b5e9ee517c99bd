//! Bounded price history plus the moving-average series used for charting.

use serde::{Deserialize, Serialize};

use crate::domain::indicator::IndicatorPair;

/// Number of trailing points exposed as chart data.
pub const CHART_POINTS: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    prices: Vec<f64>,
    ma_history: Vec<IndicatorPair>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub prices: Vec<f64>,
    pub short_mas: Vec<f64>,
    pub long_mas: Vec<f64>,
}

impl PriceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(prices: Vec<f64>, ma_history: Vec<IndicatorPair>) -> Self {
        PriceHistory { prices, ma_history }
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn ma_history(&self) -> &[IndicatorPair] {
        &self.ma_history
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Append a close and drop the oldest samples beyond `bound`.
    pub fn push(&mut self, close: f64, bound: usize) {
        self.prices.push(close);
        trim_front(&mut self.prices, bound);
    }

    /// Record the moving averages evaluated this tick.
    pub fn record_pair(&mut self, pair: IndicatorPair, bound: usize) {
        self.ma_history.push(pair);
        trim_front(&mut self.ma_history, bound);
    }

    /// Re-apply `bound`, e.g. after restoring history persisted under a larger config.
    pub fn trim(&mut self, bound: usize) {
        trim_front(&mut self.prices, bound);
        trim_front(&mut self.ma_history, bound);
    }

    pub fn chart_data(&self) -> ChartData {
        let prices = tail(&self.prices, CHART_POINTS).to_vec();
        let pairs = tail(&self.ma_history, CHART_POINTS);
        ChartData {
            prices,
            short_mas: pairs.iter().map(|p| p.short_ma).collect(),
            long_mas: pairs.iter().map(|p| p.long_ma).collect(),
        }
    }
}

fn trim_front<T>(values: &mut Vec<T>, bound: usize) {
    if values.len() > bound {
        let excess = values.len() - bound;
        values.drain(..excess);
    }
}

fn tail<T>(values: &[T], n: usize) -> &[T] {
    &values[values.len().saturating_sub(n)..]
}
