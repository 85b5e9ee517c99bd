//! Technical indicators driving the crossover strategy.
//!
//! - `sma`: simple moving average over the last n closes
//! - `rsi`: relative strength over a fixed trailing window
//! - `IndicatorPair`: short/long moving averages evaluated on one tick
//! - `Indicators`: everything computed for one tick

pub mod rsi;
pub mod sma;

pub use rsi::rsi;
pub use sma::moving_average;

use serde::{Deserialize, Serialize};

use crate::domain::strategy::StrategyConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPair {
    pub short_ma: f64,
    pub long_ma: f64,
}

impl IndicatorPair {
    pub fn new(short_ma: f64, long_ma: f64) -> Self {
        IndicatorPair { short_ma, long_ma }
    }

    pub fn short_above(&self) -> bool {
        self.short_ma > self.long_ma
    }

    pub fn short_below(&self) -> bool {
        self.short_ma < self.long_ma
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Indicators {
    pub pair: IndicatorPair,
    pub rsi: f64,
}

impl Indicators {
    pub fn compute(prices: &[f64], config: &StrategyConfig) -> Self {
        Indicators {
            pair: IndicatorPair::new(
                moving_average(prices, config.short_ma_period),
                moving_average(prices, config.long_ma_period),
            ),
            rsi: rsi(prices, config.rsi_period),
        }
    }

    pub fn is_bullish(&self) -> bool {
        self.rsi > 50.0
    }

    pub fn is_bearish(&self) -> bool {
        self.rsi < 50.0
    }
}
