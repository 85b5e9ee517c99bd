//! Strategy configuration, immutable for the lifetime of a run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeInForce {
    Gtc,
    Day,
    Ioc,
    Fok,
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeInForce::Gtc => write!(f, "gtc"),
            TimeInForce::Day => write!(f, "day"),
            TimeInForce::Ioc => write!(f, "ioc"),
            TimeInForce::Fok => write!(f, "fok"),
        }
    }
}

impl FromStr for TimeInForce {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gtc" => Ok(TimeInForce::Gtc),
            "day" => Ok(TimeInForce::Day),
            "ioc" => Ok(TimeInForce::Ioc),
            "fok" => Ok(TimeInForce::Fok),
            other => Err(format!("unknown time in force '{other}'")),
        }
    }
}

/// Percentages are fractions: `0.05` means 5%.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub symbol: String,
    pub short_ma_period: usize,
    pub long_ma_period: usize,
    pub rsi_period: usize,
    pub risk_fraction: f64,
    pub stop_loss_pct: f64,
    pub take_profit_enabled: bool,
    pub take_profit_pct: f64,
    pub trailing_stop_enabled: bool,
    pub trailing_stop_pct: f64,
    pub min_notional: f64,
    pub history_slack: usize,
    pub time_in_force: TimeInForce,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            symbol: "BTC/USD".into(),
            short_ma_period: 10,
            long_ma_period: 30,
            rsi_period: 14,
            risk_fraction: 0.1,
            stop_loss_pct: 0.05,
            take_profit_enabled: false,
            take_profit_pct: 0.0,
            trailing_stop_enabled: false,
            trailing_stop_pct: 0.0,
            min_notional: 1.0,
            history_slack: 100,
            time_in_force: TimeInForce::Gtc,
        }
    }
}

impl StrategyConfig {
    /// Upper bound on retained price history.
    pub fn max_history(&self) -> usize {
        self.long_ma_period.max(self.rsi_period) + self.history_slack
    }

    /// Samples needed before any entry or exit rule may run.
    ///
    /// RSI needs `rsi_period + 1` closes; the long SMA needs `long_ma_period`
    /// so its zero sentinel never reaches a decision.
    pub fn required_history(&self) -> usize {
        (self.rsi_period + 1).max(self.long_ma_period)
    }
}
