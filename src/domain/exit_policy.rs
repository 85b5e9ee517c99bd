//! Exit rules, evaluated only while LONG.
//!
//! Strict priority, first match wins:
//! 1. take-profit (if enabled)
//! 2. trailing stop (if enabled)
//! 3. fixed stop-loss
//! 4. downward crossover confirmed by RSI below 50
//!
//! The running peak must already include the current price; the orchestrator
//! calls `PositionState::observe_price` before evaluating.

use std::fmt;

use crate::domain::crossover::{self, Crossover};
use crate::domain::indicator::{IndicatorPair, Indicators};
use crate::domain::position::PositionState;
use crate::domain::strategy::StrategyConfig;

/// Absolute tolerance on price thresholds.
const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    TakeProfit,
    TrailingStop,
    StopLoss,
    SignalCrossover,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::TakeProfit => write!(f, "Take-profit"),
            ExitReason::TrailingStop => write!(f, "Trailing stop"),
            ExitReason::StopLoss => write!(f, "Stop-loss"),
            ExitReason::SignalCrossover => write!(f, "MA crossover with bearish RSI"),
        }
    }
}

pub fn take_profit_price(position: &PositionState, config: &StrategyConfig) -> f64 {
    position.purchase_price * (1.0 + config.take_profit_pct)
}

pub fn trailing_stop_price(position: &PositionState, config: &StrategyConfig) -> f64 {
    position.highest_price_since_buy * (1.0 - config.trailing_stop_pct)
}

pub fn stop_loss_price(position: &PositionState, config: &StrategyConfig) -> f64 {
    position.purchase_price * (1.0 - config.stop_loss_pct)
}

pub fn evaluate(
    position: &PositionState,
    price: f64,
    previous: &IndicatorPair,
    current: &Indicators,
    config: &StrategyConfig,
) -> Option<ExitReason> {
    if !position.is_long() {
        return None;
    }

    if config.take_profit_enabled && price >= take_profit_price(position, config) - EPSILON {
        return Some(ExitReason::TakeProfit);
    }

    if config.trailing_stop_enabled && price <= trailing_stop_price(position, config) + EPSILON {
        return Some(ExitReason::TrailingStop);
    }

    if price <= stop_loss_price(position, config) + EPSILON {
        return Some(ExitReason::StopLoss);
    }

    if crossover::detect(previous, &current.pair) == Crossover::Down && current.is_bearish() {
        return Some(ExitReason::SignalCrossover);
    }

    None
}
