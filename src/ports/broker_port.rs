//! Broker and market-data port traits.
//!
//! The engine only ever talks to a broker through these two traits, so a new
//! broker client means a new adapter and nothing else.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::bar::PriceBar;
use crate::domain::error::BotError;
use crate::domain::strategy::TimeInForce;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub equity: f64,
    pub last_equity: f64,
    pub buying_power: f64,
}

/// Open position as reported by the broker; the broker's quantity is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrokerPosition {
    pub qty: f64,
    pub avg_entry_price: f64,
    pub unrealized_pl: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "buy"),
            OrderSide::Sell => write!(f, "sell"),
        }
    }
}

/// Market orders are sized either by dollar amount or by unit quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrderAmount {
    Notional(f64),
    Qty(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub amount: OrderAmount,
    pub time_in_force: TimeInForce,
}

impl OrderRequest {
    pub fn market_buy_notional(symbol: &str, notional: f64, tif: TimeInForce) -> Self {
        OrderRequest {
            symbol: symbol.to_string(),
            side: OrderSide::Buy,
            amount: OrderAmount::Notional(notional),
            time_in_force: tif,
        }
    }

    pub fn market_sell_qty(symbol: &str, qty: f64, tif: TimeInForce) -> Self {
        OrderRequest {
            symbol: symbol.to_string(),
            side: OrderSide::Sell,
            amount: OrderAmount::Qty(qty),
            time_in_force: tif,
        }
    }
}

pub trait PriceFeed {
    fn latest_bar(&self, symbol: &str) -> Result<PriceBar, BotError>;
}

pub trait OrderGateway {
    fn account(&self) -> Result<Account, BotError>;

    /// `Ok(None)` when the broker holds no open position for `symbol`.
    fn position(&self, symbol: &str) -> Result<Option<BrokerPosition>, BotError>;

    /// Fire-and-forget: acceptance is all the engine waits for.
    fn submit_order(&self, order: &OrderRequest) -> Result<(), BotError>;
}
