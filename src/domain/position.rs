//! Position state for the single traded symbol.
//!
//! Two states only: FLAT (`in_position == false`) and LONG. While LONG,
//! `highest_price_since_buy >= purchase_price`; every FLAT transition zeroes
//! both prices together.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionState {
    pub in_position: bool,
    pub purchase_price: f64,
    pub highest_price_since_buy: f64,
    pub last_known_price: f64,
    pub last_known_rsi: f64,
}

impl PositionState {
    pub fn is_long(&self) -> bool {
        self.in_position
    }

    pub fn is_flat(&self) -> bool {
        !self.in_position
    }

    /// FLAT → LONG after an accepted buy.
    pub fn enter_long(&mut self, price: f64) {
        self.in_position = true;
        self.purchase_price = price;
        self.highest_price_since_buy = price;
    }

    /// Adopt the broker's entry price, discarding any locally tracked peak.
    pub fn adopt_broker_entry(&mut self, avg_entry_price: f64) {
        self.enter_long(avg_entry_price);
    }

    /// Any → FLAT.
    pub fn reset_flat(&mut self) {
        self.in_position = false;
        self.purchase_price = 0.0;
        self.highest_price_since_buy = 0.0;
    }

    /// Ratchet the running peak; only meaningful while LONG.
    pub fn observe_price(&mut self, price: f64) {
        if self.in_position {
            self.highest_price_since_buy = self.highest_price_since_buy.max(price);
        }
    }
}
