//! Order execution against the broker gateway.
//!
//! Orders are submitted before any state changes, so a rejected order leaves
//! the position untouched and the same decision is simply re-evaluated next
//! tick. Nothing here retries.

use crate::domain::position::PositionState;
use crate::domain::strategy::StrategyConfig;
use crate::ports::broker_port::{OrderGateway, OrderRequest};

/// Result of a buy attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum BuyOutcome {
    Placed { notional: f64 },
    BelowMinimum { notional: f64 },
    AccountUnavailable { reason: String },
    Rejected { reason: String },
}

/// Result of a sell attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SellOutcome {
    Closed { qty: f64 },
    /// Broker holds nothing; state was forced FLAT without an order.
    NoBrokerPosition,
    PositionUnavailable { reason: String },
    Rejected { reason: String },
}

/// Buy `risk_fraction` of account equity at market.
///
/// Steps:
/// 1. Fetch account equity
/// 2. notional = equity * risk_fraction
/// 3. Below `min_notional` → abort
/// 4. Submit market buy sized by notional
/// 5. On acceptance, position enters LONG at `price`
pub fn buy(
    position: &mut PositionState,
    gateway: &dyn OrderGateway,
    config: &StrategyConfig,
    price: f64,
) -> BuyOutcome {
    let account = match gateway.account() {
        Ok(a) => a,
        Err(e) => {
            tracing::warn!(error = %e, "account unavailable, skipping buy");
            return BuyOutcome::AccountUnavailable {
                reason: e.to_string(),
            };
        }
    };

    let notional = account.equity * config.risk_fraction;
    if !(notional >= config.min_notional) {
        tracing::info!(notional, min = config.min_notional, "notional below minimum");
        return BuyOutcome::BelowMinimum { notional };
    }

    let order = OrderRequest::market_buy_notional(&config.symbol, notional, config.time_in_force);
    if let Err(e) = gateway.submit_order(&order) {
        tracing::error!(error = %e, "buy order failed");
        return BuyOutcome::Rejected {
            reason: e.to_string(),
        };
    }

    position.enter_long(price);
    tracing::info!(symbol = %config.symbol, notional, price, "buy order placed");
    BuyOutcome::Placed { notional }
}

/// Close the whole broker-reported position at market.
///
/// The locally cached state never sizes the sell; only the broker's reported
/// quantity does. A missing broker position flattens the local state directly.
pub fn sell(
    position: &mut PositionState,
    gateway: &dyn OrderGateway,
    config: &StrategyConfig,
) -> SellOutcome {
    let broker_position = match gateway.position(&config.symbol) {
        Ok(Some(p)) => p,
        Ok(None) => {
            tracing::warn!(symbol = %config.symbol, "no broker position, resetting to flat");
            position.reset_flat();
            return SellOutcome::NoBrokerPosition;
        }
        Err(e) => {
            tracing::warn!(error = %e, "position unavailable, staying long");
            return SellOutcome::PositionUnavailable {
                reason: e.to_string(),
            };
        }
    };

    let order =
        OrderRequest::market_sell_qty(&config.symbol, broker_position.qty, config.time_in_force);
    if let Err(e) = gateway.submit_order(&order) {
        tracing::error!(error = %e, "sell order failed, staying long");
        return SellOutcome::Rejected {
            reason: e.to_string(),
        };
    }

    position.reset_flat();
    tracing::info!(symbol = %config.symbol, qty = broker_position.qty, "sell order placed");
    SellOutcome::Closed {
        qty: broker_position.qty,
    }
}
