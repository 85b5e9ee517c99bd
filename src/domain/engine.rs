//! One tick of the strategy: fetch, record, evaluate, act, persist.
//!
//! `Engine` owns the bot state outright. Exclusive access is enforced by the
//! caller (see `domain::bot`), so nothing in here locks.

use std::sync::Arc;

use crate::domain::control::BotControl;
use crate::domain::entry_policy;
use crate::domain::error::BotError;
use crate::domain::execution::{self, BuyOutcome, SellOutcome};
use crate::domain::exit_policy::{self, ExitReason};
use crate::domain::indicator::Indicators;
use crate::domain::reconcile::{self, ReconcileOutcome};
use crate::domain::state::BotState;
use crate::domain::strategy::StrategyConfig;
use crate::ports::broker_port::{OrderGateway, PriceFeed};
use crate::ports::notify_port::NotifyPort;
use crate::ports::state_port::StatePort;

pub const DATA_UNAVAILABLE_STATUS: &str = "Could not fetch price data...";

/// Collaborators a tick needs, borrowed for its duration.
#[derive(Clone, Copy)]
pub struct TickPorts<'a> {
    pub feed: &'a dyn PriceFeed,
    pub gateway: &'a dyn OrderGateway,
    pub store: &'a dyn StatePort,
    pub notifier: &'a dyn NotifyPort,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    DataUnavailable,
    GatheringData { have: usize, required: usize },
    Entered(BuyOutcome),
    Exited { reason: ExitReason, outcome: SellOutcome },
    NoSignal,
}

pub struct Engine {
    config: Arc<StrategyConfig>,
    state: BotState,
    control: Arc<BotControl>,
}

impl Engine {
    pub fn new(config: Arc<StrategyConfig>, state: BotState, control: Arc<BotControl>) -> Self {
        Engine {
            config,
            state,
            control,
        }
    }

    /// Load persisted state, or start empty when none exists.
    pub fn restore(
        config: Arc<StrategyConfig>,
        store: &dyn StatePort,
        control: Arc<BotControl>,
    ) -> Result<Self, BotError> {
        let mut state = match store.load()? {
            Some(state) => {
                tracing::info!(
                    in_position = state.position.in_position,
                    history = state.history.len(),
                    "restored persisted state"
                );
                state
            }
            None => {
                tracing::info!("no persisted state, starting fresh");
                BotState::default()
            }
        };
        state.history.trim(config.max_history());
        Ok(Engine::new(config, state, control))
    }

    /// Adopt the broker's view of the position and persist the result.
    pub fn reconcile(
        &mut self,
        gateway: &dyn OrderGateway,
        store: &dyn StatePort,
    ) -> Result<ReconcileOutcome, BotError> {
        let outcome = reconcile::reconcile(&mut self.state.position, gateway, &self.config.symbol);
        match &outcome {
            ReconcileOutcome::Adopted {
                qty,
                avg_entry_price,
            } => self.control.append_log(format!(
                "Synced with broker: holding {qty} {} at avg entry ${avg_entry_price:.2}.",
                self.config.symbol
            )),
            ReconcileOutcome::Flattened => self.control.append_log(format!(
                "Synced with broker: no open {} position.",
                self.config.symbol
            )),
            ReconcileOutcome::Unavailable { reason } => self
                .control
                .append_log(format!("Could not sync position with broker: {reason}")),
        }
        store.save(&self.state)?;
        Ok(outcome)
    }

    pub fn tick(&mut self, ports: &TickPorts<'_>) -> Result<TickOutcome, BotError> {
        let config = Arc::clone(&self.config);

        let bar = match ports.feed.latest_bar(&config.symbol) {
            Ok(bar) if bar.is_usable() => bar,
            Ok(bar) => {
                tracing::warn!(close = bar.close, "unusable bar, skipping tick");
                self.control.set_status(DATA_UNAVAILABLE_STATUS);
                return Ok(TickOutcome::DataUnavailable);
            }
            Err(e) => {
                tracing::warn!(error = %e, "price fetch failed, skipping tick");
                self.control.set_status(DATA_UNAVAILABLE_STATUS);
                return Ok(TickOutcome::DataUnavailable);
            }
        };
        let price = bar.close;
        let bound = config.max_history();

        self.state.position.last_known_price = price;
        self.state.history.push(price, bound);

        let required = config.required_history();
        let have = self.state.history.len();
        if have < required {
            self.control
                .set_status(format!("Gathering Price Data ({have}/{required})"));
            ports.store.save(&self.state)?;
            return Ok(TickOutcome::GatheringData { have, required });
        }

        let current = Indicators::compute(self.state.history.prices(), &config);
        self.state.position.last_known_rsi = current.rsi;
        self.state.history.record_pair(current.pair, bound);
        self.control
            .set_status(format!("Monitoring | RSI: {:.2}", current.rsi));
        tracing::debug!(
            price,
            short_ma = current.pair.short_ma,
            long_ma = current.pair.long_ma,
            rsi = current.rsi,
            "indicators"
        );

        let outcome = if self.state.position.is_long() {
            self.state.position.observe_price(price);
            match exit_policy::evaluate(
                &self.state.position,
                price,
                &self.state.previous,
                &current,
                &config,
            ) {
                Some(reason) => {
                    let outcome = self.exit(reason, price, ports);
                    TickOutcome::Exited { reason, outcome }
                }
                None => TickOutcome::NoSignal,
            }
        } else if entry_policy::should_enter(&self.state.position, &self.state.previous, &current)
        {
            // On the first evaluated tick `previous` is still the (0, 0) tie,
            // so any short > long with bullish RSI counts as a fresh cross.
            TickOutcome::Entered(self.enter(price, ports))
        } else {
            TickOutcome::NoSignal
        };

        self.state.previous = current.pair;
        ports.store.save(&self.state)?;
        Ok(outcome)
    }

    fn enter(&mut self, price: f64, ports: &TickPorts<'_>) -> BuyOutcome {
        let config = &self.config;
        let outcome = execution::buy(&mut self.state.position, ports.gateway, config, price);
        match &outcome {
            BuyOutcome::Placed { notional } => {
                let message = format!(
                    "MA crossover with bullish RSI. BUY order placed for ${notional:.2} of {} at price ${price:.2}",
                    config.symbol
                );
                self.control.append_log(message.clone());
                notify(ports.notifier, "Trading Bot: BUY Order Executed", &message);
            }
            BuyOutcome::BelowMinimum { notional } => self.control.append_log(format!(
                "Insufficient funds to place buy order. Required >= ${:.2}, but calculated notional is only ${notional:.2}",
                config.min_notional
            )),
            BuyOutcome::AccountUnavailable { .. } => self
                .control
                .append_log("Could not fetch account equity. Skipping buy order."),
            BuyOutcome::Rejected { reason } => self
                .control
                .append_log(format!("Error placing BUY order: {reason}")),
        }
        outcome
    }

    fn exit(&mut self, reason: ExitReason, price: f64, ports: &TickPorts<'_>) -> SellOutcome {
        let config = &self.config;
        let trigger = format!(
            "{reason} triggered for {} at ${price:.2}. Placing SELL order.",
            config.symbol
        );
        self.control.append_log(trigger.clone());
        notify(ports.notifier, "Trading Bot: Trade Executed", &trigger);

        let outcome = execution::sell(&mut self.state.position, ports.gateway, config);
        match &outcome {
            SellOutcome::Closed { qty } => {
                let message = format!("SELL order placed for {qty} {} to close position.", config.symbol);
                self.control.append_log(message.clone());
                notify(ports.notifier, "Trading Bot: SELL Order Executed", &message);
            }
            SellOutcome::NoBrokerPosition => self
                .control
                .append_log("SELL signal, but no position found at broker. Resetting state."),
            SellOutcome::PositionUnavailable { reason } | SellOutcome::Rejected { reason } => self
                .control
                .append_log(format!("Error placing SELL order: {reason}")),
        }
        outcome
    }

    pub fn state(&self) -> &BotState {
        &self.state
    }

    pub fn config(&self) -> &Arc<StrategyConfig> {
        &self.config
    }

    pub fn control(&self) -> &Arc<BotControl> {
        &self.control
    }
}

/// Best-effort delivery; failures are logged and dropped.
fn notify(notifier: &dyn NotifyPort, subject: &str, body: &str) {
    if let Err(e) = notifier.notify(subject, body) {
        tracing::warn!(error = %e, subject, "notification failed");
    }
}
