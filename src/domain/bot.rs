//! Concurrency guard around the engine.
//!
//! One `Mutex<Engine>` serializes ticks. After every mutation a fresh
//! snapshot is built under that lock and swapped into an `RwLock<Arc<_>>`,
//! so readers never wait on a tick in flight.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::domain::control::{BotControl, LogEntry};
use crate::domain::engine::{Engine, TickOutcome, TickPorts};
use crate::domain::error::BotError;
use crate::domain::indicator::IndicatorPair;
use crate::domain::position::PositionState;
use crate::domain::price_history::ChartData;
use crate::domain::reconcile::ReconcileOutcome;
use crate::ports::broker_port::{Account, OrderGateway, PriceFeed};
use crate::ports::notify_port::NotifyPort;
use crate::ports::state_port::StatePort;

/// Owned adapters the bot drives.
pub struct BotPorts {
    pub feed: Box<dyn PriceFeed + Send + Sync>,
    pub gateway: Box<dyn OrderGateway + Send + Sync>,
    pub store: Box<dyn StatePort + Send + Sync>,
    pub notifier: Box<dyn NotifyPort + Send + Sync>,
}

/// Read-only view of the bot published after each tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BotSnapshot {
    pub version: u64,
    pub symbol: String,
    pub position: PositionState,
    pub previous: IndicatorPair,
    pub history_len: usize,
    pub required_history: usize,
    pub chart: ChartData,
}

/// Equity plus unrealized P/L of the traded symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSummary {
    pub equity: f64,
    pub last_equity: f64,
    pub buying_power: f64,
    pub unrealized_pl: f64,
}

pub struct Bot {
    engine: Mutex<Engine>,
    ports: BotPorts,
    control: Arc<BotControl>,
    snapshot: RwLock<Arc<BotSnapshot>>,
    version: AtomicU64,
}

impl Bot {
    pub fn new(engine: Engine, ports: BotPorts) -> Self {
        let control = Arc::clone(engine.control());
        let initial = Arc::new(build_snapshot(&engine, 0));
        Bot {
            engine: Mutex::new(engine),
            ports,
            control,
            snapshot: RwLock::new(initial),
            version: AtomicU64::new(0),
        }
    }

    pub fn reconcile(&self) -> Result<ReconcileOutcome, BotError> {
        let mut engine = self.lock_engine();
        let outcome = engine.reconcile(self.ports.gateway.as_ref(), self.ports.store.as_ref());
        self.publish(&engine);
        outcome
    }

    /// Run one tick if the bot is running; `Ok(None)` when stopped.
    ///
    /// The running flag is read once up front, so a stop issued mid-tick
    /// takes effect on the next call.
    pub fn run_tick(&self) -> Result<Option<TickOutcome>, BotError> {
        if !self.control.is_running() {
            return Ok(None);
        }
        let mut engine = self.lock_engine();
        let ports = TickPorts {
            feed: self.ports.feed.as_ref(),
            gateway: self.ports.gateway.as_ref(),
            store: self.ports.store.as_ref(),
            notifier: self.ports.notifier.as_ref(),
        };
        let outcome = engine.tick(&ports);
        self.publish(&engine);
        outcome.map(Some)
    }

    pub fn start(&self) {
        self.control.start();
        self.control.append_log("Bot has been STARTED.");
    }

    pub fn stop(&self) {
        self.control.stop();
        self.control.append_log("Bot has been STOPPED.");
    }

    pub fn is_running(&self) -> bool {
        self.control.is_running()
    }

    pub fn status(&self) -> String {
        self.control.status()
    }

    pub fn activity(&self) -> Vec<LogEntry> {
        self.control.logs()
    }

    pub fn snapshot(&self) -> Arc<BotSnapshot> {
        Arc::clone(&self.snapshot.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Live account figures from the broker.
    ///
    /// Unrealized P/L is 0 while FLAT or when the broker has no position to
    /// report; only the account query itself can fail.
    pub fn account_summary(&self) -> Result<AccountSummary, BotError> {
        let Account {
            equity,
            last_equity,
            buying_power,
        } = self.ports.gateway.account()?;

        let snapshot = self.snapshot();
        let unrealized_pl = if snapshot.position.is_long() {
            match self.ports.gateway.position(&snapshot.symbol) {
                Ok(Some(p)) => p.unrealized_pl,
                Ok(None) => 0.0,
                Err(e) => {
                    tracing::warn!(error = %e, "position P/L unavailable");
                    0.0
                }
            }
        } else {
            0.0
        };

        Ok(AccountSummary {
            equity,
            last_equity,
            buying_power,
            unrealized_pl,
        })
    }

    fn lock_engine(&self) -> std::sync::MutexGuard<'_, Engine> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, engine: &Engine) {
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        let next = Arc::new(build_snapshot(engine, version));
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = next;
    }
}

fn build_snapshot(engine: &Engine, version: u64) -> BotSnapshot {
    let state = engine.state();
    let config = engine.config();
    BotSnapshot {
        version,
        symbol: config.symbol.clone(),
        position: state.position.clone(),
        previous: state.previous,
        history_len: state.history.len(),
        required_history: config.required_history(),
        chart: state.history.chart_data(),
    }
}
