#![allow(dead_code)]

use crossbot::domain::bar::PriceBar;
use crossbot::domain::bot::{Bot, BotPorts};
use crossbot::domain::control::BotControl;
use crossbot::domain::engine::{Engine, TickPorts};
use crossbot::domain::error::BotError;
use crossbot::domain::state::BotState;
use crossbot::domain::strategy::StrategyConfig;
use crossbot::ports::broker_port::{
    Account, BrokerPosition, OrderGateway, OrderRequest, PriceFeed,
};
use crossbot::ports::notify_port::NotifyPort;
use crossbot::ports::state_port::StatePort;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Scripted closes, served in order. Clones share the script.
#[derive(Clone, Default)]
pub struct MockPriceFeed {
    script: Arc<Mutex<VecDeque<Result<f64, String>>>>,
    calls: Arc<Mutex<usize>>,
}

impl MockPriceFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prices(self, prices: impl IntoIterator<Item = f64>) -> Self {
        self.script
            .lock()
            .unwrap()
            .extend(prices.into_iter().map(Ok));
        self
    }

    pub fn with_failure(self, reason: &str) -> Self {
        self.script.lock().unwrap().push_back(Err(reason.to_string()));
        self
    }

    pub fn push_price(&self, price: f64) {
        self.script.lock().unwrap().push_back(Ok(price));
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

impl PriceFeed for MockPriceFeed {
    fn latest_bar(&self, _symbol: &str) -> Result<PriceBar, BotError> {
        *self.calls.lock().unwrap() += 1;
        match self.script.lock().unwrap().pop_front() {
            Some(Ok(close)) => Ok(PriceBar {
                open: close,
                high: close,
                low: close,
                close,
            }),
            Some(Err(reason)) => Err(BotError::fetch("latest bar", reason)),
            None => Err(BotError::fetch("latest bar", "script exhausted")),
        }
    }
}

#[derive(Debug, Clone)]
pub enum PositionReply {
    Held(BrokerPosition),
    NotFound,
    Error(String),
}

struct GatewayState {
    equity: Option<f64>,
    position: PositionReply,
    reject_orders: bool,
    orders: Vec<OrderRequest>,
    account_calls: usize,
    position_calls: usize,
    submit_calls: usize,
}

/// In-memory broker. Clones share state, so a test can keep one handle
/// while the bot owns another.
#[derive(Clone)]
pub struct MockOrderGateway {
    state: Arc<Mutex<GatewayState>>,
}

impl MockOrderGateway {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(GatewayState {
                equity: Some(10_000.0),
                position: PositionReply::NotFound,
                reject_orders: false,
                orders: Vec::new(),
                account_calls: 0,
                position_calls: 0,
                submit_calls: 0,
            })),
        }
    }

    pub fn with_equity(self, equity: f64) -> Self {
        self.state.lock().unwrap().equity = Some(equity);
        self
    }

    pub fn without_account(self) -> Self {
        self.state.lock().unwrap().equity = None;
        self
    }

    pub fn with_position(self, qty: f64, avg_entry_price: f64) -> Self {
        self.set_position(PositionReply::Held(BrokerPosition {
            qty,
            avg_entry_price,
            unrealized_pl: 0.0,
        }));
        self
    }

    pub fn with_position_error(self, reason: &str) -> Self {
        self.set_position(PositionReply::Error(reason.to_string()));
        self
    }

    pub fn rejecting_orders(self) -> Self {
        self.state.lock().unwrap().reject_orders = true;
        self
    }

    pub fn set_position(&self, reply: PositionReply) {
        self.state.lock().unwrap().position = reply;
    }

    pub fn set_reject_orders(&self, reject: bool) {
        self.state.lock().unwrap().reject_orders = reject;
    }

    pub fn orders(&self) -> Vec<OrderRequest> {
        self.state.lock().unwrap().orders.clone()
    }

    pub fn submit_calls(&self) -> usize {
        self.state.lock().unwrap().submit_calls
    }

    /// Every broker round trip: account, position and order calls.
    pub fn total_calls(&self) -> usize {
        let s = self.state.lock().unwrap();
        s.account_calls + s.position_calls + s.submit_calls
    }
}

impl OrderGateway for MockOrderGateway {
    fn account(&self) -> Result<Account, BotError> {
        let mut s = self.state.lock().unwrap();
        s.account_calls += 1;
        s.equity
            .map(|equity| Account {
                equity,
                last_equity: equity,
                buying_power: equity,
            })
            .ok_or_else(|| BotError::fetch("account", "mock account unavailable"))
    }

    fn position(&self, _symbol: &str) -> Result<Option<BrokerPosition>, BotError> {
        let mut s = self.state.lock().unwrap();
        s.position_calls += 1;
        match &s.position {
            PositionReply::Held(p) => Ok(Some(*p)),
            PositionReply::NotFound => Ok(None),
            PositionReply::Error(reason) => Err(BotError::fetch("position", reason)),
        }
    }

    fn submit_order(&self, order: &OrderRequest) -> Result<(), BotError> {
        let mut s = self.state.lock().unwrap();
        s.submit_calls += 1;
        if s.reject_orders {
            return Err(BotError::OrderRejected {
                side: order.side.to_string(),
                reason: "422 Unprocessable Entity".into(),
            });
        }
        s.orders.push(order.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MockStateStore {
    saved: Arc<Mutex<Option<BotState>>>,
    saves: Arc<Mutex<usize>>,
    fail_saves: Arc<Mutex<bool>>,
}

impl MockStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(self, state: BotState) -> Self {
        *self.saved.lock().unwrap() = Some(state);
        self
    }

    pub fn failing(self) -> Self {
        *self.fail_saves.lock().unwrap() = true;
        self
    }

    pub fn saved(&self) -> Option<BotState> {
        self.saved.lock().unwrap().clone()
    }

    pub fn saves(&self) -> usize {
        *self.saves.lock().unwrap()
    }
}

impl StatePort for MockStateStore {
    fn load(&self) -> Result<Option<BotState>, BotError> {
        Ok(self.saved.lock().unwrap().clone())
    }

    fn save(&self, state: &BotState) -> Result<(), BotError> {
        if *self.fail_saves.lock().unwrap() {
            return Err(BotError::persistence("mock disk full"));
        }
        *self.saves.lock().unwrap() += 1;
        *self.saved.lock().unwrap() = Some(state.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<(String, String)>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn subjects(&self) -> Vec<String> {
        self.sent().into_iter().map(|(s, _)| s).collect()
    }
}

impl NotifyPort for RecordingNotifier {
    fn notify(&self, subject: &str, body: &str) -> Result<(), BotError> {
        self.sent
            .lock()
            .unwrap()
            .push((subject.to_string(), body.to_string()));
        if self.fail {
            return Err(BotError::Notification {
                reason: "mock webhook down".into(),
            });
        }
        Ok(())
    }
}

/// Mocks for one engine or bot, each keeping a shared handle for assertions.
pub struct Harness {
    pub feed: MockPriceFeed,
    pub gateway: MockOrderGateway,
    pub store: MockStateStore,
    pub notifier: RecordingNotifier,
}

impl Harness {
    pub fn new(feed: MockPriceFeed, gateway: MockOrderGateway) -> Self {
        Self {
            feed,
            gateway,
            store: MockStateStore::new(),
            notifier: RecordingNotifier::new(),
        }
    }

    pub fn ports(&self) -> TickPorts<'_> {
        TickPorts {
            feed: &self.feed,
            gateway: &self.gateway,
            store: &self.store,
            notifier: &self.notifier,
        }
    }

    pub fn bot_ports(&self) -> BotPorts {
        BotPorts {
            feed: Box::new(self.feed.clone()),
            gateway: Box::new(self.gateway.clone()),
            store: Box::new(self.store.clone()),
            notifier: Box::new(self.notifier.clone()),
        }
    }
}

/// Short 3 / long 10 / RSI 10, stop-loss 5%, everything else default.
pub fn fast_config() -> StrategyConfig {
    StrategyConfig {
        symbol: "BTC/USD".into(),
        short_ma_period: 3,
        long_ma_period: 10,
        rsi_period: 10,
        ..StrategyConfig::default()
    }
}

/// A started engine with empty state.
pub fn running_engine(config: StrategyConfig) -> Engine {
    let control = Arc::new(BotControl::new());
    control.start();
    Engine::new(Arc::new(config), BotState::default(), control)
}

pub fn running_bot(config: StrategyConfig, harness: &Harness) -> Bot {
    let control = Arc::new(BotControl::new());
    let engine = Engine::new(Arc::new(config), BotState::default(), control);
    let bot = Bot::new(engine, harness.bot_ports());
    bot.start();
    bot
}

/// Twenty flat closes at 100 followed by 101..=110.
pub fn warmup_then_rally() -> Vec<f64> {
    let mut prices = vec![100.0; 20];
    prices.extend((101..=110).map(f64::from));
    prices
}
