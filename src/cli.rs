//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::bot::Bot;
use crate::domain::config_validation::{
    build_strategy_config, flag, validate_bot_config, validate_broker_config,
};
use crate::domain::engine::TickOutcome;
use crate::domain::error::BotError;
use crate::domain::strategy::StrategyConfig;
use crate::ports::config_port::ConfigPort;

#[derive(Parser, Debug)]
#[command(name = "crossbot", about = "Moving-average crossover trading bot")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the bot against the configured broker
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Run a single tick and exit
        #[arg(long)]
        once: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print the persisted bot state as JSON
    State {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// `[scheduler]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    pub check_interval: Duration,
    pub autostart: bool,
}

impl SchedulerConfig {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, BotError> {
        let interval_ms = config.get_int("scheduler", "check_interval_ms", 60_000);
        if interval_ms <= 0 {
            return Err(BotError::ConfigInvalid {
                section: "scheduler".into(),
                key: "check_interval_ms".into(),
                reason: "check_interval_ms must be positive".into(),
            });
        }
        Ok(SchedulerConfig {
            check_interval: Duration::from_millis(interval_ms as u64),
            autostart: flag(config, "scheduler", "autostart", true)?,
        })
    }
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Run { config, once } => run_bot(&config, once),
        Command::Validate { config } => run_validate(&config),
        Command::State { config } => run_state(&config),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, BotError> {
    tracing::info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

/// Validate every section the bot needs and build the strategy config.
pub fn load_validated(config: &dyn ConfigPort) -> Result<StrategyConfig, BotError> {
    validate_bot_config(config)?;
    validate_broker_config(config)?;
    SchedulerConfig::from_config(config)?;
    build_strategy_config(config)
}

fn run_validate(path: &Path) -> Result<(), BotError> {
    let adapter = load_config(path)?;
    let strategy = load_validated(&adapter)?;
    let scheduler = SchedulerConfig::from_config(&adapter)?;

    eprintln!("Config validated successfully");
    eprintln!("  symbol:          {}", strategy.symbol);
    eprintln!(
        "  MA periods:      {} / {}",
        strategy.short_ma_period, strategy.long_ma_period
    );
    eprintln!("  RSI period:      {}", strategy.rsi_period);
    eprintln!("  risk fraction:   {}", strategy.risk_fraction);
    eprintln!("  stop-loss:       {}", strategy.stop_loss_pct);
    if strategy.take_profit_enabled {
        eprintln!("  take-profit:     {}", strategy.take_profit_pct);
    }
    if strategy.trailing_stop_enabled {
        eprintln!("  trailing stop:   {}", strategy.trailing_stop_pct);
    }
    eprintln!("  time in force:   {}", strategy.time_in_force);
    eprintln!("  warm-up ticks:   {}", strategy.required_history());
    eprintln!("  tick interval:   {:?}", scheduler.check_interval);
    Ok(())
}

#[cfg(feature = "sqlite")]
fn run_state(path: &Path) -> Result<(), BotError> {
    use crate::adapters::sqlite_adapter::SqliteStateAdapter;
    use crate::ports::state_port::StatePort;

    let adapter = load_config(path)?;
    let store = SqliteStateAdapter::from_config(&adapter)?;
    store.initialize_schema()?;
    match store.load()? {
        Some(state) => {
            let json = serde_json::to_string_pretty(&state)
                .map_err(|e: serde_json::Error| BotError::persistence(e))?;
            println!("{json}");
        }
        None => eprintln!("no persisted state"),
    }
    Ok(())
}

#[cfg(not(feature = "sqlite"))]
fn run_state(_path: &Path) -> Result<(), BotError> {
    Err(BotError::ConfigInvalid {
        section: "sqlite".into(),
        key: "path".into(),
        reason: "built without the sqlite feature".into(),
    })
}

#[cfg(feature = "sqlite")]
fn build_bot(adapter: &FileConfigAdapter) -> Result<Bot, BotError> {
    use crate::adapters::alpaca_adapter::{AlpacaAdapter, AlpacaConfig};
    use crate::adapters::notifier::notifier_from_config;
    use crate::adapters::sqlite_adapter::SqliteStateAdapter;
    use crate::domain::bot::BotPorts;
    use crate::domain::control::BotControl;
    use crate::domain::engine::Engine;

    let strategy = Arc::new(load_validated(adapter)?);

    let store = SqliteStateAdapter::from_config(adapter)?;
    store.initialize_schema()?;

    let broker = AlpacaAdapter::new(&AlpacaConfig::from_config(adapter)?)?;
    let notifier = notifier_from_config(adapter)?;

    let control = Arc::new(BotControl::new());
    let engine = Engine::restore(strategy, &store, control)?;

    Ok(Bot::new(
        engine,
        BotPorts {
            feed: Box::new(broker.clone()),
            gateway: Box::new(broker),
            store: Box::new(store),
            notifier,
        },
    ))
}

#[cfg(feature = "sqlite")]
fn run_bot(path: &Path, once: bool) -> Result<(), BotError> {
    let adapter = load_config(path)?;
    let scheduler = SchedulerConfig::from_config(&adapter)?;
    let bot = Arc::new(build_bot(&adapter)?);

    bot.reconcile()?;

    if once {
        bot.start();
        let outcome = bot.run_tick()?;
        eprintln!("{}", bot.status());
        if let Some(outcome) = outcome {
            tracing::info!(?outcome, "tick complete");
        }
        return Ok(());
    }

    if scheduler.autostart {
        bot.start();
    } else {
        tracing::info!("autostart disabled, waiting for start");
    }

    #[cfg(feature = "web")]
    {
        serve_web(&adapter, bot, scheduler.check_interval)
    }

    #[cfg(not(feature = "web"))]
    {
        tick_loop(&bot, scheduler.check_interval)
    }
}

#[cfg(not(feature = "sqlite"))]
fn run_bot(_path: &Path, _once: bool) -> Result<(), BotError> {
    Err(BotError::ConfigInvalid {
        section: "sqlite".into(),
        key: "path".into(),
        reason: "built without the sqlite feature".into(),
    })
}

/// Tick at a fixed interval until persistence fails.
///
/// Other tick failures are already absorbed by the engine; a stopped bot
/// keeps the loop alive but skips the tick.
pub fn tick_loop(bot: &Bot, interval: Duration) -> Result<(), BotError> {
    tracing::info!(interval = ?interval, "scheduler started");
    loop {
        match bot.run_tick() {
            Ok(Some(outcome)) => log_outcome(&outcome),
            Ok(None) => tracing::debug!("bot stopped, tick skipped"),
            Err(e) => {
                tracing::error!(error = %e, "tick failed, shutting down");
                return Err(e);
            }
        }
        std::thread::sleep(interval);
    }
}

fn log_outcome(outcome: &TickOutcome) {
    match outcome {
        TickOutcome::DataUnavailable => tracing::warn!("no price data this tick"),
        TickOutcome::GatheringData { have, required } => {
            tracing::info!(have, required, "gathering price data")
        }
        TickOutcome::Entered(result) => tracing::info!(?result, "entry signal"),
        TickOutcome::Exited { reason, outcome } => {
            tracing::info!(reason = %reason, ?outcome, "exit signal")
        }
        TickOutcome::NoSignal => tracing::debug!("no signal"),
    }
}

#[cfg(feature = "web")]
fn serve_web(
    adapter: &FileConfigAdapter,
    bot: Arc<Bot>,
    interval: Duration,
) -> Result<(), BotError> {
    use std::net::SocketAddr;

    let listen = adapter
        .get_string("web", "listen")
        .unwrap_or_else(|| "127.0.0.1:8080".to_string());
    let addr: SocketAddr = listen.parse().map_err(|_| BotError::ConfigInvalid {
        section: "web".into(),
        key: "listen".into(),
        reason: format!("'{listen}' is not a socket address"),
    })?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(%addr, "control API listening");
        serve_with_ticker(listener, bot, interval).await
    })
}

/// Serve the control API while a dedicated thread runs the tick loop.
///
/// Returns when either side ends. A tick loop failure stops the bot, drops the
/// server and is returned as the error.
#[cfg(feature = "web")]
pub async fn serve_with_ticker(
    listener: tokio::net::TcpListener,
    bot: Arc<Bot>,
    interval: Duration,
) -> Result<(), BotError> {
    use crate::adapters::web::{build_router, AppState};
    use std::future::IntoFuture;

    let (done_tx, done_rx) = tokio::sync::oneshot::channel();
    let ticker_bot = Arc::clone(&bot);
    std::thread::Builder::new()
        .name("crossbot-ticker".into())
        .spawn(move || {
            let _ = done_tx.send(tick_loop(&ticker_bot, interval));
        })?;

    let server = axum::serve(listener, build_router(AppState { bot: Arc::clone(&bot) }));
    tokio::select! {
        served = server.into_future() => Ok(served?),
        ticked = done_rx => {
            bot.stop();
            match ticked {
                Ok(result) => result,
                Err(_) => Err(BotError::Io(std::io::Error::other("ticker thread panicked"))),
            }
        }
    }
}
