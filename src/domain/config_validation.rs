//! Configuration validation.
//!
//! Every field is checked before the bot touches the broker. Missing optional
//! keys fall back to `StrategyConfig::default()`; present but unparseable
//! values are rejected rather than silently defaulted.

use std::str::FromStr;

use crate::domain::error::BotError;
use crate::domain::strategy::{StrategyConfig, TimeInForce};
use crate::ports::config_port::ConfigPort;

pub const BOT_SECTION: &str = "bot";
pub const BROKER_SECTION: &str = "alpaca";

pub fn validate_bot_config(config: &dyn ConfigPort) -> Result<(), BotError> {
    validate_symbol(config)?;
    validate_periods(config)?;
    validate_risk_fraction(config)?;
    validate_stop_loss(config)?;
    validate_optional_pct(config, "take_profit_enabled", "take_profit_pct")?;
    validate_optional_pct(config, "trailing_stop_enabled", "trailing_stop_pct")?;
    validate_min_notional(config)?;
    validate_history_slack(config)?;
    validate_time_in_force(config)?;
    Ok(())
}

pub fn validate_broker_config(config: &dyn ConfigPort) -> Result<(), BotError> {
    for key in ["api_key", "api_secret"] {
        require(config, BROKER_SECTION, key)?;
    }
    for key in ["base_url", "data_url"] {
        let url = require(config, BROKER_SECTION, key)?;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(invalid(BROKER_SECTION, key, "must be an http(s) URL"));
        }
    }
    let timeout = parse_or(config, BROKER_SECTION, "timeout_ms", 10_000i64)?;
    if timeout <= 0 {
        return Err(invalid(BROKER_SECTION, "timeout_ms", "timeout_ms must be positive"));
    }
    Ok(())
}

/// Build the immutable strategy config; call after `validate_bot_config`.
pub fn build_strategy_config(config: &dyn ConfigPort) -> Result<StrategyConfig, BotError> {
    let d = StrategyConfig::default();
    Ok(StrategyConfig {
        symbol: config
            .get_string(BOT_SECTION, "symbol")
            .map(|s| s.trim().to_string())
            .unwrap_or(d.symbol),
        short_ma_period: period(config, "short_ma_period", d.short_ma_period)?,
        long_ma_period: period(config, "long_ma_period", d.long_ma_period)?,
        rsi_period: period(config, "rsi_period", d.rsi_period)?,
        risk_fraction: parse_or(config, BOT_SECTION, "risk_fraction", d.risk_fraction)?,
        stop_loss_pct: parse_or(config, BOT_SECTION, "stop_loss_pct", d.stop_loss_pct)?,
        take_profit_enabled: flag(config, BOT_SECTION, "take_profit_enabled", false)?,
        take_profit_pct: parse_or(config, BOT_SECTION, "take_profit_pct", d.take_profit_pct)?,
        trailing_stop_enabled: flag(config, BOT_SECTION, "trailing_stop_enabled", false)?,
        trailing_stop_pct: parse_or(config, BOT_SECTION, "trailing_stop_pct", d.trailing_stop_pct)?,
        min_notional: parse_or(config, BOT_SECTION, "min_notional", d.min_notional)?,
        history_slack: parse_or(config, BOT_SECTION, "history_slack", d.history_slack)?,
        time_in_force: parse_or(config, BOT_SECTION, "time_in_force", d.time_in_force)?,
    })
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), BotError> {
    match config.get_string(BOT_SECTION, "symbol") {
        Some(s) if s.trim().is_empty() => {
            Err(invalid(BOT_SECTION, "symbol", "symbol must not be empty"))
        }
        _ => Ok(()),
    }
}

fn validate_periods(config: &dyn ConfigPort) -> Result<(), BotError> {
    let d = StrategyConfig::default();
    let short = period(config, "short_ma_period", d.short_ma_period)?;
    let long = period(config, "long_ma_period", d.long_ma_period)?;
    period(config, "rsi_period", d.rsi_period)?;
    if short >= long {
        return Err(invalid(
            BOT_SECTION,
            "short_ma_period",
            "short_ma_period must be less than long_ma_period",
        ));
    }
    Ok(())
}

fn validate_risk_fraction(config: &dyn ConfigPort) -> Result<(), BotError> {
    let value: f64 = parse_or(config, BOT_SECTION, "risk_fraction", 0.1)?;
    if !(value > 0.0 && value <= 1.0) {
        return Err(invalid(
            BOT_SECTION,
            "risk_fraction",
            "risk_fraction must be in (0, 1]",
        ));
    }
    Ok(())
}

fn validate_stop_loss(config: &dyn ConfigPort) -> Result<(), BotError> {
    let value: f64 = parse_or(config, BOT_SECTION, "stop_loss_pct", 0.05)?;
    if !(value > 0.0 && value < 1.0) {
        return Err(invalid(
            BOT_SECTION,
            "stop_loss_pct",
            "stop_loss_pct must be in (0, 1)",
        ));
    }
    Ok(())
}

fn validate_optional_pct(
    config: &dyn ConfigPort,
    enabled_key: &str,
    pct_key: &str,
) -> Result<(), BotError> {
    let enabled = flag(config, BOT_SECTION, enabled_key, false)?;
    let value: f64 = parse_or(config, BOT_SECTION, pct_key, 0.0)?;
    if enabled && !(value > 0.0 && value < 1.0) {
        return Err(invalid(
            BOT_SECTION,
            pct_key,
            &format!("{pct_key} must be in (0, 1) when {enabled_key} is set"),
        ));
    }
    Ok(())
}

fn validate_min_notional(config: &dyn ConfigPort) -> Result<(), BotError> {
    let value: f64 = parse_or(config, BOT_SECTION, "min_notional", 1.0)?;
    if !(value >= 0.0) {
        return Err(invalid(
            BOT_SECTION,
            "min_notional",
            "min_notional must be non-negative",
        ));
    }
    Ok(())
}

fn validate_history_slack(config: &dyn ConfigPort) -> Result<(), BotError> {
    parse_or::<usize>(config, BOT_SECTION, "history_slack", 100).map(|_| ())
}

fn validate_time_in_force(config: &dyn ConfigPort) -> Result<(), BotError> {
    parse_or(config, BOT_SECTION, "time_in_force", TimeInForce::Gtc).map(|_| ())
}

fn period(config: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, BotError> {
    let value: usize = parse_or(config, BOT_SECTION, key, default)?;
    if value == 0 {
        return Err(invalid(BOT_SECTION, key, &format!("{key} must be at least 1")));
    }
    Ok(value)
}

fn require(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, BotError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(BotError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

/// Parse `[section] key` when present, else return `default`.
fn parse_or<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: T,
) -> Result<T, BotError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| invalid(section, key, &format!("cannot parse '{}'", raw.trim()))),
    }
}

/// Read a boolean `[section] key`, rejecting values that are present but not
/// a recognised spelling.
pub fn flag(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: bool,
) -> Result<bool, BotError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(default);
    };
    // Unrecognised spellings fall back to the supplied default, so they
    // disagree across the two defaults.
    let value = config.get_bool(section, key, true);
    if value != config.get_bool(section, key, false) {
        return Err(invalid(section, key, &format!("cannot parse '{}' as a boolean", raw.trim())));
    }
    Ok(value)
}

fn invalid(section: &str, key: &str, reason: &str) -> BotError {
    BotError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
