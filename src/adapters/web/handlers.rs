//! HTTP request handlers for the control API.
//!
//! Broker calls are blocking, so anything touching the gateway runs on the
//! blocking pool. Everything else reads the published snapshot.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::domain::bot::{AccountSummary, BotSnapshot};
use crate::domain::control::LogEntry;
use crate::domain::price_history::ChartData;

use super::{AppState, WebError};

#[derive(Debug, Serialize)]
pub struct MessageView {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StatusView {
    pub running: bool,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct PriceView {
    pub price: f64,
    pub formatted_price: String,
    pub rsi: f64,
    pub formatted_rsi: String,
}

#[derive(Debug, Serialize)]
pub struct AccountView {
    pub equity: String,
    pub position_gain_loss: String,
    pub is_positive: bool,
}

#[derive(Debug, Serialize)]
pub struct StateView {
    pub running: bool,
    pub status: String,
    pub snapshot: BotSnapshot,
    /// Absent when the broker could not be reached.
    pub account: Option<AccountSummary>,
    pub activity: Vec<LogEntry>,
}

pub async fn full_state(State(state): State<Arc<AppState>>) -> Result<Json<StateView>, WebError> {
    let bot = Arc::clone(&state.bot);
    let account = tokio::task::spawn_blocking(move || bot.account_summary()).await?;
    let account = match account {
        Ok(a) => Some(a),
        Err(e) => {
            tracing::warn!(error = %e, "account unavailable for state view");
            None
        }
    };

    Ok(Json(StateView {
        running: state.bot.is_running(),
        status: state.bot.status(),
        snapshot: (*state.bot.snapshot()).clone(),
        account,
        activity: state.bot.activity(),
    }))
}

pub async fn start(State(state): State<Arc<AppState>>) -> Json<MessageView> {
    state.bot.start();
    Json(MessageView {
        message: "Bot has been STARTED.",
    })
}

pub async fn stop(State(state): State<Arc<AppState>>) -> Json<MessageView> {
    state.bot.stop();
    Json(MessageView {
        message: "Bot has been STOPPED.",
    })
}

pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusView> {
    Json(StatusView {
        running: state.bot.is_running(),
        status: state.bot.status(),
    })
}

pub async fn activity(State(state): State<Arc<AppState>>) -> Json<Vec<LogEntry>> {
    Json(state.bot.activity())
}

pub async fn price(State(state): State<Arc<AppState>>) -> Json<PriceView> {
    let snapshot = state.bot.snapshot();
    let price = snapshot.position.last_known_price;
    let rsi = snapshot.position.last_known_rsi;
    Json(PriceView {
        price,
        formatted_price: format_usd(price),
        rsi,
        formatted_rsi: format!("{rsi:.2}"),
    })
}

pub async fn account(State(state): State<Arc<AppState>>) -> Result<Json<AccountView>, WebError> {
    let bot = Arc::clone(&state.bot);
    let summary = tokio::task::spawn_blocking(move || bot.account_summary()).await??;
    let pl = summary.unrealized_pl;
    Ok(Json(AccountView {
        equity: format_usd(summary.equity),
        position_gain_loss: format!("{}{}", if pl >= 0.0 { "+" } else { "-" }, format_usd(pl.abs())),
        is_positive: pl >= 0.0,
    }))
}

pub async fn chart_data(State(state): State<Arc<AppState>>) -> Json<ChartData> {
    Json(state.bot.snapshot().chart.clone())
}

pub async fn not_found() -> WebError {
    WebError::not_found("no such endpoint")
}

/// `$` amount with thousands separators and two decimals.
pub fn format_usd(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{frac}")
}
