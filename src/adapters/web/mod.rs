//! JSON control API over a running bot.

mod error;
mod handlers;

pub use error::WebError;
pub use handlers::format_usd;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::domain::bot::Bot;

pub struct AppState {
    pub bot: Arc<Bot>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/state", get(handlers::full_state))
        .route("/api/start", post(handlers::start))
        .route("/api/stop", post(handlers::stop))
        .route("/api/chart-data", get(handlers::chart_data))
        .route("/status", get(handlers::status))
        .route("/activity", get(handlers::activity))
        .route("/price", get(handlers::price))
        .route("/account", get(handlers::account))
        .fallback(handlers::not_found)
        .with_state(Arc::new(state))
}
