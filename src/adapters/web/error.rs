//! HTTP error responses for the control API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::error::BotError;

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

pub fn status_from_error(err: &BotError) -> StatusCode {
    match err {
        BotError::Fetch { .. } | BotError::OrderRejected { .. } => StatusCode::BAD_GATEWAY,
        BotError::ConfigMissing { .. }
        | BotError::ConfigInvalid { .. }
        | BotError::ConfigParse { .. } => StatusCode::BAD_REQUEST,
        BotError::Persistence { .. } | BotError::Notification { .. } | BotError::Io(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<BotError> for WebError {
    fn from(err: BotError) -> Self {
        Self::new(status_from_error(&err), err.to_string())
    }
}

impl From<tokio::task::JoinError> for WebError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::internal(format!("background task failed: {err}"))
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
