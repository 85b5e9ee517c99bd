//! Trade notification adapters.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Serialize;

use crate::domain::error::BotError;
use crate::ports::config_port::ConfigPort;
use crate::ports::notify_port::NotifyPort;

/// Writes notifications to the process log only.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl NotifyPort for LogNotifier {
    fn notify(&self, subject: &str, body: &str) -> Result<(), BotError> {
        tracing::info!(subject, body, "notification");
        Ok(())
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    subject: &'a str,
    body: &'a str,
}

/// POSTs `{subject, body}` as JSON to a fixed URL.
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, BotError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e: reqwest::Error| BotError::Notification {
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl NotifyPort for WebhookNotifier {
    fn notify(&self, subject: &str, body: &str) -> Result<(), BotError> {
        self.client
            .post(&self.url)
            .json(&WebhookPayload { subject, body })
            .send()
            .and_then(|r| r.error_for_status())
            .map(|_| ())
            .map_err(|e: reqwest::Error| BotError::Notification {
                reason: e.to_string(),
            })
    }
}

/// Webhook notifier when `[notification] webhook_url` is set, log-only otherwise.
pub fn notifier_from_config(
    config: &dyn ConfigPort,
) -> Result<Box<dyn NotifyPort + Send + Sync>, BotError> {
    match config
        .get_string("notification", "webhook_url")
        .filter(|u| !u.trim().is_empty())
    {
        Some(url) => {
            let timeout_ms = config.get_int("notification", "timeout_ms", 5_000).max(1) as u64;
            tracing::info!(url = %url, "webhook notifications enabled");
            Ok(Box::new(WebhookNotifier::new(
                url.trim(),
                Duration::from_millis(timeout_ms),
            )?))
        }
        None => Ok(Box::new(LogNotifier)),
    }
}
