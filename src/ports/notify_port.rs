//! Outbound trade notifications.

use crate::domain::error::BotError;

pub trait NotifyPort {
    fn notify(&self, subject: &str, body: &str) -> Result<(), BotError>;
}
