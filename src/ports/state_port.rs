//! Persistence port for the bot's single state record.

use crate::domain::error::BotError;
use crate::domain::state::BotState;

pub trait StatePort {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<BotState>, BotError>;

    fn save(&self, state: &BotState) -> Result<(), BotError>;
}
