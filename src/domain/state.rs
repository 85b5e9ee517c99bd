//! The bot's single persisted state record.

use serde::{Deserialize, Serialize};

use crate::domain::indicator::IndicatorPair;
use crate::domain::position::PositionState;
use crate::domain::price_history::PriceHistory;

/// Fixed identity of the one state record per process.
pub const STATE_ID: i64 = 1;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BotState {
    pub position: PositionState,
    /// Moving averages from the previous evaluated tick, for edge detection.
    pub previous: IndicatorPair,
    pub history: PriceHistory,
}
